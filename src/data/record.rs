//! Query record built from one form submission

use super::schema;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Attributes of the car being priced. Same columns as a historical record
/// minus `Price`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarQuery {
    pub city: String,
    pub fuel_type: String,
    pub body_type: String,
    pub transmission_type: String,
    pub seats: u32,
    pub engine_displacement: u32,
    pub kilometers_driven: u32,
    pub year_of_manufacture: u32,
    pub previous_owners: u8,
}

impl CarQuery {
    /// Package the query as a single-row table with the historical column names
    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            schema::CITY => &[self.city.as_str()],
            schema::FUEL_TYPE => &[self.fuel_type.as_str()],
            schema::BODY_TYPE => &[self.body_type.as_str()],
            schema::TRANSMISSION_TYPE => &[self.transmission_type.as_str()],
            schema::SEATS => &[self.seats as i64],
            schema::ENGINE_DISPLACEMENT => &[self.engine_displacement as i64],
            schema::KILOMETERS_DRIVEN => &[self.kilometers_driven as i64],
            schema::YEAR_OF_MANUFACTURE => &[self.year_of_manufacture as i64],
            schema::PREVIOUS_OWNERS => &[self.previous_owners.to_string()]
        )?;
        Ok(df)
    }
}
