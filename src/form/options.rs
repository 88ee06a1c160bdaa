//! Form fields, their option sets and bounds

use crate::data::{schema, CarQuery};
use crate::error::{PriceError, Result};
use crate::preprocessing::Vocabulary;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Inclusive integer bounds with the value shown before any input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl NumericRange {
    pub const fn new(min: u32, max: u32, default: u32) -> Self {
        Self { min, max, default }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Parse a submitted value and pull it into bounds. Blank or
    /// unparsable input yields the default.
    pub fn clamp_raw(&self, raw: Option<&str>) -> u32 {
        let parsed = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite());

        match parsed {
            Some(v) => v.round().clamp(self.min as f64, self.max as f64) as u32,
            None => self.default,
        }
    }
}

/// The nine inputs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    City,
    FuelType,
    BodyType,
    TransmissionType,
    PreviousOwners,
    EngineDisplacement,
    KilometersDriven,
    YearOfManufacture,
    Seats,
}

impl FieldId {
    pub const ALL: [FieldId; 9] = [
        FieldId::City,
        FieldId::FuelType,
        FieldId::BodyType,
        FieldId::TransmissionType,
        FieldId::PreviousOwners,
        FieldId::EngineDisplacement,
        FieldId::KilometersDriven,
        FieldId::YearOfManufacture,
        FieldId::Seats,
    ];

    /// Name of the submitted form field
    pub fn key(self) -> &'static str {
        match self {
            FieldId::City => "city",
            FieldId::FuelType => "fuel_type",
            FieldId::BodyType => "body_type",
            FieldId::TransmissionType => "transmission_type",
            FieldId::PreviousOwners => "previous_owners",
            FieldId::EngineDisplacement => "engine_displacement",
            FieldId::KilometersDriven => "kilometers_driven",
            FieldId::YearOfManufacture => "year_of_manufacture",
            FieldId::Seats => "seats",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::City => "City",
            FieldId::FuelType => "Fuel Type",
            FieldId::BodyType => "Body Type",
            FieldId::TransmissionType => "Transmission Type",
            FieldId::PreviousOwners => "Previous Owners",
            FieldId::EngineDisplacement => "Engine Displacement (cc)",
            FieldId::KilometersDriven => "Kilometers Driven",
            FieldId::YearOfManufacture => "Year of Manufacture",
            FieldId::Seats => "Seats",
        }
    }

    /// Dataset column the field fills
    pub fn column(self) -> &'static str {
        match self {
            FieldId::City => schema::CITY,
            FieldId::FuelType => schema::FUEL_TYPE,
            FieldId::BodyType => schema::BODY_TYPE,
            FieldId::TransmissionType => schema::TRANSMISSION_TYPE,
            FieldId::PreviousOwners => schema::PREVIOUS_OWNERS,
            FieldId::EngineDisplacement => schema::ENGINE_DISPLACEMENT,
            FieldId::KilometersDriven => schema::KILOMETERS_DRIVEN,
            FieldId::YearOfManufacture => schema::YEAR_OF_MANUFACTURE,
            FieldId::Seats => schema::SEATS,
        }
    }

    /// Current value in `query`, as the form would display it
    pub fn value_of(self, query: &CarQuery) -> String {
        match self {
            FieldId::City => query.city.clone(),
            FieldId::FuelType => query.fuel_type.clone(),
            FieldId::BodyType => query.body_type.clone(),
            FieldId::TransmissionType => query.transmission_type.clone(),
            FieldId::PreviousOwners => query.previous_owners.to_string(),
            FieldId::EngineDisplacement => query.engine_displacement.to_string(),
            FieldId::KilometersDriven => query.kilometers_driven.to_string(),
            FieldId::YearOfManufacture => query.year_of_manufacture.to_string(),
            FieldId::Seats => query.seats.to_string(),
        }
    }
}

/// How a field is presented
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind<'a> {
    /// Dropdown
    Select(&'a [String]),
    /// Horizontal radio buttons
    Radio(&'a [String]),
    Number(NumericRange),
    /// Shown, not editable
    Fixed(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    pub id: FieldId,
    pub kind: FieldKind<'a>,
}

/// Option sets and bounds of the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSpec {
    pub cities: Vec<String>,
    pub fuel_types: Vec<String>,
    pub body_types: Vec<String>,
    pub transmission_types: Vec<String>,
    pub previous_owners: Vec<String>,
    pub engine_displacement: NumericRange,
    pub kilometers_driven: NumericRange,
    pub year_of_manufacture: NumericRange,
    pub seats: u32,
}

/// A form option the fitted vocabulary cannot resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyGap {
    pub column: String,
    pub option: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for FormSpec {
    fn default() -> Self {
        Self::standard()
    }
}

impl FormSpec {
    pub fn standard() -> Self {
        Self {
            cities: strings(&["Bangalore", "Chennai", "Delhi", "Hyderabad", "Jaipur", "Kolkata"]),
            fuel_types: strings(&["Petrol", "Diesel", "CNG", "LPG"]),
            body_types: strings(&["Sedan", "Hatchback", "SUV", "Minivans", "MUV", "Wagon"]),
            transmission_types: strings(&["Manual", "Automatic"]),
            previous_owners: strings(&["0", "1", "2", "3"]),
            engine_displacement: NumericRange::new(793, 1896, 793),
            kilometers_driven: NumericRange::new(0, 154_931, 0),
            year_of_manufacture: NumericRange::new(1985, 2023, 1985),
            seats: 5,
        }
    }

    /// Fields in display order
    pub fn fields(&self) -> Vec<Field<'_>> {
        FieldId::ALL
            .iter()
            .map(|&id| Field { id, kind: self.kind(id) })
            .collect()
    }

    pub fn kind(&self, id: FieldId) -> FieldKind<'_> {
        match id {
            FieldId::City => FieldKind::Select(&self.cities),
            FieldId::FuelType => FieldKind::Radio(&self.fuel_types),
            FieldId::BodyType => FieldKind::Radio(&self.body_types),
            FieldId::TransmissionType => FieldKind::Radio(&self.transmission_types),
            FieldId::PreviousOwners => FieldKind::Select(&self.previous_owners),
            FieldId::EngineDisplacement => FieldKind::Number(self.engine_displacement),
            FieldId::KilometersDriven => FieldKind::Number(self.kilometers_driven),
            FieldId::YearOfManufacture => FieldKind::Number(self.year_of_manufacture),
            FieldId::Seats => FieldKind::Fixed(self.seats),
        }
    }

    /// First option of every choice and the default of every number
    pub fn default_query(&self) -> CarQuery {
        FormInput::default().into_query(self)
    }

    /// Reject values the form could not have produced
    pub fn validate(&self, query: &CarQuery) -> Result<()> {
        let numbers = [
            (FieldId::EngineDisplacement, self.engine_displacement, query.engine_displacement),
            (FieldId::KilometersDriven, self.kilometers_driven, query.kilometers_driven),
            (FieldId::YearOfManufacture, self.year_of_manufacture, query.year_of_manufacture),
        ];
        for (id, range, value) in numbers {
            if !range.contains(value) {
                return Err(PriceError::ValidationError(format!(
                    "{} must be between {} and {}, got {}",
                    id.column(),
                    range.min,
                    range.max,
                    value
                )));
            }
        }

        if query.seats != self.seats {
            return Err(PriceError::ValidationError(format!(
                "{} is fixed at {}, got {}",
                schema::SEATS,
                self.seats,
                query.seats
            )));
        }

        let owners = query.previous_owners.to_string();
        if !self.previous_owners.contains(&owners) {
            return Err(PriceError::ValidationError(format!(
                "{} must be one of {}, got {}",
                schema::PREVIOUS_OWNERS,
                self.previous_owners.join(", "),
                owners
            )));
        }

        Ok(())
    }

    /// Options of the categorical model inputs that `vocabularies` cannot
    /// resolve. Each gap is logged; selecting one hits the unknown-category path.
    pub fn audit(&self, vocabularies: &[Vocabulary]) -> Vec<VocabularyGap> {
        let checked = [
            (schema::CITY, &self.cities),
            (schema::FUEL_TYPE, &self.fuel_types),
            (schema::BODY_TYPE, &self.body_types),
            (schema::TRANSMISSION_TYPE, &self.transmission_types),
        ];

        let mut gaps = Vec::new();
        for (column, options) in checked {
            let Some(vocab) = vocabularies.iter().find(|v| v.column == column) else {
                continue;
            };
            for option in options {
                if vocab.resolve(option).is_none() {
                    warn!(column, option = %option, "Form option missing from dataset");
                    gaps.push(VocabularyGap { column: column.to_string(), option: option.clone() });
                }
            }
        }
        gaps
    }
}

/// Raw form submission; every field may be absent or malformed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub city: Option<String>,
    pub fuel_type: Option<String>,
    pub body_type: Option<String>,
    pub transmission_type: Option<String>,
    pub previous_owners: Option<String>,
    pub engine_displacement: Option<String>,
    pub kilometers_driven: Option<String>,
    pub year_of_manufacture: Option<String>,
}

impl FormInput {
    /// Copy every field of `query` into a submission
    pub fn from_query(query: &CarQuery) -> Self {
        Self {
            city: Some(query.city.clone()),
            fuel_type: Some(query.fuel_type.clone()),
            body_type: Some(query.body_type.clone()),
            transmission_type: Some(query.transmission_type.clone()),
            previous_owners: Some(query.previous_owners.to_string()),
            engine_displacement: Some(query.engine_displacement.to_string()),
            kilometers_driven: Some(query.kilometers_driven.to_string()),
            year_of_manufacture: Some(query.year_of_manufacture.to_string()),
        }
    }

    /// Set one field by id. `Seats` is fixed and ignored.
    pub fn set(&mut self, id: FieldId, value: impl Into<String>) {
        let value = Some(value.into());
        match id {
            FieldId::City => self.city = value,
            FieldId::FuelType => self.fuel_type = value,
            FieldId::BodyType => self.body_type = value,
            FieldId::TransmissionType => self.transmission_type = value,
            FieldId::PreviousOwners => self.previous_owners = value,
            FieldId::EngineDisplacement => self.engine_displacement = value,
            FieldId::KilometersDriven => self.kilometers_driven = value,
            FieldId::YearOfManufacture => self.year_of_manufacture = value,
            FieldId::Seats => {}
        }
    }

    /// Clamp numbers into bounds and map choices onto their option sets
    pub fn into_query(self, spec: &FormSpec) -> CarQuery {
        let owners = choose(FieldId::PreviousOwners, &spec.previous_owners, self.previous_owners.as_deref());

        CarQuery {
            city: choose(FieldId::City, &spec.cities, self.city.as_deref()),
            fuel_type: choose(FieldId::FuelType, &spec.fuel_types, self.fuel_type.as_deref()),
            body_type: choose(FieldId::BodyType, &spec.body_types, self.body_type.as_deref()),
            transmission_type: choose(
                FieldId::TransmissionType,
                &spec.transmission_types,
                self.transmission_type.as_deref(),
            ),
            seats: spec.seats,
            engine_displacement: spec.engine_displacement.clamp_raw(self.engine_displacement.as_deref()),
            kilometers_driven: spec.kilometers_driven.clamp_raw(self.kilometers_driven.as_deref()),
            year_of_manufacture: spec.year_of_manufacture.clamp_raw(self.year_of_manufacture.as_deref()),
            previous_owners: owners.parse().unwrap_or(0),
        }
    }
}

/// The option matching `raw` (exactly, else ignoring case), or the first option
fn choose(id: FieldId, options: &[String], raw: Option<&str>) -> String {
    let first = options.first().cloned().unwrap_or_default();
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return first;
    };

    if let Some(hit) = options.iter().find(|o| o.as_str() == raw) {
        return hit.clone();
    }
    if let Some(hit) = options.iter().find(|o| o.eq_ignore_ascii_case(raw)) {
        return hit.clone();
    }

    warn!(field = id.key(), value = %raw, fallback = %first, "Value outside option set");
    first
}
