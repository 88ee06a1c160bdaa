//! Integration test: dataset to price, end to end

use car_price::config::ModelSettings;
use car_price::data::CarQuery;
use car_price::form::{format_price, FormSpec};
use car_price::pipeline::FittedPipeline;
use car_price::preprocessing::UnknownCategoryPolicy;
use car_price::PriceError;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn bundled() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/car_data.csv")
}

fn delhi_query() -> CarQuery {
    CarQuery {
        city: "Delhi".into(),
        fuel_type: "Petrol".into(),
        body_type: "Sedan".into(),
        transmission_type: "Manual".into(),
        seats: 5,
        engine_displacement: 1200,
        kilometers_driven: 20000,
        year_of_manufacture: 2015,
        previous_owners: 0,
    }
}

#[test]
fn test_golden_city_price() {
    let pipeline = FittedPipeline::from_path(&fixture("golden_city.csv"), &ModelSettings::default()).unwrap();

    let price = pipeline.predict(&delhi_query()).unwrap();
    assert_eq!(price, 500000.0);
    assert_eq!(format_price(price, "₹"), "₹500,000");

    let chennai = CarQuery { city: "Chennai".into(), ..delhi_query() };
    assert_eq!(pipeline.predict(&chennai).unwrap(), 420000.0);
}

#[test]
fn test_bundled_dataset_snapshot() {
    // Fixed by the bundled file, 100 trees and seed 42; changes mean the
    // bootstrap draws, split search or averaging changed.
    let pipeline = FittedPipeline::from_path(&bundled(), &ModelSettings::default()).unwrap();
    let price = pipeline.predict(&delhi_query()).unwrap();
    assert!((price - 406310.0).abs() < 1e-6, "bundled Delhi price drifted to {}", price);
    assert_eq!(format_price(price, "₹"), "₹406,310");
}

#[test]
fn test_summary_describes_fit() {
    let pipeline = FittedPipeline::from_path(&fixture("golden_city.csv"), &ModelSettings::default()).unwrap();
    let summary = pipeline.summary();

    assert_eq!(summary.rows, 40);
    assert_eq!(summary.n_estimators, 100);
    assert_eq!(summary.random_state, 42);
    // 4 numeric + 3 cities + 1 fuel + 1 body + 1 transmission
    assert_eq!(summary.n_features_out, 10);
    assert_eq!(summary.importances[0].column, "City");
    assert!((summary.importances[0].importance - 1.0).abs() < 1e-9);
    assert_eq!(summary.fingerprint.as_ref().map(String::len), Some(64));
}

#[test]
fn test_previous_owners_is_not_a_model_input() {
    let pipeline = FittedPipeline::from_path(&bundled(), &ModelSettings::default()).unwrap();
    let base = pipeline.predict(&delhi_query()).unwrap();
    for owners in 1..=3 {
        let q = CarQuery { previous_owners: owners, ..delhi_query() };
        assert_eq!(pipeline.predict(&q).unwrap(), base);
    }
}

#[test]
fn test_column_order_and_extra_columns_ignored() {
    let settings = ModelSettings::default();
    let golden = FittedPipeline::from_path(&fixture("golden_city.csv"), &settings).unwrap();
    let shuffled = FittedPipeline::from_path(&fixture("reordered_extra.csv"), &settings).unwrap();

    for city in ["Delhi", "Chennai", "Bangalore"] {
        let q = CarQuery { city: city.into(), ..delhi_query() };
        assert_eq!(golden.predict(&q).unwrap(), shuffled.predict(&q).unwrap());
    }
}

#[test]
fn test_unknown_city_per_policy() {
    let mumbai = CarQuery { city: "Mumbai".into(), ..delhi_query() };

    let strict = FittedPipeline::from_path(&fixture("golden_city.csv"), &ModelSettings::default()).unwrap();
    match strict.predict(&mumbai) {
        Err(PriceError::UnknownCategory { column, value }) => {
            assert_eq!(column, "City");
            assert_eq!(value, "Mumbai");
        }
        other => panic!("expected unknown category, got {:?}", other),
    }

    let settings = ModelSettings { unknown_category: UnknownCategoryPolicy::Ignore, ..ModelSettings::default() };
    let lenient = FittedPipeline::from_path(&fixture("golden_city.csv"), &settings).unwrap();
    let price = lenient.predict(&mumbai).unwrap();
    assert!(price.is_finite());
    assert!((420000.0..=610000.0).contains(&price));
}

#[test]
fn test_lowercase_option_resolves() {
    let pipeline = FittedPipeline::from_path(&fixture("golden_city.csv"), &ModelSettings::default()).unwrap();
    let q = CarQuery { city: "delhi".into(), ..delhi_query() };
    assert_eq!(pipeline.predict(&q).unwrap(), 500000.0);
}

#[test]
fn test_independent_fits_agree() {
    let a = FittedPipeline::from_path(&bundled(), &ModelSettings::default()).unwrap();
    let b = FittedPipeline::from_path(&bundled(), &ModelSettings::default()).unwrap();

    let q = CarQuery { city: "Jaipur".into(), body_type: "SUV".into(), year_of_manufacture: 2019, ..delhi_query() };
    let first = a.predict(&q).unwrap();
    assert_eq!(first, b.predict(&q).unwrap());
    assert_eq!(first, a.predict(&q).unwrap());
}

#[test]
fn test_every_form_combination_prices() {
    let spec = FormSpec::standard();
    let pipeline = FittedPipeline::from_path(&bundled(), &ModelSettings::default()).unwrap();
    assert!(spec.audit(&pipeline.summary().vocabularies).is_empty());

    let engines = [spec.engine_displacement.min, spec.engine_displacement.max];
    let years = [spec.year_of_manufacture.min, spec.year_of_manufacture.max];
    let kms = [spec.kilometers_driven.min, spec.kilometers_driven.max];

    for city in &spec.cities {
        for fuel in &spec.fuel_types {
            for body in &spec.body_types {
                for transmission in &spec.transmission_types {
                    for (i, &engine) in engines.iter().enumerate() {
                        let q = CarQuery {
                            city: city.clone(),
                            fuel_type: fuel.clone(),
                            body_type: body.clone(),
                            transmission_type: transmission.clone(),
                            seats: spec.seats,
                            engine_displacement: engine,
                            kilometers_driven: kms[i],
                            year_of_manufacture: years[1 - i],
                            previous_owners: i as u8,
                        };
                        let price = pipeline.predict(&q).unwrap();
                        assert!(price.is_finite() && price >= 0.0, "{:?} priced at {}", q, price);
                    }
                }
            }
        }
    }
}

#[test]
fn test_schema_errors_are_fatal() {
    let settings = ModelSettings::default();

    match FittedPipeline::from_path(&fixture("missing_transmission.csv"), &settings) {
        Err(PriceError::FeatureNotFound(cols)) => assert!(cols.contains("Transmission_Type")),
        other => panic!("expected missing column, got {:?}", other.map(|_| ())),
    }

    assert!(matches!(
        FittedPipeline::from_path(&fixture("null_engine.csv"), &settings),
        Err(PriceError::MissingValues { .. })
    ));

    assert!(matches!(
        FittedPipeline::from_path(&fixture("does_not_exist.csv"), &settings),
        Err(PriceError::IoError(_))
    ));
}
