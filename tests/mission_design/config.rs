extern crate mission_geometry as mg;

use mg::io::{ConfigError, ConfigRepr};
use mg::md::prelude::*;
use std::path::PathBuf;

use crate::test_epoch;

fn config_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "data", "tests", "config", name]
        .iter()
        .collect()
}

struct Ramp;

impl std::fmt::Display for Ramp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ramp")
    }
}

impl EventFunction for Ramp {
    fn evaluate(&self, epoch: Epoch) -> Result<(f64, f64), mg::EventError> {
        Ok(((epoch - test_epoch()).to_seconds() - 30.0, 1.0))
    }
}

#[test]
fn load_locator_config() {
    let cfg = LocatorConfig::load(config_path("locator.yaml")).unwrap();
    assert_eq!(cfg.depth, 4);
    assert_eq!(cfg.tolerance, 1e-9);
    assert_eq!(cfg.max_attempts, 30);
    assert_eq!(cfg.min_step_s, 0.01);
    assert_eq!(cfg.max_step_s, 600.0);
    // Unlisted fields take their default value
    assert_eq!(cfg.epoch_precision_s, LocatorConfig::default().epoch_precision_s);

    let locator = EventLocator::with_config(Ramp, cfg).unwrap();
    assert_eq!(locator.buffer().capacity(), 4);
}

#[test]
fn load_named_configs() {
    let cfgs = LocatorConfig::load_named(config_path("locators.yaml")).unwrap();
    assert_eq!(cfgs.len(), 3);
    assert_eq!(cfgs["visibility"].max_step_s, 300.0);
    assert_eq!(cfgs["visibility"].depth, 2);
    assert_eq!(cfgs["eclipse"].depth, 3);
    assert!(!cfgs["backward"].forward);
    for cfg in cfgs.values() {
        assert!(cfg.validate().is_ok());
    }
}

#[test]
fn config_round_trip_and_errors() {
    let cfg = LocatorConfig::builder().depth(5).max_step_s(120.0).build();
    let yaml = cfg.dumps().unwrap();
    assert_eq!(LocatorConfig::loads(&yaml).unwrap(), cfg);

    let many = LocatorConfig::loads_many("- depth: 3\n- tolerance: 1.0e-6\n").unwrap();
    assert_eq!(many.len(), 2);
    assert_eq!(many[0].depth, 3);
    assert_eq!(many[1].tolerance, 1e-6);

    assert!(matches!(
        LocatorConfig::load(config_path("does_not_exist.yaml")),
        Err(ConfigError::ReadError { .. })
    ));
    assert!(matches!(
        LocatorConfig::loads("depth: [not, a, number]"),
        Err(ConfigError::ParseError { .. })
    ));

    let invalid = LocatorConfig::loads("depth: 1").unwrap();
    assert!(matches!(
        EventLocator::with_config(Ramp, invalid),
        Err(ConfigError::InvalidConfig { .. })
    ));
}
