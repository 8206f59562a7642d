extern crate mission_geometry as mg;
extern crate pretty_env_logger as pel;

use mg::cosmic::{EARTH_EQUATORIAL_RADIUS_KM, EARTH_ROTATION_RATE_RAD_S, GEO_RADIUS_KM};
use mg::linalg::Vector3;
use mg::md::prelude::*;
use mg::EventError;
use rstest::*;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use crate::test_epoch;

#[fixture]
fn earth() -> Arc<dyn SpacePoint> {
    let _ = pel::try_init();
    Arc::new(FixedPoint::new("Earth", Vector3::zeros()))
}

#[rstest]
fn geo_opposition(earth: Arc<dyn SpacePoint>) {
    let los = LineOfSight::builder()
        .primary(Arc::new(FixedPoint::new(
            "GEO-A",
            Vector3::new(GEO_RADIUS_KM, 0.0, 0.0),
        )))
        .secondary(Arc::new(FixedPoint::new(
            "GEO-B",
            Vector3::new(-GEO_RADIUS_KM, 0.0, 0.0),
        )))
        .occulter(earth, EARTH_EQUATORIAL_RADIUS_KM)
        .build()
        .unwrap();
    let (value, _) = los.evaluate(test_epoch()).unwrap();
    let expected = 2.0 * (EARTH_EQUATORIAL_RADIUS_KM / GEO_RADIUS_KM).acos() - PI;
    assert!((value - expected).abs() < 1e-9);
    assert!(value < 0.0);
    assert!(!los.is_visible(test_epoch()).unwrap());
}

#[rstest]
fn missing_occulter(earth: Arc<dyn SpacePoint>) {
    let err = LineOfSight::builder()
        .primary(earth.clone())
        .secondary(earth)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        EventError::MissingReference {
            reference: "occulting body",
            ..
        }
    ));
}

/// A low orbit seen from a distant point in its orbital plane: the Earth blocks the line of sight
/// around the far side of each revolution.
#[rstest]
fn leo_occultations(earth: Arc<dyn SpacePoint>) {
    let radius = 7000.0;
    let period_s = 6000.0;
    let distance = 1.0e8;
    let leo = CircularOrbit::new("LEO", radius, period_s * Unit::Second, test_epoch())
        .about(earth.clone());
    let los = LineOfSight::builder()
        .primary(Arc::new(leo))
        .secondary(Arc::new(FixedPoint::new(
            "Relay",
            Vector3::new(distance, 0.0, 0.0),
        )))
        .occulter(earth, EARTH_EQUATORIAL_RADIUS_KM)
        .build()
        .unwrap();

    let cfg = LocatorConfig::builder().max_step_s(300.0).build();
    let mut locator = EventLocator::with_config(los, cfg).unwrap();
    let start = test_epoch();
    let end = test_epoch() + 2.0 * period_s * Unit::Second;

    // Half angle of the visibility cone, and mean motion
    let half = (EARTH_EQUATORIAL_RADIUS_KM / radius).acos()
        + (EARTH_EQUATORIAL_RADIUS_KM / distance).acos();
    let n = TAU / period_s;
    let expected = [
        (half / n, EventEdge::Falling),
        ((TAU - half) / n, EventEdge::Rising),
        ((TAU + half) / n, EventEdge::Falling),
        ((2.0 * TAU - half) / n, EventEdge::Rising),
    ];

    let events = locator.find_all(start, end).unwrap();
    assert_eq!(events.len(), expected.len(), "{events:?}");
    for (event, (t, edge)) in events.iter().zip(expected) {
        println!("{event}");
        assert_eq!(event.edge, edge);
        assert!(event.value.abs() <= 1e-7);
        let error = (event.epoch - (start + t * Unit::Second)).to_seconds();
        assert!(error.abs() < 1e-2, "{event}: off by {error} s");
    }

    let arcs = locator.find_arcs(start, end).unwrap();
    assert_eq!(arcs.len(), 3);
    // Visible at both ends of the interval
    assert_eq!(arcs[0].rise.epoch, start);
    assert_eq!(arcs[0].rise.attempts, 0);
    assert_eq!(arcs[2].fall.epoch, end);
    let pass = arcs[1].duration().to_seconds();
    assert!((pass - 2.0 * half / n).abs() < 2e-2, "{}", arcs[1]);
}

/// A station on the rotating Earth looking at a satellite fixed in inertial space.
#[rstest]
fn station_visibility(earth: Arc<dyn SpacePoint>) {
    let altitude = 1.0;
    let itrf = CoordinateFrame::inertial(
        "EarthFixed",
        earth.clone(),
        BaseFrame::Mj2000Eq,
        earth.clone(),
    )
    .with_axes(UniformSpin::earth_like(test_epoch()));
    let station = BodyFixedPoint::from_geocentric(
        "Equator",
        itrf,
        0.0,
        0.0,
        EARTH_EQUATORIAL_RADIUS_KM + altitude,
    );
    let los = LineOfSight::builder()
        .primary(Arc::new(station))
        .secondary(Arc::new(FixedPoint::new(
            "Beacon",
            Vector3::new(GEO_RADIUS_KM, 0.0, 0.0),
        )))
        .occulter(earth, EARTH_EQUATORIAL_RADIUS_KM)
        .build()
        .unwrap();

    let cfg = LocatorConfig::builder().max_step_s(600.0).build();
    let mut locator = EventLocator::with_config(los, cfg).unwrap();
    let start = test_epoch();
    let end = test_epoch() + 2 * Unit::Day;

    let arcs = locator.find_arcs(start, end).unwrap();
    assert_eq!(arcs.len(), 3);

    let half = (EARTH_EQUATORIAL_RADIUS_KM / (EARTH_EQUATORIAL_RADIUS_KM + altitude)).acos()
        + (EARTH_EQUATORIAL_RADIUS_KM / GEO_RADIUS_KM).acos();
    let first_set = half / EARTH_ROTATION_RATE_RAD_S;
    let first_error = (arcs[0].fall.epoch - (start + first_set * Unit::Second)).to_seconds();
    assert!(first_error.abs() < 1e-2, "{}", arcs[0]);
    let pass = arcs[1].duration().to_seconds();
    assert!((pass - 2.0 * half / EARTH_ROTATION_RATE_RAD_S).abs() < 2e-2, "{}", arcs[1]);
    for arc in &arcs {
        println!("{arc}");
        assert!(arc.rise.epoch < arc.fall.epoch);
    }
}
