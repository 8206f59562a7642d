extern crate mission_geometry as mg;

use approx::assert_abs_diff_eq;
use mg::cosmic::{
    BaseFrame, BodyFixedPoint, CircularOrbit, CoordinateFrame, FixedPoint, FrameConverter,
    LinearPoint, SpacePoint, UniformSpin, EARTH_EQUATORIAL_RADIUS_KM, GEO_RADIUS_KM,
};
use mg::linalg::{Vector3, Vector6};
use mg::time::Unit;
use std::sync::Arc;

use crate::test_epoch;

#[test]
fn station_matches_converter() {
    let earth: Arc<dyn SpacePoint> = Arc::new(FixedPoint::new("Earth", Vector3::zeros()));
    let eme2k = CoordinateFrame::inertial(
        "EarthMJ2000Eq",
        earth.clone(),
        BaseFrame::Mj2000Eq,
        earth.clone(),
    );
    let itrf = CoordinateFrame::inertial("EarthFixed", earth.clone(), BaseFrame::Mj2000Eq, earth)
        .with_axes(UniformSpin::earth_like(test_epoch()));
    let station = BodyFixedPoint::from_geocentric(
        "Madrid",
        itrf.clone(),
        40.427,
        -4.251,
        EARTH_EQUATORIAL_RADIUS_KM,
    );

    let mut converter = FrameConverter::new();
    for hours in [0_i64, 5, 11] {
        let epoch = test_epoch() + hours * Unit::Hour;
        let expected = converter
            .convert(epoch, &station.local_state, &itrf, &eme2k, false, false)
            .unwrap();
        let state = station.state(epoch).unwrap();
        assert_abs_diff_eq!(state, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(
            state.fixed_rows::<3>(0).norm(),
            EARTH_EQUATORIAL_RADIUS_KM,
            epsilon = 1e-9
        );
    }
    assert_eq!(format!("{station}"), "Madrid (fixed in EarthFixed)");
}

#[test]
fn orbit_about_moving_center() {
    let epoch = test_epoch();
    let sun_like: Arc<dyn SpacePoint> = Arc::new(LinearPoint::new(
        "Barycenter",
        epoch,
        Vector6::new(1.0e6, 0.0, 0.0, 0.0, 30.0, 0.0),
    ));
    let geo = CircularOrbit::new("GEO", GEO_RADIUS_KM, 1 * Unit::Day, epoch).about(sun_like.clone());

    let later = epoch + 6 * Unit::Hour;
    let relative = geo.state(later).unwrap() - sun_like.state(later).unwrap();
    assert_abs_diff_eq!(relative[0], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(relative[1], GEO_RADIUS_KM, epsilon = 1e-6);
    // The orbital velocity is perpendicular to the position
    let r = relative.fixed_rows::<3>(0);
    let v = relative.fixed_rows::<3>(3);
    assert_abs_diff_eq!(r.dot(&v), 0.0, epsilon = 1e-6);
}
