extern crate mission_geometry as mg;
extern crate pretty_env_logger as pel;

use approx::assert_abs_diff_eq;
use mg::cosmic::{
    BaseFrame, CoordinateFrame, EulerRotation, FixedPoint, FrameConverter, LinearPoint,
    SpacePoint, UniformSpin, EARTH_EQUATORIAL_RADIUS_KM, EARTH_ROTATION_RATE_RAD_S,
};
use mg::linalg::{Matrix3, Vector3, Vector6};
use mg::time::{Epoch, Unit};
use mg::utils::orthonormality_error;
use mg::FrameError;
use rstest::*;
use std::sync::Arc;

use crate::test_epoch;

struct Frames {
    eme2k: CoordinateFrame,
    earth_fixed: CoordinateFrame,
    tilted: CoordinateFrame,
    luna_inertial: CoordinateFrame,
    icrf: CoordinateFrame,
    ecliptic: CoordinateFrame,
}

#[fixture]
fn earth() -> Arc<dyn SpacePoint> {
    Arc::new(FixedPoint::new("Earth", Vector3::zeros()))
}

#[fixture]
fn luna() -> Arc<dyn SpacePoint> {
    Arc::new(LinearPoint::new(
        "Luna",
        test_epoch(),
        Vector6::new(384_400.0, 0.0, 0.0, 0.0, 1.022, 0.0),
    ))
}

#[fixture]
fn frames(earth: Arc<dyn SpacePoint>, luna: Arc<dyn SpacePoint>) -> Frames {
    let _ = pel::try_init();
    let eme2k = CoordinateFrame::inertial(
        "EarthMJ2000Eq",
        earth.clone(),
        BaseFrame::Mj2000Eq,
        earth.clone(),
    );
    Frames {
        earth_fixed: CoordinateFrame::new("EarthFixed")
            .with_origin(earth.clone())
            .with_axes(UniformSpin::earth_like(test_epoch()))
            .with_base(BaseFrame::Mj2000Eq)
            .with_base_origin(earth.clone()),
        tilted: CoordinateFrame::new("Tilted")
            .with_origin(earth.clone())
            .with_axes(EulerRotation::r1_from_degrees(23.439_291))
            .with_base(BaseFrame::Mj2000Eq)
            .with_base_origin(earth.clone()),
        luna_inertial: CoordinateFrame::inertial(
            "LunaMJ2000Eq",
            luna,
            BaseFrame::Mj2000Eq,
            earth.clone(),
        ),
        icrf: CoordinateFrame::inertial("EarthICRF", earth.clone(), BaseFrame::Icrf, earth.clone()),
        ecliptic: CoordinateFrame::inertial(
            "EarthMJ2000Ec",
            earth.clone(),
            BaseFrame::Mj2000Ec,
            earth,
        ),
        eme2k,
    }
}

fn leo() -> Vector6<f64> {
    Vector6::new(-2436.45, -2436.45, 6891.037, 5.088_611, -5.088_611, 0.0)
}

#[rstest]
fn identity_is_exact(frames: Frames) {
    let mut converter = FrameConverter::new();
    for frame in [&frames.eme2k, &frames.earth_fixed, &frames.luna_inertial] {
        let out = converter
            .convert(test_epoch() + 3 * Unit::Hour, &leo(), frame, frame, false, false)
            .unwrap();
        assert_eq!(out, leo());
        assert_eq!(converter.last_rotation(), Matrix3::identity());
        assert_eq!(converter.last_rotation_rate(), Matrix3::zeros());
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(3)]
fn round_trips(frames: Frames, #[case] pair: usize) {
    let (a, b) = match pair {
        0 => (&frames.eme2k, &frames.earth_fixed),
        1 => (&frames.earth_fixed, &frames.luna_inertial),
        2 => (&frames.tilted, &frames.earth_fixed),
        _ => (&frames.icrf, &frames.earth_fixed),
    };
    let mut converter = FrameConverter::new();
    for hours in [0_i64, 1, 7, 23] {
        let epoch = test_epoch() + hours * Unit::Hour;
        let there = converter.convert(epoch, &leo(), a, b, false, false).unwrap();
        let back = converter.convert(epoch, &there, b, a, false, false).unwrap();
        let error = (back - leo()).norm() / leo().norm();
        assert!(error < 1e-9, "{} <-> {} @ {epoch}: {error:e}", a, b);
    }
}

#[rstest]
fn rotations_are_orthonormal(frames: Frames) {
    let mut converter = FrameConverter::new();
    for minutes in (0..24 * 60).step_by(37) {
        let epoch = test_epoch() + (minutes as i64) * Unit::Minute;
        for frame in [&frames.earth_fixed, &frames.tilted] {
            let rotation = frame.rotation(epoch, true).unwrap();
            assert!(rotation.orthonormality_error() < 1e-10);
        }
        converter
            .convert(epoch, &leo(), &frames.tilted, &frames.earth_fixed, false, false)
            .unwrap();
        assert!(orthonormality_error(&converter.last_rotation()) < 1e-10);
    }
}

#[rstest]
fn body_fixed_velocity(frames: Frames) {
    // A point on the equator, at rest in the rotating frame
    let station = Vector6::new(EARTH_EQUATORIAL_RADIUS_KM, 0.0, 0.0, 0.0, 0.0, 0.0);
    let mut converter = FrameConverter::new();
    let inertial = converter
        .convert(test_epoch(), &station, &frames.earth_fixed, &frames.eme2k, false, false)
        .unwrap();
    assert_abs_diff_eq!(inertial[0], EARTH_EQUATORIAL_RADIUS_KM, epsilon = 1e-9);
    assert_abs_diff_eq!(inertial[1], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(inertial[3], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
        inertial[4],
        EARTH_ROTATION_RATE_RAD_S * EARTH_EQUATORIAL_RADIUS_KM,
        epsilon = 1e-12
    );

    // The composite 6x6 DCM reproduces the conversion
    let full = converter.last_dcm6() * station;
    assert_abs_diff_eq!(full, inertial, epsilon = 1e-9);

    // Six hours later the station is a quarter turn further
    let quarter_turn_s = 0.25 * std::f64::consts::TAU / EARTH_ROTATION_RATE_RAD_S;
    let epoch = test_epoch() + quarter_turn_s * Unit::Second;
    let inertial = converter
        .convert(epoch, &station, &frames.earth_fixed, &frames.eme2k, false, false)
        .unwrap();
    assert_abs_diff_eq!(inertial[0], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(inertial[1], EARTH_EQUATORIAL_RADIUS_KM, epsilon = 1e-6);
}

#[rstest]
fn translation_between_origins(frames: Frames, luna: Arc<dyn SpacePoint>) {
    let epoch = test_epoch() + 2 * Unit::Day;
    let mut converter = FrameConverter::new();
    let out = converter
        .convert(epoch, &leo(), &frames.eme2k, &frames.luna_inertial, false, false)
        .unwrap();
    let expected = leo() - luna.state(epoch).unwrap();
    assert_abs_diff_eq!(out, expected, epsilon = 1e-9);

    // Omitting the translation only rotates, and these frames share their axes
    let out = converter
        .rotate_only(epoch, &leo(), &frames.eme2k, &frames.luna_inertial)
        .unwrap();
    assert_eq!(out, leo());
}

#[rstest]
fn base_frame_table(frames: Frames) {
    let mut converter = FrameConverter::new();
    let out = converter
        .convert(test_epoch(), &leo(), &frames.eme2k, &frames.icrf, false, false)
        .unwrap();
    assert_abs_diff_eq!(out, leo(), epsilon = 1e-12);

    let err = converter
        .convert(test_epoch(), &leo(), &frames.eme2k, &frames.ecliptic, false, false)
        .unwrap_err();
    assert_eq!(
        err,
        FrameError::UnsupportedBaseConversion {
            from_frame: "EarthMJ2000Eq".to_string(),
            to_frame: "EarthMJ2000Ec".to_string(),
            from: BaseFrame::Mj2000Eq,
            to: BaseFrame::Mj2000Ec
        }
    );
    let msg = err.to_string();
    println!("{msg}");
    assert!(msg.contains("EarthMJ2000Eq") && msg.contains("EarthMJ2000Ec"));

    // Either way around
    let err = converter
        .convert(test_epoch(), &leo(), &frames.ecliptic, &frames.icrf, false, false)
        .unwrap_err();
    assert!(matches!(
        err,
        FrameError::UnsupportedBaseConversion { ref from_frame, ref to_frame, .. }
            if from_frame == "EarthMJ2000Ec" && to_frame == "EarthICRF"
    ));
}

#[rstest]
fn unconfigured_frames_fail_on_use(frames: Frames, earth: Arc<dyn SpacePoint>) {
    let orphan = CoordinateFrame::new("Orphan").with_origin(earth);
    assert!(!orphan.is_configured());
    let mut converter = FrameConverter::new();
    let err = converter
        .convert(test_epoch(), &leo(), &frames.eme2k, &orphan, false, false)
        .unwrap_err();
    assert!(
        matches!(&err, FrameError::Unconfigured { frame, .. } if frame == "Orphan"),
        "{err}"
    );
    // The same instance short-circuits before any check
    assert_eq!(
        converter
            .convert(test_epoch(), &leo(), &orphan, &orphan, false, false)
            .unwrap(),
        leo()
    );
}

#[rstest]
fn cache_holds_frame_to_base(frames: Frames) {
    let epoch: Epoch = test_epoch() + 1 * Unit::Hour;
    let expected = frames.earth_fixed.rotation(epoch, true).unwrap();

    frames.earth_fixed.from_base(epoch, &leo(), false, false).unwrap();
    assert_eq!(frames.earth_fixed.last_rotation(), expected.dcm);
    assert_eq!(frames.earth_fixed.last_rotation_rate(), expected.dcm_dot);
    assert_eq!(frames.earth_fixed.last_epoch(), Some(epoch));

    frames.earth_fixed.to_base(epoch, &leo(), false, false).unwrap();
    assert_eq!(frames.earth_fixed.last_rotation(), expected.dcm);

    // Clones own their axes and do not share their cache
    let clone = frames.earth_fixed.clone();
    let later = epoch + 1 * Unit::Hour;
    clone.to_base(later, &leo(), false, false).unwrap();
    assert_eq!(clone.last_epoch(), Some(later));
    assert_eq!(frames.earth_fixed.last_epoch(), Some(epoch));
}
