/*
    mission-geometry, frame transformations and event location for mission analysis
    Copyright (C) 2024-onwards the mission-geometry developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::errors::FrameError;
use crate::linalg::{Matrix3, Matrix6, Vector6};
use crate::time::Epoch;
use crate::utils::{dcm6, orthonormality_error};
use std::fmt;

mod converter;
mod frame;
mod points;
mod rotations;

pub use self::converter::FrameConverter;
pub use self::frame::CoordinateFrame;
pub use self::points::*;
pub use self::rotations::*;

/// Equatorial radius of the Earth in kilometers (JGM-3).
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.1363;
/// Mean rotation rate of the Earth, in radians per second.
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292_115_146_706_979e-5;
/// Radius of the geostationary orbit, in kilometers.
pub const GEO_RADIUS_KM: f64 = 42_164.0;

/// Identifies the shared inertial reference onto which the axes of several frames are expressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseFrame {
    /// Mean of J2000 Earth equator
    Mj2000Eq,
    /// International Celestial Reference Frame
    Icrf,
    /// Mean of J2000 ecliptic
    Mj2000Ec,
}

impl fmt::Display for BaseFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Mj2000Eq => write!(f, "MJ2000Eq"),
            Self::Icrf => write!(f, "ICRF"),
            Self::Mj2000Ec => write!(f, "MJ2000Ec"),
        }
    }
}

/// The orientation of a frame with respect to its base frame at a given epoch.
///
/// `dcm` maps vectors expressed in the frame's axes into the base frame axes, and `dcm_dot` is its
/// time derivative (per second). A position transforms as `r_base = dcm * r` and a velocity as
/// `v_base = dcm * v + dcm_dot * r`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RotationState {
    pub dcm: Matrix3<f64>,
    pub dcm_dot: Matrix3<f64>,
}

impl RotationState {
    pub fn new(dcm: Matrix3<f64>, dcm_dot: Matrix3<f64>) -> Self {
        Self { dcm, dcm_dot }
    }

    /// A rotation which does not change with time
    pub fn fixed(dcm: Matrix3<f64>) -> Self {
        Self::new(dcm, Matrix3::zeros())
    }

    pub fn identity() -> Self {
        Self::fixed(Matrix3::identity())
    }

    /// Returns the inverse rotation, i.e. from the base frame to this frame, and its derivative.
    pub fn transpose(&self) -> Self {
        Self::new(self.dcm.transpose(), self.dcm_dot.transpose())
    }

    /// Frobenius norm of `R^T R - I`
    pub fn orthonormality_error(&self) -> f64 {
        orthonormality_error(&self.dcm)
    }

    /// The 6x6 matrix which transforms a full Cartesian state
    pub fn dcm6(&self) -> Matrix6<f64> {
        dcm6(&self.dcm, &self.dcm_dot)
    }

    /// Applies this rotation to a Cartesian state
    pub fn apply(&self, state: &Vector6<f64>) -> Vector6<f64> {
        self.dcm6() * state
    }
}

/// A model of how the axes of a frame are oriented with respect to the base frame.
///
/// Implementations are owned by exactly one [`CoordinateFrame`]: copying the frame copies the
/// model through `clone_box`.
pub trait AxisRotation: fmt::Debug {
    /// Returns the rotation from this model's axes to the base frame axes, and its time derivative.
    fn rotation(&self, epoch: Epoch) -> Result<RotationState, FrameError>;

    /// Returns a boxed deep copy of this rotation model.
    fn clone_box(&self) -> Box<dyn AxisRotation>;
}

impl Clone for Box<dyn AxisRotation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Anything whose position and velocity can be queried at an epoch: a spacecraft trajectory, a
/// planet ephemeris, a ground station.
///
/// States are expressed in the shared inertial base axes, all relative to the same (arbitrary)
/// reference point. Two space points with the same name are the same point.
pub trait SpacePoint: fmt::Debug {
    fn name(&self) -> &str;

    /// Returns the Cartesian state (km and km/s) of this point at the requested epoch.
    fn state(&self, epoch: Epoch) -> Result<Vector6<f64>, FrameError>;
}
