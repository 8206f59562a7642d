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

use super::{AxisRotation, RotationState, EARTH_ROTATION_RATE_RAD_S};
use crate::errors::FrameError;
use crate::linalg::Matrix3;
use crate::time::Epoch;
use crate::utils::{r1, r2, r3};

/// Defines an Euler rotation, angle must be in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EulerRotation {
    R1(f64),
    R2(f64),
    R3(f64),
}

impl EulerRotation {
    pub fn r1_from_degrees(angle_deg: f64) -> Self {
        Self::R1(angle_deg.to_radians())
    }
    pub fn r2_from_degrees(angle_deg: f64) -> Self {
        Self::R2(angle_deg.to_radians())
    }
    pub fn r3_from_degrees(angle_deg: f64) -> Self {
        Self::R3(angle_deg.to_radians())
    }
    /// Get the DCM from this Euler rotation
    pub fn dcm(&self) -> Matrix3<f64> {
        match *self {
            Self::R1(angle) => r1(angle),
            Self::R2(angle) => r2(angle),
            Self::R3(angle) => r3(angle),
        }
    }
}

impl AxisRotation for EulerRotation {
    fn rotation(&self, _: Epoch) -> Result<RotationState, FrameError> {
        Ok(RotationState::fixed(self.dcm()))
    }

    fn clone_box(&self) -> Box<dyn AxisRotation> {
        Box::new(*self)
    }
}

/// A fixed three-axis Euler rotation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler3Axis {
    /// The first rotation (e.g. R3)
    pub first: EulerRotation,
    /// The second rotation (e.g. R1)
    pub second: EulerRotation,
    /// The third and final rotation (e.g. R3, to complete a 3-1-3 rotation)
    pub third: EulerRotation,
}

impl Euler3Axis {
    pub fn dcm(&self) -> Matrix3<f64> {
        self.third.dcm() * self.second.dcm() * self.first.dcm()
    }
}

impl AxisRotation for Euler3Axis {
    fn rotation(&self, _: Epoch) -> Result<RotationState, FrameError> {
        Ok(RotationState::fixed(self.dcm()))
    }

    fn clone_box(&self) -> Box<dyn AxisRotation> {
        Box::new(*self)
    }
}

/// Axes spinning at a constant rate about their Z axis, e.g. a simple body fixed frame.
///
/// The spin angle is `angle_rad + rate_rad_s * (epoch - ref_epoch)`. The spin axis is the Z axis of
/// the `pole` orientation, which defaults to the base frame Z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSpin {
    pub ref_epoch: Epoch,
    pub angle_rad: f64,
    pub rate_rad_s: f64,
    /// Rotation from the (non spinning) pole frame into the base frame
    pub pole: Matrix3<f64>,
}

impl UniformSpin {
    pub fn about_z(ref_epoch: Epoch, angle_rad: f64, rate_rad_s: f64) -> Self {
        Self {
            ref_epoch,
            angle_rad,
            rate_rad_s,
            pole: Matrix3::identity(),
        }
    }

    /// A body fixed Earth frame, with the prime meridian along the base X axis at `ref_epoch`.
    pub fn earth_like(ref_epoch: Epoch) -> Self {
        Self::about_z(ref_epoch, 0.0, EARTH_ROTATION_RATE_RAD_S)
    }

    /// Tilts the spin axis, `pole` rotates the pole frame into the base frame.
    pub fn with_pole(mut self, pole: Matrix3<f64>) -> Self {
        self.pole = pole;
        self
    }

    /// Spin angle at the requested epoch, in radians
    pub fn angle(&self, epoch: Epoch) -> f64 {
        self.angle_rad + self.rate_rad_s * (epoch - self.ref_epoch).to_seconds()
    }
}

impl AxisRotation for UniformSpin {
    fn rotation(&self, epoch: Epoch) -> Result<RotationState, FrameError> {
        let (s, c) = self.angle(epoch).sin_cos();
        // R3(angle)^T maps the spinning axes onto the pole frame
        let spin = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        let spin_dot =
            self.rate_rad_s * Matrix3::new(-s, -c, 0.0, c, -s, 0.0, 0.0, 0.0, 0.0);
        Ok(RotationState::new(self.pole * spin, self.pole * spin_dot))
    }

    fn clone_box(&self) -> Box<dyn AxisRotation> {
        Box::new(*self)
    }
}
