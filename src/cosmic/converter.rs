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

use super::{BaseFrame, CoordinateFrame};
use crate::errors::{FrameError, UnsupportedBaseConversionSnafu};
use snafu::OptionExt;
use crate::linalg::{Matrix3, Matrix6, Vector6};
use crate::time::Epoch;
use crate::utils::dcm6;

/// Rotation from the first base frame of a table entry to the second one.
type BaseRotation = fn(Epoch) -> Matrix3<f64>;

/// MJ2000Eq and ICRF differ by the frame bias (tens of milliarcseconds) which is not modeled:
/// both are treated as the same axes.
fn pass_through(_epoch: Epoch) -> Matrix3<f64> {
    Matrix3::identity()
}

/// Supported conversions between base frames. Any pair not listed here is rejected.
const BASE_CONVERSIONS: [(BaseFrame, BaseFrame, BaseRotation); 2] = [
    (BaseFrame::Mj2000Eq, BaseFrame::Icrf, pass_through),
    (BaseFrame::Icrf, BaseFrame::Mj2000Eq, pass_through),
];

/// Returns the rotation from the `from` base frame to the `to` base frame, if that pair is supported.
pub(crate) fn base_rotation(from: BaseFrame, to: BaseFrame, epoch: Epoch) -> Option<Matrix3<f64>> {
    if from == to {
        return Some(Matrix3::identity());
    }
    BASE_CONVERSIONS
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, rotation)| rotation(epoch))
}

/// Converts Cartesian states between coordinate frames by pivoting through their base frames.
///
/// After each conversion, the converter holds the composite rotation from the input frame axes to
/// the output frame axes, and its time derivative.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameConverter {
    last_rotation: Matrix3<f64>,
    last_rotation_rate: Matrix3<f64>,
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self {
            last_rotation: Matrix3::identity(),
            last_rotation_rate: Matrix3::zeros(),
        }
    }
}

impl FrameConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts `state`, expressed in `from`, into the `to` frame.
    ///
    /// + If both frames are the very same instance, the state is returned unchanged.
    /// + Translations are skipped if both frames share their origin, or if `omit_translation` is set.
    /// + If the frames use different base frames, the base conversion table is used, and the
    ///   conversion fails if that pair of base frames is not supported.
    ///
    /// The composite rotation is `R_to^T * B * R_from` where `B` is the base frame rotation.
    pub fn convert(
        &mut self,
        epoch: Epoch,
        state: &Vector6<f64>,
        from: &CoordinateFrame,
        to: &CoordinateFrame,
        force_recompute: bool,
        omit_translation: bool,
    ) -> Result<Vector6<f64>, FrameError> {
        if std::ptr::eq(from, to) {
            trace!("{} to itself: no conversion", from.name());
            self.last_rotation = Matrix3::identity();
            self.last_rotation_rate = Matrix3::zeros();
            return Ok(*state);
        }

        from.check_configured()?;
        to.check_configured()?;

        let coincident = omit_translation || from.origin_name() == to.origin_name();

        let mut state_base = from.to_base(epoch, state, coincident, force_recompute)?;
        let from_rotation = from.last_rotation();
        let from_rotation_rate = from.last_rotation_rate();

        let (from_base, to_base) = (from.try_base()?, to.try_base()?);
        let base_dcm = if from_base != to_base {
            let base_dcm = base_rotation(from_base, to_base, epoch).context(
                UnsupportedBaseConversionSnafu {
                    from_frame: from.name(),
                    to_frame: to.name(),
                    from: from_base,
                    to: to_base,
                },
            )?;
            debug!(
                "converting from {from_base} to {to_base} for {} -> {}",
                from.name(),
                to.name()
            );
            state_base = dcm6(&base_dcm, &Matrix3::zeros()) * state_base;
            base_dcm
        } else {
            Matrix3::identity()
        };

        if !coincident && from.base_origin_name() != to.base_origin_name() {
            // Both base frames are centered on different points: re-center before leaving the pivot.
            let shift = from.base_origin_state(epoch)? - to.base_origin_state(epoch)?;
            state_base += dcm6(&base_dcm, &Matrix3::zeros()) * shift;
        }

        let state_out = to.from_base(epoch, &state_base, coincident, force_recompute)?;
        let to_rotation = to.last_rotation();
        let to_rotation_rate = to.last_rotation_rate();

        self.last_rotation = to_rotation.transpose() * base_dcm * from_rotation;
        self.last_rotation_rate = to_rotation_rate.transpose() * base_dcm * from_rotation
            + to_rotation.transpose() * base_dcm * from_rotation_rate;

        Ok(state_out)
    }

    /// Converts the state by rotating its axes only, ignoring where the frame origins are.
    pub fn rotate_only(
        &mut self,
        epoch: Epoch,
        state: &Vector6<f64>,
        from: &CoordinateFrame,
        to: &CoordinateFrame,
    ) -> Result<Vector6<f64>, FrameError> {
        self.convert(epoch, state, from, to, false, true)
    }

    /// Converts a state expressed in `from` into its own base frame.
    pub fn convert_to_base(
        &mut self,
        epoch: Epoch,
        state: &Vector6<f64>,
        from: &CoordinateFrame,
        force_recompute: bool,
    ) -> Result<Vector6<f64>, FrameError> {
        let out = from.to_base(epoch, state, false, force_recompute)?;
        self.last_rotation = from.last_rotation();
        self.last_rotation_rate = from.last_rotation_rate();
        Ok(out)
    }

    /// Converts a state expressed in the base frame of `to` into `to`.
    pub fn convert_from_base(
        &mut self,
        epoch: Epoch,
        state: &Vector6<f64>,
        to: &CoordinateFrame,
        force_recompute: bool,
    ) -> Result<Vector6<f64>, FrameError> {
        let out = to.from_base(epoch, state, false, force_recompute)?;
        self.last_rotation = to.last_rotation().transpose();
        self.last_rotation_rate = to.last_rotation_rate().transpose();
        Ok(out)
    }

    /// Composite rotation of the last conversion (input frame axes to output frame axes).
    pub fn last_rotation(&self) -> Matrix3<f64> {
        self.last_rotation
    }

    /// Time derivative of the composite rotation of the last conversion.
    pub fn last_rotation_rate(&self) -> Matrix3<f64> {
        self.last_rotation_rate
    }

    /// The 6x6 state DCM of the last conversion.
    pub fn last_dcm6(&self) -> Matrix6<f64> {
        dcm6(&self.last_rotation, &self.last_rotation_rate)
    }
}
