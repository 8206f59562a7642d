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

use crate::cosmic::{CoordinateFrame, FrameConverter, SpacePoint};
use crate::errors::FrameError;
use crate::linalg::{Matrix3, Vector3, Vector6};
use crate::time::Epoch;
use std::fmt;

/// Position, velocity, and orientation of one participant of an event at a given epoch.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantData {
    pub name: String,
    pub epoch: Epoch,
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
    /// Rotation from the inertial frame to the participant's frame, identity unless set with [`Self::with_rotation`]
    pub inertial_to_participant: Matrix3<f64>,
}

impl ParticipantData {
    /// Captures the state of this point at the provided epoch.
    pub fn capture(point: &dyn SpacePoint, epoch: Epoch) -> Result<Self, FrameError> {
        let state = point.state(epoch)?;
        Ok(Self {
            name: point.name().to_string(),
            epoch,
            position_km: state.fixed_rows::<3>(0).into_owned(),
            velocity_km_s: state.fixed_rows::<3>(3).into_owned(),
            inertial_to_participant: Matrix3::identity(),
        })
    }

    /// Stores the rotation from the `inertial` frame to the participant `frame` at the capture epoch.
    pub fn with_rotation(
        mut self,
        inertial: &CoordinateFrame,
        frame: &CoordinateFrame,
        converter: &mut FrameConverter,
    ) -> Result<Self, FrameError> {
        let (r, v) = (self.position_km, self.velocity_km_s);
        let state = Vector6::new(r.x, r.y, r.z, v.x, v.y, v.z);
        converter.rotate_only(self.epoch, &state, inertial, frame)?;
        self.inertial_to_participant = converter.last_rotation();
        Ok(self)
    }

    /// Position of `other` as seen from this participant
    pub fn relative_position(&self, other: &Self) -> Vector3<f64> {
        other.position_km - self.position_km
    }

    /// Velocity of `other` as seen from this participant
    pub fn relative_velocity(&self, other: &Self) -> Vector3<f64> {
        other.velocity_km_s - self.velocity_km_s
    }
}

impl fmt::Display for ParticipantData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} @ {}: r = [{:.6}, {:.6}, {:.6}] km, v = [{:.6}, {:.6}, {:.6}] km/s",
            self.name,
            self.epoch,
            self.position_km.x,
            self.position_km.y,
            self.position_km.z,
            self.velocity_km_s.x,
            self.velocity_km_s.y,
            self.velocity_km_s.z
        )
    }
}
