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

use super::{CoordinateFrame, SpacePoint};
use crate::errors::FrameError;
use crate::linalg::{Matrix3, Vector3, Vector6};
use crate::time::{Duration, Epoch};
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

/// A point which never moves.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPoint {
    pub name: String,
    pub position_km: Vector3<f64>,
}

impl FixedPoint {
    pub fn new<S: Into<String>>(name: S, position_km: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            position_km,
        }
    }
}

impl SpacePoint for FixedPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self, _epoch: Epoch) -> Result<Vector6<f64>, FrameError> {
        Ok(Vector6::new(
            self.position_km.x,
            self.position_km.y,
            self.position_km.z,
            0.0,
            0.0,
            0.0,
        ))
    }
}

/// A point moving in a straight line at constant velocity, `state` is given at `epoch`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearPoint {
    pub name: String,
    pub epoch: Epoch,
    pub state: Vector6<f64>,
}

impl LinearPoint {
    pub fn new<S: Into<String>>(name: S, epoch: Epoch, state: Vector6<f64>) -> Self {
        Self {
            name: name.into(),
            epoch,
            state,
        }
    }
}

impl SpacePoint for LinearPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self, epoch: Epoch) -> Result<Vector6<f64>, FrameError> {
        let dt_s = (epoch - self.epoch).to_seconds();
        let mut state = self.state;
        for i in 0..3 {
            state[i] += dt_s * self.state[i + 3];
        }
        Ok(state)
    }
}

/// A point on a circular orbit around a center point.
///
/// The orbit lies in the XY plane of its `orientation`, which rotates that plane into the base
/// axes. The phase is the angle from the X axis of that plane, measured at `epoch`.
#[derive(Clone, Debug)]
pub struct CircularOrbit {
    pub name: String,
    pub center: Option<Arc<dyn SpacePoint>>,
    pub radius_km: f64,
    pub mean_motion_rad_s: f64,
    pub phase_rad: f64,
    pub epoch: Epoch,
    pub orientation: Matrix3<f64>,
}

impl CircularOrbit {
    /// Builds an equatorial circular orbit of the provided radius and period, centered on the reference point.
    pub fn new<S: Into<String>>(name: S, radius_km: f64, period: Duration, epoch: Epoch) -> Self {
        Self {
            name: name.into(),
            center: None,
            radius_km,
            mean_motion_rad_s: TAU / period.to_seconds(),
            phase_rad: 0.0,
            epoch,
            orientation: Matrix3::identity(),
        }
    }

    /// Centers this orbit on another (possibly moving) point.
    pub fn about(mut self, center: Arc<dyn SpacePoint>) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_phase_deg(mut self, phase_deg: f64) -> Self {
        self.phase_rad = phase_deg.to_radians();
        self
    }

    pub fn with_orientation(mut self, orientation: Matrix3<f64>) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn period(&self) -> Duration {
        Duration::from_seconds(TAU / self.mean_motion_rad_s)
    }
}

impl SpacePoint for CircularOrbit {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self, epoch: Epoch) -> Result<Vector6<f64>, FrameError> {
        let u = self.phase_rad + self.mean_motion_rad_s * (epoch - self.epoch).to_seconds();
        let (s, c) = u.sin_cos();
        let speed = self.radius_km * self.mean_motion_rad_s;
        let r = self.orientation * Vector3::new(self.radius_km * c, self.radius_km * s, 0.0);
        let v = self.orientation * Vector3::new(-speed * s, speed * c, 0.0);
        let mut state = Vector6::new(r.x, r.y, r.z, v.x, v.y, v.z);
        if let Some(center) = &self.center {
            state += center.state(epoch)?;
        }
        Ok(state)
    }
}

/// A point whose state is fixed in a coordinate frame, e.g. a ground station in a body fixed frame.
///
/// The frame is owned by this point, and its origin and axes provide the motion of the point.
#[derive(Clone, Debug)]
pub struct BodyFixedPoint {
    pub name: String,
    pub frame: CoordinateFrame,
    pub local_state: Vector6<f64>,
}

impl BodyFixedPoint {
    pub fn new<S: Into<String>>(name: S, frame: CoordinateFrame, local_state: Vector6<f64>) -> Self {
        Self {
            name: name.into(),
            frame,
            local_state,
        }
    }

    /// A point fixed on a sphere of the provided radius at this latitude and longitude (in degrees).
    pub fn from_geocentric<S: Into<String>>(
        name: S,
        frame: CoordinateFrame,
        latitude_deg: f64,
        longitude_deg: f64,
        radius_km: f64,
    ) -> Self {
        let (slat, clat) = latitude_deg.to_radians().sin_cos();
        let (slon, clon) = longitude_deg.to_radians().sin_cos();
        let local_state = Vector6::new(
            radius_km * clat * clon,
            radius_km * clat * slon,
            radius_km * slat,
            0.0,
            0.0,
            0.0,
        );
        Self::new(name, frame, local_state)
    }
}

impl SpacePoint for BodyFixedPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self, epoch: Epoch) -> Result<Vector6<f64>, FrameError> {
        let relative = self.frame.to_base(epoch, &self.local_state, false, false)?;
        Ok(relative + self.frame.base_origin_state(epoch)?)
    }
}

impl fmt::Display for BodyFixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (fixed in {})", self.name, self.frame.name())
    }
}
