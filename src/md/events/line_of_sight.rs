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

use super::{EventFunction, ParticipantData};
use crate::cosmic::SpacePoint;
use crate::errors::{EventError, EventFrameSnafu, MissingReferenceSnafu};
use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::utils::clamped_acos;
use snafu::{ensure, OptionExt, ResultExt};
use std::fmt;
use std::sync::Arc;

/// Below this, `1 - u^2` is considered null and the corresponding angle rate is not defined.
const DEGENERATE_SINE_SQ: f64 = 1e-24;

/// Line of sight between two points, possibly blocked by a spherical occulting body.
///
/// The event function is the sum of the horizon half angles of both points minus the angle
/// between them, as seen from the center of the occulting body:
///
/// `acos(R/|rp|) + acos(R/|rs|) - acos(rp·rs / (|rp||rs|))`
///
/// It is positive when the line of sight is clear, zero at grazing, and negative when blocked.
#[derive(Clone, Debug)]
pub struct LineOfSight {
    primary: Arc<dyn SpacePoint>,
    secondary: Arc<dyn SpacePoint>,
    occulter: Arc<dyn SpacePoint>,
    radius_km: f64,
}

/// Collects the references of a [`LineOfSight`] event. Missing references are reported by `build`.
#[derive(Clone, Debug, Default)]
pub struct LineOfSightBuilder {
    primary: Option<Arc<dyn SpacePoint>>,
    secondary: Option<Arc<dyn SpacePoint>>,
    occulter: Option<Arc<dyn SpacePoint>>,
    radius_km: Option<f64>,
}

impl LineOfSightBuilder {
    pub fn primary(mut self, primary: Arc<dyn SpacePoint>) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn secondary(mut self, secondary: Arc<dyn SpacePoint>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Sets the occulting body and its equatorial radius, in kilometers.
    pub fn occulter(mut self, occulter: Arc<dyn SpacePoint>, radius_km: f64) -> Self {
        self.occulter = Some(occulter);
        self.radius_km = Some(radius_km);
        self
    }

    pub fn build(self) -> Result<LineOfSight, EventError> {
        let event = "line of sight";
        let primary = self.primary.context(MissingReferenceSnafu {
            event,
            reference: "primary point",
        })?;
        let secondary = self.secondary.context(MissingReferenceSnafu {
            event,
            reference: "secondary point",
        })?;
        let occulter = self.occulter.context(MissingReferenceSnafu {
            event,
            reference: "occulting body",
        })?;
        let radius_km = self.radius_km.context(MissingReferenceSnafu {
            event,
            reference: "occulting body radius",
        })?;
        ensure!(
            radius_km > 0.0,
            MissingReferenceSnafu {
                event,
                reference: "positive occulting body radius",
            }
        );
        Ok(LineOfSight {
            primary,
            secondary,
            occulter,
            radius_km,
        })
    }
}

impl LineOfSight {
    pub fn builder() -> LineOfSightBuilder {
        LineOfSightBuilder::default()
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Captures the primary, secondary, and occulting body states at this epoch, in that order.
    pub fn participants(&self, epoch: Epoch) -> Result<[ParticipantData; 3], EventError> {
        Ok([
            ParticipantData::capture(self.primary.as_ref(), epoch).context(EventFrameSnafu)?,
            ParticipantData::capture(self.secondary.as_ref(), epoch).context(EventFrameSnafu)?,
            ParticipantData::capture(self.occulter.as_ref(), epoch).context(EventFrameSnafu)?,
        ])
    }

    /// Returns whether the primary and secondary points see each other at this epoch.
    pub fn is_visible(&self, epoch: Epoch) -> Result<bool, EventError> {
        Ok(self.evaluate(epoch)?.0 > 0.0)
    }

    /// Computes the line of sight function and its time derivative from the positions and velocities
    /// of both points relative to the center of an occulting body of radius `radius_km`.
    pub fn geometry(
        rp: &Vector3<f64>,
        vp: &Vector3<f64>,
        rs: &Vector3<f64>,
        vs: &Vector3<f64>,
        radius_km: f64,
    ) -> (f64, f64) {
        let (np, ns) = (rp.norm(), rs.norm());

        // A point at the center of the body is inside of it: its horizon angle is null.
        let (u_p, np_dot) = if np > 0.0 {
            (radius_km / np, rp.dot(vp) / np)
        } else {
            (1.0, 0.0)
        };
        let (u_s, ns_dot) = if ns > 0.0 {
            (radius_km / ns, rs.dot(vs) / ns)
        } else {
            (1.0, 0.0)
        };
        let (u_sep, u_sep_dot) = if np > 0.0 && ns > 0.0 {
            let u = rp.dot(rs) / (np * ns);
            let u_dot = (vp.dot(rs) + rp.dot(vs)) / (np * ns) - u * (np_dot / np + ns_dot / ns);
            (u, u_dot)
        } else {
            (1.0, 0.0)
        };

        let value = clamped_acos(u_p) + clamped_acos(u_s) - clamped_acos(u_sep);

        // d/dt acos(u) = -u_dot / sqrt(1 - u^2)
        let acos_rate = |u: f64, u_dot: f64| -> f64 {
            let sine_sq = 1.0 - u.clamp(-1.0, 1.0).powi(2);
            if sine_sq > DEGENERATE_SINE_SQ {
                -u_dot / sine_sq.sqrt()
            } else {
                0.0
            }
        };
        let u_p_dot = if np > 0.0 { -radius_km * np_dot / np.powi(2) } else { 0.0 };
        let u_s_dot = if ns > 0.0 { -radius_km * ns_dot / ns.powi(2) } else { 0.0 };

        let derivative =
            acos_rate(u_p, u_p_dot) + acos_rate(u_s, u_s_dot) - acos_rate(u_sep, u_sep_dot);

        (value, derivative)
    }
}

impl EventFunction for LineOfSight {
    fn evaluate(&self, epoch: Epoch) -> Result<(f64, f64), EventError> {
        let [primary, secondary, occulter] = self.participants(epoch)?;
        let rp = occulter.relative_position(&primary);
        let vp = occulter.relative_velocity(&primary);
        let rs = occulter.relative_position(&secondary);
        let vs = occulter.relative_velocity(&secondary);
        Ok(Self::geometry(&rp, &vp, &rs, &vs, self.radius_km))
    }
}

impl fmt::Display for LineOfSight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line of sight {} <-> {} (occulted by {}, R = {} km)",
            self.primary.name(),
            self.secondary.name(),
            self.occulter.name(),
            self.radius_km
        )
    }
}
