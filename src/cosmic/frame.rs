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

use super::{AxisRotation, BaseFrame, RotationState, SpacePoint};
use crate::errors::{FrameError, UnconfiguredSnafu};
use crate::linalg::{Matrix3, Matrix6, Vector6};
use crate::time::Epoch;
use snafu::OptionExt;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

#[derive(Copy, Clone, Debug)]
struct CachedRotation {
    epoch: Epoch,
    rotation: RotationState,
}

/// A named coordinate frame: an origin, a set of axes, and the base frame those axes are expressed in.
///
/// The axes are optional: a frame without an axis model shares the axes of its base frame.
/// The origin, the base frame and the base frame origin must all be set before any transformation,
/// otherwise the transformation fails with [`FrameError::Unconfigured`].
///
/// The frame caches the last rotation it computed. That cache is the only mutable part of a frame,
/// so a frame must not be used concurrently (it is not `Sync`).
#[derive(Debug)]
pub struct CoordinateFrame {
    name: String,
    origin: Option<Arc<dyn SpacePoint>>,
    axes: Option<Box<dyn AxisRotation>>,
    base: Option<BaseFrame>,
    base_origin: Option<Arc<dyn SpacePoint>>,
    cache: Cell<Option<CachedRotation>>,
}

impl CoordinateFrame {
    /// Creates an unconfigured frame.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            origin: None,
            axes: None,
            base: None,
            base_origin: None,
            cache: Cell::new(None),
        }
    }

    /// Creates a frame whose axes are those of the base frame, centered on `origin`.
    pub fn inertial<S: Into<String>>(
        name: S,
        origin: Arc<dyn SpacePoint>,
        base: BaseFrame,
        base_origin: Arc<dyn SpacePoint>,
    ) -> Self {
        Self::new(name)
            .with_origin(origin)
            .with_base(base)
            .with_base_origin(base_origin)
    }

    pub fn with_origin(mut self, origin: Arc<dyn SpacePoint>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the axis model of this frame, which this frame then owns.
    pub fn with_axes<A: AxisRotation + 'static>(self, axes: A) -> Self {
        self.with_boxed_axes(Box::new(axes))
    }

    /// Sets an axis model chosen at run time, e.g. from a configuration.
    pub fn with_boxed_axes(mut self, axes: Box<dyn AxisRotation>) -> Self {
        self.axes = Some(axes);
        self.cache.set(None);
        self
    }

    pub fn with_base(mut self, base: BaseFrame) -> Self {
        self.base = Some(base);
        self
    }

    /// Sets the point at the origin of the base frame, e.g. the Earth for MJ2000Eq.
    pub fn with_base_origin(mut self, base_origin: Arc<dyn SpacePoint>) -> Self {
        self.base_origin = Some(base_origin);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<BaseFrame> {
        self.base
    }

    pub fn origin_name(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.name())
    }

    pub fn base_origin_name(&self) -> Option<&str> {
        self.base_origin.as_ref().map(|o| o.name())
    }

    pub fn has_axes(&self) -> bool {
        self.axes.is_some()
    }

    pub fn is_configured(&self) -> bool {
        self.check_configured().is_ok()
    }

    /// Ensures that the origin, the base frame and the base origin are set.
    pub fn check_configured(&self) -> Result<(), FrameError> {
        self.origin.as_ref().context(UnconfiguredSnafu {
            frame: self.name.clone(),
            missing: "origin",
        })?;
        self.base.context(UnconfiguredSnafu {
            frame: self.name.clone(),
            missing: "base frame",
        })?;
        self.base_origin.as_ref().context(UnconfiguredSnafu {
            frame: self.name.clone(),
            missing: "base frame origin",
        })?;
        Ok(())
    }

    /// Returns the base frame, or an error if it was never set.
    pub(crate) fn try_base(&self) -> Result<BaseFrame, FrameError> {
        self.base.context(UnconfiguredSnafu {
            frame: self.name.clone(),
            missing: "base frame",
        })
    }

    /// Whether this frame is centered on the origin of its base frame, in which case translations are no-ops.
    pub fn is_base_centered(&self) -> bool {
        match (&self.origin, &self.base_origin) {
            (Some(origin), Some(base_origin)) => origin.name() == base_origin.name(),
            _ => false,
        }
    }

    /// Returns the rotation of this frame at the provided epoch.
    ///
    /// The cached rotation is reused if it was computed for the same epoch, unless `force_recompute` is set.
    pub fn rotation(&self, epoch: Epoch, force_recompute: bool) -> Result<RotationState, FrameError> {
        if !force_recompute {
            if let Some(cached) = self.cache.get() {
                if cached.epoch == epoch {
                    return Ok(cached.rotation);
                }
            }
        }

        let rotation = match &self.axes {
            Some(axes) => axes.rotation(epoch)?,
            None => RotationState::identity(),
        };

        self.cache.set(Some(CachedRotation { epoch, rotation }));
        Ok(rotation)
    }

    /// State of the base frame origin at this epoch, in the shared inertial axes.
    pub fn base_origin_state(&self, epoch: Epoch) -> Result<Vector6<f64>, FrameError> {
        let base_origin = self.base_origin.as_ref().context(UnconfiguredSnafu {
            frame: self.name.clone(),
            missing: "base frame origin",
        })?;
        base_origin.state(epoch)
    }

    /// Vector from the base frame origin to this frame's origin, in base frame axes.
    pub fn origin_offset(&self, epoch: Epoch) -> Result<Vector6<f64>, FrameError> {
        let origin = self.origin.as_ref().context(UnconfiguredSnafu {
            frame: self.name.clone(),
            missing: "origin",
        })?;
        Ok(origin.state(epoch)? - self.base_origin_state(epoch)?)
    }

    /// Converts a state expressed in this frame into the base frame.
    ///
    /// The axes are rotated first, then the origin offset is added. If `coincident` is set, the
    /// translation is skipped entirely and the origins are never queried.
    pub fn to_base(
        &self,
        epoch: Epoch,
        state: &Vector6<f64>,
        coincident: bool,
        force_recompute: bool,
    ) -> Result<Vector6<f64>, FrameError> {
        self.check_configured()?;

        let mut out = if self.axes.is_some() {
            self.rotation(epoch, force_recompute)?.apply(state)
        } else {
            self.rotation(epoch, force_recompute)?;
            *state
        };

        if !coincident && !self.is_base_centered() {
            out += self.origin_offset(epoch)?;
        }

        Ok(out)
    }

    /// Converts a state expressed in the base frame into this frame.
    ///
    /// This is the mirror of [`Self::to_base`]: the origin offset is removed first, then the axes
    /// are rotated with the transposed rotation.
    pub fn from_base(
        &self,
        epoch: Epoch,
        state: &Vector6<f64>,
        coincident: bool,
        force_recompute: bool,
    ) -> Result<Vector6<f64>, FrameError> {
        self.check_configured()?;

        let mut internal = *state;
        if !coincident && !self.is_base_centered() {
            internal -= self.origin_offset(epoch)?;
        }

        let rotation = self.rotation(epoch, force_recompute)?;
        if self.axes.is_some() {
            Ok(rotation.transpose().apply(&internal))
        } else {
            Ok(internal)
        }
    }

    /// The 6x6 DCM from this frame to its base frame at the provided epoch.
    pub fn dcm6_to_base(&self, epoch: Epoch) -> Result<Matrix6<f64>, FrameError> {
        Ok(self.rotation(epoch, false)?.dcm6())
    }

    /// The rotation (this frame to its base) used by the last transformation.
    /// Only valid until the next transformation on this frame.
    pub fn last_rotation(&self) -> Matrix3<f64> {
        self.cache
            .get()
            .map_or_else(Matrix3::identity, |cached| cached.rotation.dcm)
    }

    /// The time derivative of [`Self::last_rotation`].
    pub fn last_rotation_rate(&self) -> Matrix3<f64> {
        self.cache
            .get()
            .map_or_else(Matrix3::zeros, |cached| cached.rotation.dcm_dot)
    }

    /// Epoch at which the cached rotation was computed, if any.
    pub fn last_epoch(&self) -> Option<Epoch> {
        self.cache.get().map(|cached| cached.epoch)
    }
}

impl Clone for CoordinateFrame {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            origin: self.origin.clone(),
            axes: self.axes.as_ref().map(|axes| axes.clone_box()),
            base: self.base,
            base_origin: self.base_origin.clone(),
            cache: Cell::new(self.cache.get()),
        }
    }
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(origin) = self.origin_name() {
            write!(f, " centered on {origin}")?;
        }
        if let Some(base) = self.base {
            write!(f, " ({base})")?;
        }
        Ok(())
    }
}
