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

/// Event functions, the ring buffered event locator, and the search drivers built on it.
pub mod events;

pub use events::{EventDetails, EventFunction, EventLocator, EventStatus, LocatorConfig};

pub mod prelude {
    pub use super::events::{
        EventArc, EventDetails, EventEdge, EventFunction, EventKind, EventLocator, EventStatus,
        LineOfSight, LocatorConfig, RingBuffer, Sample,
    };
    pub use crate::cosmic::{
        AxisRotation, BaseFrame, BodyFixedPoint, CircularOrbit, CoordinateFrame, FixedPoint,
        FrameConverter, LinearPoint, RotationState, SpacePoint, UniformSpin,
    };
    pub use crate::time::{Duration, Epoch, Unit};
}
