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

/*! # mission-geometry

Reference frame transformations and geometric event location for spacecraft mission analysis.

The crate is split in two halves:
+ [`cosmic`] composes rotations and translations between named coordinate frames, including the
  rotation-rate matrices needed to transform velocities;
+ [`md::events`] samples scalar event functions along a trajectory, brackets their zeros and
  extrema, and refines them to a precise epoch with a bounded sample history.

Orbit propagation is not part of this crate: trajectories are provided through the
[`cosmic::SpacePoint`] trait.
*/

/// Coordinate frames, rotation models, space points and the frame converter.
pub mod cosmic;

/// Utility functions shared by different modules, e.g. elementary rotation matrices.
pub mod utils;

pub mod errors;
/// Functions which may fail return one of these errors, the core never panics on bad input.
pub use self::errors::{EventError, FrameError};

/// Configuration loading (YAML) for the event locator.
pub mod io;

/// Mission design tools: event functions and the event locator.
pub mod md;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::cosmic::{AxisRotation, CoordinateFrame, FrameConverter, RotationState, SpacePoint};
pub use self::md::events::{EventFunction, EventLocator, EventStatus, LineOfSight};
