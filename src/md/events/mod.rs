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

use crate::errors::EventError;
use crate::time::Epoch;
use std::fmt;

mod details;
mod line_of_sight;
mod locator;
mod participant;
mod ring;
mod search;

pub use self::details::{EventArc, EventDetails, EventEdge, EventKind};
pub use self::line_of_sight::{LineOfSight, LineOfSightBuilder};
pub use self::locator::{EventLocator, LocatorConfig};
pub use self::participant::ParticipantData;
pub use self::ring::RingBuffer;

/// A scalar function of time whose zeros (and extrema) are sought.
///
/// Implementations return the value and its time derivative (per second) analytically: the event
/// locator never estimates derivatives by finite differencing.
pub trait EventFunction: fmt::Display {
    /// Evaluates the function at the provided epoch, returning `(value, derivative)`.
    fn evaluate(&self, epoch: Epoch) -> Result<(f64, f64), EventError>;
}

impl<E: EventFunction + ?Sized> EventFunction for Box<E> {
    fn evaluate(&self, epoch: Epoch) -> Result<(f64, f64), EventError> {
        (**self).evaluate(epoch)
    }
}

/// One observation of an event function.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    pub epoch: Epoch,
    pub value: f64,
    /// Time derivative of the value, per second
    pub derivative: f64,
}

impl Sample {
    pub fn new(epoch: Epoch, value: f64, derivative: f64) -> Self {
        Self {
            epoch,
            value,
            derivative,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {:e} ({:e}/s)", self.epoch, self.value, self.derivative)
    }
}

/// Progress of the event locator for the current occurrence of an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// Sampling, no sign change seen yet
    Seeking,
    /// The last two samples bracket a zero of the function
    ZeroBracketed,
    /// The last two samples bracket a zero of the derivative
    ExtremaBracketed,
    /// Refining a bracket
    Iterating,
    /// The occurrence was found
    Located,
    /// Used as a placeholder only
    Unknown,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
