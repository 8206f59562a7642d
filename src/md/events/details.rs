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

use super::Sample;
use crate::time::{Duration, Epoch};
use core::fmt;

/// Whether the located occurrence is a zero of the event function or of its derivative.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Zero,
    Extremum,
}

/// Enumerates the possible edges of an event.
///
/// For a zero crossing, a rising edge means that the function goes from negative to positive.
/// For an extremum, the edge is that of the derivative: a rising edge is a minimum and a falling
/// edge is a maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventEdge {
    Rising,
    Falling,
    /// If the edge cannot be clearly defined, e.g. the bracket ends on an exact zero of a flat function.
    Unclear,
}

impl EventEdge {
    /// Edge of the crossing between two values of opposite sign.
    pub(crate) fn between(before: f64, after: f64) -> Self {
        if before < after {
            Self::Rising
        } else if before > after {
            Self::Falling
        } else {
            Self::Unclear
        }
    }
}

/// Details of a located event.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDetails {
    pub epoch: Epoch,
    /// Value of the event function at the located epoch, near zero for a zero crossing
    pub value: f64,
    /// Derivative of the event function at the located epoch, near zero for an extremum
    pub derivative: f64,
    pub kind: EventKind,
    pub edge: EventEdge,
    /// Number of refinement iterations which were needed
    pub attempts: usize,
    // Store the representation of the event function as a string because we don't keep a reference to it
    pub repr: String,
}

impl EventDetails {
    pub(crate) fn new(
        sample: Sample,
        kind: EventKind,
        edge: EventEdge,
        attempts: usize,
        repr: String,
    ) -> Self {
        Self {
            epoch: sample.epoch,
            value: sample.value,
            derivative: sample.derivative,
            kind,
            edge,
            attempts,
            repr,
        }
    }

    pub fn sample(&self) -> Sample {
        Sample::new(self.epoch, self.value, self.derivative)
    }
}

impl fmt::Display for EventDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match (self.kind, self.edge) {
            (EventKind::Zero, EventEdge::Rising) => "rising edge",
            (EventKind::Zero, EventEdge::Falling) => "falling edge",
            (EventKind::Extremum, EventEdge::Rising) => "minimum",
            (EventKind::Extremum, EventEdge::Falling) => "maximum",
            (_, EventEdge::Unclear) => "unclear edge",
        };
        write!(
            f,
            "{} {what} @ {} (value = {:e}, after {} attempts)",
            self.repr, self.epoch, self.value, self.attempts
        )
    }
}

/// A window between a rising edge and the following falling edge, e.g. a visibility pass.
#[derive(Clone, Debug, PartialEq)]
pub struct EventArc {
    pub rise: EventDetails,
    pub fall: EventDetails,
}

impl EventArc {
    pub fn duration(&self) -> Duration {
        self.fall.epoch - self.rise.epoch
    }
}

impl fmt::Display for EventArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} until {} (lasts {})",
            self.rise.epoch,
            self.fall.epoch,
            self.duration()
        )
    }
}
