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

use crate::cosmic::BaseFrame;
use crate::md::events::EventStatus;
use crate::time::Epoch;
use snafu::prelude::*;

/// Errors raised by coordinate frames and the frame converter. Each one is fatal to the call that
/// raised it only: the frame (and its cache) remains usable.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FrameError {
    #[snafu(display("frame {frame} is not fully configured: missing {missing}"))]
    Unconfigured { frame: String, missing: &'static str },
    #[snafu(display(
        "cannot convert {from_frame} to {to_frame}: no conversion between base frames {from} and {to}"
    ))]
    UnsupportedBaseConversion {
        from_frame: String,
        to_frame: String,
        from: BaseFrame,
        to: BaseFrame,
    },
    #[snafu(display("axes of frame {frame} unavailable at {epoch}: {msg}"))]
    Rotation {
        frame: String,
        epoch: Epoch,
        msg: String,
    },
    #[snafu(display("state of {point} unavailable at {epoch}: {msg}"))]
    Ephemeris {
        point: String,
        epoch: Epoch,
        msg: String,
    },
}

/// Errors raised by event functions and the event locator.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EventError {
    #[snafu(display(
        "{event} not located between {start} and {end} after {attempts} attempts"
    ))]
    RootNotFound {
        event: String,
        start: Epoch,
        end: Epoch,
        attempts: usize,
    },
    #[snafu(display("{event} is missing its {reference}"))]
    MissingReference {
        event: String,
        reference: &'static str,
    },
    #[snafu(display("{event} cannot be refined while {status:?}"))]
    NotBracketed { event: String, status: EventStatus },
    #[snafu(display("{event} needs {need} buffered samples but only has {have}"))]
    NotEnoughSamples {
        event: String,
        need: usize,
        have: usize,
    },
    #[snafu(display("frame error during event evaluation: {source}"))]
    EventFrame { source: FrameError },
}
