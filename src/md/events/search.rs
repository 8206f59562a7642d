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

use super::details::{EventArc, EventDetails, EventEdge, EventKind};
use super::{EventFunction, EventLocator, EventStatus, Sample};
use crate::errors::EventError;
use crate::time::{Duration, Epoch};
use std::cmp::Ordering;

impl<E: EventFunction> EventLocator<E> {
    /// Finds all of the zeros of the event function between `start` and `end`, in chronological order.
    ///
    /// The function is sampled with the steps proposed by [`Self::estimate_next_step`] (the step
    /// direction follows from the order of `start` and `end`). Each bracket is refined before moving
    /// on. An occurrence which cannot be refined is logged and skipped.
    ///
    /// # Limitations
    /// Two zeros closer than the proposed step are missed, since they do not change the sign of the
    /// samples. Lower the maximum step if such short events are expected.
    pub fn find_all(&mut self, start: Epoch, end: Epoch) -> Result<Vec<EventDetails>, EventError> {
        self.scan(start, end, &[EventKind::Zero])
    }

    /// Finds all of the extrema of the event function between `start` and `end`, in chronological order.
    /// Minima have a rising edge and maxima a falling edge.
    pub fn find_extrema(
        &mut self,
        start: Epoch,
        end: Epoch,
    ) -> Result<Vec<EventDetails>, EventError> {
        self.scan(start, end, &[EventKind::Extremum])
    }

    /// Finds the zeros and the extrema of the event function between `start` and `end`.
    pub fn find_zeros_and_extrema(
        &mut self,
        start: Epoch,
        end: Epoch,
    ) -> Result<Vec<EventDetails>, EventError> {
        self.scan(start, end, &[EventKind::Zero, EventKind::Extremum])
    }

    /// Finds the arcs where the event function is positive between `start` and `end`, e.g. the
    /// visibility passes of a line of sight.
    ///
    /// If the function is positive at `start` (resp. `end`), the first (resp. last) arc begins (resp.
    /// finishes) there, with zero refinement attempts.
    pub fn find_arcs(&mut self, start: Epoch, end: Epoch) -> Result<Vec<EventArc>, EventError> {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        let events = self.find_all(start, end)?;

        // Arc bound at the ends of the interval, if the function is positive there
        let boundary = |locator: &Self,
                        epoch: Epoch,
                        edge: EventEdge|
         -> Result<Option<EventDetails>, EventError> {
            let (value, derivative) = locator.function().evaluate(epoch)?;
            Ok((value > 0.0).then(|| {
                EventDetails::new(
                    Sample::new(epoch, value, derivative),
                    EventKind::Zero,
                    edge,
                    0,
                    locator.function().to_string(),
                )
            }))
        };

        let mut rise = boundary(&*self, start, EventEdge::Rising)?;
        let mut arcs = Vec::new();
        for event in events {
            match event.edge {
                EventEdge::Rising => rise = Some(event),
                EventEdge::Falling => match rise.take() {
                    Some(rise) => arcs.push(EventArc { rise, fall: event }),
                    None => warn!(
                        "{} -- falling edge without a rise @ {}",
                        event.repr, event.epoch
                    ),
                },
                EventEdge::Unclear => {
                    debug!("{} -- ignoring unclear edge @ {}", event.repr, event.epoch)
                }
            }
        }
        if let Some(rise) = rise {
            if let Some(fall) = boundary(&*self, end, EventEdge::Falling)? {
                arcs.push(EventArc { rise, fall });
            }
        }

        info!(
            "{} -- {} arc(s) between {start} and {end}",
            self.function(),
            arcs.len()
        );
        Ok(arcs)
    }

    fn scan(
        &mut self,
        start: Epoch,
        end: Epoch,
        kinds: &[EventKind],
    ) -> Result<Vec<EventDetails>, EventError> {
        self.reset();
        let mut found = Vec::new();
        if start == end {
            return Ok(found);
        }
        let forward = end > start;
        info!("Searching for {} from {start} to {end}", self.function());

        let mut epoch = start;
        let mut samples = 0_usize;
        loop {
            self.sample(epoch)?;
            samples += 1;

            for kind in kinds {
                if *kind == EventKind::Zero && samples == 1 {
                    if let Some(details) = self.locate_first_sample(forward) {
                        found.push(details);
                        self.resume();
                        continue;
                    }
                }
                let bracketed = match kind {
                    EventKind::Zero => self.check_zero(),
                    EventKind::Extremum => self.check_extremum(),
                };
                let expected = match kind {
                    EventKind::Zero => EventStatus::ZeroBracketed,
                    EventKind::Extremum => EventStatus::ExtremaBracketed,
                };
                if !bracketed || self.status() != expected {
                    continue;
                }
                match self.refine() {
                    Ok(details) => {
                        found.push(details);
                        self.resume();
                    }
                    // Already reported, the locator is seeking again
                    Err(EventError::RootNotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }

            if epoch == end {
                break;
            }
            let step: Duration = self.estimate_next_step().abs();
            epoch = if forward {
                if epoch + step >= end {
                    end
                } else {
                    epoch + step
                }
            } else if epoch - step <= end {
                end
            } else {
                epoch - step
            };
        }

        found.sort_by(|a, b| a.epoch.partial_cmp(&b.epoch).unwrap_or(Ordering::Equal));
        debug!(
            "{} -- {} sample(s), {} event(s) found",
            self.function(),
            samples,
            found.len()
        );
        Ok(found)
    }
}
