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

use super::details::{EventDetails, EventEdge, EventKind};
use super::ring::RingBuffer;
use super::{EventFunction, EventStatus, Sample};
use crate::errors::{EventError, NotBracketedSnafu, NotEnoughSamplesSnafu};
use crate::io::{ConfigError, ConfigRepr, InvalidConfigSnafu};
use crate::time::{Duration, Epoch, Unit};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use typed_builder::TypedBuilder;

/// Configuration of an [`EventLocator`].
///
/// Every field has a default, so a YAML configuration only needs to list the fields it changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct LocatorConfig {
    /// Number of samples kept in the history
    #[builder(default = 2)]
    pub depth: usize,
    /// Convergence threshold on the value (zeros) or on the derivative (extrema)
    #[builder(default = 1e-7)]
    pub tolerance: f64,
    /// Maximum number of refinement iterations per occurrence
    #[builder(default = 50)]
    pub max_attempts: usize,
    /// Smallest proposed step, in seconds
    #[builder(default = 1e-3)]
    pub min_step_s: f64,
    /// Largest proposed step, in seconds, also used when no estimate is available
    #[builder(default = 3600.0)]
    pub max_step_s: f64,
    /// A bracket narrower than this (in seconds) is considered collapsed
    #[builder(default = 1e-9)]
    pub epoch_precision_s: f64,
    /// Proposed steps are positive if set, negative otherwise
    #[builder(default = true)]
    pub forward: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| InvalidConfigSnafu { msg }.fail();
        if self.depth < 2 {
            return invalid(format!("depth must be at least 2, got {}", self.depth));
        }
        if !(self.tolerance > 0.0) {
            return invalid(format!("tolerance must be positive, got {}", self.tolerance));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be at least 1".to_string());
        }
        if !(self.min_step_s > 0.0) || !(self.max_step_s >= self.min_step_s) {
            return invalid(format!(
                "steps must satisfy 0 < min_step_s <= max_step_s, got {} and {}",
                self.min_step_s, self.max_step_s
            ));
        }
        if !(self.epoch_precision_s > 0.0) {
            return invalid(format!(
                "epoch_precision_s must be positive, got {}",
                self.epoch_precision_s
            ));
        }
        Ok(())
    }

    pub fn min_step(&self) -> Duration {
        self.min_step_s * Unit::Second
    }

    pub fn max_step(&self) -> Duration {
        self.max_step_s * Unit::Second
    }
}

impl ConfigRepr for LocatorConfig {}

/// Monitors one event function along a trajectory.
///
/// The caller (or one of the search drivers) feeds samples in chronological order, asks for
/// the next step, checks for brackets, and refines them into located events:
///
/// ```text
/// Seeking --check_zero--> ZeroBracketed --refine--> Iterating --> Located --resume--> Seeking
///         --check_extremum--> ExtremaBracketed --^           \--> Seeking (RootNotFound)
/// ```
#[derive(Clone, Debug)]
pub struct EventLocator<E: EventFunction> {
    function: E,
    cfg: LocatorConfig,
    buffer: RingBuffer<Sample>,
    status: EventStatus,
    bracket: Option<(Sample, Sample)>,
    /// Kind and closing epoch of the last bracket handed to the root finder, so it is refined only once
    consumed: Option<(EventKind, Epoch)>,
    found: Vec<EventDetails>,
    estimated_epoch: Option<Epoch>,
    fixed_epoch: Option<Epoch>,
    fixed_timestep: f64,
    var_timestep: f64,
}

impl<E: EventFunction> EventLocator<E> {
    /// Monitors this function with the default configuration.
    pub fn new(function: E) -> Self {
        let cfg = LocatorConfig::default();
        Self {
            function,
            buffer: RingBuffer::new(cfg.depth),
            cfg,
            status: EventStatus::Seeking,
            bracket: None,
            consumed: None,
            found: Vec::new(),
            estimated_epoch: None,
            fixed_epoch: None,
            fixed_timestep: 0.0,
            var_timestep: 0.0,
        }
    }

    pub fn with_config(function: E, cfg: LocatorConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut me = Self::new(function);
        me.buffer = RingBuffer::new(cfg.depth);
        me.cfg = cfg;
        Ok(me)
    }

    pub fn function(&self) -> &E {
        &self.function
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.cfg
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Returns the status, after changing it to `new_status` unless that is `None` or `Unknown`.
    pub fn check_status(&mut self, new_status: Option<EventStatus>) -> EventStatus {
        if let Some(status) = new_status {
            if status != EventStatus::Unknown {
                debug!("{} -- status {} -> {status}", self.function, self.status);
                self.status = status;
            }
        }
        self.status
    }

    pub fn buffer(&self) -> &RingBuffer<Sample> {
        &self.buffer
    }

    /// The pair of samples currently bracketing an occurrence, if any.
    pub fn bracket(&self) -> Option<(Sample, Sample)> {
        self.bracket
    }

    /// All the occurrences located so far, in the order they were refined.
    pub fn found(&self) -> &[EventDetails] {
        &self.found
    }

    pub fn found_epochs(&self) -> Vec<Epoch> {
        self.found.iter().map(|event| event.epoch).collect()
    }

    /// Epoch computed by the last call to [`Self::estimate_timestep`].
    pub fn estimated_epoch(&self) -> Option<Epoch> {
        self.estimated_epoch
    }

    /// Epoch of the state data held fixed while locating, e.g. the reception epoch of a signal.
    pub fn fixed_epoch(&self) -> Option<Epoch> {
        self.fixed_epoch
    }

    /// Sets (or clears) the fixed epoch. The fixed time step is updated from the latest sample.
    pub fn set_fixed_epoch(&mut self, epoch: Option<Epoch>) {
        self.fixed_epoch = epoch;
        self.update_fixed_timestep();
    }

    /// Time step from the latest sample to the fixed epoch, in seconds. Zero without a fixed epoch
    /// or without samples, and kept current as samples are buffered.
    pub fn fixed_timestep(&self) -> f64 {
        self.fixed_timestep
    }

    fn update_fixed_timestep(&mut self) {
        self.fixed_timestep = match (self.fixed_epoch, self.buffer.latest()) {
            (Some(fixed), Some(last)) => (fixed - last.epoch).to_seconds(),
            _ => 0.0,
        };
    }

    /// Time step to the estimated (or located) epoch of the event, in seconds, as an offset from
    /// the epoch where the estimation started.
    pub fn var_timestep(&self) -> f64 {
        self.var_timestep
    }

    pub fn set_var_timestep(&mut self, step_s: f64) {
        self.var_timestep = step_s;
    }

    /// Clears the history and the bracket, and goes back to seeking. Located events are forgotten too.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.status = EventStatus::Seeking;
        self.bracket = None;
        self.consumed = None;
        self.found.clear();
        self.estimated_epoch = None;
        self.fixed_epoch = None;
        self.fixed_timestep = 0.0;
        self.var_timestep = 0.0;
    }

    /// Stores a sample computed by the caller.
    pub fn buffer_sample(&mut self, epoch: Epoch, value: f64, derivative: f64) {
        trace!("{} -- buffering {value:e} ({derivative:e}/s) @ {epoch}", self.function);
        self.buffer.push(Sample::new(epoch, value, derivative));
        self.update_fixed_timestep();
    }

    /// Evaluates the event function at this epoch and stores the sample.
    pub fn sample(&mut self, epoch: Epoch) -> Result<Sample, EventError> {
        let (value, derivative) = self.function.evaluate(epoch)?;
        self.buffer_sample(epoch, value, derivative);
        Ok(Sample::new(epoch, value, derivative))
    }

    /// Proposes the next sampling step from the buffered history.
    ///
    /// The change of the derivative between consecutive samples gives an apparent angular frequency
    /// `w = sqrt(|df'/dt| / |f|)`. The fastest one sets the half period `pi / w`, and the step is half
    /// of it so that any oscillation gets at least two samples per half cycle. Without curvature
    /// (fewer than two samples, or a linear function) the largest step is proposed.
    pub fn estimate_next_step(&self) -> Duration {
        let floor = self.cfg.tolerance;
        let omega = self
            .buffer
            .iter()
            .zip(self.buffer.iter().skip(1))
            .filter_map(|(a, b)| {
                let dt = (b.epoch - a.epoch).to_seconds().abs();
                if dt <= 0.0 {
                    return None;
                }
                let curvature = ((b.derivative - a.derivative) / dt).abs();
                let level = a.value.abs().max(b.value.abs()).max(floor);
                let omega = (curvature / level).sqrt();
                (omega.is_finite() && omega > 0.0).then_some(omega)
            })
            .fold(None, |fastest: Option<f64>, omega| {
                Some(fastest.map_or(omega, |fastest| fastest.max(omega)))
            });

        let step_s = match omega {
            Some(omega) => (FRAC_PI_2 / omega).clamp(self.cfg.min_step_s, self.cfg.max_step_s),
            None => self.cfg.max_step_s,
        };
        let step = step_s * Unit::Second;
        if self.cfg.forward {
            step
        } else {
            -step
        }
    }

    /// Linearly interpolates the epoch of the occurrence from the two latest samples: on the values
    /// when a zero is expected, on the derivatives while an extremum is bracketed.
    ///
    /// The estimate is stored and the offset from the latest sample becomes the variable time step.
    pub fn estimate_timestep(&mut self) -> Result<Epoch, EventError> {
        let (prev, last) = match self.buffer.latest_pair() {
            Some((prev, last)) => (*prev, *last),
            None => {
                return NotEnoughSamplesSnafu {
                    event: self.function.to_string(),
                    need: 2_usize,
                    have: self.buffer.len(),
                }
                .fail()
            }
        };
        let (y_prev, y_last) = match self.status {
            EventStatus::ExtremaBracketed => (prev.derivative, last.derivative),
            _ => (prev.value, last.value),
        };
        let dt = (last.epoch - prev.epoch).to_seconds();
        let offset_s = if y_last != y_prev {
            -y_last * dt / (y_last - y_prev)
        } else {
            0.0
        };
        let estimate = last.epoch + offset_s * Unit::Second;
        self.var_timestep = offset_s;
        self.estimated_epoch = Some(estimate);
        Ok(estimate)
    }

    /// Checks whether the values of the two latest samples have opposite signs.
    ///
    /// With a single sample, reports whether that sample is within tolerance of zero, without any
    /// change of status.
    pub fn check_zero(&mut self) -> bool {
        self.check_sign_change(EventKind::Zero)
    }

    /// Checks whether the derivatives of the two latest samples have opposite signs.
    pub fn check_extremum(&mut self) -> bool {
        self.check_sign_change(EventKind::Extremum)
    }

    fn check_sign_change(&mut self, kind: EventKind) -> bool {
        let pick = |sample: &Sample| match kind {
            EventKind::Zero => sample.value,
            EventKind::Extremum => sample.derivative,
        };

        let (prev, last) = match self.buffer.latest_pair() {
            Some((prev, last)) => (*prev, *last),
            None => {
                return match (kind, self.buffer.latest()) {
                    (EventKind::Zero, Some(only)) => only.value.abs() <= self.cfg.tolerance,
                    _ => false,
                }
            }
        };

        let (a, b) = (pick(&prev), pick(&last));
        let brackets = a * b < 0.0 || (b == 0.0 && a != 0.0);
        // A sample located as the zero itself does not open another bracket
        let located_prev =
            self.consumed == Some((kind, prev.epoch)) && a.abs() <= self.cfg.tolerance;
        if !brackets || self.consumed == Some((kind, last.epoch)) || located_prev {
            return false;
        }

        if self.status == EventStatus::Seeking {
            self.status = match kind {
                EventKind::Zero => EventStatus::ZeroBracketed,
                EventKind::Extremum => EventStatus::ExtremaBracketed,
            };
            self.bracket = Some((prev, last));
            debug!(
                "{} -- {} between {} and {}",
                self.function, self.status, prev.epoch, last.epoch
            );
        }
        true
    }

    /// Locates the only buffered sample when it is within tolerance of zero.
    ///
    /// Such a zero is never bracketed, since the samples which follow cannot change sign around it.
    /// The edge is taken from the sign of the derivative, in the direction of the search (forward in
    /// time if `forward` is set) like the edges of refined events.
    pub fn locate_first_sample(&mut self, forward: bool) -> Option<EventDetails> {
        if self.buffer.len() != 1 || self.status != EventStatus::Seeking {
            return None;
        }
        let only = *self.buffer.latest()?;
        if only.value.abs() > self.cfg.tolerance
            || self.consumed == Some((EventKind::Zero, only.epoch))
        {
            return None;
        }

        let rate = if forward {
            only.derivative
        } else {
            -only.derivative
        };
        let edge = EventEdge::between(0.0, rate);
        let details = EventDetails::new(only, EventKind::Zero, edge, 0, self.function.to_string());
        info!("{details}");
        self.consumed = Some((EventKind::Zero, only.epoch));
        self.var_timestep = 0.0;
        self.status = EventStatus::Located;
        self.found.push(details.clone());
        Some(details)
    }

    /// Refines the current bracket into a located event.
    ///
    /// Each iteration tries a Newton step from the bracket end closest to zero (zeros only, using the
    /// analytic derivative), then an Illinois secant step, and bisects if neither lands strictly
    /// inside the bracket. The refinement samples are not stored in the history.
    ///
    /// On failure, `RootNotFound` is returned once: the bracket is dropped and the locator is back to
    /// seeking, so that monitoring continues with the next samples.
    pub fn refine(&mut self) -> Result<EventDetails, EventError> {
        let kind = match self.status {
            EventStatus::ZeroBracketed => EventKind::Zero,
            EventStatus::ExtremaBracketed => EventKind::Extremum,
            status => {
                return NotBracketedSnafu {
                    event: self.function.to_string(),
                    status,
                }
                .fail()
            }
        };
        let (start, end) = match self.bracket {
            Some(bracket) => bracket,
            None => {
                return NotBracketedSnafu {
                    event: self.function.to_string(),
                    status: self.status,
                }
                .fail()
            }
        };

        let bracketed_status = self.status;
        self.status = EventStatus::Iterating;

        let outcome = match self.iterate(kind, start, end) {
            Ok(outcome) => outcome,
            Err(e) => {
                // The bracket is still valid, the caller may retry.
                self.status = bracketed_status;
                return Err(e);
            }
        };

        self.bracket = None;
        self.consumed = Some((kind, end.epoch));

        match outcome {
            Ok((sample, attempts)) => {
                let edge = match kind {
                    EventKind::Zero => EventEdge::between(start.value, end.value),
                    EventKind::Extremum => EventEdge::between(start.derivative, end.derivative),
                };
                let details =
                    EventDetails::new(sample, kind, edge, attempts, self.function.to_string());
                info!("{details}");
                self.var_timestep = (sample.epoch - start.epoch).to_seconds();
                self.status = EventStatus::Located;
                self.found.push(details.clone());
                Ok(details)
            }
            Err(attempts) => {
                warn!(
                    "{} -- not located between {} and {} after {attempts} attempts",
                    self.function, start.epoch, end.epoch
                );
                self.status = EventStatus::Seeking;
                Err(EventError::RootNotFound {
                    event: self.function.to_string(),
                    start: start.epoch,
                    end: end.epoch,
                    attempts,
                })
            }
        }
    }

    /// Runs the root finder on the bracket. The outer error is an evaluation failure, the inner one
    /// is the number of attempts spent without converging.
    fn iterate(
        &self,
        kind: EventKind,
        start: Sample,
        end: Sample,
    ) -> Result<Result<(Sample, usize), usize>, EventError> {
        let tol = self.cfg.tolerance;
        let y = |sample: &Sample| match kind {
            EventKind::Zero => sample.value,
            EventKind::Extremum => sample.derivative,
        };

        if y(&end).abs() <= tol {
            return Ok(Ok((end, 0)));
        }

        // Search in seconds from the start of the bracket (convert to epoch just in time)
        let (mut xa, mut sa, mut wa) = (0.0, start, y(&start));
        let (mut xb, mut sb, mut wb) = ((end.epoch - start.epoch).to_seconds(), end, y(&end));
        // Side replaced by the previous iteration: -1 for `a`, +1 for `b`
        let mut side = 0_i8;

        // Offsets are rounded to the nearest nanosecond, the resolution of an epoch
        let snap = |x: f64| {
            let epoch = start.epoch + (x * 1e9).round() * Unit::Nanosecond;
            (epoch, (epoch - start.epoch).to_seconds())
        };

        for attempt in 1..=self.cfg.max_attempts {
            let (lo, hi) = if xa < xb { (xa, xb) } else { (xb, xa) };
            let inside = |x: f64| x.is_finite() && x > lo && x < hi;

            let mut candidates = Vec::with_capacity(4);
            if kind == EventKind::Zero {
                let (x0, s0, x1) = if sa.value.abs() < sb.value.abs() {
                    (xa, sa, xb)
                } else {
                    (xb, sb, xa)
                };
                if s0.derivative != 0.0 {
                    let newton = x0 - s0.value / s0.derivative;
                    candidates.push(newton);
                    if (newton - x0).abs() < 1.0 && snap(newton).1 == x0 {
                        // Within one epoch resolution of that end: try its neighbor
                        candidates.push(x0 + self.cfg.epoch_precision_s.copysign(x1 - x0));
                    }
                }
            }
            if wb != wa {
                candidates.push(xb - wb * (xb - xa) / (wb - wa));
            }
            candidates.push(0.5 * (xa + xb));

            let next = candidates
                .into_iter()
                .filter(|x| inside(*x))
                .map(snap)
                .find(|(_, x)| inside(*x));

            let (epoch, x) = match next {
                Some(next) if hi - lo >= self.cfg.epoch_precision_s => next,
                _ => {
                    debug!(
                        "{} -- bracket collapsed to {} s at {}",
                        self.function,
                        hi - lo,
                        sb.epoch
                    );
                    return Ok(self.collapsed(kind, (xa, sa), (xb, sb), attempt - 1));
                }
            };

            let (value, derivative) = self.function.evaluate(epoch)?;
            let sample = Sample::new(epoch, value, derivative);
            let ys = y(&sample);
            trace!("{} -- attempt {attempt}: {sample}", self.function);

            if ys.abs() <= tol {
                return Ok(Ok((sample, attempt)));
            }

            if ys * y(&sb) > 0.0 {
                // Same sign as b: the root is between a and the new sample
                (xb, sb, wb) = (x, sample, ys);
                if side == 1 {
                    wa *= 0.5;
                }
                side = 1;
            } else {
                (xa, sa, wa) = (x, sample, ys);
                if side == -1 {
                    wb *= 0.5;
                }
                side = -1;
            }
        }

        Ok(Err(self.cfg.max_attempts))
    }

    /// Resolves a bracket which cannot be split any further at the epoch resolution.
    ///
    /// The end closest to zero is located if the ends still have opposite signs and, for zeros, the
    /// derivative there agrees with the direction of the crossing. Otherwise the bracket held a
    /// discontinuity (e.g. a pole) rather than a root.
    fn collapsed(
        &self,
        kind: EventKind,
        (xa, sa): (f64, Sample),
        (xb, sb): (f64, Sample),
        attempts: usize,
    ) -> Result<(Sample, usize), usize> {
        let y = |sample: &Sample| match kind {
            EventKind::Zero => sample.value,
            EventKind::Extremum => sample.derivative,
        };
        let (ya, yb) = (y(&sa), y(&sb));
        if ya * yb > 0.0 {
            return Err(attempts);
        }
        let best = if ya.abs() <= yb.abs() { sa } else { sb };
        let consistent = match kind {
            EventKind::Zero => best.derivative * (yb - ya) * (xb - xa) > 0.0,
            EventKind::Extremum => true,
        };
        if consistent {
            Ok((best, attempts))
        } else {
            Err(attempts)
        }
    }

    /// Goes back to seeking after an occurrence was located.
    pub fn resume(&mut self) {
        if self.status != EventStatus::Seeking {
            debug!("{} -- resuming from {}", self.function, self.status);
        }
        self.status = EventStatus::Seeking;
        self.bracket = None;
    }
}
