// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Converts wall-clock frame times into fixed simulation steps.

use tessera_core::config::StallPolicy;

/// The outcome of one [`FixedStepClock::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Number of fixed updates to run this frame.
    pub steps: u32,
    /// Fraction of a step left in the accumulator, in `[0, 1)`.
    pub alpha: f64,
    /// Whether the stall policy shortened this frame.
    pub stalled: bool,
}

// Slack on the step count, in steps, so a frame that lands exactly on a step
// boundary is not lost to rounding in `elapsed / fixed_step`.
const STEP_TOLERANCE: f64 = 1e-9;

/// A fixed-step accumulator.
///
/// The clock keeps the simulated time as wall-clock time since the first
/// call minus the time discarded by the stall policy, and the number of
/// steps already accounted for. Each [`advance`](Self::advance) yields the
/// difference between the whole steps in the simulated time and that count,
/// so rounding never builds up across frames.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    fixed_step: f64,
    policy: StallPolicy,
    accumulator: f64,
    origin_ms: Option<f64>,
    last_ms: f64,
    discarded_ms: f64,
    consumed: u64,
}

impl FixedStepClock {
    /// Creates a new clock.
    /// ## Arguments
    /// * `fixed_step` - The simulation step in seconds; must be positive.
    /// * `policy` - What to do with very long frames.
    pub fn new(fixed_step: f64, policy: StallPolicy) -> Self {
        Self {
            fixed_step,
            policy,
            accumulator: 0.0,
            origin_ms: None,
            last_ms: 0.0,
            discarded_ms: 0.0,
            consumed: 0,
        }
    }

    /// The simulation step in seconds.
    #[inline]
    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    /// Seconds accumulated but not yet simulated.
    #[inline]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Forgets the previous frame time and the accumulated remainder.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.origin_ms = None;
        self.last_ms = 0.0;
        self.discarded_ms = 0.0;
        self.consumed = 0;
    }

    /// Advances the clock to `now_ms`.
    ///
    /// The first call only records the time base and yields no step.
    /// Time going backwards, and a non-finite timestamp, count as no time at all.
    /// ## Arguments
    /// * `now_ms` - A monotonic timestamp in milliseconds.
    /// ## Returns
    /// The number of steps to simulate and the interpolation factor.
    pub fn advance(&mut self, now_ms: f64) -> Tick {
        let Some(origin) = self.origin_ms else {
            if now_ms.is_finite() {
                self.origin_ms = Some(now_ms);
                self.last_ms = now_ms;
            }
            return Tick {
                steps: 0,
                alpha: 0.0,
                stalled: false,
            };
        };
        let now_ms = if now_ms.is_finite() { now_ms } else { self.last_ms };

        let delta_ms = now_ms - self.last_ms;
        self.last_ms = now_ms;
        let mut stalled = false;
        if delta_ms < 0.0 {
            self.discarded_ms += delta_ms;
        } else if let StallPolicy::ClampFrame { max_frame_ms } = self.policy {
            if delta_ms > max_frame_ms {
                self.discarded_ms += delta_ms - max_frame_ms;
                stalled = true;
            }
        }

        let elapsed_s = (now_ms - origin - self.discarded_ms) / 1000.0;
        let exact = (elapsed_s / self.fixed_step).max(0.0);
        let whole = (exact + STEP_TOLERANCE).floor();
        let due = (whole as u64).saturating_sub(self.consumed);
        self.consumed = self.consumed.max(whole as u64);

        let mut steps = u32::try_from(due).unwrap_or(u32::MAX);
        if let StallPolicy::DropBacklog { max_steps } = self.policy {
            if steps > max_steps {
                steps = max_steps;
                stalled = true;
            }
        }

        // `exact` may sit a hair below `whole` inside the tolerance.
        let alpha = (exact - whole).clamp(0.0, 1.0 - f64::EPSILON);
        self.accumulator = alpha * self.fixed_step;
        Tick {
            steps,
            alpha,
            stalled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Dyadic values keep the arithmetic exact.
    const STEP: f64 = 0.0625;

    #[test]
    fn test_first_advance_sets_the_time_base() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::Uncapped);
        let tick = clock.advance(5_000.0);
        assert_eq!(tick.steps, 0);
        assert_eq!(tick.alpha, 0.0);
    }

    #[test]
    fn test_partial_steps_accumulate() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::Uncapped);
        clock.advance(0.0);
        let tick = clock.advance(31.25);
        assert_eq!(tick.steps, 0);
        assert_relative_eq!(tick.alpha, 0.5);

        let tick = clock.advance(93.75);
        assert_eq!(tick.steps, 1);
        assert_relative_eq!(tick.alpha, 0.5);
    }

    #[test]
    fn test_backwards_time_counts_as_zero() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::Uncapped);
        clock.advance(1_000.0);
        let tick = clock.advance(500.0);
        assert_eq!(tick.steps, 0);
        assert_eq!(clock.accumulator(), 0.0);

        // The time base moved back as well.
        assert_eq!(clock.advance(562.5).steps, 1);
    }

    #[test]
    fn test_clamp_frame_limits_catch_up() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::ClampFrame { max_frame_ms: 250.0 });
        clock.advance(0.0);
        let tick = clock.advance(10_000.0);
        assert_eq!(tick.steps, 4);
        assert!(tick.stalled);
    }

    #[test]
    fn test_drop_backlog_caps_steps_and_keeps_remainder() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::DropBacklog { max_steps: 3 });
        clock.advance(0.0);
        let tick = clock.advance(1_031.25);
        assert_eq!(tick.steps, 3);
        assert!(tick.stalled);
        assert_relative_eq!(tick.alpha, 0.5);
    }

    #[test]
    fn test_uncapped_runs_every_step() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::Uncapped);
        clock.advance(0.0);
        assert_eq!(clock.advance(10_000.0).steps, 160);
    }

    #[test]
    fn test_sixtieth_step_never_loses_a_step() {
        let step = 1.0 / 60.0;
        let mut clock = FixedStepClock::new(step, StallPolicy::Uncapped);
        clock.advance(0.0);
        let mut total = 0u64;
        for frame in 1..=600u64 {
            let tick = clock.advance(frame as f64 * 1000.0 / 60.0);
            total += u64::from(tick.steps);
            assert_eq!(total, frame, "frame {frame}");
            assert!((0.0..1.0).contains(&tick.alpha));
        }
    }

    #[test]
    fn test_uneven_frames_follow_elapsed_time() {
        // 144 Hz frames against a 60 Hz step: floor(n * 60 / 144) steps after n frames.
        let mut clock = FixedStepClock::new(1.0 / 60.0, StallPolicy::Uncapped);
        clock.advance(0.0);
        let mut total = 0u64;
        for frame in 1..=1440u64 {
            total += u64::from(clock.advance(frame as f64 * 1000.0 / 144.0).steps);
            assert_eq!(total, frame * 5 / 12, "frame {frame}");
        }
        assert!(clock.accumulator() < clock.fixed_step());
    }

    #[test]
    fn test_reset_forgets_time_base() {
        let mut clock = FixedStepClock::new(STEP, StallPolicy::Uncapped);
        clock.advance(0.0);
        clock.advance(31.25);
        clock.reset();
        assert_eq!(clock.advance(1_000.0).steps, 0);
        assert_eq!(clock.accumulator(), 0.0);
    }
}
