use std::time::Duration;

use crate::easing::Easing;
use crate::scale::{lerp, time_progress};

// ============================================================================
// RUN CLOCK
// ============================================================================

/// Lifecycle of a timed run.
///
/// A run starts `Pending` and captures its start timestamp on the first tick,
/// so elapsed time begins at zero whenever the host gets around to ticking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running { started: Duration, last: Duration },
    Stopped,
}

impl RunState {
    /// Elapsed time for a tick at `now`. Timestamps earlier than the previous
    /// tick are treated as the previous tick. `None` once stopped.
    fn elapsed(&mut self, now: Duration) -> Option<Duration> {
        match *self {
            Self::Pending => {
                *self = Self::Running {
                    started: now,
                    last: now,
                };
                Some(Duration::ZERO)
            }
            Self::Running { started, last } => {
                let now = now.max(last);
                *self = Self::Running { started, last: now };
                Some(now - started)
            }
            Self::Stopped => None,
        }
    }

    /// Moves the start timestamp forward, used when a looping run begins a new cycle.
    fn rebase(&mut self, by: Duration) {
        if let Self::Running { started, last } = *self {
            *self = Self::Running {
                started: started.saturating_add(by),
                last,
            };
        }
    }

    fn is_active(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

// ============================================================================
// RISE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseStep {
    pub value: f64,
    pub finished: bool,
}

/// One-shot interpolation of the fill value from a start to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct RiseRun {
    start_value: f64,
    target_value: f64,
    duration: Duration,
    easing: Easing,
    state: RunState,
}

impl RiseRun {
    pub fn start(start_value: f64, target_value: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            start_value,
            target_value,
            duration,
            easing,
            state: RunState::Pending,
        }
    }

    /// Advances the run. Once the duration has elapsed the step carries the
    /// exact target value, `finished` is set and the run stops.
    pub fn tick(&mut self, now: Duration) -> Option<RiseStep> {
        let elapsed = self.state.elapsed(now)?;

        if elapsed >= self.duration {
            self.state = RunState::Stopped;
            return Some(RiseStep {
                value: self.target_value,
                finished: true,
            });
        }

        let progress = time_progress(millis(elapsed), millis(self.duration));
        let eased = self.easing.apply(progress);
        Some(RiseStep {
            value: lerp(self.start_value, self.target_value, eased),
            finished: false,
        })
    }

    pub fn cancel(&mut self) {
        self.state = RunState::Stopped;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn start_value(&self) -> f64 {
        self.start_value
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }
}

// ============================================================================
// WAVE SCROLL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    /// Scroll fraction, in [0, 1] for easings that do not overshoot.
    pub t: f64,
    /// Cycles that wrapped around during this tick.
    pub wrapped: u32,
}

/// Endless horizontal scroll of the wave.
///
/// Each cycle eases the scroll fraction from where it started to 1 over
/// `wave_time * (1 - start)`, then wraps to 0 and begins the next cycle at the
/// exact moment the previous one ended.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveScrollRun {
    cycle_start: f64,
    t: f64,
    wave_time: Duration,
    easing: Easing,
    state: RunState,
}

impl WaveScrollRun {
    pub fn start(from: f64, wave_time: Duration, easing: Easing) -> Self {
        let from = if (0.0..1.0).contains(&from) { from } else { 0.0 };
        Self {
            cycle_start: from,
            t: from,
            wave_time,
            easing,
            state: RunState::Pending,
        }
    }

    /// Duration of the current cycle, shortened when it started mid-way.
    pub fn cycle_duration(&self) -> Duration {
        self.wave_time.mul_f64(1.0 - self.cycle_start)
    }

    pub fn tick(&mut self, now: Duration) -> Option<ScrollStep> {
        let mut elapsed = self.state.elapsed(now)?;
        let mut wrapped = 0u32;

        if self.wave_time.is_zero() {
            self.t = 0.0;
            return Some(ScrollStep { t: 0.0, wrapped });
        }

        let first = self.cycle_duration();
        if elapsed >= first && !first.is_zero() {
            elapsed -= first;
            let mut consumed = first;
            wrapped += 1;
            self.cycle_start = 0.0;

            let full = self.wave_time.as_nanos();
            let extra = elapsed.as_nanos() / full;
            let remainder = elapsed.as_nanos() % full;
            let extra = u32::try_from(extra).unwrap_or(u32::MAX);
            wrapped = wrapped.saturating_add(extra);
            let skipped = self.wave_time.checked_mul(extra).unwrap_or(Duration::MAX);
            consumed = consumed.saturating_add(skipped);
            elapsed = Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX));
            self.state.rebase(consumed);
        }

        let duration = self.cycle_duration();
        let progress = time_progress(millis(elapsed), millis(duration));
        self.t = lerp(self.cycle_start, 1.0, self.easing.apply(progress));
        if self.t >= 1.0 && elapsed >= duration {
            self.t = 0.0;
        }
        Some(ScrollStep { t: self.t, wrapped })
    }

    pub fn cancel(&mut self) {
        self.state = RunState::Stopped;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn t(&self) -> f64 {
        self.t
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Rise,
    WaveScroll,
}

/// Identifies the run that produced a tick result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub kind: RunKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamped<T> {
    pub stamp: Stamp,
    pub step: T,
}

/// Results of one scheduler tick, rise first.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SchedulerTick {
    pub rise: Option<Stamped<RiseStep>>,
    pub wave: Option<Stamped<ScrollStep>>,
}

/// Multiplexes the rise and wave-scroll runs of one gauge.
///
/// Every start or cancel bumps the slot's generation. Tick results carry the
/// generation they were computed under, so a result that outlives its run can
/// be recognised and dropped.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    rise: Option<RiseRun>,
    rise_generation: u64,
    wave: Option<WaveScrollRun>,
    wave_generation: u64,
}

impl Scheduler {
    pub fn start_rise(&mut self, run: RiseRun) -> Stamp {
        self.rise_generation += 1;
        log::debug!(
            "rise run {} started: {} -> {}",
            self.rise_generation,
            run.start_value(),
            run.target_value()
        );
        self.rise = Some(run);
        self.stamp(RunKind::Rise)
    }

    pub fn start_wave(&mut self, run: WaveScrollRun) -> Stamp {
        self.wave_generation += 1;
        log::debug!("wave run {} started at t={}", self.wave_generation, run.t());
        self.wave = Some(run);
        self.stamp(RunKind::WaveScroll)
    }

    /// Stops the rise run, if any.
    ///
    /// The generation is bumped even when the run already finished, so a final
    /// step that has not been committed yet is rejected as well.
    pub fn cancel_rise(&mut self) -> Option<RiseRun> {
        self.rise_generation += 1;
        let mut run = self.rise.take()?;
        run.cancel();
        log::debug!("rise run cancelled");
        Some(run)
    }

    pub fn cancel_wave(&mut self) -> Option<WaveScrollRun> {
        self.wave_generation += 1;
        let mut run = self.wave.take()?;
        run.cancel();
        log::debug!("wave run cancelled");
        Some(run)
    }

    pub fn tick(&mut self, now: Duration) -> SchedulerTick {
        let mut tick = SchedulerTick::default();

        if let Some(run) = self.rise.as_mut() {
            tick.rise = run.tick(now).map(|step| Stamped {
                stamp: Stamp {
                    kind: RunKind::Rise,
                    generation: self.rise_generation,
                },
                step,
            });
            if !run.is_active() {
                log::debug!("rise run {} finished", self.rise_generation);
                self.rise = None;
            }
        }

        if let Some(run) = self.wave.as_mut() {
            tick.wave = run.tick(now).map(|step| Stamped {
                stamp: Stamp {
                    kind: RunKind::WaveScroll,
                    generation: self.wave_generation,
                },
                step,
            });
        }

        tick
    }

    /// Whether a result stamped with `stamp` still belongs to the live run.
    pub fn is_current(&self, stamp: Stamp) -> bool {
        match stamp.kind {
            RunKind::Rise => stamp.generation == self.rise_generation,
            RunKind::WaveScroll => stamp.generation == self.wave_generation,
        }
    }

    pub fn rise(&self) -> Option<&RiseRun> {
        self.rise.as_ref()
    }

    pub fn wave(&self) -> Option<&WaveScrollRun> {
        self.wave.as_ref()
    }

    fn stamp(&self, kind: RunKind) -> Stamp {
        let generation = match kind {
            RunKind::Rise => self.rise_generation,
            RunKind::WaveScroll => self.wave_generation,
        };
        Stamp { kind, generation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_rise_interpolates_and_finishes_on_target() {
        let mut run = RiseRun::start(10.0, 70.0, ms(1000), Easing::Linear);
        assert_eq!(run.tick(ms(500)), Some(RiseStep { value: 10.0, finished: false }));
        let mid = run.tick(ms(1000)).map(|s| s.value);
        assert_eq!(mid, Some(40.0));
        assert_eq!(run.tick(ms(1500)), Some(RiseStep { value: 70.0, finished: true }));
        assert!(!run.is_active());
        assert_eq!(run.tick(ms(2000)), None);
    }

    #[test]
    fn test_rise_endpoint_is_exact_for_every_easing() {
        for name in ["linear", "cubicInOut", "elastic", "bounceInOut", "backOut", "expIn", "sin"] {
            let easing = crate::easing::resolve(name, Easing::CubicInOut);
            let mut run = RiseRun::start(3.3, 71.7, ms(750), easing);
            run.tick(ms(0));
            let step = run.tick(ms(750));
            assert_eq!(step, Some(RiseStep { value: 71.7, finished: true }), "{name}");
        }
    }

    #[test]
    fn test_rise_with_zero_duration_finishes_on_first_tick() {
        let mut run = RiseRun::start(0.0, 55.0, Duration::ZERO, Easing::CubicInOut);
        assert_eq!(run.tick(ms(0)), Some(RiseStep { value: 55.0, finished: true }));
    }

    #[test]
    fn test_rise_ignores_time_going_backwards() {
        let mut run = RiseRun::start(0.0, 100.0, ms(1000), Easing::Linear);
        run.tick(ms(100));
        run.tick(ms(600));
        let step = run.tick(ms(200));
        assert_eq!(step.map(|s| s.value), Some(50.0));
    }

    #[test]
    fn test_wave_cycle_duration_scales_with_remaining_distance() {
        let from_start = WaveScrollRun::start(0.0, ms(2000), Easing::Linear);
        let from_half = WaveScrollRun::start(0.5, ms(2000), Easing::Linear);
        assert_eq!(from_start.cycle_duration(), ms(2000));
        assert_eq!(from_half.cycle_duration(), ms(1000));
        assert_eq!(from_half.cycle_duration() * 2, from_start.cycle_duration());
    }

    #[test]
    fn test_wave_wraps_and_keeps_constant_speed() {
        let mut run = WaveScrollRun::start(0.5, ms(2000), Easing::Linear);
        assert_eq!(run.tick(ms(100)).map(|s| s.t), Some(0.5));
        assert_eq!(run.tick(ms(600)).map(|s| s.t), Some(0.75));
        // First cycle ends at 1100; 500ms into the next full cycle.
        let step = run.tick(ms(1600));
        assert_eq!(step, Some(ScrollStep { t: 0.25, wrapped: 1 }));
        assert_eq!(run.cycle_duration(), ms(2000));
        // Several cycles at once.
        let step = run.tick(ms(1600 + 4000));
        assert_eq!(step, Some(ScrollStep { t: 0.25, wrapped: 2 }));
    }

    #[test]
    fn test_wave_start_outside_unit_interval_restarts_at_zero() {
        assert_eq!(WaveScrollRun::start(1.0, ms(1000), Easing::Linear).t(), 0.0);
        assert_eq!(WaveScrollRun::start(-0.2, ms(1000), Easing::Linear).t(), 0.0);
    }

    #[test]
    fn test_scheduler_generations_detect_stale_results() {
        let mut scheduler = Scheduler::default();
        scheduler.start_rise(RiseRun::start(0.0, 50.0, ms(1000), Easing::Linear));
        scheduler.start_wave(WaveScrollRun::start(0.0, ms(1000), Easing::Linear));

        let tick = scheduler.tick(ms(0));
        let (rise, wave) = match (tick.rise, tick.wave) {
            (Some(rise), Some(wave)) => (rise, wave),
            other => panic!("expected both runs to tick, got {other:?}"),
        };
        assert!(scheduler.is_current(rise.stamp));
        assert!(scheduler.is_current(wave.stamp));

        assert!(scheduler.cancel_rise().is_some());
        assert!(!scheduler.is_current(rise.stamp));
        assert!(scheduler.is_current(wave.stamp));
        assert!(scheduler.tick(ms(10)).rise.is_none());
    }

    #[test]
    fn test_finished_rise_leaves_scheduler_but_stays_current() {
        let mut scheduler = Scheduler::default();
        scheduler.start_rise(RiseRun::start(0.0, 50.0, ms(100), Easing::Linear));
        scheduler.tick(ms(0));
        let tick = scheduler.tick(ms(100));
        let rise = tick.rise.map(|r| (r.step.finished, scheduler.is_current(r.stamp)));
        assert_eq!(rise, Some((true, true)));
        assert!(scheduler.rise().is_none());
    }

    #[test]
    fn test_cancel_after_finish_invalidates_final_step() {
        let mut scheduler = Scheduler::default();
        scheduler.start_rise(RiseRun::start(0.0, 50.0, ms(100), Easing::Linear));
        scheduler.start_wave(WaveScrollRun::start(0.0, ms(1000), Easing::Linear));
        scheduler.tick(ms(0));
        let tick = scheduler.tick(ms(100));
        let (rise, wave) = match (tick.rise, tick.wave) {
            (Some(rise), Some(wave)) => (rise, wave),
            other => panic!("expected both runs to tick, got {other:?}"),
        };
        assert!(rise.step.finished);

        assert!(scheduler.cancel_rise().is_none());
        assert!(!scheduler.is_current(rise.stamp));

        assert!(scheduler.cancel_wave().is_some());
        assert!(scheduler.cancel_wave().is_none());
        assert!(!scheduler.is_current(wave.stamp));
    }
}
