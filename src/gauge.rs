use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::animation::{RiseRun, RiseStep, Scheduler, ScrollStep, Stamped, WaveScrollRun};
use crate::config::{clamp_value, GaugeConfig, ShapeType};
use crate::easing::{resolve, Easing};
use crate::id::{IdProvider, RandomIds, DEFAULT_ID_PREFIX};
use crate::path::Path;
use crate::scale::GaugeScales;
use crate::shape::{Container, FillShape, HitRegion};
use crate::wave::{clip_path, sample_points, WavePoint};

/// Payload of rise animation callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct RiseEvent {
    pub value: f64,
    /// Id of the gauge that emitted the event.
    pub container: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GaugeEvent {
    RiseProgress(RiseEvent),
    RiseComplete(RiseEvent),
}

/// Command enum for updates sent to a running gauge
#[derive(Debug, Clone)]
pub enum GaugeCommand {
    SetValue(f64),
    Resize(f64, f64), // width, height
    SetShape(ShapeType),
    SetWaveAnimation(bool),
    SetRiseAnimation(bool),
    SetWaveAmplitude(f64),
    SetWaveFrequency(f64),
    Configure(Box<GaugeConfig>),
}

/// Everything a renderer needs for one committed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub value: f64,
    pub label: String,
    /// Wave clip region before the scroll translation is applied.
    pub clip_path: Path,
    /// Horizontal offset applied to `clip_path`.
    pub wave_translation: f64,
    pub container_path: Path,
    pub fill: FillShape,
    pub hit_region: HitRegion,
    pub clip_id: String,
    pub gradient_id: String,
    pub events: Vec<GaugeEvent>,
}

/// Result of advancing the scheduler, not yet visible to renderers.
///
/// Committing checks that the geometry and the producing runs are still the
/// ones that computed it; anything stale is dropped.
#[derive(Debug, Clone)]
pub struct PendingFrame {
    geometry_epoch: u64,
    rise: Option<(Stamped<RiseStep>, Path)>,
    wave: Option<Stamped<ScrollStep>>,
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone)]
struct Geometry {
    scales: GaugeScales,
    samples: Rc<[WavePoint]>,
    container: Container,
    baseline: f64,
}

impl Geometry {
    fn build(config: &GaugeConfig) -> Self {
        log::debug!(
            "building geometry for {}x{} {:?}",
            config.width,
            config.height,
            config.shape_type
        );
        Self {
            scales: GaugeScales::new(
                config.width,
                config.height,
                config.inner_radius,
                config.margin,
                config.wave_amplitude,
            ),
            samples: sample_points(config.wave_frequency),
            container: Container::build(config),
            baseline: config.height / 2.0,
        }
    }

    fn clip_path_at(&self, value: f64) -> Path {
        clip_path(&self.samples, value, &self.scales, self.baseline)
    }
}

// ============================================================================
// GAUGE
// ============================================================================

type RiseCallback = Box<dyn FnMut(&RiseEvent)>;

/// One liquid fill gauge: configuration, geometry and its two animations.
pub struct Gauge {
    config: GaugeConfig,
    id: String,
    geometry: Geometry,
    geometry_epoch: u64,
    scheduler: Scheduler,
    value: f64,
    clip_path: Path,
    /// Last committed scroll fraction; `None` until the wave has scrolled.
    scroll_t: Option<f64>,
    on_rise_progress: Option<RiseCallback>,
    on_rise_complete: Option<RiseCallback>,
    on_click: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("scroll_t", &self.scroll_t)
            .field("geometry_epoch", &self.geometry_epoch)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl Gauge {
    /// Creates a gauge with a random id unless the config carries one.
    pub fn new(config: GaugeConfig) -> Self {
        Self::with_id_provider(config, &RandomIds)
    }

    pub fn with_id_provider(config: GaugeConfig, ids: &dyn IdProvider) -> Self {
        let config = config.sanitized();
        let id = match &config.id {
            Some(id) => id.clone(),
            None => ids.generate(DEFAULT_ID_PREFIX, Some(&config.value.to_string())),
        };
        let geometry = Geometry::build(&config);

        let mut gauge = Self {
            config,
            id,
            geometry,
            geometry_epoch: 0,
            scheduler: Scheduler::default(),
            value: 0.0,
            clip_path: Path::new(),
            scroll_t: None,
            on_rise_progress: None,
            on_rise_complete: None,
            on_click: None,
        };
        gauge.start_wave(0.0);
        gauge.restart_rise();
        gauge
    }

    pub fn on_rise_progress(&mut self, callback: impl FnMut(&RiseEvent) + 'static) {
        self.on_rise_progress = Some(Box::new(callback));
    }

    pub fn on_rise_complete(&mut self, callback: impl FnMut(&RiseEvent) + 'static) {
        self.on_rise_complete = Some(Box::new(callback));
    }

    pub fn on_click(&mut self, callback: impl FnMut() + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Whether either animation still needs ticks.
    pub fn is_animating(&self) -> bool {
        self.scheduler.rise().is_some() || self.scheduler.wave().is_some()
    }

    /// Current horizontal offset of the wave, zero for a wave that never scrolled.
    pub fn wave_translation(&self) -> f64 {
        self.scroll_t.map_or(0.0, |t| self.geometry.scales.scroll.apply(t))
    }

    pub fn clip_id(&self) -> String {
        format!("clipWave-{}", self.id)
    }

    pub fn gradient_id(&self) -> String {
        format!("gradient-{}", self.id)
    }

    /// Replaces the configuration, restarting only what the change affects.
    ///
    /// Geometry changes rebuild the scales and samples and restart both runs.
    /// Toggling the wave animation pauses or resumes the scroll where it was.
    /// A new value or a rise toggle restarts the rise from the rendered value.
    pub fn update(&mut self, config: GaugeConfig) {
        let config = config.sanitized();
        let old = std::mem::replace(&mut self.config, config);
        if let Some(id) = self.config.id.as_ref().filter(|id| **id != self.id) {
            self.id = id.clone();
        }

        if old.geometry_differs(&self.config) {
            self.geometry_epoch += 1;
            self.geometry = Geometry::build(&self.config);
            self.scheduler.cancel_wave();
            self.scroll_t = None;
            self.start_wave(0.0);
            self.restart_rise();
            return;
        }

        if old.wave_animation != self.config.wave_animation {
            if self.config.wave_animation {
                self.start_wave(self.scroll_t.unwrap_or(0.0));
            } else {
                self.scheduler.cancel_wave();
            }
        }

        if old.value != self.config.value || old.rise_animation != self.config.rise_animation {
            self.restart_rise();
        }
    }

    pub fn apply(&mut self, command: GaugeCommand) {
        let mut config = self.config.clone();
        match command {
            GaugeCommand::SetValue(value) => config.value = value,
            GaugeCommand::Resize(width, height) => {
                config.width = width;
                config.height = height;
            }
            GaugeCommand::SetShape(shape_type) => config.shape_type = shape_type,
            GaugeCommand::SetWaveAnimation(enabled) => config.wave_animation = enabled,
            GaugeCommand::SetRiseAnimation(enabled) => config.rise_animation = enabled,
            GaugeCommand::SetWaveAmplitude(amplitude) => config.wave_amplitude = amplitude,
            GaugeCommand::SetWaveFrequency(frequency) => config.wave_frequency = frequency,
            GaugeCommand::Configure(new_config) => config = *new_config,
        }
        self.update(config);
    }

    pub fn set_value(&mut self, value: f64) {
        self.apply(GaugeCommand::SetValue(value));
    }

    /// Advances both runs to `now` and computes, but does not commit, the result.
    pub fn advance(&mut self, now: Duration) -> PendingFrame {
        let tick = self.scheduler.tick(now);
        let rise = tick.rise.map(|stamped| {
            let path = self.geometry.clip_path_at(stamped.step.value);
            (stamped, path)
        });
        PendingFrame {
            geometry_epoch: self.geometry_epoch,
            rise,
            wave: tick.wave,
        }
    }

    /// Makes a pending result visible and fires rise callbacks.
    ///
    /// Returns `None` when the geometry changed since `pending` was computed.
    /// Parts produced by runs that have since been cancelled are dropped.
    pub fn commit(&mut self, pending: PendingFrame) -> Option<Frame> {
        if pending.geometry_epoch != self.geometry_epoch {
            log::trace!("dropping frame computed for stale geometry");
            return None;
        }

        let mut events = Vec::new();
        if let Some((stamped, path)) = pending.rise {
            if self.scheduler.is_current(stamped.stamp) {
                self.value = stamped.step.value;
                self.clip_path = path;
                let event = RiseEvent {
                    value: self.value,
                    container: self.id.clone(),
                };
                if let Some(callback) = self.on_rise_progress.as_mut() {
                    callback(&event);
                }
                events.push(GaugeEvent::RiseProgress(event.clone()));
                if stamped.step.finished {
                    if let Some(callback) = self.on_rise_complete.as_mut() {
                        callback(&event);
                    }
                    events.push(GaugeEvent::RiseComplete(event));
                }
            } else {
                log::trace!("dropping stale rise step");
            }
        }

        if let Some(stamped) = pending.wave {
            if self.scheduler.is_current(stamped.stamp) {
                self.scroll_t = Some(stamped.step.t);
            } else {
                log::trace!("dropping stale wave step");
            }
        }

        let mut frame = self.frame();
        frame.events = events;
        Some(frame)
    }

    /// Advances and commits in one step.
    pub fn tick(&mut self, now: Duration) -> Frame {
        let pending = self.advance(now);
        self.commit(pending).unwrap_or_else(|| self.frame())
    }

    /// Snapshot of the committed state, without events.
    pub fn frame(&self) -> Frame {
        Frame {
            value: self.value,
            label: self.label(),
            clip_path: self.clip_path.clone(),
            wave_translation: self.wave_translation(),
            container_path: self.geometry.container.outline.clone(),
            fill: self.geometry.container.fill,
            hit_region: self.geometry.container.hit_region,
            clip_id: self.clip_id(),
            gradient_id: self.gradient_id(),
            events: Vec::new(),
        }
    }

    /// Rounded value followed by the unit, e.g. `"70%"`.
    pub fn label(&self) -> String {
        let rounded = self.value.round();
        // Avoid printing "-0".
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        format!("{rounded}{}", self.config.unit)
    }

    /// Handles a click at `(x, y)` relative to the gauge's top-left corner.
    ///
    /// Returns whether the click landed on the gauge's hit region.
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        let (cx, cy) = (self.config.width / 2.0, self.config.height / 2.0);
        let hit = self.geometry.container.hit_region.contains(x - cx, y - cy);
        if hit {
            log::debug!("gauge {} clicked", self.id);
            if let Some(callback) = self.on_click.as_mut() {
                callback();
            }
        }
        hit
    }

    fn start_wave(&mut self, from: f64) {
        if !self.config.wave_animation {
            return;
        }
        let easing = resolve(&self.config.wave_animation_easing, Easing::Linear);
        self.scheduler.start_wave(WaveScrollRun::start(
            from,
            self.config.wave_animation_time,
            easing,
        ));
    }

    fn restart_rise(&mut self) {
        self.scheduler.cancel_rise();
        let target = clamp_value(self.config.value);

        if self.config.rise_animation {
            let easing = resolve(&self.config.rise_animation_easing, Easing::CubicInOut);
            self.scheduler.start_rise(RiseRun::start(
                self.value,
                target,
                self.config.rise_animation_time,
                easing,
            ));
            // Until the first tick the wave shows the rendered value.
            self.clip_path = self.geometry.clip_path_at(self.value);
        } else {
            self.value = target;
            self.clip_path = self.geometry.clip_path_at(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_WAVE_FREQUENCY;
    use crate::id::DeterministicIds;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn animated() -> GaugeConfig {
        GaugeConfig::builder()
            .value(60.0)
            .rise_animation(true)
            .rise_animation_time(ms(1000))
            .rise_animation_easing("linear".to_string())
            .wave_animation(true)
            .wave_animation_time(ms(2000))
            .build()
    }

    #[test]
    fn test_static_gauge_renders_target_immediately() {
        let gauge = Gauge::with_id_provider(
            GaugeConfig::builder().value(42.0).build(),
            &DeterministicIds,
        );
        assert_eq!(gauge.value(), 42.0);
        assert_eq!(gauge.id(), "liquid-fill-42");
        assert_eq!(gauge.clip_id(), "clipWave-liquid-fill-42");
        assert_eq!(gauge.label(), "42%");
        assert!(!gauge.is_animating());
        assert!(!gauge.frame().clip_path.is_empty());
    }

    #[test]
    fn test_config_id_wins_over_provider() {
        let gauge = Gauge::new(GaugeConfig::builder().id("tank".to_string()).build());
        assert_eq!(gauge.gradient_id(), "gradient-tank");
    }

    #[test]
    fn test_rise_progress_then_complete() {
        let mut gauge = Gauge::with_id_provider(animated(), &DeterministicIds);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        gauge.on_rise_complete(move |event| sink.borrow_mut().push(event.value));

        assert_eq!(gauge.tick(ms(0)).value, 0.0);
        assert_eq!(gauge.tick(ms(500)).value, 30.0);
        let last = gauge.tick(ms(1000));
        assert_eq!(last.value, 60.0);
        assert_eq!(
            last.events,
            vec![
                GaugeEvent::RiseProgress(RiseEvent {
                    value: 60.0,
                    container: "liquid-fill-60".to_string()
                }),
                GaugeEvent::RiseComplete(RiseEvent {
                    value: 60.0,
                    container: "liquid-fill-60".to_string()
                }),
            ]
        );
        assert_eq!(*seen.borrow(), vec![60.0]);
        assert!(gauge.scheduler().rise().is_none());
        assert!(gauge.tick(ms(1500)).events.is_empty());
    }

    #[test]
    fn test_new_value_rises_from_rendered_value() {
        let mut gauge = Gauge::with_id_provider(animated(), &DeterministicIds);
        gauge.tick(ms(0));
        gauge.tick(ms(500));
        gauge.set_value(80.0);
        let rise = gauge.scheduler().rise().map(|r| (r.start_value(), r.target_value()));
        assert_eq!(rise, Some((30.0, 80.0)));
        // The wave keeps scrolling across value changes.
        assert!(gauge.scheduler().wave().is_some());
    }

    #[test]
    fn test_disabling_rise_jumps_to_target() {
        let mut gauge = Gauge::with_id_provider(animated(), &DeterministicIds);
        gauge.tick(ms(0));
        gauge.apply(GaugeCommand::SetRiseAnimation(false));
        assert_eq!(gauge.value(), 60.0);
        assert!(gauge.scheduler().rise().is_none());
    }

    #[test]
    fn test_wave_pause_and_resume_keeps_offset() {
        let mut gauge = Gauge::with_id_provider(animated(), &DeterministicIds);
        gauge.tick(ms(0));
        gauge.tick(ms(500));
        let paused = gauge.wave_translation();

        gauge.apply(GaugeCommand::SetWaveAnimation(false));
        assert!(gauge.scheduler().wave().is_none());
        assert_eq!(gauge.tick(ms(900)).wave_translation, paused);

        gauge.apply(GaugeCommand::SetWaveAnimation(true));
        let resumed = gauge.scheduler().wave().map(|w| w.cycle_duration());
        assert_eq!(resumed, Some(ms(1500)));
    }

    #[test]
    fn test_stale_rise_step_is_not_committed() {
        let mut gauge = Gauge::with_id_provider(animated(), &DeterministicIds);
        gauge.tick(ms(0));
        let pending = gauge.advance(ms(500));
        gauge.apply(GaugeCommand::SetRiseAnimation(false));
        let frame = gauge.commit(pending);
        assert_eq!(frame.map(|f| (f.value, f.events.len())), Some((60.0, 0)));
    }

    #[test]
    fn test_finished_rise_step_is_not_committed_after_reconfigure() {
        let mut gauge = Gauge::with_id_provider(animated(), &DeterministicIds);
        let completed = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&completed);
        gauge.on_rise_complete(move |_| *counter.borrow_mut() += 1);

        gauge.tick(ms(0));
        let pending = gauge.advance(ms(1000));
        let config = GaugeConfig {
            rise_animation: false,
            value: 20.0,
            ..gauge.config().clone()
        };
        gauge.apply(GaugeCommand::Configure(Box::new(config)));

        let frame = gauge.commit(pending);
        assert_eq!(frame.map(|f| (f.value, f.events.len())), Some((20.0, 0)));
        assert_eq!(gauge.value(), 20.0);
        assert_eq!(*completed.borrow(), 0);
    }

    #[test]
    fn test_huge_wave_frequency_is_capped() {
        let mut gauge = Gauge::with_id_provider(GaugeConfig::default(), &DeterministicIds);
        gauge.apply(GaugeCommand::SetWaveFrequency(1e10));
        assert_eq!(gauge.config().wave_frequency, MAX_WAVE_FREQUENCY);
        assert_eq!(gauge.geometry.samples.len(), 40_001);
    }

    #[test]
    fn test_static_wave_is_not_shifted() {
        let config = GaugeConfig::builder()
            .value(50.0)
            .wave_frequency(3.0)
            .wave_animation(false)
            .build();
        let mut gauge = Gauge::with_id_provider(config, &DeterministicIds);
        assert_eq!(gauge.wave_translation(), 0.0);
        assert_eq!(gauge.tick(ms(400)).wave_translation, 0.0);

        gauge.apply(GaugeCommand::SetWaveAnimation(true));
        gauge.tick(ms(500));
        assert_eq!(gauge.wave_translation(), gauge.geometry.scales.scroll.apply(0.0));
    }

    #[test]
    fn test_click_uses_hit_region() {
        let mut gauge = Gauge::new(GaugeConfig::default());
        let clicks = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&clicks);
        gauge.on_click(move || *counter.borrow_mut() += 1);

        assert!(gauge.click(200.0, 200.0));
        assert!(!gauge.click(5.0, 5.0));
        assert_eq!(*clicks.borrow(), 1);
    }
}
