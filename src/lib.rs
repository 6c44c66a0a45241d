// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod animation;
pub mod color;
pub mod config;
pub mod easing;
pub mod error;
pub mod gauge;
pub mod id;
pub mod path;
pub mod render;
pub mod scale;
pub mod shape;
pub mod svg;
pub mod wave;

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub use color::{Color, GradientStop, StopSpec};
pub use config::{GaugeConfig, ShapeType};
pub use error::GaugeError;
pub use gauge::{Frame, Gauge, GaugeCommand, GaugeEvent, RiseEvent};
pub use id::{DeterministicIds, IdProvider, RandomIds};

use render::{load_font, render_frame, Canvas, Viewport};

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Options for the desktop window that hosts a gauge.
#[derive(Debug, Clone, Builder)]
pub struct WindowConfig {
    #[builder(default = "Liquid Gauge".to_string())]
    pub title: String,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    /// TrueType/OpenType data for the value label; without it no label is drawn.
    pub font_data: Option<Vec<u8>>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A gauge shown in its own window.
pub struct LiquidGauge {
    gauge: Gauge,
    window: WindowConfig,
    font: Option<Font<'static>>,
}

impl LiquidGauge {
    pub fn new(config: GaugeConfig, window: WindowConfig) -> Result<Self, GaugeError> {
        let font = window.font_data.clone().map(load_font).transpose()?;
        if font.is_none() {
            log::info!("no font configured, the value label will not be drawn");
        }
        Ok(Self {
            gauge: Gauge::new(config),
            window,
            font,
        })
    }

    pub fn gauge(&self) -> &Gauge {
        &self.gauge
    }

    pub fn gauge_mut(&mut self) -> &mut Gauge {
        &mut self.gauge
    }

    pub fn show(&mut self) -> Result<(), GaugeError> {
        self.run_window(None)
    }

    pub fn show_with_commands(&mut self, receiver: Receiver<GaugeCommand>) -> Result<(), GaugeError> {
        self.run_window(Some(receiver))
    }

    fn run_window(&mut self, receiver: Option<Receiver<GaugeCommand>>) -> Result<(), GaugeError> {
        let config = self.gauge.config();
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.window.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);

        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let target_fps = if self.window.max_framerate > 0.0 {
            self.window.max_framerate
        } else {
            60.0
        };
        let frame_duration = Duration::from_secs_f64(1.0 / target_fps);
        let mut last_frame = Instant::now();
        let started = Instant::now();
        let mut cursor = (0.0, 0.0);

        let gauge = &mut self.gauge;
        let font = self.font.as_ref();
        log::info!(
            "showing gauge {} in a {}x{} window",
            gauge.id(),
            size.width,
            size.height
        );

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        if let Err(err) = pixels
                            .resize_buffer(new_size.width, new_size.height)
                            .and_then(|()| pixels.resize_surface(new_size.width, new_size.height))
                        {
                            log::warn!("failed to resize surface: {err}");
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = (position.x, position.y);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        let config = gauge.config();
                        let viewport = Viewport::fit(config.width, config.height, fb_width, fb_height);
                        let p = viewport.unmap(cursor.0, cursor.1);
                        gauge.click(p.x + config.width / 2.0, p.y + config.height / 2.0);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            while let Ok(command) = receiver.try_recv() {
                                log::debug!("applying {command:?}");
                                gauge.apply(command);
                            }
                        }

                        let frame = gauge.tick(started.elapsed());
                        for event in &frame.events {
                            if let GaugeEvent::RiseComplete(done) = event {
                                log::debug!("gauge {} reached {}", done.container, done.value);
                            }
                        }

                        let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                        render_frame(&mut canvas, &frame, gauge.config(), font);
                        if let Err(err) = pixels.render() {
                            log::error!("render failed: {err}");
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}
