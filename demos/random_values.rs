use liquid_gauge::{GaugeCommand, GaugeConfig, GaugeError, LiquidGauge, ShapeType, WindowConfig};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), GaugeError> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    // A rectangular gauge with a gradient fill, configured through the bon builder
    let config = GaugeConfig::builder()
        .shape_type(ShapeType::Rectangle)
        .gradient(true)
        .wave_frequency(3.0)
        .wave_amplitude(2.0)
        .rise_animation(true)
        .rise_animation_time(Duration::from_millis(1200))
        .wave_animation(true)
        .build();

    // Optional font path as the first argument
    let font_data = std::env::args().nth(1).map(std::fs::read).transpose()?;
    let window = WindowConfig::builder()
        .title("Random values".to_string())
        .maybe_font_data(font_data)
        .build();

    let mut gauge = LiquidGauge::new(config, window)?;

    let (sender, receiver) = mpsc::channel();

    // Send a new random level every few seconds, occasionally toggling the shape
    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let mut commands = vec![GaugeCommand::SetValue(rng.random_range(0.0..100.0))];
            if rng.random_bool(0.2) {
                let shape = if rng.random_bool(0.5) {
                    ShapeType::Circle
                } else {
                    ShapeType::Rectangle
                };
                commands.push(GaugeCommand::SetShape(shape));
            }

            if commands.into_iter().any(|cmd| sender.send(cmd).is_err()) {
                break;
            }

            thread::sleep(Duration::from_millis(2500));
        }
    });

    println!("Displaying a liquid gauge with random values. Close the window to exit.");

    gauge.show_with_commands(receiver)
}
