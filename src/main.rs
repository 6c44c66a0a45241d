use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use liquid_gauge::{GaugeCommand, GaugeConfig, GaugeError, LiquidGauge, ShapeType, WindowConfig};

fn parse_number(flag: &str, value: Option<String>) -> Result<f64, GaugeError> {
    let value = value.ok_or_else(|| GaugeError::Argument(format!("{flag} needs a value")))?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| GaugeError::Argument(format!("{flag}: not a number: {value}")))
}

fn parse_millis(flag: &str, value: Option<String>) -> Result<Duration, GaugeError> {
    let millis = parse_number(flag, value)?;
    Duration::try_from_secs_f64(millis / 1000.0).map_err(|err| {
        GaugeError::Argument(format!("{flag}: {millis} ms is not a valid duration: {err}"))
    })
}

fn main() -> Result<(), GaugeError> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut config = GaugeConfig::builder()
        .rise_animation(true)
        .wave_animation(true)
        .build();
    let mut window = WindowConfig::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--value" => config.value = parse_number("--value", args.next())?,
            "--shape" => {
                let shape = args
                    .next()
                    .ok_or_else(|| GaugeError::Argument("--shape needs a value".to_string()))?;
                config.shape_type = shape.parse::<ShapeType>().map_err(GaugeError::Argument)?;
            }
            "--title" => {
                if let Some(title) = args.next() {
                    window.title = title;
                }
            }
            "--font" => {
                let path = args
                    .next()
                    .ok_or_else(|| GaugeError::Argument("--font needs a path".to_string()))?;
                window.font_data = Some(fs::read(path)?);
            }
            "--rise-time" => {
                config.rise_animation_time = parse_millis("--rise-time", args.next())?;
            }
            "--wave-time" => {
                config.wave_animation_time = parse_millis("--wave-time", args.next())?;
            }
            "--no-wave" => config.wave_animation = false,
            "--no-rise" => config.rise_animation = false,
            "--gradient" => config.gradient = true,
            other => log::warn!("ignoring unknown argument {other:?}"),
        }
    }

    let mut gauge = LiquidGauge::new(config, window)?;

    // Each stdin line holding a number becomes the new fill value.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            match line.trim().parse::<f64>() {
                Ok(value) => {
                    if sender.send(GaugeCommand::SetValue(value)).is_err() {
                        break;
                    }
                }
                Err(_) => log::warn!("ignoring non-numeric input {line:?}"),
            }
        }
    });

    gauge.show_with_commands(receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_millis() {
        let parsed = parse_millis("--rise-time", Some("1500".to_string()));
        assert!(matches!(parsed, Ok(d) if d == Duration::from_millis(1500)));
    }

    #[test]
    fn test_parse_millis_rejects_out_of_range() {
        for input in ["1e300", "-5", "inf", "NaN"] {
            let parsed = parse_millis("--wave-time", Some(input.to_string()));
            assert!(matches!(parsed, Err(GaugeError::Argument(_))), "{input}");
        }
        assert!(matches!(parse_millis("--wave-time", None), Err(GaugeError::Argument(_))));
    }
}
