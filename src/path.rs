use std::f64::consts::PI;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// A single drawing instruction.
///
/// Angles are in radians in screen space (y down), so increasing angles sweep
/// clockwise. An arc continues from the current point, which must lie at
/// `start_angle` on the circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Close,
}

/// An ordered list of drawing commands plus the rule used to fill them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
    fill_rule: FillRule,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
    }

    pub fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.commands.push(PathCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Serializes the path as SVG path data (the `d` attribute).
    pub fn to_svg(&self) -> String {
        let mut d = String::new();
        for command in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = match *command {
                PathCommand::MoveTo(p) => {
                    write!(d, "M{},{}", format_number(p.x), format_number(p.y))
                }
                PathCommand::LineTo(p) => {
                    write!(d, "L{},{}", format_number(p.x), format_number(p.y))
                }
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let sweep = end_angle - start_angle;
                    let end = point_on_circle(center, radius, end_angle);
                    write!(
                        d,
                        "A{},{},0,{},{},{},{}",
                        format_number(radius),
                        format_number(radius),
                        u8::from(sweep.abs() >= PI),
                        u8::from(sweep > 0.0),
                        format_number(end.x),
                        format_number(end.y)
                    )
                }
                PathCommand::Close => write!(d, "Z"),
            };
        }
        d
    }

    /// Flattens the path into closed polygons, one per subpath.
    ///
    /// Arcs are split so that no chord is longer than `tolerance` units.
    pub fn to_polygons(&self, tolerance: f64) -> Vec<Vec<Point>> {
        let tolerance = if tolerance > 0.0 { tolerance } else { 1.0 };
        let mut polygons = Vec::new();
        let mut current: Vec<Point> = Vec::new();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(p);
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let sweep = end_angle - start_angle;
                    let length = sweep.abs() * radius.abs();
                    let steps = ((length / tolerance).ceil() as usize).clamp(8, 100_000);
                    for i in 1..=steps {
                        let angle = start_angle + sweep * (i as f64 / steps as f64);
                        current.push(point_on_circle(center, radius, angle));
                    }
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
        }
        if current.len() > 1 {
            polygons.push(current);
        }
        polygons
    }

    /// Area enclosed by the path.
    ///
    /// Signed subpath areas are summed, so nested subpaths traced in opposite
    /// directions subtract. This matches the even-odd region for the
    /// non-intersecting outlines the gauge builds.
    pub fn area(&self, tolerance: f64) -> f64 {
        self.to_polygons(tolerance)
            .iter()
            .map(|polygon| signed_area(polygon))
            .sum::<f64>()
            .abs()
    }

    /// Returns a copy of the path shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift = |p: Point| Point::new(p.x + dx, p.y + dy);
        let commands = self
            .commands
            .iter()
            .map(|command| match *command {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(shift(p)),
                PathCommand::LineTo(p) => PathCommand::LineTo(shift(p)),
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => PathCommand::Arc {
                    center: shift(center),
                    radius,
                    start_angle,
                    end_angle,
                },
                PathCommand::Close => PathCommand::Close,
            })
            .collect();
        Self {
            commands,
            fill_rule: self.fill_rule,
        }
    }
}

/// Shoelace area; positive for clockwise polygons in screen space.
pub fn signed_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

pub fn point_on_circle(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

// Rounds to 6 decimals and trims trailing zeros so output stays compact and stable.
pub(crate) fn format_number(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}
