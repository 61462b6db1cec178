//! Toolpath command types
//!
//! A [`Toolpath`] is an ordered, append-only list of [`Command`]s. Order is
//! execution order. Commands render to G-code text through `Display`.

use brushograph_core::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis words of a move. Absent axes are left unchanged by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Motion {
    /// X target
    pub x: Option<f64>,
    /// Y target
    pub y: Option<f64>,
    /// Z target
    pub z: Option<f64>,
    /// Extruder amount (relative extrusion, `M83`)
    pub e: Option<f64>,
}

impl Motion {
    /// Move in X only
    pub fn x(x: f64) -> Self {
        Self {
            x: Some(x),
            ..Self::default()
        }
    }

    /// Move in Y only
    pub fn y(y: f64) -> Self {
        Self {
            y: Some(y),
            ..Self::default()
        }
    }

    /// Move in Z only
    pub fn z(z: f64) -> Self {
        Self {
            z: Some(z),
            ..Self::default()
        }
    }

    /// Move in X and Y
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Move to a planar point
    pub fn to(point: Point2) -> Self {
        Self::xy(point.x, point.y)
    }

    /// Attach an extruder amount
    pub fn with_extrusion(mut self, e: f64) -> Self {
        self.e = Some(e);
        self
    }

    /// Planar target when both X and Y are present
    pub fn point(&self) -> Option<Point2> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point2::new(x, y)),
            _ => None,
        }
    }

    fn write_words(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(x) = self.x {
            write!(f, " X{}", Coord(x))?;
        }
        if let Some(y) = self.y {
            write!(f, " Y{}", Coord(y))?;
        }
        if let Some(z) = self.z {
            write!(f, " Z{}", Coord(z))?;
        }
        if let Some(e) = self.e {
            write!(f, " E{:.5}", if e == 0.0 { 0.0 } else { e })?;
        }
        Ok(())
    }
}

/// Acceleration plus the two feed rates of a named motion profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Acceleration (mm/s^2), emitted as `M204 S`
    pub acceleration: f64,
    /// Rapid feed rate (mm/min), emitted as `G0 F`
    pub feedrate_1: f64,
    /// Linear feed rate (mm/min), emitted as `G1 F`
    pub feedrate_2: f64,
}

impl SpeedProfile {
    /// Create a profile
    pub const fn new(acceleration: f64, feedrate_1: f64, feedrate_2: f64) -> Self {
        Self {
            acceleration,
            feedrate_1,
            feedrate_2,
        }
    }
}

/// One toolpath directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// `G0` rapid positioning
    RapidMove(Motion),
    /// `G1` linear move
    LinearMove(Motion),
    /// Acceleration + feed rate triple
    SpeedProfile(SpeedProfile),
    /// Verbatim directive (homing, units, comments)
    Raw(String),
}

impl Command {
    /// Rapid move
    pub fn rapid(motion: Motion) -> Self {
        Self::RapidMove(motion)
    }

    /// Linear move
    pub fn linear(motion: Motion) -> Self {
        Self::LinearMove(motion)
    }

    /// Verbatim directive
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Motion words when this is a move
    pub fn motion(&self) -> Option<&Motion> {
        match self {
            Self::RapidMove(m) | Self::LinearMove(m) => Some(m),
            _ => None,
        }
    }

    /// Whether this is a rapid or linear move
    pub fn is_move(&self) -> bool {
        self.motion().is_some()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RapidMove(m) => {
                write!(f, "G0")?;
                m.write_words(f)
            }
            Self::LinearMove(m) => {
                write!(f, "G1")?;
                m.write_words(f)
            }
            Self::SpeedProfile(p) => write!(
                f,
                "M204 S{:.0}\nG0 F{:.0}\nG1 F{:.0}",
                p.acceleration, p.feedrate_1, p.feedrate_2
            ),
            Self::Raw(text) => write!(f, "{}", text),
        }
    }
}

struct Coord(f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", normalize_zero(self.0))
    }
}

// Avoids "-0.000" in the output.
fn normalize_zero(value: f64) -> f64 {
    if value.abs() < 5e-4 {
        0.0
    } else {
        value
    }
}

/// Ordered command sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Toolpath {
    commands: Vec<Command>,
}

impl Toolpath {
    /// Create an empty toolpath
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Append every command of another toolpath
    pub fn append(&mut self, other: Toolpath) {
        self.commands.extend(other.commands);
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the toolpath has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate commands in execution order
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Borrow the command list
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Render as G-code text, one directive per line, newline terminated
    pub fn to_gcode(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            out.push_str(&command.to_string());
            out.push('\n');
        }
        out
    }
}

impl Extend<Command> for Toolpath {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl FromIterator<Command> for Toolpath {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Toolpath {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a Toolpath {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
