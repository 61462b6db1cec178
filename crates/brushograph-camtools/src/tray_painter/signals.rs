//! Classification of sliced toolpath lines
//!
//! The slicer lifts and lowers its tool with Z-only linear moves at a
//! calibrated height and feed rate. Those moves, the extrusion reset and
//! planar coordinates are the only things the post-processor reacts to.

use brushograph_core::Point2;
use brushograph_gcode::{MotionKind, ParsedLine};
use brushograph_settings::SignalSettings;

/// What a toolpath line means to the post-processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolpathSignal {
    /// Tool lifted: the brush leaves the canvas
    PenUp,
    /// Tool lowered: the next coordinate starts a stroke
    PenDown,
    /// `G92 E0`
    ExtrusionReset,
    /// Rapid or linear move with both X and Y
    Coordinate(Point2),
    /// Anything else
    Ignored,
}

/// Maps parsed lines to [`ToolpathSignal`]s using calibrated heights
#[derive(Debug, Clone, PartialEq)]
pub struct SignalClassifier {
    lift_z: f64,
    draw_z: f64,
    feedrate: f64,
    tolerance: f64,
}

impl SignalClassifier {
    /// Create a classifier from signal calibration
    pub fn new(settings: &SignalSettings) -> Self {
        Self {
            lift_z: settings.lift_z,
            draw_z: settings.draw_z,
            feedrate: settings.feedrate,
            tolerance: settings.tolerance,
        }
    }

    /// Classify one parsed line
    pub fn classify(&self, line: &ParsedLine) -> ToolpathSignal {
        if line.is_extrusion_reset() {
            return ToolpathSignal::ExtrusionReset;
        }

        if line.motion() == Some(MotionKind::Linear) && line.is_z_only_move() {
            let feed_matches = line
                .feed()
                .is_some_and(|f| (f - self.feedrate).abs() <= self.tolerance);
            if feed_matches {
                match line.z() {
                    Some(z) if (z - self.lift_z).abs() <= self.tolerance => {
                        return ToolpathSignal::PenUp
                    }
                    Some(z) if (z - self.draw_z).abs() <= self.tolerance => {
                        return ToolpathSignal::PenDown
                    }
                    _ => {}
                }
            }
        }

        match line.planar_target() {
            Some(point) => ToolpathSignal::Coordinate(point),
            None => ToolpathSignal::Ignored,
        }
    }
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(&SignalSettings::default())
    }
}
