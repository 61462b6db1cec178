//! Paint and water trays
//!
//! A tray is a reservoir the brush dips into. Entries are diagonal chords
//! through the tray center: the brush goes down at one end and comes up at
//! the diametrically opposite end.

use crate::geometry::Point2;
use serde::{Deserialize, Serialize};

/// A paint or water reservoir on the machine bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tray {
    /// Tray identity (color name or "water")
    pub name: String,
    /// Tray center in machine coordinates
    pub center: Point2,
    /// Radius of the circle entry/exit points are sampled on
    pub enter_radius: f64,
    /// Inner radius of the drop-removal stroke (color trays only)
    pub remove_drops_radius: Option<f64>,
}

impl Tray {
    /// Create a water tray (no drop removal)
    pub fn water(center: Point2, enter_radius: f64) -> Self {
        Self {
            name: "water".to_string(),
            center,
            enter_radius,
            remove_drops_radius: None,
        }
    }

    /// Create a color tray
    pub fn color(
        name: impl Into<String>,
        center: Point2,
        enter_radius: f64,
        remove_drops_radius: f64,
    ) -> Self {
        Self {
            name: name.into(),
            center,
            enter_radius,
            remove_drops_radius: Some(remove_drops_radius),
        }
    }

    /// Entry and exit points of one dip.
    ///
    /// `angle` picks the per-axis magnitudes `|r cos a|, |r sin a|`; `quadrant`
    /// (0..4, taken modulo 4) picks which quadrant the entry lies in. The exit
    /// is the mirror of the entry through the center.
    pub fn entry_chord(&self, angle: f64, quadrant: u8) -> (Point2, Point2) {
        let dx = (self.enter_radius * angle.cos()).abs();
        let dy = (self.enter_radius * angle.sin()).abs();
        let (sx, sy) = match quadrant % 4 {
            0 => (1.0, 1.0),
            1 => (-1.0, 1.0),
            2 => (-1.0, -1.0),
            _ => (1.0, -1.0),
        };
        let offset = Point2::new(sx * dx, sy * dy);
        (self.center + offset, self.center - offset)
    }
}
