//! Configuration for the brushograph machine
//!
//! Supports JSON and TOML files, chosen by file extension.
//!
//! Configuration is organized into logical sections:
//! - Tray positions (water, process colors, additional spot colors)
//! - Machine calibration (heights, radii, canvas placement, paint budget)
//! - Speed profiles (normal, fast, drop removal)
//! - Slicer signal calibration (pen up / pen down Z moves)
//! - Halftone defaults (levels, physical size, pen heights)

use brushograph_core::{tray_name_for, Point2, Tray};
use brushograph_gcode::SpeedProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult, SettingsResult};

/// Tray center on the machine bed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrayPosition {
    /// X coordinate (mm)
    pub x: f64,
    /// Y coordinate (mm)
    pub y: f64,
}

impl TrayPosition {
    /// Tray center as a point
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Tray positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraySettings {
    /// Water tray used for washing and parking
    pub water: TrayPosition,
    /// Process color trays by name (cyan, magenta, yellow, kroma)
    #[serde(default)]
    pub colors: BTreeMap<String, TrayPosition>,
    /// Trays of additional spot colors by name
    #[serde(default)]
    pub additionals: BTreeMap<String, TrayPosition>,
}

impl Default for TraySettings {
    fn default() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert("cyan".to_string(), TrayPosition { x: -60.0, y: 40.0 });
        colors.insert("magenta".to_string(), TrayPosition { x: -60.0, y: 100.0 });
        colors.insert("yellow".to_string(), TrayPosition { x: -60.0, y: 160.0 });
        colors.insert("kroma".to_string(), TrayPosition { x: -60.0, y: 220.0 });

        Self {
            water: TrayPosition { x: -60.0, y: -20.0 },
            colors,
            additionals: BTreeMap::new(),
        }
    }
}

/// Machine calibration used by the tray post-processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Z height at which the brush touches the canvas
    pub canvas_height: f64,
    /// Z height for travelling between trays
    pub go_in_tray_lift: f64,
    /// Z height of the drop-removal stroke
    pub remove_drops_lift: f64,
    /// Lift above the canvas when moving to another shape
    pub move_to_other_shape_lift: f64,
    /// Radius of the circle tray entries are sampled on
    pub tray_enter_radius: f64,
    /// Inner end of the drop-removal stroke
    pub remove_drops_radius: f64,
    /// Canvas placement on the bed, X
    pub offset_x: f64,
    /// Canvas placement on the bed, Y
    pub offset_y: f64,
    /// Lower bound (inclusive) of the paint budget per dip, in drawn mm
    pub paint_per_run_min: u32,
    /// Upper bound (exclusive) of the paint budget per dip, in drawn mm
    pub paint_per_run_max: u32,
    /// Tray entries used to mix paint before the first stroke of a color
    pub prepare_paint_count: u32,
    /// Z depth of a tray dip
    #[serde(default = "default_tray_dip_depth")]
    pub tray_dip_depth: f64,
    /// Z height the brush is parked at in the water tray
    #[serde(default)]
    pub park_depth: f64,
    /// Tray entries per wash
    #[serde(default = "default_wash_count")]
    pub wash_count: u32,
    /// Coordinates beyond this magnitude are reported as suspicious
    #[serde(default = "default_coordinate_limit")]
    pub coordinate_limit: f64,
}

fn default_tray_dip_depth() -> f64 {
    -4.0
}

fn default_wash_count() -> u32 {
    3
}

fn default_coordinate_limit() -> f64 {
    1000.0
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            canvas_height: 10.0,
            go_in_tray_lift: 30.0,
            remove_drops_lift: 12.0,
            move_to_other_shape_lift: 5.0,
            tray_enter_radius: 20.0,
            remove_drops_radius: 10.0,
            offset_x: 0.0,
            offset_y: 0.0,
            paint_per_run_min: 200,
            paint_per_run_max: 400,
            prepare_paint_count: 4,
            tray_dip_depth: default_tray_dip_depth(),
            park_depth: 0.0,
            wash_count: default_wash_count(),
            coordinate_limit: default_coordinate_limit(),
        }
    }
}

impl MachineSettings {
    /// Height that clears both the canvas and the tray rims
    pub fn safe_travel_height(&self) -> f64 {
        (self.move_to_other_shape_lift + self.canvas_height).max(self.go_in_tray_lift)
    }

    /// Height of the brush while hopping between shapes on the canvas
    pub fn above_canvas_height(&self) -> f64 {
        self.move_to_other_shape_lift + self.canvas_height
    }

    /// Canvas placement offset
    pub fn canvas_offset(&self) -> Point2 {
        Point2::new(self.offset_x, self.offset_y)
    }
}

/// Named speed profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSettings {
    /// Drawing on the canvas
    pub normal: SpeedProfile,
    /// Travelling and dipping
    pub fast: SpeedProfile,
    /// Wiping excess paint on the tray rim
    pub remove_drops: SpeedProfile,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            normal: SpeedProfile::new(500.0, 3000.0, 1500.0),
            fast: SpeedProfile::new(1000.0, 6000.0, 6000.0),
            remove_drops: SpeedProfile::new(200.0, 1000.0, 600.0),
        }
    }
}

/// Calibration of the Z moves a slicer uses to lift and lower the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSettings {
    /// Z of the "pen up" move
    pub lift_z: f64,
    /// Z of the "pen down" move
    pub draw_z: f64,
    /// Feed rate carried by both signal moves
    pub feedrate: f64,
    /// Comparison tolerance for the values above
    #[serde(default = "default_signal_tolerance")]
    pub tolerance: f64,
}

fn default_signal_tolerance() -> f64 {
    1e-6
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            lift_z: 6.0,
            draw_z: 1.0,
            feedrate: 600.0,
            tolerance: default_signal_tolerance(),
        }
    }
}

/// Halftone rasterizer defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalftoneSettings {
    /// Threshold levels per channel
    pub levels: u32,
    /// Grid columns (resize target); derived from rows when absent
    pub columns: Option<u32>,
    /// Grid rows (resize target); derived from columns when absent
    pub rows: Option<u32>,
    /// Physical output width (mm)
    pub width_mm: f64,
    /// Physical output height (mm)
    pub height_mm: f64,
    /// Pen-down Z (negative) or pen-up Z (positive)
    pub z_step: f64,
    /// Emit rapid moves instead of linear moves
    pub fast: bool,
    /// Also write one combined file per channel
    pub join: bool,
    /// Extrusion per drawn mm
    pub extruder_speed: Option<f64>,
    /// Retraction amount on pen up
    pub retract: Option<f64>,
    /// Extruder temperature (`M109`)
    pub temperature: Option<u32>,
    /// Single gray channel instead of CMYK
    pub grayscale: bool,
}

impl Default for HalftoneSettings {
    fn default() -> Self {
        Self {
            levels: 1,
            columns: None,
            rows: None,
            width_mm: 300.0,
            height_mm: 300.0,
            z_step: -7.0,
            fast: false,
            join: false,
            extruder_speed: None,
            retract: None,
            temperature: None,
            grayscale: false,
        }
    }
}

/// Complete brushograph configuration
///
/// Aggregates all sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrushographConfig {
    /// Order in which colors are painted
    #[serde(default)]
    pub color_order: Vec<String>,
    /// Tray positions
    pub trays: TraySettings,
    /// Machine calibration
    pub machine: MachineSettings,
    /// Speed profiles
    pub speeds: SpeedSettings,
    /// Slicer signal calibration
    #[serde(default)]
    pub signals: SignalSettings,
    /// Halftone defaults
    #[serde(default)]
    pub halftone: HalftoneSettings,
}

impl BrushographConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension_of(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(
                    ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into(),
                )
            }
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension_of(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(
                    ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into(),
                )
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let m = &self.machine;

        if m.paint_per_run_min == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "machine.paint_per_run_min".to_string(),
                value: m.paint_per_run_min.to_string(),
            });
        }

        if m.paint_per_run_min >= m.paint_per_run_max {
            return Err(ConfigError::InvalidSetting {
                key: "machine.paint_per_run_max".to_string(),
                reason: format!(
                    "must be greater than paint_per_run_min ({})",
                    m.paint_per_run_min
                ),
            });
        }

        if m.tray_enter_radius <= 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "machine.tray_enter_radius".to_string(),
                value: m.tray_enter_radius.to_string(),
            });
        }

        if m.remove_drops_radius <= 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "machine.remove_drops_radius".to_string(),
                value: m.remove_drops_radius.to_string(),
            });
        }

        if m.remove_drops_radius >= m.tray_enter_radius {
            return Err(ConfigError::InvalidSetting {
                key: "machine.remove_drops_radius".to_string(),
                reason: "must be smaller than tray_enter_radius".to_string(),
            });
        }

        if m.coordinate_limit <= 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "machine.coordinate_limit".to_string(),
                value: m.coordinate_limit.to_string(),
            });
        }

        let h = &self.halftone;
        if h.levels == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "halftone.levels".to_string(),
                value: h.levels.to_string(),
            });
        }

        if h.width_mm <= 0.0 || h.height_mm <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                key: "halftone".to_string(),
                reason: "physical width and height must be > 0".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the tray of a color by channel label or tray name.
    ///
    /// Process trays are searched first, then additional spot-color trays.
    pub fn color_tray(&self, color: &str) -> ConfigResult<Tray> {
        let name = tray_name_for(color);
        let position = self
            .trays
            .colors
            .get(name)
            .or_else(|| self.trays.additionals.get(name))
            .ok_or_else(|| ConfigError::MissingKey(format!("trays.{}", name)))?;

        Ok(Tray::color(
            name,
            position.point(),
            self.machine.tray_enter_radius,
            self.machine.remove_drops_radius,
        ))
    }

    /// The water tray
    pub fn water_tray(&self) -> Tray {
        Tray::water(self.trays.water.point(), self.machine.tray_enter_radius)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
