//! Brushograph Settings Crate
//!
//! Loads, validates and saves the machine configuration: tray positions,
//! lift heights, paint budget, speed profiles, slicer signal calibration
//! and halftone defaults.

pub mod config;
pub mod error;

pub use config::{
    BrushographConfig, HalftoneSettings, MachineSettings, SignalSettings, SpeedSettings,
    TrayPosition, TraySettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
