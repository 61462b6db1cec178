//! # Brushograph
//!
//! Toolpath generation for a brush plotter that paints with real paint:
//! - Halftone rasterizer that turns per-channel intensity grids into
//!   serpentine scan-line toolpaths, one per threshold level
//! - Spot color separation on top of the CMYK channels
//! - Tray post-processor that rewrites sliced drawing toolpaths into
//!   programs that dip, wipe, refill and wash the brush
//!
//! ## Architecture
//!
//! 1. **brushograph-core** - Points, trays and ink channels
//! 2. **brushograph-gcode** - Command model, line parser and writer
//! 3. **brushograph-settings** - Machine, tray and speed configuration
//! 4. **brushograph-camtools** - Rasterizer, scheduler and tray painter
//! 5. **brushograph** - Logging setup and the command line front end

pub use brushograph_camtools as camtools;
pub use brushograph_core as core;
pub use brushograph_gcode as gcode;
pub use brushograph_settings as settings;

pub use brushograph_camtools::{
    BrushProgram, ColorToolpath, HalftoneParameters, HalftoneScheduler, IntensityGrid,
    SpotColor, TrayPainter,
};
pub use brushograph_settings::BrushographConfig;

/// Crate version from Cargo
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version plus the build date stamped by `build.rs`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// Initialize the tracing subscriber.
///
/// Prints INFO and above plus any `RUST_LOG` directives to stderr, keeping
/// stdout free for piped output.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(())
}
