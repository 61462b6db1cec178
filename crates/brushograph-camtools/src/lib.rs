//! # Brushograph CAM Tools
//!
//! Toolpath generation for a brush plotter that paints from trays.
//!
//! ## Tools Included
//!
//! - **Halftone Rasterizer**: Serpentine scan-line toolpaths per channel and threshold level
//! - **Spot Colors**: Derive extra ink channels from the CMYK separation
//! - **Scheduler**: Rasterize every (channel, level) pair on a worker pool and write the results
//! - **Tray Painter**: Rewrite sliced drawing toolpaths into programs that dip, wipe and wash the brush

pub mod error;
pub mod halftone;
pub mod scheduler;
pub mod spot_color;
pub mod tray_painter;

pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
pub use halftone::{HalftoneParameters, HalftoneRasterizer, IntensityGrid, LevelToolpath};
pub use scheduler::{ChannelGrid, HalftoneReport, HalftoneScheduler, LevelReport};
pub use spot_color::{separate_spot_colors, SpotColor};
pub use tray_painter::{
    BrushPhase, BrushProgram, ColorToolpath, MachineState, PaintStats, PaintedColor,
    PaintedProgram, SignalClassifier, ToolpathSignal, TrayPainter,
};
