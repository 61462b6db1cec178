//! # Brushograph G-code
//!
//! The command vocabulary shared by the halftone rasterizer and the tray
//! post-processor, and the line parser used to read externally sliced
//! toolpaths back in.
//!
//! This module provides:
//! - [`Command`] and [`Toolpath`]: typed motion/speed directives and their G-code text
//! - [`GcodeParser`]: comment stripping and word tokenizing with line tracking

pub mod command;
pub mod error;
pub mod parser;

pub use command::{Command, Motion, SpeedProfile, Toolpath};
pub use error::{GcodeError, GcodeResult};
pub use parser::{GcodeParser, MotionKind, ParsedLine, Word};
