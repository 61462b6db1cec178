//! # Brushograph Core
//!
//! Shared primitives for the brushograph toolpath engines:
//! points and segment interpolation, paint/water trays, and the ink
//! channel vocabulary used to name per-channel outputs.

pub mod geometry;
pub mod ink;
pub mod tray;

pub use geometry::{distance, Point2};
pub use ink::{tray_name_for, InkChannel, PROCESS_CHANNELS};
pub use tray::Tray;
