//! Ink channel vocabulary
//!
//! Channels are addressed by a short label (`C`, `M`, `Y`, `K` for the
//! process inks, or a spot color's own name). Trays in the machine
//! configuration use long names, see [`tray_name_for`].

use serde::{Deserialize, Serialize};

/// Process (CMYK) channels in separation order, with their preview colors
pub const PROCESS_CHANNELS: [(&str, [u8; 3]); 4] = [
    ("C", [0, 255, 255]),
    ("M", [255, 0, 255]),
    ("Y", [255, 255, 0]),
    ("K", [0, 0, 0]),
];

/// Preview color used for every pixel in grayscale mode
pub const GRAYSCALE_PREVIEW: [u8; 3] = [128, 128, 128];

/// One ink channel: label used in file names plus preview color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkChannel {
    /// Short label (`C`, `M`, `Y`, `K` or a spot color name)
    pub label: String,
    /// RGB color painted into the preview raster
    pub preview_rgb: [u8; 3],
}

impl InkChannel {
    /// Create a channel
    pub fn new(label: impl Into<String>, preview_rgb: [u8; 3]) -> Self {
        Self {
            label: label.into(),
            preview_rgb,
        }
    }

    /// The four process channels in order
    pub fn process() -> Vec<InkChannel> {
        PROCESS_CHANNELS
            .iter()
            .map(|(label, rgb)| InkChannel::new(*label, *rgb))
            .collect()
    }

    /// The single channel used in grayscale mode
    pub fn grayscale() -> InkChannel {
        InkChannel::new("K", GRAYSCALE_PREVIEW)
    }
}

/// Map a channel label to the tray name used in configuration.
///
/// Process letters become `cyan`, `magenta`, `yellow` and `kroma`; any
/// other label is already a tray name and is returned unchanged.
pub fn tray_name_for(label: &str) -> &str {
    match label {
        "C" => "cyan",
        "M" => "magenta",
        "Y" => "yellow",
        "K" => "kroma",
        other => other,
    }
}
