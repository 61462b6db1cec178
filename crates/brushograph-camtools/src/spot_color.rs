//! Spot color separation
//!
//! Derives extra ink channels from the four process channels. Each spot
//! color takes as much of its CMYK recipe out of the process grids as every
//! pixel allows; what it took becomes the spot channel's own intensity.

use brushograph_core::InkChannel;

use crate::error::{ParameterError, ParameterResult};
use crate::halftone::IntensityGrid;

/// An additional ink defined by its CMYK recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotColor {
    /// Channel label, also the tray name (e.g. `#DFC7A3`)
    pub name: String,
    /// Ink amounts of C, M, Y and K (0-255)
    pub cmyk: [u8; 4],
    /// Color painted into the preview raster
    pub preview_rgb: [u8; 3],
}

impl SpotColor {
    /// Create a spot color whose preview is derived from its recipe
    pub fn new(name: impl Into<String>, cmyk: [u8; 4]) -> Self {
        let name = name.into();
        let preview_rgb = parse_hex_rgb(&name).unwrap_or_else(|| cmyk_to_rgb(cmyk));
        Self {
            name,
            cmyk,
            preview_rgb,
        }
    }

    /// Override the preview color
    pub fn with_preview(mut self, rgb: [u8; 3]) -> Self {
        self.preview_rgb = rgb;
        self
    }

    /// Parse `name=c,m,y,k` with an optional `:#rrggbb` preview color
    pub fn parse(spec: &str) -> ParameterResult<Self> {
        let invalid = |reason: &str| ParameterError::InvalidValue {
            name: "spot".to_string(),
            reason: format!("'{}': {}", spec, reason),
        };

        let (name, rest) = spec
            .split_once('=')
            .ok_or_else(|| invalid("expected name=c,m,y,k"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("empty name"));
        }

        let (recipe, preview) = match rest.split_once(':') {
            Some((recipe, preview)) => (recipe, Some(preview)),
            None => (rest, None),
        };

        let values = recipe
            .split(',')
            .map(|v| v.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| invalid(&e.to_string()))?;
        let cmyk: [u8; 4] = values
            .try_into()
            .map_err(|_| invalid("expected four components"))?;

        let spot = Self::new(name, cmyk);
        match preview {
            Some(hex) => {
                let rgb = parse_hex_rgb(hex.trim()).ok_or_else(|| invalid("bad preview color"))?;
                Ok(spot.with_preview(rgb))
            }
            None => Ok(spot),
        }
    }

    /// Total ink usage of the recipe
    pub fn coverage(&self) -> u32 {
        self.cmyk.iter().map(|&c| u32::from(c)).sum()
    }

    /// Ink channel used for rasterizing this color
    pub fn channel(&self) -> InkChannel {
        InkChannel::new(self.name.clone(), self.preview_rgb)
    }
}

fn parse_hex_rgb(text: &str) -> Option<[u8; 3]> {
    let hex = text.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let component = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([component(0)?, component(2)?, component(4)?])
}

fn cmyk_to_rgb(cmyk: [u8; 4]) -> [u8; 3] {
    let k = 1.0 - f64::from(cmyk[3]) / 255.0;
    let channel = |c: u8| (255.0 * (1.0 - f64::from(c) / 255.0) * k).round() as u8;
    [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
}

/// Separate spot colors out of the process grids.
///
/// `process` must hold the C, M, Y and K grids, all of one size; they are
/// reduced in place. Spot colors are handled lightest recipe first. A recipe
/// without any ink is skipped. Returns the derived channels in processing
/// order.
pub fn separate_spot_colors(
    process: &mut [IntensityGrid],
    spots: &[SpotColor],
) -> ParameterResult<Vec<(InkChannel, IntensityGrid)>> {
    if process.len() != 4 {
        return Err(ParameterError::InvalidValue {
            name: "process".to_string(),
            reason: format!("expected 4 process channels, got {}", process.len()),
        });
    }

    let (width, height) = process[0].dimensions();
    for (grid, label) in process.iter().zip(["C", "M", "Y", "K"]) {
        let (found_width, found_height) = grid.dimensions();
        if (found_width, found_height) != (width, height) {
            return Err(ParameterError::DimensionMismatch {
                channel: label.to_string(),
                width,
                height,
                found_width,
                found_height,
            });
        }
    }

    let mut ordered: Vec<&SpotColor> = spots.iter().collect();
    ordered.sort_by_key(|spot| spot.coverage());

    let mut derived = Vec::with_capacity(ordered.len());
    for spot in ordered {
        if spot.coverage() == 0 {
            tracing::warn!("Spot color {} has no ink in its recipe, skipping", spot.name);
            continue;
        }

        tracing::info!(
            "Processing spot color {} (CMYK {:?})",
            spot.name,
            spot.cmyk
        );

        let mut grid = IntensityGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let alpha = (0..4)
                    .map(|n| {
                        let component = spot.cmyk[n];
                        if component > 0 {
                            f64::from(process[n].get(x, y)) / f64::from(component)
                        } else {
                            1.0
                        }
                    })
                    .fold(f64::INFINITY, f64::min);

                for (n, channel) in process.iter_mut().enumerate() {
                    let taken = (f64::from(spot.cmyk[n]) * alpha).floor() as u8;
                    channel.set(x, y, channel.get(x, y).saturating_sub(taken));
                }
                grid.set(x, y, (256.0 * alpha).floor().min(255.0) as u8);
            }
        }

        derived.push((spot.channel(), grid));
    }

    Ok(derived)
}
