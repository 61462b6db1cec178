//! Halftone Rasterizer
//!
//! Turns one channel's intensity grid into a serpentine brush toolpath for a
//! single threshold level. Rows are rendered from bottom to top to match the
//! machine coordinate space where Y increases upward, alternating direction
//! every row.
//!
//! Levels of the same channel are shifted vertically by a small dither
//! offset so their scan lines interleave instead of stacking.

use brushograph_core::InkChannel;
use brushograph_gcode::{Command, Motion, Toolpath};
use brushograph_settings::HalftoneSettings;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

use crate::error::{CamToolResult, ParameterError, ParameterResult};

type ColumnIter = Box<dyn Iterator<Item = u32>>;

/// Feed rate directive that opens every level toolpath
const PREAMBLE_FEED: &str = "F2000";

/// Per-pixel ink intensity (0-255) of one channel
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    image: GrayImage,
}

impl IntensityGrid {
    /// Create an all-zero grid
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Create a grid with every pixel set to `value`
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([value])),
        }
    }

    /// Create a grid from a function of the pixel position
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> u8,
    {
        Self {
            image: GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)])),
        }
    }

    /// Wrap an 8-bit luma image
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    /// Load a grid from an image file, resizing it to `columns` x `rows`.
    ///
    /// A missing dimension is derived from the aspect ratio; when both are
    /// absent the image keeps its size.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        columns: Option<u32>,
        rows: Option<u32>,
    ) -> CamToolResult<Self> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_image(img, columns, rows)?)
    }

    /// Convert a decoded image to a grid, resizing as in [`IntensityGrid::from_file`]
    pub fn from_image(
        img: DynamicImage,
        columns: Option<u32>,
        rows: Option<u32>,
    ) -> ParameterResult<Self> {
        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "image is {}x{}",
                width, height
            )));
        }

        let (columns, rows) = match (columns, rows) {
            (None, None) => return Ok(Self::from_gray(gray)),
            (Some(c), Some(r)) => (c, r),
            (Some(c), None) => (c, ((height as f64 * c as f64 / width as f64) as u32).max(1)),
            (None, Some(r)) => (((width as f64 * r as f64 / height as f64) as u32).max(1), r),
        };

        if columns == 0 || rows == 0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "grid must be at least 1x1, got {}x{}",
                columns, rows
            )));
        }

        // Box-style averaging when shrinking, Lanczos3 when any axis grows
        let filter = if columns > width || rows > height {
            FilterType::Lanczos3
        } else {
            FilterType::Triangle
        };

        Ok(Self::from_gray(image::imageops::resize(
            &gray, columns, rows, filter,
        )))
    }

    /// Number of columns
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Number of rows
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(columns, rows)`
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Intensity at a pixel
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Overwrite the intensity at a pixel
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.image.put_pixel(x, y, Luma([value]));
    }
}

/// Halftone rasterizer parameters
#[derive(Debug, Clone, PartialEq)]
pub struct HalftoneParameters {
    /// Physical output width in millimeters
    pub width_mm: f64,
    /// Physical output height in millimeters
    pub height_mm: f64,
    /// Threshold levels per channel
    pub levels: u32,
    /// Pen-down Z when negative, pen-up Z when positive
    pub z_step: f64,
    /// Use rapid moves for positioning and drawing
    pub fast: bool,
    /// Extrusion per drawn mm (annotates pen-up moves)
    pub extruder_speed: Option<f64>,
    /// Retraction on pen up, primed again on the next pen down
    pub retract: Option<f64>,
    /// Extruder temperature
    pub temperature: Option<u32>,
}

impl Default for HalftoneParameters {
    fn default() -> Self {
        Self {
            width_mm: 300.0,
            height_mm: 300.0,
            levels: 1,
            z_step: -7.0,
            fast: false,
            extruder_speed: None,
            retract: None,
            temperature: None,
        }
    }
}

impl From<&HalftoneSettings> for HalftoneParameters {
    fn from(settings: &HalftoneSettings) -> Self {
        Self {
            width_mm: settings.width_mm,
            height_mm: settings.height_mm,
            levels: settings.levels,
            z_step: settings.z_step,
            fast: settings.fast,
            extruder_speed: settings.extruder_speed,
            retract: settings.retract,
            temperature: settings.temperature,
        }
    }
}

impl HalftoneParameters {
    /// Validate parameters
    pub fn validate(&self) -> ParameterResult<()> {
        if self.levels == 0 || self.levels > 255 {
            return Err(ParameterError::OutOfRange {
                name: "levels".to_string(),
                value: self.levels as f64,
                min: 1.0,
                max: 255.0,
            });
        }

        if self.width_mm <= 0.0 || self.height_mm <= 0.0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "output must be larger than 0x0 mm, got {}x{}",
                self.width_mm, self.height_mm
            )));
        }

        if !self.z_step.is_finite() {
            return Err(ParameterError::InvalidValue {
                name: "z_step".to_string(),
                reason: "must be finite".to_string(),
            });
        }

        Ok(())
    }

    /// Threshold a pixel must exceed to be drawn at `level`
    pub fn threshold(&self, level: u32) -> f64 {
        level as f64 * 255.0 / self.levels as f64
    }

    /// Vertical offset applied to a level's scan lines.
    ///
    /// Level 0 is never shifted. The remaining levels are spread over one row
    /// pitch, alternating up and down with the parity of
    /// `levels - level + channel_index`.
    pub fn dither_offset(&self, channel_index: usize, level: u32, y_step: f64) -> f64 {
        if level == 0 {
            return 0.0;
        }
        let l = (self.levels - level) as usize;
        let k = l / 2 + l % 2;
        let sign = if (l + channel_index) % 2 == 0 { 1.0 } else { -1.0 };
        y_step / self.levels as f64 * sign * k as f64
    }

    fn pen_up_z(&self) -> f64 {
        self.z_step.max(0.0)
    }

    fn pen_down_z(&self) -> f64 {
        self.z_step.min(0.0)
    }
}

/// Output of one (channel, level) pass
#[derive(Debug, Clone)]
pub struct LevelToolpath {
    /// Channel label
    pub channel: String,
    /// Threshold level
    pub level: u32,
    /// Generated commands
    pub toolpath: Toolpath,
    /// Drawn pixels painted in the channel's preview color on white
    pub preview: RgbImage,
    /// Number of pixels above the threshold
    pub on_pixels: u64,
    /// Total drawn length in millimeters
    pub drawn_length_mm: f64,
}

impl LevelToolpath {
    /// Number of pen-down transitions
    pub fn pen_down_count(&self, params: &HalftoneParameters) -> usize {
        let z = params.pen_down_z();
        self.toolpath
            .iter()
            .filter(|cmd| matches!(cmd, Command::RapidMove(m) if m.z == Some(z) && m.x.is_none()))
            .count()
    }
}

/// Serpentine halftone rasterizer
#[derive(Debug, Clone)]
pub struct HalftoneRasterizer {
    params: HalftoneParameters,
}

impl HalftoneRasterizer {
    /// Create a new rasterizer
    pub fn new(params: HalftoneParameters) -> ParameterResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Rasterizer parameters
    pub fn params(&self) -> &HalftoneParameters {
        &self.params
    }

    /// Rasterize one level of one channel.
    ///
    /// `channel_index` is the channel's position among all channels (process
    /// channels first, then spot colors) and only selects the dither parity.
    pub fn rasterize(
        &self,
        grid: &IntensityGrid,
        channel_index: usize,
        channel: &InkChannel,
        level: u32,
    ) -> ParameterResult<LevelToolpath> {
        let p = &self.params;
        if level >= p.levels {
            return Err(ParameterError::OutOfRange {
                name: "level".to_string(),
                value: level as f64,
                min: 0.0,
                max: (p.levels - 1) as f64,
            });
        }

        let (columns, rows) = grid.dimensions();
        if columns == 0 || rows == 0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "channel '{}' grid is {}x{}",
                channel.label, columns, rows
            )));
        }

        let x_step = p.width_mm / columns as f64;
        let y_step = p.height_mm / rows as f64;
        let threshold = p.threshold(level);
        let dy = p.dither_offset(channel_index, level, y_step);

        tracing::debug!(
            "Rasterizing channel {} level {} ({}x{}, threshold {:.1})",
            channel.label,
            level,
            columns,
            rows,
            threshold
        );

        let mut toolpath = Toolpath::new();
        self.push_preamble(&mut toolpath);
        if level > 0 {
            toolpath.push(self.travel(Motion::y(dy)));
        }

        let mut preview = RgbImage::from_pixel(columns, rows, Rgb([255, 255, 255]));
        let mut scan = ScanState {
            pen_down: false,
            last_row: rows - 1,
            run: 0,
            on_pixels: 0,
            retracted: false,
        };

        for (row, y) in (0..rows).rev().enumerate() {
            let left_to_right = row % 2 == 0;
            let xs: ColumnIter = if left_to_right {
                Box::new(0..columns)
            } else {
                Box::new((0..columns).rev())
            };
            let last_x = if left_to_right { columns - 1 } else { 0 };

            for x in xs {
                if f64::from(grid.get(x, y)) > threshold {
                    scan.run += 1;
                    preview.put_pixel(x, y, Rgb(channel.preview_rgb));

                    if !scan.pen_down {
                        let edge = (x + u32::from(!left_to_right)) as f64 * x_step;
                        let motion = if y != scan.last_row {
                            Motion::xy(edge, (rows - 1 - y) as f64 * y_step + dy)
                        } else {
                            Motion::x(edge)
                        };
                        toolpath.push(self.travel(motion));

                        let mut plunge = Motion::z(p.pen_down_z());
                        if let Some(retract) = p.retract {
                            if scan.retracted {
                                plunge = plunge.with_extrusion(retract);
                                scan.retracted = false;
                            }
                        }
                        toolpath.push(Command::rapid(plunge));

                        scan.pen_down = true;
                        scan.last_row = y;
                    }
                } else if scan.pen_down {
                    let edge = (x + u32::from(left_to_right)) as f64 * x_step;
                    self.pen_up(&mut toolpath, &mut scan, edge, x_step, y);
                }

                if x == last_x && scan.pen_down {
                    let edge = (x + u32::from(left_to_right)) as f64 * x_step;
                    self.pen_up(&mut toolpath, &mut scan, edge, x_step, y);
                }
            }
        }

        toolpath.push(Command::rapid(Motion::xy(0.0, 0.0)));

        Ok(LevelToolpath {
            channel: channel.label.clone(),
            level,
            toolpath,
            preview,
            on_pixels: scan.on_pixels,
            drawn_length_mm: scan.on_pixels as f64 * x_step,
        })
    }

    fn push_preamble(&self, toolpath: &mut Toolpath) {
        toolpath.push(Command::raw(PREAMBLE_FEED));
        toolpath.push(Command::rapid(Motion::z(self.params.pen_up_z())));
        if let Some(temperature) = self.params.temperature {
            toolpath.push(Command::raw(format!("M109 S{}", temperature)));
        }
        if self.params.extruder_speed.is_some() {
            toolpath.push(Command::raw("M83"));
        }
    }

    fn travel(&self, motion: Motion) -> Command {
        if self.params.fast {
            Command::rapid(motion)
        } else {
            Command::linear(motion)
        }
    }

    fn pen_up(&self, toolpath: &mut Toolpath, scan: &mut ScanState, edge: f64, x_step: f64, y: u32) {
        let mut stop = Motion::x(edge);
        if let Some(speed) = self.params.extruder_speed {
            stop = stop.with_extrusion(scan.run as f64 * x_step * speed);
        }
        toolpath.push(self.travel(stop));

        let mut lift = Motion::z(self.params.pen_up_z());
        if let Some(retract) = self.params.retract {
            lift = lift.with_extrusion(-retract);
            scan.retracted = true;
        }
        toolpath.push(Command::rapid(lift));

        scan.pen_down = false;
        scan.last_row = y;
        scan.on_pixels += scan.run;
        scan.run = 0;
    }
}

struct ScanState {
    pen_down: bool,
    last_row: u32,
    run: u64,
    on_pixels: u64,
    retracted: bool,
}
