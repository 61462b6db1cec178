//! Multi-color program assembly
//!
//! Every color is post-processed into its own buffer with its own seeded
//! RNG; buffers are concatenated in the configured color order. Running the
//! colors on a rayon pool therefore yields the same bytes as running them
//! one after another.

use brushograph_core::tray_name_for;
use brushograph_gcode::Toolpath;
use brushograph_settings::BrushographConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::Path;

use super::{PaintStats, PaintedColor, TrayPainter};
use crate::error::{CamToolError, CamToolResult};

/// Sliced toolpath of one color
#[derive(Debug, Clone, PartialEq)]
pub struct ColorToolpath {
    /// Channel letter or tray name
    pub color: String,
    /// Toolpath text
    pub source: String,
}

impl ColorToolpath {
    /// Pair a color with toolpath text
    pub fn new(color: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            source: source.into(),
        }
    }

    /// Read a color's toolpath from a file
    pub fn from_file(color: impl Into<String>, path: &Path) -> CamToolResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            CamToolError::LoadError(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::new(color, source))
    }
}

/// The final machine program
#[derive(Debug, Clone, Default)]
pub struct PaintedProgram {
    /// All colors' commands in painting order
    pub toolpath: Toolpath,
    /// Per-color counters in painting order
    pub stats: Vec<PaintStats>,
}

impl PaintedProgram {
    /// Render the program
    pub fn to_gcode(&self) -> String {
        self.toolpath.to_gcode()
    }

    /// Write the program to `path`
    pub fn save(&self, path: &Path) -> CamToolResult<()> {
        std::fs::write(path, self.to_gcode())?;
        tracing::info!(
            "Wrote {} commands for {} colors to {}",
            self.toolpath.len(),
            self.stats.len(),
            path.display()
        );
        Ok(())
    }
}

/// Builds the program for all colors
#[derive(Debug, Clone)]
pub struct BrushProgram<'a> {
    config: &'a BrushographConfig,
    seed: u64,
    parallel: bool,
}

impl<'a> BrushProgram<'a> {
    /// Create a builder; `seed` drives every random choice
    pub fn new(config: &'a BrushographConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            parallel: true,
        }
    }

    /// Post-process colors concurrently (default) or one after another
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Inputs in painting order.
    ///
    /// Follows `color_order` when it is set; colors it names without a
    /// toolpath, and toolpaths it does not name, are reported and left out.
    /// Without a color order the inputs keep their own order.
    pub fn painting_order<'b>(&self, inputs: &'b [ColorToolpath]) -> Vec<&'b ColorToolpath> {
        let order = &self.config.color_order;
        if order.is_empty() {
            return inputs.iter().collect();
        }

        let mut ordered = Vec::with_capacity(inputs.len());
        for color in order {
            let name = tray_name_for(color);
            match inputs.iter().find(|i| tray_name_for(&i.color) == name) {
                Some(input) => ordered.push(input),
                None => tracing::warn!("No toolpath for color {} in color_order, skipping", color),
            }
        }

        for input in inputs {
            let name = tray_name_for(&input.color);
            if !order.iter().any(|c| tray_name_for(c) == name) {
                tracing::warn!("Color {} is not in color_order, skipping", input.color);
            }
        }

        ordered
    }

    /// Post-process every color and concatenate the results.
    ///
    /// Tray lookups happen before any work starts, so a color without a tray
    /// fails the whole program.
    pub fn assemble(&self, inputs: &[ColorToolpath]) -> CamToolResult<PaintedProgram> {
        let mut jobs = Vec::with_capacity(inputs.len());
        for (position, input) in self.painting_order(inputs).into_iter().enumerate() {
            let painter = TrayPainter::new(self.config, &input.color)?;
            jobs.push((painter, input, self.seed.wrapping_add(position as u64)));
        }

        let run = |(painter, input, seed): &(TrayPainter<'_>, &ColorToolpath, u64)| -> PaintedColor {
            let mut rng = StdRng::seed_from_u64(*seed);
            painter.paint(&input.source, &mut rng)
        };

        let painted: Vec<PaintedColor> = if self.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        let mut program = PaintedProgram::default();
        for color in painted {
            program.toolpath.append(color.toolpath);
            program.stats.push(color.stats);
        }
        Ok(program)
    }
}
