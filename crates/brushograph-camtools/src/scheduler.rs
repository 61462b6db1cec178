//! Channel/Level Scheduler
//!
//! Fans rasterizer runs for every (channel, level) pair out over a rayon
//! pool. Tasks only read their channel's grid and return an in-memory
//! toolpath; files are written after every task has finished, and the
//! per-channel combined file is assembled in level order.

use brushograph_core::InkChannel;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{CamToolError, CamToolResult, ParameterError};
use crate::halftone::{HalftoneParameters, HalftoneRasterizer, IntensityGrid, LevelToolpath};

/// One channel to rasterize
#[derive(Debug, Clone)]
pub struct ChannelGrid {
    /// Label and preview color
    pub channel: InkChannel,
    /// Intensity grid
    pub grid: IntensityGrid,
}

impl ChannelGrid {
    /// Pair a channel with its grid
    pub fn new(channel: InkChannel, grid: IntensityGrid) -> Self {
        Self { channel, grid }
    }
}

/// Files written for one (channel, level) pass
#[derive(Debug, Clone, PartialEq)]
pub struct LevelReport {
    /// Channel label
    pub channel: String,
    /// Threshold level
    pub level: u32,
    /// Toolpath file
    pub gcode_path: PathBuf,
    /// Preview raster
    pub preview_path: PathBuf,
    /// Drawn length in millimeters
    pub drawn_length_mm: f64,
}

/// Everything a scheduler run wrote
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalftoneReport {
    /// Per-level outputs, channel-major, level order
    pub levels: Vec<LevelReport>,
    /// Combined per-channel files, in channel order
    pub combined: Vec<PathBuf>,
}

impl HalftoneReport {
    /// Sum of drawn lengths over every level of a channel
    pub fn drawn_length_mm(&self, channel: &str) -> f64 {
        self.levels
            .iter()
            .filter(|l| l.channel == channel)
            .map(|l| l.drawn_length_mm)
            .sum()
    }
}

/// Bounded-pool scheduler for halftone passes
#[derive(Debug, Clone)]
pub struct HalftoneScheduler {
    rasterizer: HalftoneRasterizer,
    threads: Option<usize>,
    join: bool,
}

impl HalftoneScheduler {
    /// Create a scheduler using all available cores
    pub fn new(params: HalftoneParameters) -> CamToolResult<Self> {
        Ok(Self {
            rasterizer: HalftoneRasterizer::new(params)?,
            threads: None,
            join: false,
        })
    }

    /// Limit the worker pool size
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Also write one combined file per channel
    pub fn with_join(mut self, join: bool) -> Self {
        self.join = join;
        self
    }

    /// Rasterize every (channel, level) pair.
    ///
    /// Results are channel-major and in level order regardless of which
    /// task finished first.
    pub fn rasterize_all(&self, channels: &[ChannelGrid]) -> CamToolResult<Vec<LevelToolpath>> {
        check_dimensions(channels)?;

        let levels = self.rasterizer.params().levels;
        let tasks: Vec<(usize, u32)> = (0..channels.len())
            .flat_map(|c| (0..levels).map(move |j| (c, j)))
            .collect();

        let pool = build_thread_pool(self.threads)?;
        let rendered = pool.install(|| {
            tasks
                .par_iter()
                .map(|&(index, level)| -> CamToolResult<LevelToolpath> {
                    let job = &channels[index];
                    let started = Instant::now();
                    let out = self.rasterizer.rasterize(&job.grid, index, &job.channel, level)?;
                    tracing::info!(
                        "Channel {}, level {}: {:.3}s, {:.1}mm",
                        job.channel.label,
                        level,
                        started.elapsed().as_secs_f64(),
                        out.drawn_length_mm
                    );
                    Ok(out)
                })
                .collect::<Vec<CamToolResult<LevelToolpath>>>()
        });

        rendered.into_iter().collect()
    }

    /// Rasterize and write `<stem>_<channel>_<level>.gcode` and `.png` files
    /// into `out_dir`, plus `<stem>_<channel>_combined_0-<L-1>.gcode` when
    /// joining.
    pub fn run(
        &self,
        channels: &[ChannelGrid],
        out_dir: &Path,
        stem: &str,
    ) -> CamToolResult<HalftoneReport> {
        let started = Instant::now();
        let outputs = self.rasterize_all(channels)?;
        std::fs::create_dir_all(out_dir)?;

        let mut report = HalftoneReport::default();
        for out in &outputs {
            let base = format!("{}_{}_{}", stem, out.channel, out.level);
            let gcode_path = out_dir.join(format!("{}.gcode", base));
            let preview_path = out_dir.join(format!("{}.png", base));

            std::fs::write(&gcode_path, out.toolpath.to_gcode())?;
            out.preview.save(&preview_path)?;

            report.levels.push(LevelReport {
                channel: out.channel.clone(),
                level: out.level,
                gcode_path,
                preview_path,
                drawn_length_mm: out.drawn_length_mm,
            });
        }

        if self.join {
            let last_level = self.rasterizer.params().levels - 1;
            for job in channels {
                let combined: String = outputs
                    .iter()
                    .filter(|o| o.channel == job.channel.label)
                    .map(|o| o.toolpath.to_gcode())
                    .collect();
                let path = out_dir.join(format!(
                    "{}_{}_combined_0-{}.gcode",
                    stem, job.channel.label, last_level
                ));
                std::fs::write(&path, combined)?;
                report.combined.push(path);
            }
        }

        tracing::info!(
            "Halftone run: {} channels x {} levels in {:.3}s",
            channels.len(),
            self.rasterizer.params().levels,
            started.elapsed().as_secs_f64()
        );
        Ok(report)
    }
}

fn check_dimensions(channels: &[ChannelGrid]) -> CamToolResult<()> {
    let first = channels.first().ok_or_else(|| {
        CamToolError::InvalidParameters("at least one channel is required".to_string())
    })?;
    let (width, height) = first.grid.dimensions();

    for job in channels {
        let (found_width, found_height) = job.grid.dimensions();
        if (found_width, found_height) != (width, height) {
            return Err(ParameterError::DimensionMismatch {
                channel: job.channel.label.clone(),
                width,
                height,
                found_width,
                found_height,
            }
            .into());
        }
    }

    let mut labels: Vec<&str> = channels.iter().map(|c| c.channel.label.as_str()).collect();
    labels.sort_unstable();
    if labels.windows(2).any(|w| w[0] == w[1]) {
        return Err(CamToolError::InvalidParameters(
            "channel labels must be unique".to_string(),
        ));
    }

    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> CamToolResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(CamToolError::WorkerPool(
            "thread count must be >= 1 when set".to_string(),
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CamToolError::WorkerPool(format!("failed to build thread pool: {e}")))
}
