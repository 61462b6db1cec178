use std::path::PathBuf;

use anyhow::Context as _;
use brushograph::camtools::{separate_spot_colors, ChannelGrid, ParameterError};
use brushograph::core::{InkChannel, PROCESS_CHANNELS};
use brushograph::{
    init_logging, BrushProgram, BrushographConfig, ColorToolpath, HalftoneParameters,
    HalftoneScheduler, IntensityGrid, SpotColor,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "brushograph", version = brushograph::VERSION, long_version = brushograph::LONG_VERSION)]
struct Cli {
    /// Machine configuration (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize channel images into halftone toolpaths.
    Halftone(HalftoneArgs),
    /// Turn sliced drawing toolpaths into a tray-dipping brush program.
    Paint(PaintArgs),
}

#[derive(Args, Debug)]
struct HalftoneArgs {
    /// Channel image as LABEL=PATH; repeat per channel.
    #[arg(long = "channel", value_parser = parse_key_path, required = true)]
    channels: Vec<(String, PathBuf)>,

    /// Spot color as NAME=C,M,Y,K[:#RRGGBB]; needs the C, M, Y and K channels.
    #[arg(long = "spot")]
    spots: Vec<String>,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// File name prefix for every output.
    #[arg(long, default_value = "halftone")]
    stem: String,

    /// Threshold levels per channel.
    #[arg(long)]
    levels: Option<u32>,

    /// Physical output width in millimeters.
    #[arg(long)]
    width_mm: Option<f64>,

    /// Physical output height in millimeters.
    #[arg(long)]
    height_mm: Option<f64>,

    /// Resize channel images to this many columns.
    #[arg(long)]
    columns: Option<u32>,

    /// Resize channel images to this many rows.
    #[arg(long)]
    rows: Option<u32>,

    /// Also write one combined file per channel.
    #[arg(long, default_value_t = false)]
    join: bool,

    /// Use rapid moves for drawing.
    #[arg(long, default_value_t = false)]
    fast: bool,

    /// Treat the single channel as grayscale.
    #[arg(long, default_value_t = false)]
    grayscale: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct PaintArgs {
    /// Sliced toolpath as COLOR=PATH; repeat per color.
    #[arg(long = "toolpath", value_parser = parse_key_path, required = true)]
    toolpaths: Vec<(String, PathBuf)>,

    /// Output program path.
    #[arg(long)]
    out: PathBuf,

    /// Seed for tray entry angles and paint budgets.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Post-process colors one after another.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

fn parse_key_path(s: &str) -> Result<(String, PathBuf), String> {
    let (key, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=PATH, got '{}'", s))?;
    if key.is_empty() || path.is_empty() {
        return Err(format!("expected KEY=PATH, got '{}'", s));
    }
    Ok((key.to_string(), PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = match &cli.config {
        Some(path) => BrushographConfig::load_from_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => BrushographConfig::default(),
    };

    match cli.cmd {
        Command::Halftone(args) => cmd_halftone(&config, args),
        Command::Paint(args) => cmd_paint(&config, args),
    }
}

fn channel_for(label: &str, grayscale: bool) -> InkChannel {
    if grayscale {
        return InkChannel::grayscale();
    }
    PROCESS_CHANNELS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(l, rgb)| InkChannel::new(*l, *rgb))
        .unwrap_or_else(|| InkChannel::new(label, [0, 0, 0]))
}

fn cmd_halftone(config: &BrushographConfig, args: HalftoneArgs) -> anyhow::Result<()> {
    let mut settings = config.halftone.clone();
    if let Some(levels) = args.levels {
        settings.levels = levels;
    }
    if let Some(width) = args.width_mm {
        settings.width_mm = width;
    }
    if let Some(height) = args.height_mm {
        settings.height_mm = height;
    }
    settings.columns = args.columns.or(settings.columns);
    settings.rows = args.rows.or(settings.rows);
    settings.fast |= args.fast;
    settings.join |= args.join;
    settings.grayscale |= args.grayscale;

    if settings.grayscale && args.channels.len() != 1 {
        anyhow::bail!("grayscale mode takes exactly one --channel");
    }

    let mut channels = Vec::with_capacity(args.channels.len());
    for (label, path) in &args.channels {
        let grid = IntensityGrid::from_file(path, settings.columns, settings.rows)
            .with_context(|| format!("load channel image '{}'", path.display()))?;
        channels.push(ChannelGrid::new(channel_for(label, settings.grayscale), grid));
    }

    if !args.spots.is_empty() {
        if settings.grayscale {
            return Err(ParameterError::Incompatible(
                "spot colors in grayscale mode".to_string(),
            )
            .into());
        }
        let spots = args
            .spots
            .iter()
            .map(|s| SpotColor::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        add_spot_channels(&mut channels, &spots)?;
    }

    let mut scheduler =
        HalftoneScheduler::new(HalftoneParameters::from(&settings))?.with_join(settings.join);
    if let Some(threads) = args.threads {
        scheduler = scheduler.with_threads(threads);
    }

    let report = scheduler.run(&channels, &args.out_dir, &args.stem)?;
    for channel in &channels {
        tracing::info!(
            "Channel {}: {:.1} mm drawn",
            channel.channel.label,
            report.drawn_length_mm(&channel.channel.label)
        );
    }
    eprintln!(
        "wrote {} level files to {}",
        report.levels.len(),
        args.out_dir.display()
    );
    Ok(())
}

/// Reduce the process grids in place and append one channel per spot color.
fn add_spot_channels(channels: &mut Vec<ChannelGrid>, spots: &[SpotColor]) -> anyhow::Result<()> {
    let mut indices = Vec::with_capacity(4);
    for (label, _) in PROCESS_CHANNELS {
        let index = channels
            .iter()
            .position(|c| c.channel.label == label)
            .with_context(|| format!("spot colors need a --channel for {}", label))?;
        indices.push(index);
    }

    let mut process: Vec<IntensityGrid> =
        indices.iter().map(|&i| channels[i].grid.clone()).collect();
    let derived = separate_spot_colors(&mut process, spots)?;

    for (&i, grid) in indices.iter().zip(process) {
        channels[i].grid = grid;
    }
    channels.extend(
        derived
            .into_iter()
            .map(|(channel, grid)| ChannelGrid::new(channel, grid)),
    );
    Ok(())
}

fn cmd_paint(config: &BrushographConfig, args: PaintArgs) -> anyhow::Result<()> {
    let mut inputs = Vec::with_capacity(args.toolpaths.len());
    for (color, path) in &args.toolpaths {
        inputs.push(
            ColorToolpath::from_file(color.as_str(), path)
                .with_context(|| format!("read toolpath for {}", color))?,
        );
    }

    let program = BrushProgram::new(config, args.seed)
        .with_parallel(!args.sequential)
        .assemble(&inputs)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    program
        .save(&args.out)
        .with_context(|| format!("write program '{}'", args.out.display()))?;

    for stats in &program.stats {
        tracing::info!(
            "{}: {} refills, {:.1} mm drawn, {} skipped lines, {} suspicious coordinates",
            stats.color,
            stats.refills,
            stats.drawn_distance,
            stats.skipped_lines,
            stats.suspicious_coordinates
        );
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
