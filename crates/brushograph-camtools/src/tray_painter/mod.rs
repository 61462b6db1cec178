//! Tray Post-Processor
//!
//! Rewrites a sliced drawing toolpath for one ink color into a program that
//! keeps the brush loaded: it primes the brush, follows the strokes while
//! counting drawn distance against a randomized paint budget, and detours to
//! the color tray whenever the budget runs out.

pub mod maneuvers;
pub mod program;
pub mod signals;
pub mod state;

pub use program::{BrushProgram, ColorToolpath, PaintedProgram};
pub use signals::{SignalClassifier, ToolpathSignal};
pub use state::{BrushPhase, MachineState};

use brushograph_core::{Point2, Tray};
use brushograph_gcode::{Command, GcodeError, GcodeParser, Motion, Toolpath};
use brushograph_settings::BrushographConfig;
use rand::Rng;
use serde::Serialize;

use crate::error::CamToolResult;

/// Counters of one color's run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaintStats {
    /// Color (tray name)
    pub color: String,
    /// Refill maneuvers, including the initial load
    pub refills: usize,
    /// Distance drawn on the canvas in millimeters
    pub drawn_distance: f64,
    /// Lines that could not be parsed
    pub skipped_lines: usize,
    /// Coordinates beyond the sanity bound
    pub suspicious_coordinates: usize,
}

/// Post-processed toolpath of one color
#[derive(Debug, Clone)]
pub struct PaintedColor {
    /// Emitted commands
    pub toolpath: Toolpath,
    /// Counters
    pub stats: PaintStats,
}

/// Post-processor for a single ink color
#[derive(Debug, Clone)]
pub struct TrayPainter<'a> {
    config: &'a BrushographConfig,
    color_tray: Tray,
    water_tray: Tray,
    classifier: SignalClassifier,
}

impl<'a> TrayPainter<'a> {
    /// Create a painter for `color` (channel letter or tray name).
    ///
    /// Fails when the configuration is invalid or has no tray for the color.
    pub fn new(config: &'a BrushographConfig, color: &str) -> CamToolResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            color_tray: config.color_tray(color)?,
            water_tray: config.water_tray(),
            classifier: SignalClassifier::new(&config.signals),
        })
    }

    /// Post-process sliced toolpath text
    pub fn paint<R: Rng + ?Sized>(&self, source: &str, rng: &mut R) -> PaintedColor {
        let config = self.config;
        let mut out = Toolpath::new();
        let mut stats = PaintStats {
            color: self.color_tray.name.clone(),
            ..PaintStats::default()
        };

        let mut state = MachineState::new(&config.machine, rng);
        maneuvers::preamble(&mut out, config);
        maneuvers::prime(&mut out, &mut state, config, &self.color_tray, &self.water_tray, rng);
        out.push(self.above_canvas());

        let mut parser = GcodeParser::new();
        for text in source.lines() {
            let line = match parser.parse(text) {
                Ok(line) => line,
                Err(GcodeError::EmptyLine { .. }) => continue,
                Err(e) => {
                    tracing::debug!("Skipping toolpath line: {}", e);
                    stats.skipped_lines += 1;
                    continue;
                }
            };

            let signal = self.classifier.classify(&line);
            if let ToolpathSignal::Coordinate(point) = signal {
                if self.is_suspicious(point) {
                    tracing::warn!(
                        "Coordinate {} at line {} is beyond {} mm",
                        point,
                        line.line_number,
                        config.machine.coordinate_limit
                    );
                    stats.suspicious_coordinates += 1;
                }
            }

            self.apply_signal(&mut out, &mut state, signal, rng);
        }

        maneuvers::finalize(&mut out, config, &self.water_tray, rng);

        stats.refills = state.refills;
        stats.drawn_distance = state.drawn_distance;
        tracing::info!(
            "Color {}: {} refills, {:.1}mm drawn, {} lines skipped",
            stats.color,
            stats.refills,
            stats.drawn_distance,
            stats.skipped_lines
        );

        PaintedColor {
            toolpath: out,
            stats,
        }
    }

    /// Apply one signal to the state machine
    pub fn apply_signal<R: Rng + ?Sized>(
        &self,
        out: &mut Toolpath,
        state: &mut MachineState,
        signal: ToolpathSignal,
        rng: &mut R,
    ) {
        match signal {
            ToolpathSignal::PenUp => {
                out.push(self.above_canvas());
                out.push(Command::SpeedProfile(self.config.speeds.fast));
                state.phase = BrushPhase::Idle;
            }
            ToolpathSignal::PenDown => {
                state.phase = BrushPhase::ArmedForFirstPoint;
            }
            ToolpathSignal::ExtrusionReset => {
                if matches!(state.phase, BrushPhase::Drawing | BrushPhase::ArmedForFirstPoint) {
                    out.push(self.above_canvas());
                    out.push(Command::SpeedProfile(self.config.speeds.fast));
                    state.phase = BrushPhase::ResumeAfterRepaint;
                }
            }
            ToolpathSignal::Coordinate(point) => {
                if state.phase.awaiting_first_point() {
                    out.push(Command::linear(Motion::to(self.on_canvas(point))));
                    out.push(Command::rapid(Motion::z(self.config.machine.canvas_height)));
                    out.push(Command::SpeedProfile(self.config.speeds.normal));
                    state.phase = BrushPhase::Drawing;
                    state.last_draw_point = Some(point);
                } else if state.phase == BrushPhase::Drawing {
                    draw_step(out, state, self.config, &self.color_tray, point, rng);
                } else {
                    out.push(Command::linear(Motion::to(self.on_canvas(point))));
                }
            }
            ToolpathSignal::Ignored => {}
        }
    }

    fn above_canvas(&self) -> Command {
        Command::rapid(Motion::z(self.config.machine.above_canvas_height()))
    }

    fn on_canvas(&self, point: Point2) -> Point2 {
        point + self.config.machine.canvas_offset()
    }

    fn is_suspicious(&self, point: Point2) -> bool {
        let limit = self.config.machine.coordinate_limit;
        point.x.abs() > limit && point.y.abs() > limit
    }
}

/// Draw from the last stroke point to `target`, refilling whenever the paint
/// budget is used up.
///
/// Segments longer than the budget are split: the first piece uses what is
/// left of the current load, every further piece a full load of the same
/// budget, and each piece but the last is followed by a dip where it ended.
/// A new budget is drawn once the split is done. A segment that fits is drawn
/// whole and the refill, if due, happens at its end. A budget of zero or less
/// draws the segment whole.
pub fn draw_step<R: Rng + ?Sized>(
    out: &mut Toolpath,
    state: &mut MachineState,
    config: &BrushographConfig,
    tray: &Tray,
    target: Point2,
    rng: &mut R,
) {
    let offset = config.machine.canvas_offset();
    let start = state.last_draw_point.unwrap_or(target);
    let distance = start.distance_to(target);

    let budget = state.paint_per_run;
    if budget > 0.0 && distance > budget {
        let mut current = start.toward(target, state.remaining_budget());
        out.push(Command::linear(Motion::to(current + offset)));
        maneuvers::reload(out, state, config, tray, current, rng);

        while current.distance_to(target) > budget {
            current = current.toward(target, budget);
            out.push(Command::linear(Motion::to(current + offset)));
            maneuvers::reload(out, state, config, tray, current, rng);
        }

        out.push(Command::linear(Motion::to(target + offset)));
        state.dist_painted = current.distance_to(target);
        state.resample_budget(&config.machine, rng);
    } else {
        out.push(Command::linear(Motion::to(target + offset)));
        state.dist_painted += distance;
    }
    state.drawn_distance += distance;

    if state.dist_painted >= state.paint_per_run {
        maneuvers::refill(out, state, config, tray, target, rng);
    }

    state.last_draw_point = Some(target);
}
