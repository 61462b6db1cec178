//! Per-color post-processor state

use brushograph_core::Point2;
use brushograph_settings::MachineSettings;
use rand::Rng;

/// Where the brush is relative to the drawing it follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushPhase {
    /// Above the canvas, coordinates are travel moves
    #[default]
    Idle,
    /// Pen-down seen, the next coordinate starts a stroke
    ArmedForFirstPoint,
    /// Following a stroke, coordinates consume paint
    Drawing,
    /// Extrusion reset seen while down, the next coordinate restarts the stroke
    ResumeAfterRepaint,
}

impl BrushPhase {
    /// Whether the next coordinate lowers the brush instead of drawing
    pub fn awaiting_first_point(&self) -> bool {
        matches!(self, Self::ArmedForFirstPoint | Self::ResumeAfterRepaint)
    }
}

/// Running accumulators of one color's post-processing run
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    /// Current phase
    pub phase: BrushPhase,
    /// Distance drawn since the last refill
    pub dist_painted: f64,
    /// Distance one load of paint lasts
    pub paint_per_run: f64,
    /// Last canvas point of the stroke being drawn (without placement offset)
    pub last_draw_point: Option<Point2>,
    /// Refill maneuvers emitted, including the load before the first stroke
    pub refills: usize,
    /// Total drawn distance
    pub drawn_distance: f64,
}

impl MachineState {
    /// Fresh state with an initial paint budget drawn from `rng`
    pub fn new<R: Rng + ?Sized>(machine: &MachineSettings, rng: &mut R) -> Self {
        Self::with_budget(sample_paint_per_run(machine, rng))
    }

    /// Fresh state with a given paint budget
    pub fn with_budget(paint_per_run: f64) -> Self {
        Self {
            phase: BrushPhase::Idle,
            dist_painted: 0.0,
            paint_per_run,
            last_draw_point: None,
            refills: 0,
            drawn_distance: 0.0,
        }
    }

    /// Record a dip that loads paint without changing the budget
    pub fn reloaded(&mut self) {
        self.dist_painted = 0.0;
        self.refills += 1;
    }

    /// Draw a new paint budget from `rng`
    pub fn resample_budget<R: Rng + ?Sized>(&mut self, machine: &MachineSettings, rng: &mut R) {
        self.paint_per_run = sample_paint_per_run(machine, rng);
    }

    /// Record a refill: the budget starts over with a new draw from `rng`
    pub fn refilled<R: Rng + ?Sized>(&mut self, machine: &MachineSettings, rng: &mut R) {
        self.reloaded();
        self.resample_budget(machine, rng);
    }

    /// Budget left before the next refill
    pub fn remaining_budget(&self) -> f64 {
        self.paint_per_run - self.dist_painted
    }
}

/// Draw a paint budget uniformly from `[paint_per_run_min, paint_per_run_max)`.
///
/// The budget is at least 1 mm; an empty range yields its lower bound.
pub fn sample_paint_per_run<R: Rng + ?Sized>(machine: &MachineSettings, rng: &mut R) -> f64 {
    let min = machine.paint_per_run_min.max(1);
    if machine.paint_per_run_max <= min {
        return f64::from(min);
    }
    f64::from(rng.gen_range(min..machine.paint_per_run_max))
}
