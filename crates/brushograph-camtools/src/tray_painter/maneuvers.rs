//! Scripted brush maneuvers
//!
//! Each maneuver appends its commands to the output toolpath. Randomness
//! (entry angle and quadrant of every tray dip) comes from the caller's RNG
//! so a seeded run is reproducible.

use brushograph_core::{Point2, Tray};
use brushograph_gcode::{Command, Motion, SpeedProfile, Toolpath};
use brushograph_settings::BrushographConfig;
use rand::Rng;
use std::f64::consts::TAU;

use super::state::MachineState;

fn set_speed(out: &mut Toolpath, profile: &SpeedProfile) {
    out.push(Command::SpeedProfile(*profile));
}

fn rapid_z(out: &mut Toolpath, z: f64) {
    out.push(Command::rapid(Motion::z(z)));
}

/// Per-color program header: normal speed, absolute millimeters, lift to
/// tray height and home X/Y.
pub fn preamble(out: &mut Toolpath, config: &BrushographConfig) {
    set_speed(out, &config.speeds.normal);
    out.push(Command::raw("G90 ; absolute positioning"));
    out.push(Command::raw("G21 ; millimeters"));
    out.push(Command::raw("M400 ; finish moves"));
    rapid_z(out, config.machine.go_in_tray_lift);
    out.push(Command::raw("G28 X Y ; home X and Y only"));
}

/// Dip the brush `entries` times into `tray`, optionally wipe it, and return
/// to `canvas_point` at canvas height.
pub fn go_in_tray<R: Rng + ?Sized>(
    out: &mut Toolpath,
    config: &BrushographConfig,
    tray: &Tray,
    canvas_point: Point2,
    entries: u32,
    remove_drop: bool,
    rng: &mut R,
) {
    let machine = &config.machine;
    let safe_height = machine.safe_travel_height();

    set_speed(out, &config.speeds.fast);
    for i in 0..entries {
        let angle = rng.gen_range(0.0..TAU);
        let quadrant = rng.gen_range(0..4u8);
        let (entry, exit) = tray.entry_chord(angle, quadrant);

        rapid_z(out, if i == 0 { safe_height } else { machine.go_in_tray_lift });
        out.push(Command::rapid(Motion::to(entry)));
        rapid_z(out, machine.tray_dip_depth);
        out.push(Command::rapid(Motion::to(exit)));
        rapid_z(out, machine.go_in_tray_lift);
    }

    if remove_drop {
        remove_drops(out, config, tray, canvas_point);
    }

    rapid_z(out, safe_height);
    out.push(Command::rapid(Motion::to(
        canvas_point + machine.canvas_offset(),
    )));
    rapid_z(out, machine.canvas_height);
    set_speed(out, &config.speeds.normal);
}

/// Wipe excess paint on the tray rim along the line toward `canvas_point`.
///
/// The stroke starts on the entry circle and ends on the drop-removal circle.
/// Trays without a drop-removal radius are left alone.
pub fn remove_drops(
    out: &mut Toolpath,
    config: &BrushographConfig,
    tray: &Tray,
    canvas_point: Point2,
) {
    let Some(inner_radius) = tray.remove_drops_radius else {
        return;
    };

    let target = canvas_point + config.machine.canvas_offset();
    let stroke = tray
        .center
        .radial_toward(target, tray.enter_radius)
        .zip(tray.center.radial_toward(target, inner_radius));
    let Some((start, end)) = stroke else {
        tracing::warn!(
            "Canvas point {} is at the center of tray {}, skipping drop removal",
            target,
            tray.name
        );
        return;
    };

    out.push(Command::linear(Motion::to(start)));
    out.push(Command::linear(Motion::z(config.machine.remove_drops_lift)));
    set_speed(out, &config.speeds.remove_drops);
    out.push(Command::linear(Motion::to(end)));
    set_speed(out, &config.speeds.fast);
}

/// Dip once for paint and return to `canvas_point`, keeping the current budget.
pub fn reload<R: Rng + ?Sized>(
    out: &mut Toolpath,
    state: &mut MachineState,
    config: &BrushographConfig,
    tray: &Tray,
    canvas_point: Point2,
    rng: &mut R,
) {
    go_in_tray(out, config, tray, canvas_point, 1, true, rng);
    state.reloaded();
}

/// Load paint for the next stretch of drawing and restart the paint budget.
pub fn refill<R: Rng + ?Sized>(
    out: &mut Toolpath,
    state: &mut MachineState,
    config: &BrushographConfig,
    tray: &Tray,
    canvas_point: Point2,
    rng: &mut R,
) {
    reload(out, state, config, tray, canvas_point, rng);
    state.resample_budget(&config.machine, rng);
}

/// Rinse the brush in the water tray.
pub fn wash<R: Rng + ?Sized>(
    out: &mut Toolpath,
    config: &BrushographConfig,
    water: &Tray,
    canvas_point: Point2,
    rng: &mut R,
) {
    go_in_tray(
        out,
        config,
        water,
        canvas_point,
        config.machine.wash_count,
        false,
        rng,
    );
}

/// Mix paint, wash, then load the brush for the first stroke.
pub fn prime<R: Rng + ?Sized>(
    out: &mut Toolpath,
    state: &mut MachineState,
    config: &BrushographConfig,
    color: &Tray,
    water: &Tray,
    rng: &mut R,
) {
    let origin = Point2::origin();
    go_in_tray(
        out,
        config,
        color,
        origin,
        config.machine.prepare_paint_count,
        true,
        rng,
    );
    wash(out, config, water, origin, rng);
    refill(out, state, config, color, origin, rng);
}

/// Return to the origin, wash, and park the brush in the water tray.
pub fn finalize<R: Rng + ?Sized>(
    out: &mut Toolpath,
    config: &BrushographConfig,
    water: &Tray,
    rng: &mut R,
) {
    let machine = &config.machine;
    rapid_z(out, machine.safe_travel_height());
    out.push(Command::rapid(Motion::xy(0.0, 0.0)));

    wash(out, config, water, Point2::origin(), rng);

    set_speed(out, &config.speeds.fast);
    rapid_z(out, machine.safe_travel_height());
    out.push(Command::rapid(Motion::to(water.center)));
    set_speed(out, &config.speeds.normal);
    rapid_z(out, machine.park_depth);
}
