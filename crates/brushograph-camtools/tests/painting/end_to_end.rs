use brushograph_camtools::tray_painter::TrayPainter;
use brushograph_core::Point2;
use brushograph_gcode::Command;
use brushograph_settings::BrushographConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SLICED: &str = "\
;FLAVOR:Marlin
G1 F600 Z1
G0 X0 Y0
G1 X100 Y0 E1.2
G1 X100 Y100 E2.4
G1 F600 Z6
G0 X20 Y20
";

fn config() -> BrushographConfig {
    let mut config = BrushographConfig::default();
    config.machine.paint_per_run_min = 60;
    config.machine.paint_per_run_max = 61;
    config
}

fn is_draw_to(cmd: &Command, target: Point2) -> bool {
    matches!(cmd, Command::LinearMove(m)
        if m.z.is_none()
            && m.point().is_some_and(|p| p.distance_to(target) < 1e-9))
}

#[test]
fn test_refills_interrupt_long_strokes() {
    let config = config();
    let painter = TrayPainter::new(&config, "C").unwrap();
    let painted = painter.paint(SLICED, &mut StdRng::seed_from_u64(17));
    let commands = painted.toolpath.commands();

    let waypoints = [
        Point2::new(0.0, 0.0),
        Point2::new(60.0, 0.0),
        Point2::new(100.0, 0.0),
        Point2::new(100.0, 20.0),
        Point2::new(100.0, 80.0),
        Point2::new(100.0, 100.0),
    ];

    let mut positions = Vec::new();
    let mut from = 0;
    for target in waypoints {
        let offset = commands[from..]
            .iter()
            .position(|c| is_draw_to(c, target))
            .unwrap_or_else(|| panic!("no draw to {}", target));
        positions.push(from + offset);
        from += offset + 1;
    }

    let dip_depth = config.machine.tray_dip_depth;
    let dips_between = |a: usize, b: usize| {
        commands[a..b]
            .iter()
            .filter(|c| matches!(c, Command::RapidMove(m) if m.z == Some(dip_depth)))
            .count()
    };

    // (0,0) lowers the brush, (60,0) empties the first load
    assert_eq!(dips_between(positions[0], positions[1]), 0);
    assert_eq!(dips_between(positions[1], positions[2]), 1);
    // 40 mm painted, 20 left
    assert_eq!(dips_between(positions[2], positions[3]), 0);
    assert_eq!(dips_between(positions[3], positions[4]), 1);
    assert_eq!(dips_between(positions[4], positions[5]), 1);

    // nothing between the last draw and the pen-up lift
    let lift = config.machine.above_canvas_height();
    let next_lift = commands[positions[5]..]
        .iter()
        .position(|c| matches!(c, Command::RapidMove(m) if m.z == Some(lift) && m.x.is_none()))
        .unwrap();
    assert_eq!(dips_between(positions[5], positions[5] + next_lift), 0);

    // priming load plus three while drawing
    assert_eq!(painted.stats.refills, 4);
    assert!((painted.stats.drawn_distance - 200.0).abs() < 1e-9);
}

#[test]
fn test_program_structure() {
    let config = config();
    let painter = TrayPainter::new(&config, "cyan").unwrap();
    let painted = painter.paint(SLICED, &mut StdRng::seed_from_u64(3));
    let gcode = painted.toolpath.to_gcode();

    assert!(gcode.starts_with("M204 S500\nG0 F3000\nG1 F1500\nG90"));
    assert!(gcode.contains("G28 X Y"));
    // pen-up travel stays a linear move above the canvas
    assert!(gcode.contains("G0 Z15.000\nM204 S1000\nG0 F6000\nG1 F6000\nG1 X20.000 Y20.000\n"));
    // parked in the water tray at the end
    assert!(gcode.ends_with("G0 X-60.000 Y-20.000\nM204 S500\nG0 F3000\nG1 F1500\nG0 Z0.000\n"));
}

#[test]
fn test_prime_sequence() {
    let mut config = config();
    config.machine.prepare_paint_count = 2;
    config.machine.wash_count = 3;
    let painter = TrayPainter::new(&config, "M").unwrap();
    let painted = painter.paint("", &mut StdRng::seed_from_u64(1));

    let dips = painted
        .toolpath
        .iter()
        .filter(|c| matches!(c, Command::RapidMove(m) if m.z == Some(-4.0)))
        .count();
    // mix 2 + wash 3 + load 1, then the final wash 3
    assert_eq!(dips, 9);
    assert_eq!(painted.stats.refills, 1);
}

#[test]
fn test_placement_offset() {
    let mut config = config();
    config.machine.offset_x = 200.0;
    config.machine.offset_y = -15.0;
    let painter = TrayPainter::new(&config, "C").unwrap();
    let painted = painter.paint(
        "G1 F600 Z1\nG1 X1 Y2\nG1 X11 Y2\n",
        &mut StdRng::seed_from_u64(0),
    );
    let gcode = painted.toolpath.to_gcode();
    assert!(gcode.contains("G1 X201.000 Y-13.000\nG0 Z10.000\n"));
    assert!(gcode.contains("G1 X211.000 Y-13.000\n"));
}

#[test]
fn test_bad_lines_are_skipped() {
    let config = config();
    let painter = TrayPainter::new(&config, "C").unwrap();
    let clean = painter.paint("G1 F600 Z1\nG1 X5 Y5\nG1 X9 Y8\n", &mut StdRng::seed_from_u64(4));
    let noisy = painter.paint(
        "G1 F600 Z1\n$H\nG1 X5 Y5\nG1 X\n\n;comment\nG1 X9 Y8\n",
        &mut StdRng::seed_from_u64(4),
    );
    assert_eq!(clean.toolpath, noisy.toolpath);
    assert_eq!(noisy.stats.skipped_lines, 2);
    assert_eq!(clean.stats.skipped_lines, 0);
}

#[test]
fn test_out_of_range_coordinates_still_emitted() {
    let config = config();
    let painter = TrayPainter::new(&config, "C").unwrap();
    let painted = painter.paint("G0 X1500 Y2000\nG0 X1500 Y20\n", &mut StdRng::seed_from_u64(0));
    assert_eq!(painted.stats.suspicious_coordinates, 1);
    assert!(painted.toolpath.to_gcode().contains("G1 X1500.000 Y2000.000"));
}
