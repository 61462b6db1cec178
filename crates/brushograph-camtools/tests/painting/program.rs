use brushograph_camtools::tray_painter::{BrushProgram, ColorToolpath};
use brushograph_settings::{BrushographConfig, TrayPosition};

fn inputs() -> Vec<ColorToolpath> {
    let stroke = "G1 F600 Z1\nG0 X0 Y0\nG1 X300 Y0\nG1 X300 Y300\nG1 F600 Z6\n";
    vec![
        ColorToolpath::new("C", stroke),
        ColorToolpath::new("M", "G1 F600 Z1\nG0 X10 Y10\nG1 X10 Y500\nG1 F600 Z6\n"),
        ColorToolpath::new("#DFC7A3", stroke),
    ]
}

fn config() -> BrushographConfig {
    let mut config = BrushographConfig::default();
    config
        .trays
        .additionals
        .insert("#DFC7A3".to_string(), TrayPosition { x: -60.0, y: 280.0 });
    config.color_order = vec!["#DFC7A3".to_string(), "C".to_string(), "M".to_string()];
    config
}

#[test]
fn test_same_seed_same_bytes() {
    let config = config();
    let a = BrushProgram::new(&config, 1234).assemble(&inputs()).unwrap();
    let b = BrushProgram::new(&config, 1234).assemble(&inputs()).unwrap();
    assert_eq!(a.to_gcode(), b.to_gcode());

    let c = BrushProgram::new(&config, 1235).assemble(&inputs()).unwrap();
    assert_ne!(a.to_gcode(), c.to_gcode());
}

#[test]
fn test_parallel_matches_sequential() {
    let config = config();
    let parallel = BrushProgram::new(&config, 99).assemble(&inputs()).unwrap();
    let sequential = BrushProgram::new(&config, 99)
        .with_parallel(false)
        .assemble(&inputs())
        .unwrap();
    assert_eq!(parallel.to_gcode(), sequential.to_gcode());
}

#[test]
fn test_colors_in_configured_order() {
    let config = config();
    let program = BrushProgram::new(&config, 7).assemble(&inputs()).unwrap();
    let colors: Vec<&str> = program.stats.iter().map(|s| s.color.as_str()).collect();
    assert_eq!(colors, vec!["#DFC7A3", "cyan", "magenta"]);

    // one preamble per color
    let homes = program.to_gcode().matches("G28 X Y").count();
    assert_eq!(homes, 3);
}

#[test]
fn test_save_writes_program() {
    let config = config();
    let program = BrushProgram::new(&config, 5).assemble(&inputs()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.gcode");
    program.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), program.to_gcode());

    let reread = ColorToolpath::from_file("C", &path).unwrap();
    assert_eq!(reread.source, program.to_gcode());
    assert!(ColorToolpath::from_file("C", &dir.path().join("missing.gcode")).is_err());
}
