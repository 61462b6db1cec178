use brushograph_camtools::halftone::{HalftoneParameters, HalftoneRasterizer, IntensityGrid};
use brushograph_core::InkChannel;

fn params(levels: u32) -> HalftoneParameters {
    HalftoneParameters {
        width_mm: 40.0,
        height_mm: 40.0,
        levels,
        ..HalftoneParameters::default()
    }
}

#[test]
fn test_blank_grid_never_lowers_pen() {
    let rasterizer = HalftoneRasterizer::new(params(4)).unwrap();
    let grid = IntensityGrid::new(16, 9);

    for (index, channel) in InkChannel::process().iter().enumerate() {
        for level in 1..4 {
            let out = rasterizer.rasterize(&grid, index, channel, level).unwrap();
            assert_eq!(out.pen_down_count(rasterizer.params()), 0);
            assert_eq!(out.on_pixels, 0);
            assert!(!out.toolpath.to_gcode().contains("Z-7.000"));
        }
    }
}

#[test]
fn test_full_grid_serpentine_scan() {
    let rasterizer = HalftoneRasterizer::new(params(1)).unwrap();
    let grid = IntensityGrid::filled(4, 4, 255);
    let out = rasterizer
        .rasterize(&grid, 3, &InkChannel::process()[3], 0)
        .unwrap();

    let lines: Vec<String> = out.toolpath.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "F2000",
            "G0 Z0.000",
            // bottom row, left to right
            "G1 X0.000",
            "G0 Z-7.000",
            "G1 X40.000",
            "G0 Z0.000",
            // right to left
            "G1 X40.000 Y10.000",
            "G0 Z-7.000",
            "G1 X0.000",
            "G0 Z0.000",
            "G1 X0.000 Y20.000",
            "G0 Z-7.000",
            "G1 X40.000",
            "G0 Z0.000",
            "G1 X40.000 Y30.000",
            "G0 Z-7.000",
            "G1 X0.000",
            "G0 Z0.000",
            "G0 X0.000 Y0.000",
        ]
    );
    assert_eq!(out.pen_down_count(rasterizer.params()), 4);
    assert_eq!(out.drawn_length_mm, 160.0);
}

#[test]
fn test_fast_mode_uses_rapid_moves() {
    let rasterizer = HalftoneRasterizer::new(HalftoneParameters {
        fast: true,
        ..params(1)
    })
    .unwrap();
    let grid = IntensityGrid::filled(2, 2, 255);
    let out = rasterizer
        .rasterize(&grid, 0, &InkChannel::grayscale(), 0)
        .unwrap();
    assert!(out.toolpath.iter().all(|c| !c.to_string().starts_with("G1")));
}

#[test]
fn test_levels_partition_intensity() {
    let rasterizer = HalftoneRasterizer::new(params(4)).unwrap();
    // intensity ramps across columns: 0, 64, 128, 192, 255
    let ramp = [0u8, 64, 128, 192, 255];
    let grid = IntensityGrid::from_fn(5, 1, |x, _| ramp[x as usize]);

    let on: Vec<u64> = (0..4)
        .map(|level| {
            rasterizer
                .rasterize(&grid, 0, &InkChannel::grayscale(), level)
                .unwrap()
                .on_pixels
        })
        .collect();
    // thresholds 0, 63.75, 127.5, 191.25
    assert_eq!(on, vec![4, 4, 3, 2]);
}

#[test]
fn test_extrusion_follows_run_length() {
    let rasterizer = HalftoneRasterizer::new(HalftoneParameters {
        extruder_speed: Some(0.1),
        width_mm: 30.0,
        height_mm: 10.0,
        ..HalftoneParameters::default()
    })
    .unwrap();
    let grid = IntensityGrid::filled(3, 1, 255);
    let out = rasterizer
        .rasterize(&grid, 0, &InkChannel::grayscale(), 0)
        .unwrap();
    // three pixels of 10 mm at 0.1 per mm
    assert!(out.toolpath.to_gcode().contains("G1 X30.000 E3.00000"));
    assert!(out.toolpath.to_gcode().contains("M83"));
}
