use brushograph_camtools::halftone::{HalftoneParameters, IntensityGrid};
use brushograph_camtools::scheduler::{ChannelGrid, HalftoneScheduler};
use brushograph_core::InkChannel;

fn jobs() -> Vec<ChannelGrid> {
    vec![
        ChannelGrid::new(
            InkChannel::process()[0].clone(),
            IntensityGrid::from_fn(6, 4, |x, y| ((x * 40 + y * 10) % 256) as u8),
        ),
        ChannelGrid::new(
            InkChannel::new("#DFC7A3", [0xDF, 0xC7, 0xA3]),
            IntensityGrid::filled(6, 4, 180),
        ),
    ]
}

fn params() -> HalftoneParameters {
    HalftoneParameters {
        width_mm: 60.0,
        height_mm: 40.0,
        levels: 3,
        ..HalftoneParameters::default()
    }
}

#[test]
fn test_writes_level_files_and_previews() {
    let dir = tempfile::tempdir().unwrap();
    let report = HalftoneScheduler::new(params())
        .unwrap()
        .with_threads(2)
        .run(&jobs(), dir.path(), "portrait")
        .unwrap();

    assert_eq!(report.levels.len(), 6);
    assert!(report.combined.is_empty());
    for name in [
        "portrait_C_0.gcode",
        "portrait_C_2.gcode",
        "portrait_C_1.png",
        "portrait_#DFC7A3_0.gcode",
        "portrait_#DFC7A3_2.png",
    ] {
        assert!(dir.path().join(name).exists(), "missing {}", name);
    }

    let preview = image::open(dir.path().join("portrait_#DFC7A3_0.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(preview.dimensions(), (6, 4));
    assert_eq!(preview.get_pixel(0, 0).0, [0xDF, 0xC7, 0xA3]);

    // every level of a solid channel draws the whole grid
    assert_eq!(report.drawn_length_mm("#DFC7A3"), 3.0 * 4.0 * 60.0);
}

#[test]
fn test_combined_file_in_level_order() {
    let dir = tempfile::tempdir().unwrap();
    let report = HalftoneScheduler::new(params())
        .unwrap()
        .with_join(true)
        .run(&jobs(), dir.path(), "portrait")
        .unwrap();

    assert_eq!(report.combined.len(), 2);
    let combined_path = dir.path().join("portrait_C_combined_0-2.gcode");
    assert_eq!(report.combined[0], combined_path);

    let combined = std::fs::read_to_string(&combined_path).unwrap();
    let expected: String = (0..3)
        .map(|level| {
            std::fs::read_to_string(dir.path().join(format!("portrait_C_{}.gcode", level))).unwrap()
        })
        .collect();
    assert_eq!(combined, expected);
}

#[test]
fn test_pool_size_does_not_change_output() {
    let single = HalftoneScheduler::new(params())
        .unwrap()
        .with_threads(1)
        .rasterize_all(&jobs())
        .unwrap();
    let wide = HalftoneScheduler::new(params())
        .unwrap()
        .with_threads(8)
        .rasterize_all(&jobs())
        .unwrap();

    assert_eq!(single.len(), wide.len());
    for (a, b) in single.iter().zip(&wide) {
        assert_eq!(a.toolpath, b.toolpath);
    }
}
