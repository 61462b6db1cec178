use brushograph_camtools::tray_painter::{draw_step, BrushPhase, MachineState};
use brushograph_core::Point2;
use brushograph_gcode::{Command, Toolpath};
use brushograph_settings::BrushographConfig;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config(min: u32, max: u32) -> BrushographConfig {
    let mut config = BrushographConfig::default();
    config.machine.paint_per_run_min = min;
    config.machine.paint_per_run_max = max;
    config
}

fn drawing_state(budget: f64, dist_painted: f64, from: Point2) -> MachineState {
    let mut state = MachineState::with_budget(budget);
    state.phase = BrushPhase::Drawing;
    state.dist_painted = dist_painted;
    state.last_draw_point = Some(from);
    state
}

/// Linear moves on the canvas quadrant; tray strokes stay at negative X.
fn canvas_draws(out: &Toolpath) -> Vec<Point2> {
    out.iter()
        .filter_map(|c| match c {
            Command::LinearMove(m) if m.z.is_none() => m.point(),
            _ => None,
        })
        .filter(|p| p.x >= 0.0)
        .collect()
}

#[test]
fn test_split_count_matches_budget() {
    let config = config(60, 61);
    let tray = config.color_tray("C").unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let mut state = drawing_state(60.0, 25.0, Point2::new(0.0, 0.0));
    let mut out = Toolpath::new();

    draw_step(&mut out, &mut state, &config, &tray, Point2::new(250.0, 0.0), &mut rng);

    let draws = canvas_draws(&out);
    // first piece 35, then 60, 60, 60, final 35
    let xs: Vec<f64> = draws.iter().map(|p| p.x).collect();
    assert_eq!(draws.len(), 5);
    for (x, expected) in xs.iter().zip([35.0, 95.0, 155.0, 215.0, 250.0]) {
        assert!((x - expected).abs() < 1e-9, "{} != {}", x, expected);
    }
    assert_eq!(state.refills, 4);
    assert!((state.dist_painted - 35.0).abs() < 1e-9);
}

#[test]
fn test_split_keeps_budget_across_dips() {
    let config = config(60, 100);
    let tray = config.color_tray("C").unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let mut state = drawing_state(60.0, 25.0, Point2::new(0.0, 0.0));
    let mut out = Toolpath::new();

    draw_step(&mut out, &mut state, &config, &tray, Point2::new(250.0, 0.0), &mut rng);

    let xs: Vec<f64> = canvas_draws(&out).iter().map(|p| p.x).collect();
    assert_eq!(xs.len(), 5);
    for (x, expected) in xs.iter().zip([35.0, 95.0, 155.0, 215.0, 250.0]) {
        assert!((x - expected).abs() < 1e-9, "{} != {}", x, expected);
    }
    assert_eq!(state.refills, 4);
    assert!((state.dist_painted - 35.0).abs() < 1e-9);
    // one new budget once the split is done
    assert!((60.0..100.0).contains(&state.paint_per_run));
}

#[test]
fn test_zero_budget_draws_whole_segment() {
    let config = BrushographConfig::default();
    let tray = config.color_tray("K").unwrap();
    let mut rng = StdRng::seed_from_u64(4);
    let mut state = drawing_state(0.0, 0.0, Point2::new(0.0, 0.0));
    let mut out = Toolpath::new();

    draw_step(&mut out, &mut state, &config, &tray, Point2::new(10.0, 0.0), &mut rng);

    assert_eq!(canvas_draws(&out).first(), Some(&Point2::new(10.0, 0.0)));
    assert_eq!(state.refills, 1);
    assert!(state.paint_per_run >= 200.0);
    assert_eq!(state.dist_painted, 0.0);
}

#[test]
fn test_refill_follows_every_piece_but_last() {
    let config = config(60, 61);
    let tray = config.color_tray("C").unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let mut state = drawing_state(60.0, 0.0, Point2::new(10.0, 10.0));
    let mut out = Toolpath::new();

    draw_step(&mut out, &mut state, &config, &tray, Point2::new(10.0, 140.0), &mut rng);

    let dip_depth = config.machine.tray_dip_depth;
    let mut dips_since_draw = 0;
    let mut pattern = Vec::new();
    for cmd in out.iter() {
        match cmd {
            Command::RapidMove(m) if m.z == Some(dip_depth) => dips_since_draw += 1,
            Command::LinearMove(m) if m.z.is_none() && m.point().is_some_and(|p| p.x >= 0.0) => {
                pattern.push(dips_since_draw);
                dips_since_draw = 0;
            }
            _ => {}
        }
    }
    pattern.push(dips_since_draw);
    // draw, dip, draw, dip, draw (10 left in the budget)
    assert_eq!(pattern, vec![0, 1, 1, 0]);
}

proptest! {
    #[test]
    fn split_pieces_cover_segment(
        budget in 10u32..100,
        used in 0.0f64..1.0,
        length in 1.0f64..1000.0,
        angle in 0.0f64..std::f64::consts::FRAC_PI_2,
    ) {
        let config = config(budget, budget * 3);
        let tray = config.color_tray("M").unwrap();
        let ppr = f64::from(budget);
        let dist_painted = used * ppr;
        let start = Point2::new(5.0, 5.0);
        let target = start + Point2::new(length * angle.cos(), length * angle.sin());

        let mut state = drawing_state(ppr, dist_painted, start);
        let mut rng = StdRng::seed_from_u64(u64::from(budget));
        let mut out = Toolpath::new();
        draw_step(&mut out, &mut state, &config, &tray, target, &mut rng);

        let draws = canvas_draws(&out);
        let mut walked = 0.0;
        let mut previous = start;
        for p in &draws {
            walked += previous.distance_to(*p);
            previous = *p;
        }
        prop_assert!((walked - length).abs() < 1e-6);
        prop_assert!(previous.distance_to(target) < 1e-9);

        let d = start.distance_to(target);
        if d > ppr {
            let first = ppr - dist_painted;
            let expected = ((d - first) / ppr).ceil() as usize + 1;
            let remainder = (d - first) % ppr;
            // exact multiples may round either way
            if remainder > 1e-6 && ppr - remainder > 1e-6 {
                prop_assert_eq!(draws.len(), expected);
            }
        } else {
            prop_assert_eq!(draws.len(), 1);
        }

        prop_assert!(state.dist_painted >= 0.0);
        prop_assert!(state.dist_painted < state.paint_per_run);
        prop_assert!(state.paint_per_run >= ppr && state.paint_per_run < 3.0 * ppr);
    }

    #[test]
    fn budget_stays_below_load_over_random_walks(
        steps in prop::collection::vec((0.0f64..400.0, 0.0f64..400.0), 1..40),
        seed in any::<u64>(),
    ) {
        let config = config(30, 90);
        let tray = config.color_tray("Y").unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = MachineState::new(&config.machine, &mut rng);
        state.phase = BrushPhase::Drawing;
        state.last_draw_point = Some(Point2::origin());

        let mut out = Toolpath::new();
        for (x, y) in steps {
            draw_step(&mut out, &mut state, &config, &tray, Point2::new(x, y), &mut rng);
            prop_assert!(state.dist_painted >= 0.0);
            prop_assert!(state.dist_painted < state.paint_per_run);
            prop_assert!((30.0..90.0).contains(&state.paint_per_run));
        }
    }
}
