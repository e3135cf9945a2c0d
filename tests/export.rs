mod support;

use geartrain::float_types::{Real, TAU};
use geartrain::io::xyz::{
    ExportConfig, Twist, close_loop, export_carrier_path, export_train, filter_close_points,
    prepare_loop,
};
use geartrain::trains::cycloid::{Cycloid, CycloidParams};
use geartrain::trains::planetary::{Planetary, PlanetaryParams, ToothCounts};
use geartrain::trains::GearTrain;
use geo::Coord;
use std::fs;
use std::path::PathBuf;
use support::approx_eq;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("geartrain-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn planetary() -> Planetary {
    let k = Planetary::kinematics("s", "c", &["r"]).unwrap();
    Planetary::new(k, PlanetaryParams::new(ToothCounts::new(21, 6, 9), 3).with_resolution(100)).unwrap()
}

fn parse_line(line: &str) -> [Real; 3] {
    let fields: Vec<Real> = line.split(' ').map(|f| f.parse().unwrap()).collect();
    assert_eq!(fields.len(), 3, "bad line `{line}`");
    [fields[0], fields[1], fields[2]]
}

fn coords(points: &[(Real, Real)]) -> Vec<Coord<Real>> {
    points.iter().map(|&(x, y)| Coord { x, y }).collect()
}

#[test]
fn preparing_a_loop_twice_changes_nothing() {
    let noisy: Vec<Coord<Real>> = (0..50)
        .map(|i| {
            let t = i as Real / 50.0 * TAU;
            // every other point is a near-duplicate
            let jitter = if i % 2 == 0 { 0.0 } else { 1e-9 };
            Coord {
                x: t.cos() + jitter,
                y: t.sin(),
            }
        })
        .collect();
    let inputs = [
        noisy,
        // already closed
        coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
        // repeated vertices
        coords(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (1.0, 1e-9), (1.0, 1.0), (0.0, 1.0)]),
        // ends within tolerance of the start
        coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (1e-9, 0.0)]),
        // creeps forward in steps below the tolerance
        coords(&[(0.0, 0.0), (0.6e-7, 0.0), (1.2e-7, 0.0), (1.8e-7, 0.0), (1.0, 0.0), (1.0, 1.0)]),
    ];
    for input in &inputs {
        let once = close_loop(filter_close_points(input, 1e-7), 1e-7);
        let twice = close_loop(filter_close_points(&once, 1e-7), 1e-7);
        assert_eq!(once, twice, "{input:?}");
        let (first, last) = (once[0], once[once.len() - 1]);
        assert!((first.x - last.x).hypot(first.y - last.y) <= 1e-7, "{input:?} left open");
        assert_eq!(prepare_loop(&once, 1e-7), Some(once.clone()));
    }
}

#[test]
fn collapsed_loops_are_rejected() {
    let dot = [Coord { x: 1.0, y: 1.0 }; 10];
    assert!(prepare_loop(&dot, 1e-7).is_none());
    let segment = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }];
    assert!(prepare_loop(&segment, 1e-7).is_none());
}

#[test]
fn spur_export_writes_three_sections_per_body() {
    let dir = scratch_dir("spur");
    let gear = planetary();
    let report = export_train(&dir, &gear, &ExportConfig::default()).unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(report.written.len(), 9);
    // planets orbit the unit circle, scaled like the profiles
    let carrier = report.carrier.as_ref().expect("planetary trains have a carrier");
    let text = fs::read_to_string(carrier).unwrap();
    let first = parse_line(text.lines().next().unwrap());
    assert!(approx_eq(first[0].hypot(first[1]), report.scale, 1e-6));
    for stem in ["ring_21", "planet_6", "sun_9"] {
        for (suffix, z) in [("z0", 0.0), ("z_pos", 5.0), ("z_neg", -5.0)] {
            let text = fs::read_to_string(dir.join(format!("{stem}_{suffix}.txt"))).unwrap();
            let lines: Vec<&str> = text.lines().collect();
            assert!(lines.len() > 3);
            assert_eq!(lines.first(), lines.last(), "{stem} is not closed");
            assert!(lines.iter().all(|l| parse_line(l)[2] == z));
        }
    }
    // the ring is the largest body and spans the requested diameter
    let ring = fs::read_to_string(dir.join("ring_21_z0.txt")).unwrap();
    let radius = ring
        .lines()
        .map(parse_line)
        .map(|[x, y, _]| x.hypot(y))
        .fold(0.0, Real::max);
    assert!(approx_eq(radius, 35.0, 1e-6), "ring radius {radius}");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn helix_turns_opposite_hands_opposite_ways() {
    let dir = scratch_dir("helix");
    let gear = planetary();
    let config = ExportConfig {
        twist: Some(Twist::helix_degrees(20.0)),
        ..ExportConfig::default()
    };
    export_train(&dir, &gear, &config).unwrap();
    let first = |file: &str| {
        let text = fs::read_to_string(dir.join(file)).unwrap();
        let [x, y, _] = parse_line(text.lines().next().unwrap());
        y.atan2(x)
    };
    let sun_turn = first("sun_9_z_pos.txt") - first("sun_9_z0.txt");
    let ring_turn = first("ring_21_z_pos.txt") - first("ring_21_z0.txt");
    assert!(sun_turn > 0.0 && ring_turn < 0.0, "sun {sun_turn}, ring {ring_turn}");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn pin_rings_are_numbered_per_loop() {
    let dir = scratch_dir("pins");
    let k = Cycloid::kinematics("c", "p", &["r"]).unwrap();
    let gear = Cycloid::new(k, CycloidParams::new(6)).unwrap();
    let report = export_train(&dir, &gear, &ExportConfig::default()).unwrap();
    assert!(dir.join("ring_7_loop0_z0.txt").is_file());
    assert!(dir.join("ring_7_loop6_z_neg.txt").is_file());
    assert!(dir.join("disc_6_z0.txt").is_file());
    assert!(dir.join("eccentric_loop1_z_pos.txt").is_file());
    let expected_files = 3 * gear.templates().iter().map(|t| t.profile.loops().len()).sum::<usize>();
    assert_eq!(report.written.len(), expected_files);
    assert!(report.carrier.is_none());
    assert!(!dir.join("carrier_path.txt").exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn carrier_path_is_a_closed_circle() {
    let dir = scratch_dir("carrier");
    fs::create_dir_all(&dir).unwrap();
    let path = export_carrier_path(&dir, 12.5, 200).unwrap();
    let text = fs::read_to_string(path).unwrap();
    let points: Vec<[Real; 3]> = text.lines().map(parse_line).collect();
    assert_eq!(points.len(), 200);
    assert_eq!(points.first(), points.last());
    assert!(points.iter().all(|[x, y, z]| approx_eq(x.hypot(*y), 12.5, 1e-6) && *z == 0.0));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn exporting_into_a_file_fails() {
    let dir = scratch_dir("file");
    fs::create_dir_all(&dir).unwrap();
    let file = dir.join("occupied");
    fs::write(&file, "").unwrap();
    assert!(export_train(&file, &planetary(), &ExportConfig::default()).is_err());
    fs::remove_dir_all(&dir).unwrap();
}
