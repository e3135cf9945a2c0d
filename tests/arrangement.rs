mod support;

use geartrain::float_types::{Real, TAU};
use geartrain::trains::compound_cycloid::{CompoundCycloid, CompoundCycloidParams};
use geartrain::trains::compound_planetary::{CompoundPlanetary, CompoundPlanetaryParams};
use geartrain::trains::cycloid::{Cycloid, CycloidParams, LobeKind};
use geartrain::trains::nabtesco::{Nabtesco, NabtescoParams};
use geartrain::trains::planetary::{Planetary, PlanetaryParams, ToothCounts};
use geartrain::trains::simple::{NestedGear, SimpleGear};
use geartrain::trains::{Arrangement, BodyId, GearTrain};
use geartrain::transform::{apply, rotor};
use geo::LineString;
use support::{
    depth_inside, distance_to_outline, excursion_outside, loop_centre, loop_excursion, loop_radius,
    polygon, self_crossings,
};

const CONTACT_TOLERANCE: Real = 1e-3;

fn planetary() -> Planetary {
    let k = Planetary::kinematics("s", "c", &["r"]).unwrap();
    Planetary::new(k, PlanetaryParams::new(ToothCounts::new(21, 6, 9), 3)).unwrap()
}

fn body<'a>(a: &'a Arrangement, id: BodyId) -> &'a geartrain::trains::PlacedBody {
    a.get(id).unwrap_or_else(|| panic!("no body {id}"))
}

#[test]
fn phase_zero_places_fixed_bodies_as_generated() {
    let gear = planetary();
    let arrangement = gear.arrange(0.0).unwrap();
    let templates = gear.templates();
    for (name, template) in [("ring", 0), ("sun", 2)] {
        let placed = body(&arrangement, BodyId::new(name));
        assert_eq!(
            placed.profile.loops(),
            templates[template].profile.loops(),
            "{name} moved at phase 0"
        );
    }
}

#[test]
fn arrangement_is_deterministic() {
    let gear = planetary();
    let (a, b) = (gear.arrange(0.37).unwrap(), gear.arrange(0.37).unwrap());
    assert_eq!(a.len(), b.len());
    for (x, y) in a.bodies().iter().zip(b.bodies()) {
        assert_eq!(x.body, y.body);
        assert_eq!(x.profile.loops(), y.profile.loops());
    }
}

#[test]
fn planets_are_copies_of_the_first_rolled_along_the_ring() {
    let gear = planetary();
    let arrangement = gear.arrange(0.0).unwrap();
    let first = body(&arrangement, BodyId::new("planet").index(0));
    let ratio = 21.0 / 6.0;
    for i in 1..3 {
        let sa = TAU * i as Real / 3.0;
        let expected = rotor(sa) * first.motion * rotor(-sa * ratio);
        let placed = body(&arrangement, BodyId::new("planet").index(i));
        let template = gear.templates()[1].profile;
        for (v, t) in placed.profile.vertices().zip(template.vertices()) {
            let (x, y) = apply(&expected, t.x, t.y);
            assert!((v.x - x).abs() < 1e-9 && (v.y - y).abs() < 1e-9, "planet {i} misplaced");
        }
    }
}

#[test]
fn planetary_teeth_do_not_interpenetrate() {
    let gear = planetary();
    for phase in [0.0, 0.05, 0.2] {
        let a = gear.arrange(phase).unwrap();
        let ring = &body(&a, BodyId::new("ring")).profile;
        let sun = &body(&a, BodyId::new("sun")).profile;
        for planet in a.named("planet") {
            let into_sun = depth_inside(&planet.profile, sun);
            let into_ring = excursion_outside(&planet.profile, ring);
            assert!(
                into_sun < CONTACT_TOLERANCE && into_ring < CONTACT_TOLERANCE,
                "{} at phase {phase}: sun {into_sun}, ring {into_ring}",
                planet.body
            );
        }
    }
}

#[test]
fn compound_planetary_meshes_on_both_stages() {
    let k = CompoundPlanetary::kinematics("s1", "r2", &["r1"]).unwrap();
    let params = CompoundPlanetaryParams::new(ToothCounts::new(5, 2, 1), ToothCounts::new(4, 1, 2), 3);
    let gear = CompoundPlanetary::new(k, params).unwrap();
    for phase in [0.0, 0.3, 1.1] {
        let a = gear.arrange(phase).unwrap();
        for stage in [1, 2] {
            let ring = &body(&a, BodyId::new("ring").stage(stage)).profile;
            let sun = &body(&a, BodyId::new("sun").stage(stage)).profile;
            for planet in a.named("planet").filter(|p| p.body.stage == Some(stage)) {
                let into_sun = depth_inside(&planet.profile, sun);
                let into_ring = excursion_outside(&planet.profile, ring);
                assert!(
                    into_sun < CONTACT_TOLERANCE && into_ring < CONTACT_TOLERANCE,
                    "{} at phase {phase}: sun {into_sun}, ring {into_ring}",
                    planet.body
                );
            }
        }
    }
}

#[test]
fn nabtesco_cranks_mesh_with_the_sun() {
    let k = Nabtesco::kinematics("s", "o", &["r"]).unwrap();
    let gear = Nabtesco::new(k, NabtescoParams::new(15, 8, 19)).unwrap();
    for phase in [0.0, 0.05, 0.2] {
        let a = gear.arrange(phase).unwrap();
        let sun = &body(&a, BodyId::new("sun")).profile;
        for crank in a.named("crank") {
            let depth = depth_inside(&crank.profile, sun);
            assert!(depth < CONTACT_TOLERANCE, "{} at phase {phase}: {depth}", crank.body);
        }
    }
}

#[test]
fn nabtesco_journals_sit_in_the_disc_holes() {
    let k = Nabtesco::kinematics("s", "o", &["r"]).unwrap();
    let gear = Nabtesco::new(k, NabtescoParams::new(15, 8, 19).with_resolution(100)).unwrap();
    for phase in [0.0, 0.07, 0.31] {
        let a = gear.arrange(phase).unwrap();
        let disc = body(&a, BodyId::new("disc")).profile.loops();
        for i in 0..3 {
            let hole = &disc[i + 1];
            let journal = &body(&a, BodyId::new("journal").index(i)).profile.loops()[0];
            let (hx, hy) = loop_centre(hole);
            let (jx, jy) = loop_centre(journal);
            assert!(
                (hx - jx).hypot(hy - jy) < 1e-9,
                "journal {i} is off its hole at phase {phase}"
            );
            assert!((loop_radius(hole) - loop_radius(journal)).abs() < 1e-9);
        }
    }
}

fn cycloid_with(params: CycloidParams) -> Cycloid {
    let k = Cycloid::kinematics("c", "p", &["r"]).unwrap();
    Cycloid::new(k, params).unwrap()
}

fn cycloid(lobes: usize, kind: LobeKind) -> Cycloid {
    cycloid_with(CycloidParams::new(lobes).with_kind(kind))
}

#[test]
fn output_pins_stay_inside_their_disc_holes() {
    let gear = cycloid_with(CycloidParams::new(10).with_output_pins(4));
    let e = gear.eccentricity();
    for phase in [0.0, 0.05, 0.13, 0.4] {
        let a = gear.arrange(phase).unwrap();
        let disc = body(&a, BodyId::new("disc")).profile.loops();
        let pins = body(&a, BodyId::new("output")).profile.loops();
        assert_eq!((disc.len(), pins.len()), (5, 4));
        for (k, pin) in pins.iter().enumerate() {
            let hole = &disc[k + 1];
            let (hx, hy) = loop_centre(hole);
            let (px, py) = loop_centre(pin);
            // the pin rides the hole wall, offset by the eccentricity
            assert!(((hx - px).hypot(hy - py) - e).abs() < 1e-9);
            let excursion = loop_excursion(pin, hole);
            assert!(
                excursion < CONTACT_TOLERANCE,
                "output pin {k} leaves its hole by {excursion} at phase {phase}"
            );
        }
    }
}

fn assert_pins_clear(disc: &LineString<Real>, pins: &[LineString<Real>], bearing: Real, what: &str) {
    let area = polygon(disc);
    for pin in pins {
        let (x, y) = loop_centre(pin);
        assert!(!geo::Contains::contains(&area, &geo::Point::new(x, y)), "{what}: pin inside");
        let clearance = distance_to_outline(x, y, disc);
        assert!(
            clearance > bearing - CONTACT_TOLERANCE,
            "{what}: pin at ({x:.3}, {y:.3}) is {clearance} from the disc"
        );
    }
}

#[test]
fn compound_cycloid_discs_roll_on_both_pin_rings() {
    let k = CompoundCycloid::kinematics("c", "r2", &["r1"]).unwrap();
    let gear = CompoundCycloid::new(k, CompoundCycloidParams::new(3, 4)).unwrap();
    let bearing = gear.params().bearing;
    for phase in [0.0, 0.05, 0.13, 0.3] {
        let a = gear.arrange(phase).unwrap();
        for stage in [1, 2] {
            let disc = &body(&a, BodyId::new("disc").stage(stage)).profile.loops()[0];
            let ring = body(&a, BodyId::new("ring").stage(stage)).profile.loops();
            assert_eq!(ring.len(), [4, 5][stage as usize - 1]);
            assert_pins_clear(disc, ring, bearing, &format!("stage {stage} at phase {phase}"));
        }
    }
}

#[test]
fn simple_pair_meshes_away_from_phase_zero() {
    let k = SimpleGear::kinematics("a", "b", &[]).unwrap();
    let gear = SimpleGear::new(k, 12, 18).unwrap();
    for phase in [0.05, 0.13, 0.2] {
        let a = gear.arrange(phase).unwrap();
        let first = &body(&a, BodyId::new("a")).profile;
        let second = &body(&a, BodyId::new("b")).profile;
        let (ab, ba) = (depth_inside(first, second), depth_inside(second, first));
        assert!(
            ab < CONTACT_TOLERANCE && ba < CONTACT_TOLERANCE,
            "phase {phase}: {ab}, {ba}"
        );
    }
}

#[test]
fn nested_rotor_stays_inside_its_stator() {
    let k = NestedGear::kinematics("a", "b", &[]).unwrap();
    let gear = NestedGear::new(k, 5).unwrap();
    for phase in [0.05, 0.13, 0.2] {
        let a = gear.arrange(phase).unwrap();
        let rotor = &body(&a, BodyId::new("a")).profile;
        let stator = &body(&a, BodyId::new("b")).profile;
        let excursion = excursion_outside(rotor, stator);
        assert!(excursion < CONTACT_TOLERANCE, "phase {phase}: {excursion}");
    }
}

#[test]
fn full_depth_cycloids_keep_simple_outlines() {
    // depth 1 puts cusps on the lobes; a bearing of 2 on six lobes is the tightest fit
    for params in [
        CycloidParams::new(10).with_depth(1.0),
        CycloidParams::new(6).with_depth(1.0).with_bearing(2.0),
        CycloidParams::new(10).with_depth(1.0).with_kind(LobeKind::Hypo),
    ] {
        let gear = cycloid_with(params.clone());
        let lobed = match params.kind {
            LobeKind::Epi => gear.templates()[1].profile.loops()[0].clone(),
            LobeKind::Hypo => gear.templates()[0].profile.loops()[0].clone(),
        };
        let crossings = self_crossings(&lobed);
        assert_eq!(crossings, 0, "{params:?}: outline crosses itself {crossings} times");

        let a = gear.arrange(0.05).unwrap();
        if params.kind == LobeKind::Epi {
            let disc = &body(&a, BodyId::new("disc")).profile.loops()[0];
            let pins = body(&a, BodyId::new("ring")).profile.loops();
            // round joins at the cusps are faceted; half the bearing is a safe floor
            assert_pins_clear(disc, pins, params.bearing / 2.0, "full depth");
        }
    }
}

#[test]
fn epicycloid_disc_rolls_on_the_ring_pins() {
    let gear = cycloid(10, LobeKind::Epi);
    let bearing = gear.params().bearing;
    for phase in [0.0, 0.05, 0.13] {
        let a = gear.arrange(phase).unwrap();
        let disc = &body(&a, BodyId::new("disc")).profile.loops()[0];
        let area = polygon(disc);
        let ring = &body(&a, BodyId::new("ring")).profile;
        assert_eq!(ring.loops().len(), 11);
        for pin in ring.loops() {
            let (x, y) = loop_centre(pin);
            assert!(!geo::Contains::contains(&area, &geo::Point::new(x, y)));
            let clearance = distance_to_outline(x, y, disc);
            assert!(
                clearance > bearing - CONTACT_TOLERANCE,
                "pin at ({x:.3}, {y:.3}) is {clearance} from the disc at phase {phase}"
            );
        }
    }
}

#[test]
fn hypocycloid_pins_stay_inside_the_ring() {
    let gear = cycloid(10, LobeKind::Hypo);
    let bearing = gear.params().bearing;
    for phase in [0.0, 0.05, 0.13] {
        let a = gear.arrange(phase).unwrap();
        let ring = &body(&a, BodyId::new("ring")).profile.loops()[0];
        let area = polygon(ring);
        let disc = &body(&a, BodyId::new("disc")).profile;
        assert_eq!(disc.loops().len(), 10);
        for pin in disc.loops() {
            let (x, y) = loop_centre(pin);
            assert!(geo::Contains::contains(&area, &geo::Point::new(x, y)));
            let clearance = distance_to_outline(x, y, ring);
            assert!(
                clearance > bearing - CONTACT_TOLERANCE,
                "pin at ({x:.3}, {y:.3}) is {clearance} from the ring at phase {phase}"
            );
        }
    }
}

#[test]
fn frames_follow_the_animation_step() {
    let gear = planetary();
    let step = gear.geometry().animation_step();
    let frames = gear.frames(3, None).unwrap();
    assert_eq!(frames.len(), 3);
    let sun = |a: &Arrangement| body(a, BodyId::new("sun")).profile.loops()[0].0[0];
    assert_eq!(sun(&frames[2]), sun(&gear.arrange(2.0 * step).unwrap()));
}
