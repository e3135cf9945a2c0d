// main.rs
//
// Command line front-end: solve a gear train, export its profiles for CAD,
// or render an arrangement.

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use geartrain::float_types::Real;
use geartrain::io::xyz::{ExportConfig, Twist, export_train};
use geartrain::trains::GearTrain;
use geartrain::trains::angular_contact::{AngularContact, AngularContactParams};
use geartrain::trains::compound_cycloid::{CompoundCycloid, CompoundCycloidParams};
use geartrain::trains::compound_planetary::{CompoundPlanetary, CompoundPlanetaryParams};
use geartrain::trains::cycloid::{Cycloid, CycloidParams, LobeKind};
use geartrain::trains::nabtesco::{Nabtesco, NabtescoParams};
use geartrain::trains::planetary::{Planetary, PlanetaryParams, ToothCounts};
use geartrain::trains::simple::{NestedGear, SimpleGear};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process;

type CliResult<T> = Result<T, Box<dyn Error>>;

const TRAINS: [&str; 8] = [
    "simple",
    "nested",
    "planetary",
    "compound-planetary",
    "cycloid",
    "compound-cycloid",
    "nabtesco",
    "angular-contact",
];

/// Arguments shared by every subcommand: which train, how it is driven.
fn train_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("train")
                .required(true)
                .value_parser(TRAINS)
                .help("Gear train topology"),
        )
        .arg(
            Arg::new("teeth")
                .long("teeth")
                .short('t')
                .value_name("N,..")
                .value_delimiter(',')
                .value_parser(value_parser!(usize))
                .help("Tooth or lobe counts, e.g. 21,6,9 for ring, planet and sun"),
        )
        .arg(Arg::new("input").long("input").short('i').help("Driven degree of freedom"))
        .arg(Arg::new("output").long("output").short('o').help("Output degree of freedom"))
        .arg(
            Arg::new("fixed")
                .long("fixed")
                .short('f')
                .value_delimiter(',')
                .help("Constraints pinned to zero, e.g. r or rob,rib-rit"),
        )
        .arg(
            Arg::new("planets")
                .long("planets")
                .value_parser(value_parser!(usize))
                .default_value("3")
                .help("Planet or crank count"),
        )
        .arg(
            Arg::new("kind")
                .long("kind")
                .value_parser(["epi", "hypo"])
                .default_value("epi")
                .help("Cycloid lobe arrangement"),
        )
        .arg(
            Arg::new("output-pins")
                .long("output-pins")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Cycloid output pin count"),
        )
}

fn main() {
    env_logger::init();

    let matches = Command::new("geartrain")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Gear-train kinematics and tooth profile export")
        .subcommand_required(true)
        .subcommand(train_args(Command::new("ratio").about("Print the symbolic and numeric ratios")))
        .subcommand(
            train_args(Command::new("export").about("Write XYZ point files for CAD"))
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .short('d')
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("output"),
                )
                .arg(
                    Arg::new("diameter")
                        .long("diameter")
                        .value_parser(value_parser!(Real))
                        .default_value("70")
                        .help("Outer diameter of the largest body"),
                )
                .arg(
                    Arg::new("thickness")
                        .long("thickness")
                        .value_parser(value_parser!(Real))
                        .default_value("10")
                        .help("Face width"),
                )
                .arg(
                    Arg::new("twist")
                        .long("twist")
                        .value_parser(["spur", "helix", "herringbone"])
                        .default_value("spur"),
                )
                .arg(
                    Arg::new("helix-angle")
                        .long("helix-angle")
                        .value_parser(value_parser!(Real))
                        .default_value("20")
                        .help("Helix angle in degrees"),
                )
                .arg(
                    Arg::new("tolerance")
                        .long("tolerance")
                        .value_parser(value_parser!(Real))
                        .help("Merge distance for consecutive points"),
                ),
        )
        .subcommand(
            train_args(Command::new("render").about("Render arrangements to SVG or DXF"))
                .arg(
                    Arg::new("phase")
                        .long("phase")
                        .value_parser(value_parser!(Real))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("frames")
                        .long("frames")
                        .value_parser(value_parser!(usize))
                        .default_value("1")
                        .help("Number of frames, advanced by the animation step"),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("arrangement.svg")
                        .help("Output file; a .dxf extension selects DXF"),
                )
                .arg(
                    Arg::new("stroke")
                        .long("stroke")
                        .value_parser(value_parser!(Real))
                        .default_value("0.01"),
                ),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("ratio", sub)) => handle_ratio(sub),
        Some(("export", sub)) => handle_export(sub),
        Some(("render", sub)) => handle_render(sub),
        _ => Err("no subcommand given, see --help".into()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn required<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, name: &str) -> CliResult<&'a T> {
    matches
        .get_one::<T>(name)
        .ok_or_else(|| format!("missing argument `{name}`").into())
}

/// Default tooth counts and binding per train, overridable from the command line.
fn defaults(train: &str) -> (&'static [usize], &'static str, &'static str, &'static [&'static str]) {
    match train {
        "simple" => (&[12, 18], "a", "b", &[]),
        "nested" => (&[5], "a", "b", &[]),
        "compound-planetary" => (&[5, 2, 1, 4, 1, 2], "s1", "r2", &["r1"]),
        "cycloid" => (&[10], "c", "p", &["r"]),
        "compound-cycloid" => (&[3, 4], "c", "r2", &["r1"]),
        "nabtesco" => (&[15, 8, 19], "s", "o", &["r"]),
        "angular-contact" => (&[], "rib", "rot", &["rob", "rib-rit"]),
        _ => (&[21, 6, 9], "s", "c", &["r"]),
    }
}

fn teeth<const N: usize>(counts: &[usize], train: &str) -> CliResult<[usize; N]> {
    counts
        .try_into()
        .map_err(|_| format!("{train} takes {N} tooth counts, got {}", counts.len()).into())
}

fn build_train(matches: &ArgMatches) -> CliResult<Box<dyn GearTrain>> {
    let train = required::<String>(matches, "train")?.as_str();
    let (default_teeth, input, output, fixed) = defaults(train);
    let counts: Vec<usize> = matches
        .get_many::<usize>("teeth")
        .map(|v| v.copied().collect())
        .unwrap_or_else(|| default_teeth.to_vec());
    let input = matches.get_one::<String>("input").map_or(input, String::as_str);
    let output = matches.get_one::<String>("output").map_or(output, String::as_str);
    let fixed: Vec<&str> = match matches.get_many::<String>("fixed") {
        Some(values) => values.map(String::as_str).collect(),
        None => fixed.to_vec(),
    };
    let planets = *required::<usize>(matches, "planets")?;

    let built: Box<dyn GearTrain> = match train {
        "simple" => {
            let [a, b] = teeth(&counts, train)?;
            Box::new(SimpleGear::new(SimpleGear::kinematics(input, output, &fixed)?, a, b)?)
        }
        "nested" => {
            let [n] = teeth(&counts, train)?;
            Box::new(NestedGear::new(NestedGear::kinematics(input, output, &fixed)?, n)?)
        }
        "planetary" => {
            let [r, p, s] = teeth(&counts, train)?;
            let params = PlanetaryParams::new(ToothCounts::new(r, p, s), planets);
            Box::new(Planetary::new(Planetary::kinematics(input, output, &fixed)?, params)?)
        }
        "compound-planetary" => {
            let [r1, p1, s1, r2, p2, s2] = teeth(&counts, train)?;
            let params = CompoundPlanetaryParams::new(
                ToothCounts::new(r1, p1, s1),
                ToothCounts::new(r2, p2, s2),
                planets,
            );
            Box::new(CompoundPlanetary::new(
                CompoundPlanetary::kinematics(input, output, &fixed)?,
                params,
            )?)
        }
        "cycloid" => {
            let [lobes] = teeth(&counts, train)?;
            let kind: LobeKind = required::<String>(matches, "kind")?.parse()?;
            let params = CycloidParams::new(lobes)
                .with_kind(kind)
                .with_output_pins(*required::<usize>(matches, "output-pins")?);
            Box::new(Cycloid::new(Cycloid::kinematics(input, output, &fixed)?, params)?)
        }
        "compound-cycloid" => {
            let [first, second] = teeth(&counts, train)?;
            let kind: LobeKind = required::<String>(matches, "kind")?.parse()?;
            let params = CompoundCycloidParams::new(first, second).with_kind(kind);
            Box::new(CompoundCycloid::new(
                CompoundCycloid::kinematics(input, output, &fixed)?,
                params,
            )?)
        }
        "nabtesco" => {
            let [lobes, sun, crank] = teeth(&counts, train)?;
            let params = NabtescoParams::new(lobes, sun, crank).with_cranks(planets);
            Box::new(Nabtesco::new(Nabtesco::kinematics(input, output, &fixed)?, params)?)
        }
        "angular-contact" => Box::new(AngularContact::new(
            AngularContact::kinematics(input, output, &fixed)?,
            AngularContactParams::default(),
        )?),
        other => return Err(format!("unknown train `{other}`").into()),
    };
    Ok(built)
}

fn handle_ratio(matches: &ArgMatches) -> CliResult<()> {
    let train = build_train(matches)?;
    let geometry = train.geometry();
    println!("{}", geometry.kinematics());
    println!("{geometry}");
    for (dof, ratio) in geometry.ratios()? {
        println!("  {dof:>4} = {ratio} ({:.6})", geometry.ratio_of(dof)?);
    }
    Ok(())
}

fn handle_export(matches: &ArgMatches) -> CliResult<()> {
    let train = build_train(matches)?;
    let dir = required::<PathBuf>(matches, "dir")?;
    let angle = *required::<Real>(matches, "helix-angle")?;
    let twist = Twist::from_name(required::<String>(matches, "twist")?, angle)?;
    let mut config = ExportConfig {
        diameter: *required::<Real>(matches, "diameter")?,
        thickness: *required::<Real>(matches, "thickness")?,
        twist,
        ..ExportConfig::default()
    };
    if let Some(tolerance) = matches.get_one::<Real>("tolerance") {
        config.tolerance = *tolerance;
    }

    let report = export_train(dir, train.as_ref(), &config)?;
    if !matches.get_flag("quiet") {
        println!(
            "wrote {} files to {} (scale {:.6}, {} loops skipped)",
            report.written.len(),
            dir.display(),
            report.scale,
            report.skipped.len()
        );
    }
    Ok(())
}

fn handle_render(matches: &ArgMatches) -> CliResult<()> {
    let train = build_train(matches)?;
    let phase = *required::<Real>(matches, "phase")?;
    let frames = (*required::<usize>(matches, "frames")?).max(1);
    let file = required::<PathBuf>(matches, "file")?;
    let stroke = *required::<Real>(matches, "stroke")?;
    let step = train.geometry().animation_step();

    for i in 0..frames {
        let arrangement = train.arrange(phase + i as Real * step)?;
        let path = if frames == 1 {
            file.clone()
        } else {
            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
            let ext = file.extension().and_then(|s| s.to_str()).unwrap_or("svg");
            file.with_file_name(format!("{stem}_{i:04}.{ext}"))
        };
        let is_dxf = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("dxf"));
        if is_dxf {
            write_dxf(&arrangement, &path)?;
        } else {
            write_svg(&arrangement, &path, stroke)?;
        }
        info!("frame {i} written to {}", path.display());
    }
    if !matches.get_flag("quiet") {
        println!("{}", train.geometry());
    }
    Ok(())
}

#[cfg(feature = "svg-io")]
fn write_svg(arrangement: &geartrain::Arrangement, path: &std::path::Path, stroke: Real) -> CliResult<()> {
    std::fs::write(path, arrangement.to_svg(stroke))?;
    Ok(())
}

#[cfg(not(feature = "svg-io"))]
fn write_svg(_: &geartrain::Arrangement, _: &std::path::Path, _: Real) -> CliResult<()> {
    Err("SVG rendering needs the `svg-io` feature".into())
}

#[cfg(feature = "dxf-io")]
fn write_dxf(arrangement: &geartrain::Arrangement, path: &std::path::Path) -> CliResult<()> {
    std::fs::write(path, arrangement.to_dxf()?)?;
    Ok(())
}

#[cfg(not(feature = "dxf-io"))]
fn write_dxf(_: &geartrain::Arrangement, _: &std::path::Path) -> CliResult<()> {
    Err("DXF export needs the `dxf-io` feature".into())
}
