//! Plain-text point export for CAD curve import.
//!
//! Every loop of every template profile is written as one text file of
//! `X Y Z` lines (8 decimals, space separated, no header), the format that
//! "curve through XYZ points" importers accept. Helical and herringbone
//! gears are described by three sections of the same loop: at `z = 0` and
//! at `z = ±thickness/2`, each twisted about the gear axis.
//!
//! Profiles are scaled so that the largest body of the train has the
//! requested outer diameter. Trains with a carrier also get its path: the
//! orbit of the planet (or crank) centres, scaled like the profiles.

use super::ExportError;
use crate::float_types::{DEFAULT_TOLERANCE, EPSILON, Real, TAU};
use crate::trains::{GearTrain, Template};
use geo::Coord;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwistKind {
    Helix,
    /// Twist grows with `|z|`, so both halves lean away from the middle.
    Herringbone,
}

impl std::str::FromStr for TwistKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helix" => Ok(TwistKind::Helix),
            "herringbone" => Ok(TwistKind::Herringbone),
            other => Err(format!("unknown twist `{other}`, expected `helix` or `herringbone`")),
        }
    }
}

/// Helix description shared by all gears of an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twist {
    pub kind: TwistKind,
    /// Helix angle of the base hand, in radians.
    pub angle: Real,
}

impl Twist {
    pub fn helix_degrees(angle: Real) -> Self {
        Self {
            kind: TwistKind::Helix,
            angle: angle.to_radians(),
        }
    }

    pub fn herringbone_degrees(angle: Real) -> Self {
        Self {
            kind: TwistKind::Herringbone,
            angle: angle.to_radians(),
        }
    }

    /// Twist named `helix` or `herringbone`; `spur` means none.
    pub fn from_name(name: &str, degrees: Real) -> Result<Option<Self>, String> {
        if name == "spur" {
            return Ok(None);
        }
        let kind = name.parse::<TwistKind>()?;
        Ok(Some(Self {
            kind,
            angle: degrees.to_radians(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Consecutive points closer than this (in output units) are merged.
    pub tolerance: Real,
    /// Outer diameter of the largest body after scaling.
    pub diameter: Real,
    /// Face width; sections are written at `0` and `±thickness/2`.
    pub thickness: Real,
    /// `None` exports straight (spur) sections.
    pub twist: Option<Twist>,
    pub carrier_points: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            diameter: 70.0,
            thickness: 10.0,
            twist: None,
            carrier_points: 200,
        }
    }
}

impl ExportConfig {
    /// `(file suffix, z)` of the three exported sections.
    pub fn sections(&self) -> [(&'static str, Real); 3] {
        let half = self.thickness / 2.0;
        [("z0", 0.0), ("z_pos", half), ("z_neg", -half)]
    }
}

/// What an export wrote and what it had to leave out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub scale: Real,
    pub written: Vec<PathBuf>,
    /// Labels of loops that collapsed below three points.
    pub skipped: Vec<String>,
    /// Carrier path, for trains that have a carrier.
    pub carrier: Option<PathBuf>,
}

fn distance(a: Coord<Real>, b: Coord<Real>) -> Real {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Keep a point only when it lies farther than `tolerance` from the last
/// kept point. The first point is always kept.
pub fn filter_close_points(points: &[Coord<Real>], tolerance: Real) -> Vec<Coord<Real>> {
    let mut out: Vec<Coord<Real>> = Vec::with_capacity(points.len());
    for &p in points {
        match out.last() {
            Some(&last) if distance(last, p) <= tolerance => {}
            _ => out.push(p),
        }
    }
    out
}

/// Append the first point unless the last one is already within `tolerance`
/// of it.
pub fn close_loop(mut points: Vec<Coord<Real>>, tolerance: Real) -> Vec<Coord<Real>> {
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if distance(first, last) > tolerance {
            points.push(first);
        }
    }
    points
}

/// Filter, then close. `None` when fewer than three distinct points remain.
pub fn prepare_loop(points: &[Coord<Real>], tolerance: Real) -> Option<Vec<Coord<Real>>> {
    let filtered = filter_close_points(points, tolerance);
    if filtered.len() < 3 {
        return None;
    }
    Some(close_loop(filtered, tolerance))
}

/// Scale factor that gives the largest template an outer diameter of
/// `diameter`.
pub fn scale_to_diameter(templates: &[Template<'_>], diameter: Real) -> Result<Real, ExportError> {
    let radius = templates
        .iter()
        .map(|t| t.profile.max_radius())
        .fold(0.0, Real::max);
    if radius <= EPSILON {
        return Err(ExportError::ZeroRadius("gear train".to_string()));
    }
    Ok(diameter / 2.0 / radius)
}

/// Lift `points` to height `z`, turning each about the origin by
/// `z·tan_helix/radius`. Herringbones use `|z|`; points on the axis stay put.
pub fn apply_twist(points: &[Coord<Real>], z: Real, tan_helix: Real, kind: TwistKind) -> Vec<[Real; 3]> {
    let height = match kind {
        TwistKind::Helix => z,
        TwistKind::Herringbone => z.abs(),
    };
    points
        .iter()
        .map(|p| {
            let radius = p.x.hypot(p.y);
            if radius < EPSILON {
                return [p.x, p.y, z];
            }
            let (sin, cos) = (height * tan_helix / radius).sin_cos();
            [p.x * cos - p.y * sin, p.x * sin + p.y * cos, z]
        })
        .collect()
}

pub fn write_points<W: Write>(out: &mut W, points: &[[Real; 3]]) -> std::io::Result<()> {
    for [x, y, z] in points {
        writeln!(out, "{x:.8} {y:.8} {z:.8}")?;
    }
    Ok(())
}

fn write_file(path: &Path, points: &[[Real; 3]]) -> Result<(), ExportError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_points(&mut out, points)?;
    out.flush()?;
    debug!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

/// Write the three sections of every loop of one template.
///
/// Single-loop profiles go to `{label}_{section}.txt`; profiles with several
/// loops (pin rings, discs with holes) number them as
/// `{label}_loop{k}_{section}.txt`.
pub fn export_profile(
    dir: &Path,
    template: &Template<'_>,
    scale: Real,
    config: &ExportConfig,
    report: &mut ExportReport,
) -> Result<(), ExportError> {
    let label = template.label();
    let loops = template.profile.loops();
    let tan_helix = config
        .twist
        .map(|t| t.angle.tan() * template.hand.sign())
        .unwrap_or(0.0);
    let kind = config.twist.map(|t| t.kind).unwrap_or(TwistKind::Helix);

    for (k, line) in loops.iter().enumerate() {
        let stem = if loops.len() == 1 {
            label.clone()
        } else {
            format!("{label}_loop{k}")
        };
        let scaled: Vec<Coord<Real>> = line
            .0
            .iter()
            .map(|c| Coord {
                x: c.x * scale,
                y: c.y * scale,
            })
            .collect();
        let Some(points) = prepare_loop(&scaled, config.tolerance) else {
            warn!("{stem}: fewer than 3 points after filtering, skipped");
            report.skipped.push(stem);
            continue;
        };
        for (suffix, z) in config.sections() {
            let path = dir.join(format!("{stem}_{suffix}.txt"));
            write_file(&path, &apply_twist(&points, z, tan_helix, kind))?;
            report.written.push(path);
        }
    }
    Ok(())
}

/// Circle of the planet centres, `points` samples with the end point equal
/// to the start.
pub fn export_carrier_path(dir: &Path, radius: Real, points: usize) -> Result<PathBuf, ExportError> {
    let last = points.saturating_sub(1).max(1) as Real;
    let path_points: Vec<[Real; 3]> = (0..points)
        .map(|i| {
            let a = TAU * i as Real / last;
            [radius * a.cos(), radius * a.sin(), 0.0]
        })
        .collect();
    let path = dir.join("carrier_path.txt");
    write_file(&path, &path_points)?;
    Ok(path)
}

/// Export every template of `train` into `dir`, creating it if needed.
pub fn export_train(dir: &Path, train: &dyn GearTrain, config: &ExportConfig) -> Result<ExportReport, ExportError> {
    if dir.is_file() {
        return Err(ExportError::MalformedPath(format!(
            "{} is a file, not a directory",
            dir.display()
        )));
    }
    fs::create_dir_all(dir)?;
    let templates = train.templates();
    let scale = scale_to_diameter(&templates, config.diameter)?;
    info!(
        "exporting {} bodies to {} at scale {scale:.6}",
        templates.len(),
        dir.display()
    );
    let mut report = ExportReport {
        scale,
        ..ExportReport::default()
    };
    for template in &templates {
        export_profile(dir, template, scale, config, &mut report)?;
    }
    if let Some(radius) = train.carrier_radius() {
        let path = export_carrier_path(dir, radius * scale, config.carrier_points)?;
        info!("carrier path written to {}", path.display());
        report.carrier = Some(path);
    }
    if !report.skipped.is_empty() {
        warn!("skipped {} degenerate loops", report.skipped.len());
    }
    Ok(report)
}
