//! The flat `.gal` file format.
//!
//! A file is a bare array of fixed-size records, one per body, with no header
//! and no endianness conversion:
//!
//! | field      | type |
//! |------------|------|
//! | x          | f64  |
//! | y          | f64  |
//! | mass       | f64  |
//! | vx         | f64  |
//! | vy         | f64  |
//! | brightness | f64  |

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use bytemuck::{Pod, Zeroable};
use log::{debug, warn};
use nalgebra::Vector2;

use super::{Bodies, Body};
use crate::{Error, Result};

/// One body as laid out on disk.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BodyRecord {
    pub x: f64,
    pub y: f64,
    pub mass: f64,
    pub vx: f64,
    pub vy: f64,
    pub brightness: f64,
}

pub const RECORD_SIZE: usize = std::mem::size_of::<BodyRecord>();

impl From<BodyRecord> for Body {
    fn from(record: BodyRecord) -> Self {
        Body::new(
            Vector2::new(record.x, record.y),
            Vector2::new(record.vx, record.vy),
            record.mass,
            record.brightness,
        )
    }
}

impl From<Body> for BodyRecord {
    fn from(body: Body) -> Self {
        Self {
            x: body.position.x,
            y: body.position.y,
            mass: body.mass,
            vx: body.velocity.x,
            vy: body.velocity.y,
            brightness: body.brightness,
        }
    }
}

/// Decode the first `n` records of `bytes`.
pub fn decode_bodies(bytes: &[u8], n: usize) -> Option<Bodies> {
    let bytes = bytes.get(..n.checked_mul(RECORD_SIZE)?)?;
    Some(
        bytes
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| Body::from(bytemuck::pod_read_unaligned::<BodyRecord>(chunk)))
            .collect(),
    )
}

/// Load `n` bodies from a `.gal` file.
///
/// Fails if the file cannot be read or holds fewer than `n` records.
/// Surplus records are ignored.
pub fn read_bodies(path: impl AsRef<Path>, n: usize) -> Result<Bodies> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

    let expected = n.saturating_mul(RECORD_SIZE);
    let bodies = decode_bodies(&bytes, n).ok_or_else(|| Error::TruncatedInput {
        path: path.to_path_buf(),
        expected,
        found: bytes.len(),
    })?;

    if bytes.len() > expected {
        warn!(
            "'{}' holds {} bytes, only the first {n} bodies are used",
            path.display(),
            bytes.len()
        );
    }
    debug!("loaded {n} bodies from '{}'", path.display());

    Ok(bodies)
}

/// Store all bodies in a `.gal` file.
///
/// The data is written to a temporary sibling first and renamed into place,
/// so `path` never holds a partially written result.
pub fn write_bodies(path: impl AsRef<Path>, bodies: &Bodies) -> Result<()> {
    let path = path.as_ref();
    let records: Vec<BodyRecord> = bodies.iter().map(BodyRecord::from).collect();

    let tmp = temporary_path(path);
    if let Err(e) = write_records(&tmp, &records) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::io(tmp, e));
    }
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    debug!("wrote {} bodies to '{}'", bodies.len(), path.display());

    Ok(())
}

fn write_records(path: &Path, records: &[BodyRecord]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(bytemuck::cast_slice(records))?;
    file.into_inner()?.sync_all()
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Largest distance between the positions of corresponding bodies.
pub fn max_position_difference(a: &Bodies, b: &Bodies) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    Ok(a.positions
        .iter()
        .zip(&b.positions)
        .map(|(p1, p2)| (p1 - p2).norm())
        .fold(0., f64::max))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("galsim-record-{}-{name}.gal", std::process::id()))
    }

    fn sample() -> Bodies {
        (0..7)
            .map(|i| {
                let x = f64::from(i);
                Body::new(
                    Vector2::new(0.1 * x, 1. / (x + 3.)),
                    Vector2::new(-1e-7 * x, std::f64::consts::PI * x),
                    1. / (x + 1.),
                    x.sqrt(),
                )
            })
            .collect()
    }

    #[test]
    fn record_layout() {
        assert_eq!(RECORD_SIZE, 48);

        let record = BodyRecord {
            x: 1.,
            y: 2.,
            mass: 3.,
            vx: 4.,
            vy: 5.,
            brightness: 6.,
        };
        let values: &[f64] = bytemuck::cast_slice(std::slice::from_ref(&record));
        assert_eq!(values, &[1., 2., 3., 4., 5., 6.]);
    }

    #[test]
    fn file_round_trip_is_bit_identical() {
        let path = scratch("round-trip");
        let bodies = sample();

        write_bodies(&path, &bodies).unwrap();
        let read = read_bodies(&path, bodies.len()).unwrap();
        fs::remove_file(&path).unwrap();

        for (b1, b2) in bodies.iter().zip(read.iter()) {
            assert_eq!(b1.position.x.to_bits(), b2.position.x.to_bits());
            assert_eq!(b1.position.y.to_bits(), b2.position.y.to_bits());
            assert_eq!(b1.velocity.x.to_bits(), b2.velocity.x.to_bits());
            assert_eq!(b1.velocity.y.to_bits(), b2.velocity.y.to_bits());
            assert_eq!(b1.mass.to_bits(), b2.mass.to_bits());
            assert_eq!(b1.brightness.to_bits(), b2.brightness.to_bits());
        }
        assert!(!temporary_path(&path).exists());
    }

    #[test]
    fn reads_prefix() {
        let path = scratch("prefix");
        let bodies = sample();

        write_bodies(&path, &bodies).unwrap();
        let read = read_bodies(&path, 3).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(read.len(), 3);
        assert_eq!(read.get(2), bodies.get(2));
    }

    #[test]
    fn truncated_input() {
        let path = scratch("truncated");
        fs::write(&path, [0u8; RECORD_SIZE * 2 + 5]).unwrap();

        let result = read_bodies(&path, 3);
        fs::remove_file(&path).unwrap();

        match result {
            Err(Error::TruncatedInput {
                expected, found, ..
            }) => {
                assert_eq!(expected, 3 * RECORD_SIZE);
                assert_eq!(found, 2 * RECORD_SIZE + 5);
            }
            other => panic!("expected truncated input, got {other:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let result = read_bodies(scratch("does-not-exist"), 1);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn position_difference() {
        let a = sample();
        let mut b = a.clone();
        assert_eq!(max_position_difference(&a, &b).unwrap(), 0.);

        b.positions[4] += Vector2::new(3., 4.);
        b.positions[1] += Vector2::new(0., 1.);
        assert_abs_diff_eq!(max_position_difference(&a, &b).unwrap(), 5., epsilon = 1e-12);

        let short = decode_bodies(&[0u8; RECORD_SIZE], 1).unwrap();
        assert!(matches!(
            max_position_difference(&a, &short),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
