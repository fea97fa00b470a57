use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{Bodies, Error, Result};

/// Writes the positions of all bodies after every time step as CSV.
///
/// The header is `t,x0,y0,x1,y1,...` and every row holds one time step.
#[derive(Debug)]
pub struct TrajectoryWriter<W: Write> {
    writer: W,
    path: PathBuf,
    num_bodies: usize,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>, num_bodies: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        Self::new(BufWriter::new(file), path, num_bodies)
    }
}

impl<W: Write> TrajectoryWriter<W> {
    /// Wrap `writer` and emit the header line. `path` is only used in error messages.
    pub fn new(mut writer: W, path: impl Into<PathBuf>, num_bodies: usize) -> Result<Self> {
        let path = path.into();
        let mut header = String::from("t");
        for i in 0..num_bodies {
            header.push_str(&format!(",x{i},y{i}"));
        }
        writeln!(writer, "{header}").map_err(|e| Error::io(&path, e))?;

        Ok(Self {
            writer,
            path,
            num_bodies,
        })
    }

    /// Append the row of time step `t`.
    pub fn write_step(&mut self, t: usize, bodies: &Bodies) -> Result<()> {
        if bodies.len() != self.num_bodies {
            return Err(Error::LengthMismatch {
                expected: self.num_bodies,
                found: bodies.len(),
            });
        }

        let mut row = t.to_string();
        for position in bodies.positions() {
            row.push_str(&format!(",{},{}", position.x, position.y));
        }
        writeln!(self.writer, "{row}").map_err(|e| Error::io(&self.path, e))
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;

    use super::*;

    fn bodies(x: f64) -> Bodies {
        Bodies::new(
            vec![Vector2::new(x, 0.5), Vector2::new(0.25, x)],
            vec![Vector2::zeros(); 2],
            vec![1.; 2],
            vec![1.; 2],
        )
    }

    #[test]
    fn header_and_rows() {
        let mut writer = TrajectoryWriter::new(Vec::new(), "memory", 2).unwrap();
        writer.write_step(0, &bodies(0.125)).unwrap();
        writer.write_step(1, &bodies(0.75)).unwrap();

        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            ["t,x0,y0,x1,y1", "0,0.125,0.5,0.25,0.125", "1,0.75,0.5,0.25,0.75"]
        );
    }

    #[test]
    fn wrong_number_of_bodies() {
        let mut writer = TrajectoryWriter::new(Vec::new(), "memory", 3).unwrap();
        assert!(matches!(
            writer.write_step(0, &bodies(0.5)),
            Err(Error::LengthMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn to_file() {
        let path =
            std::env::temp_dir().join(format!("galsim_trajectory_{}.csv", std::process::id()));

        let mut writer = TrajectoryWriter::create(&path, 2).unwrap();
        writer.write_step(0, &bodies(0.5)).unwrap();
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, "t,x0,y0,x1,y1\n0,0.5,0.5,0.25,0.5\n");
    }
}
