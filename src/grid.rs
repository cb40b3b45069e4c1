/// Voxel density field parsing and label transcription.
use crate::constants::RANDOM_DENSITY_RANGE;
use crate::error::{PipelineError, Result};
use rand::Rng;
use std::fs;
use std::io::Write;
use std::path::Path;

/// A 3D grid of scalar scatter densities, indexed `(x, y, z)`.
///
/// Storage is row-major with `x` contiguous, matching the text layout:
/// one row of `dim_x` values per `(z, y)` pair, `y` varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    dim_x: usize,
    dim_y: usize,
    dim_z: usize,
    values: Vec<f64>,
}

impl DensityGrid {
    /// Parse a density field from its plain-text form.
    ///
    /// The first three lines are the integer extents `dim_x`, `dim_y`,
    /// `dim_z`; each following line holds one `(z, y)` row of `dim_x`
    /// whitespace-separated floats. Trailing whitespace on a row is
    /// tolerated, extra tokens beyond `dim_x` are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let mut header = |name: &str, line: usize| -> Result<usize> {
            lines
                .next()
                .ok_or_else(|| PipelineError::MalformedGrid {
                    line,
                    reason: format!("missing {name} header line"),
                })?
                .trim()
                .parse::<usize>()
                .map_err(|e| PipelineError::MalformedGrid {
                    line,
                    reason: format!("cannot parse {name}: {e}"),
                })
        };
        let dim_x = header("dim_x", 1)?;
        let dim_y = header("dim_y", 2)?;
        let dim_z = header("dim_z", 3)?;

        let expected_rows = dim_y * dim_z;
        let mut values = Vec::with_capacity(dim_x * expected_rows);
        for row in 0..expected_rows {
            let line_no = row + 4;
            let line = lines
                .next()
                .ok_or(PipelineError::TruncatedInput {
                    expected: expected_rows,
                    found: row,
                })?;
            let mut tokens = line.split_whitespace();
            for col in 0..dim_x {
                let token = tokens.next().ok_or_else(|| PipelineError::MalformedGrid {
                    line: line_no,
                    reason: format!("expected {dim_x} values, found {col}"),
                })?;
                let value = token
                    .parse::<f64>()
                    .map_err(|e| PipelineError::MalformedGrid {
                        line: line_no,
                        reason: format!("cannot parse '{token}': {e}"),
                    })?;
                values.push(value);
            }
        }

        Ok(Self {
            dim_x,
            dim_y,
            dim_z,
            values,
        })
    }

    /// Load and parse a density field file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let grid = Self::parse(&text)?;
        log::info!(
            "loaded density grid {}x{}x{} from {}",
            grid.dim_x,
            grid.dim_y,
            grid.dim_z,
            path.display()
        );
        Ok(grid)
    }

    /// Generate a random density field, values uniform in `[0.1, 0.3]`.
    /// Draw order matches row order, so a seed fixes the whole field.
    pub fn random<R: Rng>(dims: (usize, usize, usize), rng: &mut R) -> Self {
        let (dim_x, dim_y, dim_z) = dims;
        let (lo, hi) = RANDOM_DENSITY_RANGE;
        let values = (0..dim_x * dim_y * dim_z)
            .map(|_| rng.gen_range(lo..hi))
            .collect();
        Self {
            dim_x,
            dim_y,
            dim_z,
            values,
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.dim_x, self.dim_y, self.dim_z)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[x + self.dim_x * (y + self.dim_y * z)]
    }

    /// Iterate `(z, y)` rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.dim_x.max(1))
    }

    /// Write the grid back out in its text form.
    ///
    /// This is the label format: a lossless, order-preserving transcript of
    /// the densities, six decimal places each, trailing space kept.
    pub fn write_label<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_header(writer, self.dims())?;
        for row in self.rows() {
            for value in row {
                write_density(writer, *value)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// Write the three-line integer extent header.
pub fn write_header<W: Write>(writer: &mut W, dims: (usize, usize, usize)) -> std::io::Result<()> {
    writeln!(writer, "{}\n{}\n{}", dims.0, dims.1, dims.2)
}

/// Write one density value in label format: six decimals, trailing space.
pub fn write_density<W: Write>(writer: &mut W, value: f64) -> std::io::Result<()> {
    write!(writer, "{value:.6} ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_worked_example() {
        let grid = DensityGrid::parse("2\n1\n1\n0.15 0.27\n").unwrap();
        assert_eq!(grid.dims(), (2, 1, 1));
        assert_eq!(grid.get(0, 0, 0), 0.15);
        assert_eq!(grid.get(1, 0, 0), 0.27);
    }

    #[test]
    fn label_matches_original_formatting() {
        let grid = DensityGrid::parse("2\n1\n1\n0.15 0.27\n").unwrap();
        let mut out = Vec::new();
        grid.write_label(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2\n1\n1\n0.150000 0.270000 \n"
        );
    }

    #[test]
    fn tolerates_trailing_split_artifact() {
        // A trailing space leaves an empty token after splitting; rows may
        // also carry more tokens than dim_x.
        let grid = DensityGrid::parse("2\n1\n1\n0.15 0.27 \n").unwrap();
        assert_eq!(grid.get(1, 0, 0), 0.27);
        let grid = DensityGrid::parse("1\n1\n1\n0.5 0.9\n").unwrap();
        assert_eq!(grid.get(0, 0, 0), 0.5);
    }

    #[test]
    fn label_round_trips_through_parser() {
        let mut rng = StdRng::seed_from_u64(99);
        let grid = DensityGrid::random((3, 2, 4), &mut rng);
        let mut out = Vec::new();
        grid.write_label(&mut out).unwrap();
        let reparsed = DensityGrid::parse(&String::from_utf8(out).unwrap()).unwrap();

        assert_eq!(reparsed.dims(), grid.dims());
        for (a, b) in grid.rows().flatten().zip(reparsed.rows().flatten()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn rejects_bad_header() {
        let err = DensityGrid::parse("two\n1\n1\n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedGrid { line: 1, .. }
        ));

        let err = DensityGrid::parse("2\n1\n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedGrid { line: 3, .. }
        ));
    }

    #[test]
    fn rejects_short_row() {
        let err = DensityGrid::parse("3\n1\n1\n0.1 0.2\n").unwrap_err();
        match err {
            PipelineError::MalformedGrid { line, reason } => {
                assert_eq!(line, 4);
                assert!(reason.contains("found 2"));
            }
            other => panic!("expected MalformedGrid, got {other}"),
        }
    }

    #[test]
    fn rejects_truncated_body() {
        let err = DensityGrid::parse("1\n2\n2\n0.1\n0.2\n0.3\n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TruncatedInput {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn random_grid_stays_in_density_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let grid = DensityGrid::random((4, 4, 2), &mut rng);
        for value in grid.rows().flatten() {
            assert!(*value >= 0.1 && *value < 0.3);
        }
    }
}
