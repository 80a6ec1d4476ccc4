use crate::matrix::{Matrix, ShapeError};
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Field separator for every file this crate reads or writes.
pub const DELIMITER: char = '\t';

#[derive(Error, Debug)]
pub enum TsvError {
    #[error("Failed to open {}: {}", .path.display(), .source)]
    Open { path: PathBuf, source: io::Error },
    #[error("Failed to create {}: {}", .path.display(), .source)]
    Create { path: PathBuf, source: io::Error },
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },
    #[error("{}:{}:{}: cannot parse {:?} as a number", .path.display(), .line, .column, .field)]
    Parse { path: PathBuf, line: usize, column: usize, field: String },
    #[error("{}:{}: row has {} fields, expected {}", .path.display(), .line, .actual, .expected)]
    Shape { path: PathBuf, line: usize, expected: usize, actual: usize },
    #[error("{} contains no rows", .path.display())]
    Empty { path: PathBuf },
    #[error(transparent)]
    Layout(#[from] ShapeError),
}

/// A scalar that can live in a TSV cell.
///
/// Writers must emit text that `parse_field` turns back into the same value.
pub trait TsvField: Sized {
    fn parse_field(text: &str) -> Option<Self>;
    fn write_field<W: Write>(&self, out: &mut W) -> io::Result<()>;
}

impl TsvField for f32 {
    fn parse_field(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    // Debug is the shortest round-trip form and always keeps a `.` or exponent.
    fn write_field<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{:?}", self)
    }
}

impl TsvField for i64 {
    fn parse_field(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn write_field<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

/// Reads a tab-separated file into a rectangular matrix.
///
/// # Logic
/// Every line is one row, every tab-separated field one column. Surrounding
/// whitespace in a field is ignored. Blank lines at the end of the file are
/// dropped; a blank line followed by more data is a zero-field row and fails
/// the shape check.
///
/// # Errors
/// `Open` if the file is missing, `Parse` on a non-numeric field, `Shape` on
/// ragged rows and `Empty` if no row is present.
pub fn read_matrix<T: TsvField>(path: impl AsRef<Path>) -> Result<Matrix<T>, TsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TsvError::Open { path: path.to_path_buf(), source })?;
    let reader = BufReader::new(file);

    let mut data = Vec::new();
    let mut cols: Option<usize> = None;
    let mut rows = 0usize;
    let mut blank_at: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| TsvError::Io { path: path.to_path_buf(), source })?;

        if line.trim().is_empty() {
            blank_at.get_or_insert(line_no);
            continue;
        }
        if let Some(blank) = blank_at {
            return Err(TsvError::Shape {
                path: path.to_path_buf(),
                line: blank,
                expected: cols.unwrap_or(0),
                actual: 0,
            });
        }

        let before = data.len();
        for (col, field) in line.split(DELIMITER).enumerate() {
            let field = field.trim();
            let value = T::parse_field(field).ok_or_else(|| TsvError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                column: col + 1,
                field: field.to_string(),
            })?;
            data.push(value);
        }

        let width = data.len() - before;
        match cols {
            None => cols = Some(width),
            Some(expected) if expected != width => {
                return Err(TsvError::Shape { path: path.to_path_buf(), line: line_no, expected, actual: width });
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.ok_or_else(|| TsvError::Empty { path: path.to_path_buf() })?;
    debug!("Read {}x{} matrix from {}", rows, cols, path.display());

    Ok(Matrix::from_vec(rows, cols, data)?)
}

/// Writes a matrix as tab-separated text, truncating any existing file.
pub fn write_matrix<T: TsvField>(path: impl AsRef<Path>, matrix: &Matrix<T>) -> Result<(), TsvError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| TsvError::Create { path: path.to_path_buf(), source })?;
    let mut out = BufWriter::new(file);

    write_rows(&mut out, matrix)
        .and_then(|_| out.flush())
        .map_err(|source| TsvError::Io { path: path.to_path_buf(), source })?;

    debug!("Wrote {}x{} matrix to {}", matrix.rows(), matrix.cols(), path.display());
    Ok(())
}

fn write_rows<T: TsvField, W: Write>(out: &mut W, matrix: &Matrix<T>) -> io::Result<()> {
    for row in matrix.rows_iter() {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                write!(out, "{}", DELIMITER)?;
            }
            value.write_field(out)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_text(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_read_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "xb.txt", "0\t0\n1\t0\n0 \t 1\n10\t10\n");

        let m: Matrix<f32> = read_matrix(&path).unwrap();
        assert_eq!(m.rows(), 4);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.row(2), &[0.0, 1.0]);
        assert_eq!(m.row(3), &[10.0, 10.0]);
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "xb.txt", "1\t2\n3\t4\n\n\n");
        let m: Matrix<f32> = read_matrix(&path).unwrap();
        assert_eq!(m.rows(), 2);
    }

    #[test]
    fn test_blank_line_inside_data_is_shape_error() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "xb.txt", "1\t2\n\n3\t4\n");
        match read_matrix::<f32>(&path) {
            Err(TsvError::Shape { line, actual, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(actual, 0);
            }
            other => panic!("expected shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.txt");
        let err = read_matrix::<f32>(&path).unwrap_err();
        assert!(matches!(err, TsvError::Open { .. }));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn test_non_numeric_field() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "xb.txt", "1\t2\n3\tabc\n");
        match read_matrix::<f32>(&path) {
            Err(TsvError::Parse { line, column, field, .. }) => {
                assert_eq!((line, column), (2, 2));
                assert_eq!(field, "abc");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "xb.txt", "1\t2\t3\n4\t5\n");
        match read_matrix::<f32>(&path) {
            Err(TsvError::Shape { line, expected, actual, .. }) => {
                assert_eq!((line, expected, actual), (2, 3, 2));
            }
            other => panic!("expected shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "xb.txt", "");
        assert!(matches!(read_matrix::<f32>(&path), Err(TsvError::Empty { .. })));
    }

    #[test]
    fn test_write_format() {
        let dir = TempDir::new().unwrap();
        let d = Matrix::from_rows(vec![vec![0.0f32, 1.0], vec![0.5, f32::MAX]]).unwrap();
        let i = Matrix::from_rows(vec![vec![0i64, 1], vec![3, -1]]).unwrap();

        let d_path = dir.path().join("D.txt");
        let i_path = dir.path().join("I.txt");
        write_matrix(&d_path, &d).unwrap();
        write_matrix(&i_path, &i).unwrap();

        assert_eq!(fs::read_to_string(&d_path).unwrap(), "0.0\t1.0\n0.5\t3.4028235e38\n");
        assert_eq!(fs::read_to_string(&i_path).unwrap(), "0\t1\n3\t-1\n");
    }

    #[test]
    fn test_write_truncates() {
        let dir = TempDir::new().unwrap();
        let path = write_text(&dir, "I.txt", "9\t9\t9\n9\t9\t9\n9\t9\t9\n");
        let m = Matrix::from_rows(vec![vec![1i64]]).unwrap();
        write_matrix(&path, &m).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n");
    }

    proptest! {
        #[test]
        fn prop_write_read_roundtrip(
            (rows, cols) in (1usize..20, 1usize..8),
            seed in prop::collection::vec(-1.0e6f32..1.0e6, 160),
        ) {
            let data: Vec<f32> = seed.into_iter().cycle().take(rows * cols).collect();
            let original = Matrix::from_vec(rows, cols, data).unwrap();

            let dir = TempDir::new().unwrap();
            let path = dir.path().join("m.txt");
            write_matrix(&path, &original).unwrap();
            let first: Matrix<f32> = read_matrix(&path).unwrap();
            write_matrix(&path, &first).unwrap();
            let second: Matrix<f32> = read_matrix(&path).unwrap();

            prop_assert_eq!(&first, &original);
            prop_assert_eq!(&second, &original);
        }
    }
}
