//! Text formats for matrices, kernels, and results
//!
//! Both input formats are streams of whitespace-separated integers; line
//! breaks carry no meaning.
//!
//! ```text
//! input:   rows cols  v00 v01 ... (rows * cols values)
//! kernel:  size       w00 w01 ... (size * size values)
//! ```
//!
//! Every declared dimension is checked against the values actually present,
//! so malformed files produce [`ConvError::Parse`] rather than partial data.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{ConvError, Kernel, Matrix, Result};

/// Cap on preallocation driven by a declared (unverified) size
const MAX_PREALLOC: usize = 1 << 20;

struct Tokens<'a> {
    what: &'static str,
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(what: &'static str, text: &'a str) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .flat_map(|(n, line)| line.split_whitespace().map(move |t| (n + 1, t)));
        Tokens {
            what,
            inner: Box::new(inner),
        }
    }

    fn int(&self, line: usize, token: &str, label: &str) -> Result<i64> {
        token.parse::<i64>().map_err(|_| {
            ConvError::parse(
                self.what,
                format!("line {line}: expected integer {label}, found {token:?}"),
            )
        })
    }

    fn next_dim(&mut self, label: &str) -> Result<usize> {
        let (line, token) = self.inner.next().ok_or_else(|| {
            ConvError::parse(self.what, format!("unexpected end of file, expected {label}"))
        })?;
        let value = self.int(line, token, label)?;
        if value <= 0 {
            return Err(ConvError::parse(
                self.what,
                format!("{label} must be positive, got {value}"),
            ));
        }
        usize::try_from(value)
            .map_err(|_| ConvError::parse(self.what, format!("{label} {value} is too large")))
    }

    fn values(&mut self, count: usize) -> Result<Vec<i64>> {
        let mut data = Vec::with_capacity(count.min(MAX_PREALLOC));
        for index in 0..count {
            let Some((line, token)) = self.inner.next() else {
                return Err(ConvError::parse(
                    self.what,
                    format!("expected {count} values, found {index}"),
                ));
            };
            data.push(self.int(line, token, "matrix value")?);
        }
        Ok(data)
    }

    fn finish(mut self) -> Result<()> {
        match self.inner.next() {
            None => Ok(()),
            Some((line, token)) => Err(ConvError::parse(
                self.what,
                format!("line {line}: unexpected trailing value {token:?}"),
            )),
        }
    }
}

fn cell_count(what: &'static str, a: usize, b: usize) -> Result<usize> {
    a.checked_mul(b)
        .ok_or_else(|| ConvError::parse(what, format!("dimensions {a}x{b} are too large")))
}

/// Parses an input matrix: `rows cols` followed by `rows * cols` integers
///
/// # Errors
///
/// Returns `Parse` on missing or non-integer values, non-positive dimensions,
/// or values beyond the declared count
///
/// # Example
///
/// ```
/// use convsoak::io::parse_matrix;
///
/// let m = parse_matrix("2 3\n1 2 3\n4 5 6\n").unwrap();
/// assert_eq!(m.shape(), (2, 3));
/// assert_eq!(m.get(1, 2), Some(6));
///
/// assert!(parse_matrix("2 2\n1 2\n3\n").is_err());
/// ```
pub fn parse_matrix(text: &str) -> Result<Matrix> {
    const WHAT: &str = "input";
    let mut toks = Tokens::new(WHAT, text);
    let rows = toks.next_dim("row count")?;
    let cols = toks.next_dim("column count")?;
    let data = toks.values(cell_count(WHAT, rows, cols)?)?;
    toks.finish()?;
    Matrix::from_vec(rows, cols, data)
}

/// Parses a kernel: `size` followed by `size * size` integers
///
/// # Errors
///
/// Returns `Parse` for malformed text (as [`parse_matrix`]) and
/// `InvalidKernel` when `size` is even
///
/// # Example
///
/// ```
/// use convsoak::io::parse_kernel;
///
/// let k = parse_kernel("3\n0 0 0\n0 1 0\n0 0 0\n").unwrap();
/// assert_eq!(k.size(), 3);
///
/// assert!(parse_kernel("2\n1 1\n1 1\n").is_err());
/// ```
pub fn parse_kernel(text: &str) -> Result<Kernel> {
    const WHAT: &str = "kernel";
    let mut toks = Tokens::new(WHAT, text);
    let size = toks.next_dim("kernel size")?;
    if size % 2 == 0 {
        return Err(ConvError::InvalidKernel(format!(
            "kernel size must be odd, got {size}"
        )));
    }
    let data = toks.values(cell_count(WHAT, size, size)?)?;
    toks.finish()?;
    Kernel::new(Matrix::from_vec(size, size, data)?)
}

fn read_text(what: &'static str, path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|source| ConvError::FileOpen {
        what,
        path: path.to_path_buf(),
        source,
    })?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

/// Reads and parses an input matrix file
///
/// # Errors
///
/// Returns `FileOpen` if the file cannot be opened, `Io` if it cannot be
/// read as UTF-8 text, and parse errors as [`parse_matrix`]
pub fn read_matrix_file(path: impl AsRef<Path>) -> Result<Matrix> {
    parse_matrix(&read_text("input", path.as_ref())?)
}

/// Reads and parses a kernel file
///
/// # Errors
///
/// As [`read_matrix_file`], plus `InvalidKernel` for even sizes
pub fn read_kernel_file(path: impl AsRef<Path>) -> Result<Kernel> {
    parse_kernel(&read_text("kernel", path.as_ref())?)
}

/// Renders the result block: `Result:` then one line per row, each value
/// followed by a space
///
/// # Example
///
/// ```
/// use convsoak::{io::format_result, Matrix};
///
/// let m = Matrix::from_rows(vec![vec![4, 6], vec![6, 9]]).unwrap();
/// assert_eq!(format_result(&m), "Result:\n4 6 \n6 9 \n");
/// ```
pub fn format_result(output: &Matrix) -> String {
    format!("Result:\n{output}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_line_breaks_not_significant() {
        let a = parse_matrix("2 2\n1 2\n3 4\n").unwrap();
        let b = parse_matrix("2 2 1 2 3 4").unwrap();
        let c = parse_matrix("  2\n2\n\n1\t2 3\n4").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_negative_values() {
        let m = parse_matrix("1 3\n-1 0 -7\n").unwrap();
        assert_eq!(m.as_slice(), &[-1, 0, -7]);
    }

    #[test]
    fn test_missing_values_counted() {
        let err = parse_matrix("2 2\n1 2 3\n").unwrap_err();
        assert_eq!(err.to_string(), "Malformed input: expected 4 values, found 3");
    }

    #[test]
    fn test_trailing_values_rejected() {
        let err = parse_matrix("1 1\n5\n6\n").unwrap_err();
        assert!(err.to_string().contains("line 3: unexpected trailing value \"6\""));
    }

    #[test]
    fn test_non_integer_token() {
        let err = parse_matrix("2 2\n1 x\n3 4\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("\"x\""));
    }

    #[test]
    fn test_bad_dimensions() {
        assert!(parse_matrix("").unwrap_err().to_string().contains("row count"));
        assert!(parse_matrix("0 3\n")
            .unwrap_err()
            .to_string()
            .contains("must be positive"));
        assert!(parse_matrix("3 -1\n").is_err());
        assert!(parse_matrix("3\n").is_err());
    }

    #[test]
    fn test_huge_declared_size_does_not_allocate() {
        let err = parse_matrix("100000000 100000000\n1 2 3\n").unwrap_err();
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_kernel_parsing() {
        let k = parse_kernel("1\n9\n").unwrap();
        assert_eq!(k.weight(0, 0), Some(9));

        let err = parse_kernel("4\n").unwrap_err();
        assert!(matches!(err, ConvError::InvalidKernel(_)));

        let err = parse_kernel("3\n1 1 1\n1 1 1\n").unwrap_err();
        assert!(err.to_string().starts_with("Malformed kernel"));
    }

    #[test]
    fn test_read_files() {
        let mut input = tempfile::NamedTempFile::new().unwrap();
        write!(input, "3 3\n1 1 1\n1 1 1\n1 1 1\n").unwrap();
        let mut kernel = tempfile::NamedTempFile::new().unwrap();
        write!(kernel, "3\n1 1 1\n1 1 1\n1 1 1\n").unwrap();

        let m = read_matrix_file(input.path()).unwrap();
        let k = read_kernel_file(kernel.path()).unwrap();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(k.size(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let err = read_kernel_file(&path).unwrap_err();
        match err {
            ConvError::FileOpen { what, path: p, .. } => {
                assert_eq!(what, "kernel");
                assert_eq!(p, path);
            }
            other => panic!("expected FileOpen, got {other:?}"),
        }
    }

    #[test]
    fn test_format_result_scenario() {
        let m = Matrix::from_rows(vec![vec![4, 6, 4], vec![6, 9, 6], vec![4, 6, 4]]).unwrap();
        assert_eq!(format_result(&m), "Result:\n4 6 4 \n6 9 6 \n4 6 4 \n");
    }
}
