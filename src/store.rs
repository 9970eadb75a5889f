//! Named matrix persistence.
//!
//! The analysis functions never touch storage. Only the experiment layer uses a store, to
//! memoize matrices that are expensive to build (large TP matrices, MFPT).

use crate::{Error, Result};
use ndarray::{Array2, ArrayView2};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load/save matrices by name. Names may contain `/` to group related matrices.
pub trait MatrixStore {
    /// `Ok(None)` if nothing is stored under `name`.
    fn load(&self, name: &str) -> Result<Option<Array2<f64>>>;
    fn save(&mut self, name: &str, matrix: &ArrayView2<f64>) -> Result<()>;
}

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    matrices: HashMap<String, Array2<f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matrices.contains_key(name)
    }
}

impl MatrixStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<Array2<f64>>> {
        Ok(self.matrices.get(name).cloned())
    }

    fn save(&mut self, name: &str, matrix: &ArrayView2<f64>) -> Result<()> {
        self.matrices.insert(name.to_string(), matrix.to_owned());
        Ok(())
    }
}

/// One whitespace-delimited text file per matrix: `<root>/<name>.dat`, one row per line.
#[derive(Debug, Clone)]
pub struct TextStore {
    root: PathBuf,
}

impl TextStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.dat"))
    }
}

/// Parse a whitespace-delimited matrix. Blank lines are skipped; rows must have equal length.
pub fn parse_matrix(text: &str) -> Result<Array2<f64>> {
    let mut data = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0usize;
    for (line_idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut count = 0usize;
        for tok in line.split_whitespace() {
            let v: f64 = tok
                .parse()
                .map_err(|_| Error::Parse(format!("line {}: bad number {tok:?}", line_idx + 1)))?;
            data.push(v);
            count += 1;
        }
        match ncols {
            None => ncols = Some(count),
            Some(c) if c != count => {
                return Err(Error::Parse(format!(
                    "line {}: expected {c} columns, found {count}",
                    line_idx + 1
                )));
            }
            Some(_) => {}
        }
        nrows += 1;
    }
    let ncols = ncols.ok_or_else(|| Error::Parse("matrix has no rows".to_string()))?;
    Array2::from_shape_vec((nrows, ncols), data).map_err(|e| Error::Parse(e.to_string()))
}

/// Inverse of [`parse_matrix`]. Values use Rust's shortest round-trip formatting.
pub fn format_matrix(matrix: &ArrayView2<f64>) -> String {
    let mut out = String::new();
    for row in matrix.rows() {
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{v:e}");
        }
        out.push('\n');
    }
    out
}

impl MatrixStore for TextStore {
    fn load(&self, name: &str) -> Result<Option<Array2<f64>>> {
        let path = self.path_for(name);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "loading matrix");
        parse_matrix(&text).map(Some)
    }

    fn save(&mut self, name: &str, matrix: &ArrayView2<f64>) -> Result<()> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), rows = matrix.nrows(), "saving matrix");
        fs::write(&path, format_matrix(matrix))?;
        Ok(())
    }
}
