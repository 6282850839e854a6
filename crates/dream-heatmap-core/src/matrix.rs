use crate::axis::Axis;
use crate::error::{Error, Result};
use crate::id::Id;
use nalgebra::DMatrix;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Value scaling applied before display or clustering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    #[default]
    None,
    /// Subtract the mean, divide by the sample standard deviation.
    ZScore,
    Center,
    /// Rescale to `[0, 1]`.
    MinMax,
}

/// A validated numeric matrix with its row and column ids. NaN marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMatrix {
    values: DMatrix<f64>,
    row_ids: Vec<Id>,
    col_ids: Vec<Id>,
    row_index: FxHashMap<Id, usize>,
    col_index: FxHashMap<Id, usize>,
}

fn index_ids(ids: &[Id]) -> Result<FxHashMap<Id, usize>> {
    if ids.is_empty() {
        return Err(Error::EmptyInput);
    }
    let mut index = FxHashMap::default();
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(Error::DuplicateIdentifier { id: id.clone() });
        }
    }
    Ok(index)
}

impl NumericMatrix {
    pub fn new(values: DMatrix<f64>, row_ids: Vec<Id>, col_ids: Vec<Id>) -> Result<Self> {
        let row_index = index_ids(&row_ids)?;
        let col_index = index_ids(&col_ids)?;
        if values.nrows() != row_ids.len() {
            return Err(Error::ArityMismatch {
                what: "matrix rows",
                expected: row_ids.len(),
                actual: values.nrows(),
            });
        }
        if values.ncols() != col_ids.len() {
            return Err(Error::ArityMismatch {
                what: "matrix columns",
                expected: col_ids.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self {
            values,
            row_ids,
            col_ids,
            row_index,
            col_index,
        })
    }

    /// Builds from row-major rows.
    pub fn from_rows(rows: &[Vec<f64>], row_ids: Vec<Id>, col_ids: Vec<Id>) -> Result<Self> {
        let ncols = col_ids.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(Error::ArityMismatch {
                what: "matrix row length",
                expected: ncols,
                actual: bad.len(),
            });
        }
        let values = DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]);
        Self::new(values, row_ids, col_ids)
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn row_ids(&self) -> &[Id] {
        &self.row_ids
    }

    pub fn col_ids(&self) -> &[Id] {
        &self.col_ids
    }

    pub fn ids(&self, axis: Axis) -> &[Id] {
        match axis {
            Axis::Row => &self.row_ids,
            Axis::Col => &self.col_ids,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    fn positions(index: &FxHashMap<Id, usize>, ids: &[Id]) -> Result<Vec<usize>> {
        ids.iter()
            .map(|id| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| Error::UnknownIdentifier { id: id.clone() })
            })
            .collect()
    }

    /// One row per id, all columns.
    pub fn rows_for(&self, ids: &[Id]) -> Result<DMatrix<f64>> {
        let rows = Self::positions(&self.row_index, ids)?;
        Ok(DMatrix::from_fn(rows.len(), self.values.ncols(), |i, j| {
            self.values[(rows[i], j)]
        }))
    }

    /// One row per column id (the transpose of the column slice), all matrix rows as features.
    pub fn cols_for(&self, ids: &[Id]) -> Result<DMatrix<f64>> {
        let cols = Self::positions(&self.col_index, ids)?;
        Ok(DMatrix::from_fn(cols.len(), self.values.nrows(), |i, j| {
            self.values[(j, cols[i])]
        }))
    }

    /// The items of `axis` as observation rows.
    pub fn items_for(&self, axis: Axis, ids: &[Id]) -> Result<DMatrix<f64>> {
        match axis {
            Axis::Row => self.rows_for(ids),
            Axis::Col => self.cols_for(ids),
        }
    }

    pub fn slice(&self, row_ids: &[Id], col_ids: &[Id]) -> Result<Self> {
        let rows = Self::positions(&self.row_index, row_ids)?;
        let cols = Self::positions(&self.col_index, col_ids)?;
        let values = DMatrix::from_fn(rows.len(), cols.len(), |i, j| {
            self.values[(rows[i], cols[j])]
        });
        Self::new(values, row_ids.to_vec(), col_ids.to_vec())
    }

    /// `(min, max)` over finite values; `(0, 1)` when there are none.
    pub fn finite_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi { (0.0, 1.0) } else { (lo, hi) }
    }

    /// Scales every row (`Axis::Row`) or every column (`Axis::Col`) independently. NaN stays
    /// NaN and is ignored by the statistics.
    pub fn scaled(&self, scaling: Scaling, axis: Axis) -> Self {
        let mut values = self.values.clone();
        if scaling != Scaling::None {
            match axis {
                Axis::Row => {
                    for mut row in values.row_iter_mut() {
                        let current: Vec<f64> = row.iter().copied().collect();
                        let (shift, scale) = stats(&current, scaling);
                        row.apply(|v| *v = (*v - shift) / scale);
                    }
                }
                Axis::Col => {
                    for mut col in values.column_iter_mut() {
                        let current: Vec<f64> = col.iter().copied().collect();
                        let (shift, scale) = stats(&current, scaling);
                        col.apply(|v| *v = (*v - shift) / scale);
                    }
                }
            }
        }
        Self {
            values,
            ..self.clone()
        }
    }
}

/// `(shift, divisor)` for one vector. Degenerate spreads divide by 1.
fn stats(values: &[f64], scaling: Scaling) -> (f64, f64) {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let count = present.len();
    if count == 0 {
        return (0.0, 1.0);
    }
    let mean = present.iter().sum::<f64>() / count as f64;
    let nonzero = |s: f64| if s == 0.0 || !s.is_finite() { 1.0 } else { s };
    match scaling {
        Scaling::None => (0.0, 1.0),
        Scaling::Center => (mean, 1.0),
        Scaling::ZScore => {
            let var = if count > 1 {
                present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64
            } else {
                0.0
            };
            (mean, nonzero(var.sqrt()))
        }
        Scaling::MinMax => {
            let (lo, hi) = present
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            (lo, nonzero(hi - lo))
        }
    }
}
