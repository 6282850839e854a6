use crate::algo::Metric;
use nalgebra::DMatrix;

/// Upper-triangular pairwise distances, `n * (n - 1) / 2` entries.
#[derive(Debug, Clone)]
pub struct Condensed {
    n: usize,
    values: Vec<f64>,
}

impl Condensed {
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - i * (i + 1) / 2 + (j - i - 1)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        self.values[self.offset(i, j)]
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        let at = self.offset(i, j);
        self.values[at] = value;
    }
}

/// Copies the matrix into one row vector per item, replacing missing (NaN) entries with the mean
/// of the row's observed values. A row with no observed values becomes all zeros.
///
/// The imputed values are only ever used for distances.
pub fn impute_row_means(data: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..data.nrows())
        .map(|i| {
            let mut row: Vec<f64> = data.row(i).iter().copied().collect();
            let (sum, count) = row
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count < row.len() {
                let fill = if count == 0 { 0.0 } else { sum / count as f64 };
                for v in row.iter_mut().filter(|v| v.is_nan()) {
                    *v = fill;
                }
            }
            row
        })
        .collect()
}

pub fn pairwise(rows: &[Vec<f64>], metric: Metric) -> Condensed {
    let n = rows.len();
    let mut out = Condensed {
        n,
        values: vec![0.0; n * n.saturating_sub(1) / 2],
    };
    for i in 0..n {
        for j in (i + 1)..n {
            out.set(i, j, distance(&rows[i], &rows[j], metric));
        }
    }
    out
}

pub fn distance(u: &[f64], v: &[f64], metric: Metric) -> f64 {
    let pairs = u.iter().zip(v.iter());
    match metric {
        Metric::Euclidean => pairs.map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt(),
        Metric::Cityblock => pairs.map(|(a, b)| (a - b).abs()).sum(),
        Metric::Chebyshev => pairs.map(|(a, b)| (a - b).abs()).fold(0.0, f64::max),
        Metric::Cosine => cosine(u, v, 0.0, 0.0),
        Metric::Correlation => cosine(u, v, mean(u), mean(v)),
        Metric::Braycurtis => {
            let (num, den) = pairs.fold((0.0, 0.0), |(n, d), (a, b)| {
                (n + (a - b).abs(), d + (a + b).abs())
            });
            if den == 0.0 { 0.0 } else { num / den }
        }
        Metric::Canberra => pairs
            .map(|(a, b)| {
                let den = a.abs() + b.abs();
                if den == 0.0 { 0.0 } else { (a - b).abs() / den }
            })
            .sum(),
    }
}

fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

// Two zero-norm vectors are identical; one against anything else is at distance 1.
fn cosine(u: &[f64], v: &[f64], mu: f64, mv: f64) -> f64 {
    let mut dot = 0.0;
    let mut nu = 0.0;
    let mut nv = 0.0;
    for (a, b) in u.iter().zip(v.iter()) {
        let a = a - mu;
        let b = b - mv;
        dot += a * b;
        nu += a * a;
        nv += b * b;
    }
    match (nu == 0.0, nv == 0.0) {
        (true, true) => 0.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => (1.0 - dot / (nu.sqrt() * nv.sqrt())).max(0.0),
    }
}
