use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Agglomerative linkage criterion (names follow the usual SciPy spelling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Method {
    Single,
    Complete,
    #[default]
    Average,
    Weighted,
    Centroid,
    Median,
    Ward,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Single,
        Method::Complete,
        Method::Average,
        Method::Weighted,
        Method::Centroid,
        Method::Median,
        Method::Ward,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Single => "single",
            Method::Complete => "complete",
            Method::Average => "average",
            Method::Weighted => "weighted",
            Method::Centroid => "centroid",
            Method::Median => "median",
            Method::Ward => "ward",
        }
    }

    /// Lance-Williams update: distance from `k` to the union of `a` and `b`.
    pub(crate) fn update(
        self,
        d_ka: f64,
        d_kb: f64,
        d_ab: f64,
        size_a: usize,
        size_b: usize,
        size_k: usize,
    ) -> f64 {
        let na = size_a as f64;
        let nb = size_b as f64;
        let nk = size_k as f64;
        match self {
            Method::Single => d_ka.min(d_kb),
            Method::Complete => d_ka.max(d_kb),
            Method::Average => (na * d_ka + nb * d_kb) / (na + nb),
            Method::Weighted => 0.5 * (d_ka + d_kb),
            Method::Ward => {
                let t = na + nb + nk;
                (((na + nk) * d_ka * d_ka + (nb + nk) * d_kb * d_kb - nk * d_ab * d_ab) / t)
                    .max(0.0)
                    .sqrt()
            }
            Method::Centroid => {
                let s = na + nb;
                ((na * d_ka * d_ka + nb * d_kb * d_kb) / s - na * nb * d_ab * d_ab / (s * s))
                    .max(0.0)
                    .sqrt()
            }
            Method::Median => (0.5 * d_ka * d_ka + 0.5 * d_kb * d_kb - 0.25 * d_ab * d_ab)
                .max(0.0)
                .sqrt(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnsupportedMethod {
                method: s.to_string(),
            })
    }
}

impl TryFrom<String> for Method {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Method> for &'static str {
    fn from(value: Method) -> Self {
        value.as_str()
    }
}

/// Pairwise distance metric between two items (rows of the input matrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Metric {
    #[default]
    Euclidean,
    Correlation,
    Cosine,
    Cityblock,
    Chebyshev,
    Braycurtis,
    Canberra,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Euclidean,
        Metric::Correlation,
        Metric::Cosine,
        Metric::Cityblock,
        Metric::Chebyshev,
        Metric::Braycurtis,
        Metric::Canberra,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Correlation => "correlation",
            Metric::Cosine => "cosine",
            Metric::Cityblock => "cityblock",
            Metric::Chebyshev => "chebyshev",
            Metric::Braycurtis => "braycurtis",
            Metric::Canberra => "canberra",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnsupportedMetric {
                metric: s.to_string(),
            })
    }
}

impl TryFrom<String> for Metric {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Metric> for &'static str {
    fn from(value: Metric) -> Self {
        value.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterOptions {
    pub method: Method,
    pub metric: Metric,
    /// Reorder sibling subtrees so adjacent leaves are as similar as possible. Topology and
    /// merge heights are unchanged.
    pub optimal_ordering: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            method: Method::Average,
            metric: Metric::Euclidean,
            optimal_ordering: true,
        }
    }
}

impl ClusterOptions {
    /// Builds options from user-facing names, rejecting anything outside the allow-lists.
    pub fn parse(method: &str, metric: &str, optimal_ordering: bool) -> Result<Self> {
        Ok(Self {
            method: method.parse()?,
            metric: metric.parse()?,
            optimal_ordering,
        })
    }

    /// Ward linkage is only meaningful on euclidean geometry; a correlation request falls back.
    pub fn effective_metric(&self) -> Metric {
        if self.method == Method::Ward && self.metric == Metric::Correlation {
            Metric::Euclidean
        } else {
            self.metric
        }
    }
}
