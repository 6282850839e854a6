use crate::error::{Error, REPORTED_IDS, Result};
use crate::id::Id;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One metadata cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl MetaValue {
    pub fn is_missing(&self) -> bool {
        match self {
            MetaValue::Missing => true,
            MetaValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            MetaValue::Integer(v) => Some(*v as f64),
            MetaValue::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        if self.is_missing() {
            return 3;
        }
        match self {
            MetaValue::Integer(_) | MetaValue::Float(_) => 0,
            MetaValue::Bool(_) => 1,
            _ => 2,
        }
    }

    /// Order of two present values: numbers, then booleans, then text.
    ///
    /// Missing values compare equal to each other and greater than everything else; callers that
    /// sort descending must keep them last themselves.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MetaValue::Bool(a), MetaValue::Bool(b)) => a.cmp(b),
            (MetaValue::Text(a), MetaValue::Text(b)) => a.cmp(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Integer(v) => write!(f, "{v}"),
            MetaValue::Float(v) if v.is_nan() => f.write_str("nan"),
            MetaValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::Bool(true) => f.write_str("True"),
            MetaValue::Bool(false) => f.write_str("False"),
            MetaValue::Text(s) => f.write_str(s),
            MetaValue::Missing => f.write_str("nan"),
        }
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MetaValue::Missing, Into::into)
    }
}

/// Per-axis metadata aligned 1:1 with that axis's ids.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTable {
    ids: Vec<Id>,
    index: FxHashMap<Id, usize>,
    columns: IndexMap<String, Vec<MetaValue>>,
}

impl MetadataTable {
    pub fn new<I, T>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        let ids: Vec<Id> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut index = FxHashMap::default();
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(Error::DuplicateIdentifier { id: id.clone() });
            }
        }
        Ok(Self {
            ids,
            index,
            columns: IndexMap::new(),
        })
    }

    /// Adds (or replaces) a column; `values[i]` belongs to `ids()[i]`.
    pub fn with_column<V: Into<MetaValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let values: Vec<MetaValue> = values.into_iter().map(Into::into).collect();
        if values.len() != self.ids.len() {
            return Err(Error::ArityMismatch {
                what: "metadata column",
                expected: self.ids.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name.into(), values);
        Ok(self)
    }

    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Result<&[MetaValue]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownColumn {
                column: name.to_string(),
                available: self.columns.keys().cloned().collect(),
            })
    }

    pub fn row_of(&self, id: &Id) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The value of `column` for `id`; `Missing` when the id is not in the table.
    pub fn value(&self, column: &[MetaValue], id: &Id) -> MetaValue {
        self.row_of(id)
            .and_then(|row| column.get(row))
            .cloned()
            .unwrap_or(MetaValue::Missing)
    }

    /// The same table with its rows in `ids` order. The table must describe exactly the ids given.
    pub fn aligned_to(&self, ids: &[Id]) -> Result<Self> {
        let wanted: FxHashSet<&Id> = ids.iter().collect();
        let missing: Vec<Id> = ids
            .iter()
            .filter(|id| !self.index.contains_key(*id))
            .take(REPORTED_IDS)
            .cloned()
            .collect();
        let extra: Vec<Id> = self
            .ids
            .iter()
            .filter(|id| !wanted.contains(id))
            .take(REPORTED_IDS)
            .cloned()
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(Error::MetadataMismatch { missing, extra });
        }
        let rows: Vec<usize> = ids.iter().filter_map(|id| self.row_of(id)).collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let values = rows.iter().map(|&row| values[row].clone()).collect();
                (name.clone(), values)
            })
            .collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Ok(Self {
            ids: ids.to_vec(),
            index,
            columns,
        })
    }

    /// `{category: [ids]}` in first-seen order over the table's natural row order.
    pub fn categories(&self, column: &str) -> Result<IndexMap<String, Vec<Id>>> {
        let values = self.column(column)?;
        let mut out: IndexMap<String, Vec<Id>> = IndexMap::new();
        for (id, value) in self.ids.iter().zip(values) {
            out.entry(value.to_string()).or_default().push(id.clone());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_category_labels() {
        assert_eq!(MetaValue::Integer(3).to_string(), "3");
        assert_eq!(MetaValue::Float(1.0).to_string(), "1.0");
        assert_eq!(MetaValue::Float(2.5).to_string(), "2.5");
        assert_eq!(MetaValue::Float(f64::NAN).to_string(), "nan");
        assert_eq!(MetaValue::Missing.to_string(), "nan");
        assert_eq!(MetaValue::from("x").to_string(), "x");
    }

    #[test]
    fn aligning_reorders_rows_to_the_axis() {
        let table = MetadataTable::new(["c", "a", "b"])
            .unwrap()
            .with_column("kind", ["z", "x", "y"])
            .unwrap();
        let axis: Vec<Id> = ["a", "b", "c"].into_iter().map(Id::from).collect();
        let aligned = table.aligned_to(&axis).unwrap();
        assert_eq!(aligned.ids(), axis.as_slice());
        assert_eq!(
            aligned.column("kind").unwrap(),
            &[MetaValue::from("x"), MetaValue::from("y"), MetaValue::from("z")]
        );
        assert_eq!(aligned.row_of(&Id::from("c")), Some(2));
    }

    #[test]
    fn aligning_rejects_a_different_id_set() {
        let table = MetadataTable::new(["c", "a", "zz"]).unwrap();
        let axis: Vec<Id> = ["a", "b", "c", "d"].into_iter().map(Id::from).collect();
        assert_eq!(
            table.aligned_to(&axis),
            Err(Error::MetadataMismatch {
                missing: vec![Id::from("b"), Id::from("d")],
                extra: vec![Id::from("zz")],
            })
        );
    }

    #[test]
    fn missing_sorts_after_everything() {
        let mut values = vec![
            MetaValue::Missing,
            MetaValue::from("b"),
            MetaValue::Integer(2),
            MetaValue::Float(0.5),
            MetaValue::Bool(true),
        ];
        values.sort_by(MetaValue::compare);
        assert_eq!(
            values,
            vec![
                MetaValue::Float(0.5),
                MetaValue::Integer(2),
                MetaValue::Bool(true),
                MetaValue::from("b"),
                MetaValue::Missing,
            ]
        );
    }
}
