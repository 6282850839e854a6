use crate::error::{Error, Result};
use crate::id::Id;
use crate::metadata::{MetaValue, MetadataTable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction: one flag for every key, or one per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ascending {
    All(bool),
    PerKey(Vec<bool>),
}

impl Default for Ascending {
    fn default() -> Self {
        Ascending::All(true)
    }
}

impl From<bool> for Ascending {
    fn from(value: bool) -> Self {
        Ascending::All(value)
    }
}

impl Ascending {
    fn resolve(&self, keys: usize) -> Result<Vec<bool>> {
        match self {
            Ascending::All(flag) => Ok(vec![*flag; keys]),
            Ascending::PerKey(flags) if flags.len() == keys => Ok(flags.clone()),
            Ascending::PerKey(flags) => Err(Error::ArityMismatch {
                what: "ascending flags",
                expected: keys,
                actual: flags.len(),
            }),
        }
    }
}

/// Stable multi-key sort of `ids` by the named metadata columns. Missing values go last in
/// either direction.
pub fn compute_order(
    ids: &[Id],
    metadata: &MetadataTable,
    by: &[String],
    ascending: &Ascending,
) -> Result<Vec<Id>> {
    let flags = ascending.resolve(by.len())?;
    let columns = by
        .iter()
        .map(|c| metadata.column(c))
        .collect::<Result<Vec<_>>>()?;

    let mut keyed: Vec<(Vec<MetaValue>, &Id)> = ids
        .iter()
        .map(|id| {
            let key = columns.iter().map(|c| metadata.value(c, id)).collect();
            (key, id)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        for ((x, y), &asc) in a.iter().zip(b).zip(&flags) {
            let ord = match (x.is_missing(), y.is_missing()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) if asc => x.compare(y),
                (false, false) => y.compare(x),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    tracing::trace!(keys = ?by, items = ids.len(), "computed metadata order");
    Ok(keyed.into_iter().map(|(_, id)| id.clone()).collect())
}
