//! Partitioning ids into named groups.

use crate::error::{Error, REPORTED_IDS, Result};
use crate::id::Id;
use crate::metadata::MetadataTable;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

/// Joins the per-column values of a multi-column group key.
pub const GROUP_KEY_SEPARATOR: &str = "|";

/// Groups ids by the string form of their values in `columns`, joined with `|` when several.
///
/// Groups appear in first-seen order over the table's row order, never sorted, so a caller's
/// category order survives.
pub fn split_by_columns(
    metadata: &MetadataTable,
    columns: &[String],
) -> Result<IndexMap<String, Vec<Id>>> {
    if columns.is_empty() {
        return Err(Error::ArityMismatch {
            what: "split columns",
            expected: 1,
            actual: 0,
        });
    }
    let values = columns
        .iter()
        .map(|c| metadata.column(c))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: IndexMap<String, Vec<Id>> = IndexMap::new();
    let mut key = String::new();
    for (row, id) in metadata.ids().iter().enumerate() {
        key.clear();
        for (i, column) in values.iter().enumerate() {
            if i > 0 {
                key.push_str(GROUP_KEY_SEPARATOR);
            }
            key.push_str(&column[row].to_string());
        }
        match groups.get_mut(key.as_str()) {
            Some(ids) => ids.push(id.clone()),
            None => {
                groups.insert(key.clone(), vec![id.clone()]);
            }
        }
    }
    tracing::debug!(columns = ?columns, groups = groups.len(), "split by columns");
    Ok(groups)
}

/// Validates user-supplied groups against `universe` and returns them unchanged.
pub fn split_by_assignments(
    assignments: IndexMap<String, Vec<Id>>,
    universe: &[Id],
) -> Result<IndexMap<String, Vec<Id>>> {
    let known: FxHashSet<&Id> = universe.iter().collect();
    check_assignments(&assignments, universe, |id| known.contains(id))?;
    Ok(assignments)
}

/// Checks that `assignments` cover `universe` exactly once and returns each id's group index.
pub(crate) fn check_assignments<'a>(
    assignments: &'a IndexMap<String, Vec<Id>>,
    universe: &[Id],
    contains: impl Fn(&Id) -> bool,
) -> Result<FxHashMap<&'a Id, usize>> {
    let mut group_of: FxHashMap<&Id, usize> = FxHashMap::default();
    let mut duplicates = Vec::new();
    for (g, ids) in assignments.values().enumerate() {
        for id in ids {
            if group_of.insert(id, g).is_some() && duplicates.len() < REPORTED_IDS {
                duplicates.push(id.clone());
            }
        }
    }
    if !duplicates.is_empty() {
        return Err(Error::DuplicateAssignment { ids: duplicates });
    }

    let mut extra: Vec<Id> = group_of
        .keys()
        .filter(|id| !contains(id))
        .map(|id| (*id).clone())
        .collect();
    extra.sort();
    extra.truncate(REPORTED_IDS);
    let missing: Vec<Id> = universe
        .iter()
        .filter(|id| !group_of.contains_key(id))
        .take(REPORTED_IDS)
        .cloned()
        .collect();
    if !missing.is_empty() || !extra.is_empty() {
        return Err(Error::IncompleteAssignment { missing, extra });
    }
    Ok(group_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ids;

    #[test]
    fn multi_column_keys_keep_first_seen_order() {
        let table = MetadataTable::new(["a", "b", "c", "d"])
            .unwrap()
            .with_column("stage", ["late", "early", "late", "early"])
            .unwrap()
            .with_column("batch", [1i64, 1, 2, 1])
            .unwrap();
        let groups =
            split_by_columns(&table, &["stage".to_string(), "batch".to_string()]).unwrap();
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, ["late|1", "early|1", "late|2"]);
        assert_eq!(groups["early|1"], ids(["b", "d"]));
    }

    #[test]
    fn assignments_report_unknown_ids() {
        let mut explicit = IndexMap::new();
        explicit.insert("g".to_string(), ids(["a", "zz"]));
        let err = split_by_assignments(explicit, &ids(["a"])).unwrap_err();
        assert_eq!(
            err,
            Error::IncompleteAssignment {
                missing: vec![],
                extra: ids(["zz"]),
            }
        );
    }
}
