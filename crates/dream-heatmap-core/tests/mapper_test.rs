use dream_heatmap_core::{DEFAULT_GROUP, Error, Id, IdMapper, ids};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};

fn groups(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<Id>> {
    entries
        .iter()
        .map(|(name, members)| (name.to_string(), ids(members.iter().copied())))
        .collect()
}

fn gaps(values: &[usize]) -> BTreeSet<usize> {
    values.iter().copied().collect()
}

fn split_abcd() -> IdMapper {
    IdMapper::from_ids(["a", "b", "c", "d"])
        .unwrap()
        .apply_splits(&groups(&[("g1", &["a", "b"]), ("g2", &["c", "d"])]))
        .unwrap()
}

/// Deterministic shuffle for permutation checks.
fn shuffled(items: &[Id], seed: u64) -> Vec<Id> {
    let mut out = items.to_vec();
    let mut state = seed;
    for i in (1..out.len()).rev() {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let j = (state >> 33) as usize % (i + 1);
        out.swap(i, j);
    }
    out
}

#[test]
fn from_ids_builds_one_implicit_group() {
    let m = IdMapper::from_ids(["x", "y", "z"]).unwrap();
    assert_eq!(m.size(), 3);
    assert_eq!(m.visual_order(), ids(["x", "y", "z"]).as_slice());
    assert!(m.gap_positions().is_empty());
    assert_eq!(m.groups().len(), 1);
    assert_eq!(m.groups()[0].name, DEFAULT_GROUP);
    assert!(!m.is_zoomed());
}

#[test]
fn from_ids_rejects_empty_and_duplicates() {
    assert_eq!(
        IdMapper::from_ids(Vec::<Id>::new()).unwrap_err(),
        Error::EmptyInput
    );
    assert_eq!(
        IdMapper::from_ids(["a", "b", "a"]).unwrap_err(),
        Error::DuplicateIdentifier { id: Id::from("a") }
    );
}

#[test]
fn split_inserts_gap_at_group_boundary() {
    let m = split_abcd();
    assert_eq!(m.visual_order(), ids(["a", "b", "c", "d"]).as_slice());
    assert_eq!(m.gap_positions(), &gaps(&[2]));
    assert_eq!(m.groups().len(), 2);
    assert!(m.check_invariants());
}

#[test]
fn split_keeps_current_relative_order_not_assignment_order() {
    let m = IdMapper::from_ids(["a", "b", "c", "d"])
        .unwrap()
        .apply_splits(&groups(&[("odd", &["c", "a"]), ("even", &["d", "b"])]))
        .unwrap();
    assert_eq!(m.visual_order(), ids(["a", "c", "b", "d"]).as_slice());
    assert_eq!(m.gap_positions(), &gaps(&[2]));
}

#[test]
fn split_skips_empty_groups() {
    let m = IdMapper::from_ids(["a", "b", "c"])
        .unwrap()
        .apply_splits(&groups(&[("g1", &["a"]), ("empty", &[]), ("g2", &["b", "c"])]))
        .unwrap();
    assert_eq!(m.groups().len(), 2);
    assert_eq!(m.gap_positions(), &gaps(&[1]));
}

#[test]
fn split_validates_coverage() {
    let base = IdMapper::from_ids(["a", "b", "c"]).unwrap();

    let dup = base
        .apply_splits(&groups(&[("g1", &["a", "b"]), ("g2", &["b", "c"])]))
        .unwrap_err();
    assert_eq!(dup, Error::DuplicateAssignment { ids: ids(["b"]) });

    let incomplete = base
        .apply_splits(&groups(&[("g1", &["a"]), ("g2", &["z"])]))
        .unwrap_err();
    assert_eq!(
        incomplete,
        Error::IncompleteAssignment {
            missing: ids(["b", "c"]),
            extra: ids(["z"]),
        }
    );
}

#[test]
fn reorder_within_groups_keeps_gaps() {
    let m = split_abcd()
        .apply_reorder_within_groups(&groups(&[("g1", &["b", "a"])]))
        .unwrap();
    assert_eq!(m.visual_order(), ids(["b", "a", "c", "d"]).as_slice());
    assert_eq!(m.gap_positions(), &gaps(&[2]));
}

#[test]
fn reorder_within_groups_validates_each_group() {
    let err = split_abcd()
        .apply_reorder_within_groups(&groups(&[("g2", &["c", "a"])]))
        .unwrap_err();
    assert_eq!(
        err,
        Error::NotAPermutation {
            group: Some("g2".to_string())
        }
    );
}

#[test]
fn reorder_within_groups_ignores_unknown_names() {
    let m = split_abcd();
    let same = m
        .apply_reorder_within_groups(&groups(&[("nope", &["x"])]))
        .unwrap();
    assert_eq!(same.visual_order(), m.visual_order());
}

#[test]
fn reorder_reslices_groups_at_existing_boundaries() {
    let m = split_abcd()
        .apply_reorder(&ids(["d", "c", "b", "a"]))
        .unwrap();
    assert_eq!(m.gap_positions(), &gaps(&[2]));
    assert_eq!(m.groups()[0].ids, ids(["d", "c"]));
    assert_eq!(m.groups()[1].ids, ids(["b", "a"]));
    assert!(m.check_invariants());
}

#[test]
fn reorder_rejects_non_permutations() {
    let m = IdMapper::from_ids(["a", "b", "c"]).unwrap();
    for bad in [
        ids(["a", "b"]),
        ids(["a", "b", "b"]),
        ids(["a", "b", "z"]),
        ids(["a", "b", "c", "d"]),
    ] {
        assert_eq!(
            m.apply_reorder(&bad).unwrap_err(),
            Error::NotAPermutation { group: None }
        );
    }
}

#[test]
fn zoom_remaps_gaps_into_window() {
    let m = split_abcd().apply_zoom(1, 4).unwrap();
    assert_eq!(m.visual_order(), ids(["b", "c", "d"]).as_slice());
    assert_eq!(m.gap_positions(), &gaps(&[1]));
    assert!(m.is_zoomed());
    assert!(m.check_invariants());
}

#[test]
fn zoom_drops_gaps_on_window_edges() {
    let m = split_abcd().apply_zoom(2, 4).unwrap();
    assert_eq!(m.visual_order(), ids(["c", "d"]).as_slice());
    assert!(m.gap_positions().is_empty());
    assert_eq!(m.groups().len(), 1);
    assert_eq!(m.groups()[0].name, "g2");
}

#[test]
fn zoom_clamps_and_rejects_empty_windows() {
    let m = split_abcd();
    assert_eq!(m.apply_zoom(-5, 99).unwrap().size(), 4);
    assert_eq!(
        m.apply_zoom(3, 3).unwrap_err(),
        Error::InvalidRange {
            start: 3,
            end: 3,
            size: 4
        }
    );
    assert!(matches!(
        m.apply_zoom(10, 20),
        Err(Error::InvalidRange { .. })
    ));
}

#[test]
fn zoom_retains_groups_for_unzoom() {
    let base = split_abcd()
        .apply_reorder_within_groups(&groups(&[("g2", &["d", "c"])]))
        .unwrap();
    let zoomed = base.apply_zoom(1, 3).unwrap();
    assert_eq!(zoomed.groups().len(), 2);
    assert_eq!(zoomed.retained_groups(), base.groups());

    let restored = zoomed.apply_zoom(0, 1).unwrap().unzoom();
    assert_eq!(restored.visual_order(), base.visual_order());
    assert_eq!(restored.gap_positions(), base.gap_positions());
    assert!(!restored.is_zoomed());
}

#[test]
fn reordering_a_zoomed_mapper_keeps_the_zoom() {
    let base = split_abcd();

    let zoomed = base.apply_zoom(1, 4).unwrap();
    let reordered = zoomed.apply_reorder(&ids(["d", "b", "c"])).unwrap();
    assert!(reordered.is_zoomed());
    assert_eq!(reordered.retained_groups(), base.groups());
    assert_eq!(reordered.gap_positions(), &gaps(&[1]));
    assert_eq!(reordered.unzoom(), base);

    let by_ids = base.apply_zoom_by_ids(&ids(["a", "c", "d"])).unwrap();
    let within = by_ids
        .apply_reorder_within_groups(&groups(&[("g2", &["d", "c"])]))
        .unwrap();
    assert_eq!(within.visual_order(), ids(["a", "d", "c"]).as_slice());
    assert!(within.gap_positions().is_empty());
    assert!(within.is_zoomed());
    assert_eq!(within.unzoom(), base);

    // A split always starts a new base.
    let resplit = zoomed
        .apply_splits(&groups(&[("only", &["b", "c", "d"])]))
        .unwrap();
    assert!(!resplit.is_zoomed());
    assert_eq!(resplit.unzoom(), resplit);
}

#[test]
fn zoom_by_ids_keeps_relative_order_and_drops_gaps() {
    let m = split_abcd()
        .apply_zoom_by_ids(&ids(["d", "a", "zzz"]))
        .unwrap();
    assert_eq!(m.visual_order(), ids(["a", "d"]).as_slice());
    assert!(m.gap_positions().is_empty());
    assert!(m.check_invariants());

    assert_eq!(
        split_abcd().apply_zoom_by_ids(&ids(["q"])).unwrap_err(),
        Error::EmptyResult
    );
}

#[test]
fn resolve_range_properties() {
    let m = split_abcd();
    assert_eq!(m.resolve_range(0, 4), m.visual_order());
    for a in -2..7 {
        assert!(m.resolve_range(a, a).is_empty());
    }
    assert!(m.resolve_range(3, 1).is_empty());
    // Spans the gap at 2.
    assert_eq!(m.resolve_range(1, 3), ids(["b", "c"]).as_slice());
    assert_eq!(m.resolve_range(-10, 1), ids(["a"]).as_slice());
}

#[test]
fn visual_index_of_tracks_transforms() {
    let m = split_abcd()
        .apply_reorder_within_groups(&groups(&[("g1", &["b", "a"])]))
        .unwrap();
    assert_eq!(m.visual_index_of("a"), Some(1));
    assert_eq!(m.visual_index_of(&Id::from("c")), Some(2));
    assert_eq!(m.visual_index_of("zzz"), None);
}

#[test]
fn permutation_invariant_over_transform_sequences() {
    let all = ids((0..40).map(|i| format!("id{i}")));
    let original: HashSet<Id> = all.iter().cloned().collect();
    let mut m = IdMapper::from_ids(all.clone()).unwrap();

    for round in 0..6u64 {
        let order = shuffled(m.visual_order(), round + 1);
        m = m.apply_reorder(&order).unwrap();

        let mut split: IndexMap<String, Vec<Id>> = IndexMap::new();
        for (i, id) in shuffled(&all, round + 100).into_iter().enumerate() {
            split.entry(format!("g{}", i % (round as usize + 2))).or_default().push(id);
        }
        m = m.apply_splits(&split).unwrap();

        let within: IndexMap<String, Vec<Id>> = m
            .groups()
            .iter()
            .map(|g| (g.name.clone(), shuffled(&g.ids, round + 7)))
            .collect();
        m = m.apply_reorder_within_groups(&within).unwrap();

        let seen: HashSet<Id> = m.visual_order().iter().cloned().collect();
        assert_eq!(seen, original);
        assert_eq!(m.visual_order().len(), original.len());
        assert!(m.check_invariants());
        assert!(m.gap_positions().iter().all(|&g| g > 0 && g < m.size()));
    }
}

#[test]
fn subset_invariant_after_zooms() {
    let all = ids((0..30).map(|i| format!("r{i}")));
    let mut split: IndexMap<String, Vec<Id>> = IndexMap::new();
    for (i, id) in all.iter().enumerate() {
        split.entry(format!("g{}", i % 4)).or_default().push(id.clone());
    }
    let base = IdMapper::from_ids(all).unwrap().apply_splits(&split).unwrap();
    let before = base.id_set();

    for (start, end) in [(0, 30), (3, 17), (7, 8), (20, 100)] {
        let z = base.apply_zoom(start, end).unwrap();
        assert!(z.id_set().is_subset(&before));
        assert!(z.check_invariants());

        let zz = z.apply_zoom(0, (z.size() as i64) / 2 + 1).unwrap();
        assert!(zz.id_set().is_subset(&z.id_set()));
        assert!(zz.check_invariants());
    }
}

#[test]
fn state_serializes_with_camel_case_fields() {
    let state = split_abcd().to_state();
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        serde_json::json!({
            "visualOrder": ["a", "b", "c", "d"],
            "gapPositions": [2],
            "size": 4,
        })
    );
}
