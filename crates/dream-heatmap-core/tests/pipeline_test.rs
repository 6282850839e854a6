use dream_heatmap_core::pipeline::run;
use dream_heatmap_core::{
    Ascending, Axis, AxisTransform, ClusterOptions, CompositeIdMapper, DirectClusterer,
    Direction, Error, Id, IdMapper, MetaValue, MetadataTable, NumericMatrix, ReorderSpec,
    SplitSpec, compute_order, ids, split_by_columns,
};

fn matrix() -> NumericMatrix {
    NumericMatrix::from_rows(
        &[
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![0.0, 1.0],
            vec![10.0, 11.0],
            vec![5.0, f64::NAN],
        ],
        ids(["a", "b", "c", "d", "e"]),
        ids(["x", "y"]),
    )
    .unwrap()
}

fn row_metadata() -> MetadataTable {
    MetadataTable::new(["a", "b", "c", "d", "e"])
        .unwrap()
        .with_column("kind", ["t", "t", "t", "t", "solo"])
        .unwrap()
        .with_column(
            "score",
            [Some(3.0), None, Some(1.0), Some(2.0), Some(0.5)],
        )
        .unwrap()
}

fn adjacent(order: &[Id], x: &str, y: &str) -> bool {
    let px = order.iter().position(|id| id.as_str() == x).unwrap();
    let py = order.iter().position(|id| id.as_str() == y).unwrap();
    px.abs_diff(py) == 1
}

#[test]
fn identity_transform_returns_mapper_unchanged() {
    let m = matrix();
    let base = IdMapper::from_ids(m.row_ids().to_vec()).unwrap();
    let out = run(
        &base,
        &m,
        Axis::Row,
        None,
        &AxisTransform::default(),
        &mut DirectClusterer,
    )
    .unwrap();
    assert_eq!(out.mapper, base);
    assert!(out.cluster_results.is_none());
}

#[test]
fn split_then_cluster_per_group() {
    let m = matrix();
    let base = IdMapper::from_ids(m.row_ids().to_vec()).unwrap();
    let transform = AxisTransform {
        split: Some(SplitSpec::ByColumns(vec!["kind".to_string()])),
        cluster: Some(ClusterOptions::default()),
        reorder: Some(ReorderSpec {
            by: vec!["score".to_string()],
            ascending: Ascending::All(true),
        }),
    };
    let meta = row_metadata();
    let out = run(&base, &m, Axis::Row, Some(&meta), &transform, &mut DirectClusterer).unwrap();

    let order = out.mapper.visual_order();
    assert_eq!(out.mapper.gap_positions().iter().copied().collect::<Vec<_>>(), [4]);
    assert!(adjacent(order, "a", "c"));
    assert!(adjacent(order, "b", "d"));
    assert_eq!(order[4].as_str(), "e");

    let results = out.cluster_results.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results["t"].dendrogram_nodes.len(), 3);
    assert!(results["solo"].dendrogram_nodes.is_empty());
    assert_eq!(results["solo"].leaf_order, ids(["e"]));
}

#[test]
fn cluster_columns_uses_transposed_values() {
    let m = NumericMatrix::from_rows(
        &[vec![0.0, 9.0, 0.1, 9.2], vec![1.0, 7.0, 1.1, 7.1]],
        ids(["r1", "r2"]),
        ids(["c1", "c2", "c3", "c4"]),
    )
    .unwrap();
    let base = IdMapper::from_ids(m.col_ids().to_vec()).unwrap();
    let transform = AxisTransform {
        cluster: Some(ClusterOptions::default()),
        ..AxisTransform::default()
    };
    let out = run(&base, &m, Axis::Col, None, &transform, &mut DirectClusterer).unwrap();
    let order = out.mapper.visual_order();
    assert!(adjacent(order, "c1", "c3"));
    assert!(adjacent(order, "c2", "c4"));
}

#[test]
fn reorder_sorts_within_groups_with_missing_last() {
    let m = matrix();
    let base = IdMapper::from_ids(m.row_ids().to_vec()).unwrap();
    let transform = AxisTransform {
        reorder: Some(ReorderSpec {
            by: vec!["score".to_string()],
            ascending: Ascending::All(false),
        }),
        ..AxisTransform::default()
    };
    let meta = row_metadata();
    let out = run(&base, &m, Axis::Row, Some(&meta), &transform, &mut DirectClusterer).unwrap();
    assert_eq!(
        out.mapper.visual_order(),
        ids(["a", "d", "c", "e", "b"]).as_slice()
    );
}

#[test]
fn metadata_transforms_require_metadata() {
    let m = matrix();
    let base = IdMapper::from_ids(m.row_ids().to_vec()).unwrap();
    let transform = AxisTransform {
        split: Some(SplitSpec::ByColumns(vec!["kind".to_string()])),
        ..AxisTransform::default()
    };
    let err = run(&base, &m, Axis::Row, None, &transform, &mut DirectClusterer).unwrap_err();
    assert_eq!(err, Error::MissingMetadata { axis: Axis::Row });
}

#[test]
fn unsupported_cluster_names_surface_from_heron() {
    let err = ClusterOptions::parse("median-ish", "euclidean", true).unwrap_err();
    let err: Error = err.into();
    assert!(matches!(
        err,
        Error::Cluster(heron::Error::UnsupportedMethod { .. })
    ));
}

#[test]
fn compute_order_validates_arity_and_columns() {
    let meta = row_metadata();
    let err = compute_order(
        &ids(["a", "b"]),
        &meta,
        &["score".to_string()],
        &Ascending::PerKey(vec![true, false]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::ArityMismatch {
            what: "ascending flags",
            expected: 1,
            actual: 2
        }
    );

    let err = compute_order(&ids(["a"]), &meta, &["nope".to_string()], &Ascending::All(true))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { column, .. } if column == "nope"));
}

#[test]
fn compute_order_is_stable_across_keys() {
    let meta = MetadataTable::new(["p", "q", "r", "s"])
        .unwrap()
        .with_column("grade", [2i64, 1, 2, 1])
        .unwrap()
        .with_column("name", ["z", "y", "a", "y"])
        .unwrap();
    let order = compute_order(
        &ids(["p", "q", "r", "s"]),
        &meta,
        &["grade".to_string(), "name".to_string()],
        &Ascending::PerKey(vec![true, false]),
    )
    .unwrap();
    assert_eq!(order, ids(["q", "s", "p", "r"]));
}

#[test]
fn categories_follow_first_seen_order() {
    let meta = row_metadata();
    let cats = meta.categories("kind").unwrap();
    assert_eq!(cats.keys().collect::<Vec<_>>(), ["t", "solo"]);
    let groups = split_by_columns(&meta, &["kind".to_string()]).unwrap();
    assert_eq!(groups, cats);
    assert_eq!(
        meta.value(meta.column("score").unwrap(), &Id::from("b")),
        MetaValue::Missing
    );
}

#[test]
fn composite_resolves_ranges_across_panels() {
    let left = IdMapper::from_ids(["a", "b", "c"]).unwrap();
    let right = IdMapper::from_ids(["x", "y"]).unwrap();
    let composite = CompositeIdMapper::new(vec![left, right], Direction::Horizontal);

    assert_eq!(composite.total_size(), 5);
    assert_eq!(
        composite.panel_gap_positions().into_iter().collect::<Vec<_>>(),
        [3]
    );
    let hit = composite.resolve_range(2, 4);
    assert_eq!(hit.len(), 2);
    assert_eq!(hit[&0], ids(["c"]));
    assert_eq!(hit[&1], ids(["x"]));
    assert!(composite.resolve_range(10, 20).is_empty());
}
