use dream_heatmap_core::{IdMapper, ids};
use dream_heatmap_layout::{
    CellSizing, CompositeLayout, Edge, EdgeExtents, Error, GapSizes, LayoutComposer,
    LayoutConfig, LayoutInputs, LegendSize, Rect,
};
use serde_json::json;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn mapper(prefix: &str, n: usize) -> IdMapper {
    IdMapper::from_ids((0..n).map(|i| format!("{prefix}{i}"))).unwrap()
}

#[test]
fn small_matrix_clamps_to_max_cell_size() {
    let spec = LayoutComposer::default().compose(
        &mapper("r", 4),
        &mapper("c", 5),
        &LayoutInputs::default(),
    );
    assert_eq!(spec.row_cells.cell_size(), 50.0);
    assert_eq!(spec.col_cells.cell_size(), 50.0);
    assert_eq!(spec.heatmap, Rect::new(40.0, 40.0, 250.0, 200.0));
    assert_eq!(spec.total_width, 330.0);
    assert_eq!(spec.total_height, 280.0);
    assert!(spec.legend_panel.is_none());
    assert!(spec.title_y.is_none());
}

#[test]
fn budget_fit_with_dendrogram_title_gap_and_legend() {
    let split: indexmap::IndexMap<String, _> = [
        ("top".to_string(), ids((0..50).map(|i| format!("r{i}")))),
        ("bottom".to_string(), ids((50..100).map(|i| format!("r{i}")))),
    ]
    .into_iter()
    .collect();
    let rows = mapper("r", 100).apply_splits(&split).unwrap();
    let cols = mapper("c", 200);
    let inputs = LayoutInputs {
        row_dendrogram: Some(Edge::Left),
        legend: Some(LegendSize {
            width: 100.0,
            height: 300.0,
        }),
        has_title: true,
        ..LayoutInputs::default()
    };
    let spec = LayoutComposer::default().compose(&rows, &cols, &inputs);

    assert!(close(spec.col_cells.cell_size(), 4.4));
    assert!(close(spec.row_cells.cell_size(), 3.86));
    assert_eq!(spec.heatmap.x, 120.0);
    assert_eq!(spec.heatmap.y, 68.0);
    assert!(close(spec.heatmap.height, 392.0));

    let legend = spec.legend_panel.unwrap();
    assert!(close(legend.x, 1015.0));
    assert_eq!(legend.y, spec.heatmap.y);
    assert!(close(spec.total_width, 1120.0));
    assert!(close(spec.total_height, 500.0));
    assert!(close(spec.title_y.unwrap(), 59.6));

    let dendro = spec.row_dendrogram.unwrap();
    assert_eq!(dendro.x, 40.0);
    assert_eq!(dendro.width, 80.0);
    assert!(close(dendro.height, spec.heatmap.height));
    assert!(!dendro.intersects(&Rect::new(
        spec.heatmap.x + 1.0,
        spec.heatmap.y,
        spec.heatmap.width - 1.0,
        spec.heatmap.height
    )));
    assert!(!legend.intersects(&spec.heatmap));
}

#[test]
fn right_and_bottom_dendrograms_do_not_shift_origin() {
    let inputs = LayoutInputs {
        row_dendrogram: Some(Edge::Right),
        col_dendrogram: Some(Edge::Bottom),
        annotations: EdgeExtents::only(Edge::Right, 21.0),
        ..LayoutInputs::default()
    };
    let spec = LayoutComposer::default().compose(&mapper("r", 3), &mapper("c", 3), &inputs);
    assert_eq!(spec.heatmap.x, 40.0);
    assert_eq!(spec.heatmap.y, 40.0);
    let row = spec.row_dendrogram.unwrap();
    assert!(close(row.x, spec.heatmap.right() + 21.0));
    let col = spec.col_dendrogram.unwrap();
    assert!(close(col.y, spec.heatmap.bottom()));
    assert!(close(spec.total_width, row.right() + 40.0));
    assert!(close(spec.total_height, col.bottom() + 40.0));
}

#[test]
fn auto_target_caps_small_matrices() {
    let config = LayoutConfig {
        sizing: CellSizing::AutoTarget {
            target_cell_size: 20.0,
        },
        ..LayoutConfig::default()
    };
    let spec = LayoutComposer::new(config).compose(
        &mapper("r", 3),
        &mapper("c", 3),
        &LayoutInputs::default(),
    );
    assert_eq!(spec.row_cells.cell_size(), 20.0);
    assert_eq!(spec.heatmap.width, 60.0);
}

#[test]
fn huge_axis_clamps_to_min_cell_size() {
    let spec = LayoutComposer::default().compose_axes(
        1_000_000,
        &Default::default(),
        2,
        &Default::default(),
        &LayoutInputs::default(),
    );
    assert_eq!(spec.row_cells.cell_size(), 0.05);
}

#[test]
fn secondary_gaps_come_from_gap_sizes() {
    let mut gaps = GapSizes::uniform(8.0);
    gaps.overrides.insert(1, 3.0);
    gaps.overrides.insert(2, 8.0);
    let inputs = LayoutInputs {
        row_gaps: Some(gaps),
        ..LayoutInputs::default()
    };
    let spec = LayoutComposer::default().compose(&mapper("r", 4), &mapper("c", 2), &inputs);
    assert_eq!(spec.row_secondary_gaps, vec![1]);
    assert!(spec.col_secondary_gaps.is_empty());
}

#[test]
fn layout_serializes_renderer_shape() {
    let spec = LayoutComposer::default().compose(
        &mapper("r", 2),
        &mapper("c", 2),
        &LayoutInputs::default(),
    );
    let value = serde_json::to_value(&spec).unwrap();
    assert_eq!(value["heatmap"]["x"], json!(40.0));
    assert_eq!(value["rowPositions"], json!([40.0, 90.0]));
    assert_eq!(value["nCols"], json!(2));
    assert_eq!(value["rowDendroSide"], json!("left"));
    assert_eq!(value["colDendroSide"], json!("top"));
    assert!(value.get("legendPanel").is_none());
    assert!(value.get("titleY").is_none());
    assert!(value.get("rowSecondaryGaps").is_none());
}

#[test]
fn config_overrides_deep_merge_over_defaults() {
    let config = LayoutConfig::from_overrides(&json!({
        "maxWidth": 800.0,
        "sizing": { "mode": "autoTarget" }
    }))
    .unwrap();
    assert_eq!(config.max_width, 800.0);
    assert_eq!(config.padding, 40.0);
    assert_eq!(
        config.sizing,
        CellSizing::AutoTarget {
            target_cell_size: 20.0
        }
    );

    let err = LayoutConfig::from_overrides(&json!({ "padding": "wide" })).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn zero_sized_axes_degrade_gracefully() {
    let spec = LayoutComposer::default().compose_axes(
        0,
        &Default::default(),
        0,
        &Default::default(),
        &LayoutInputs::default(),
    );
    assert_eq!(spec.heatmap.width, 0.0);
    assert_eq!(spec.heatmap.height, 0.0);
    assert_eq!(spec.total_width, 80.0);
}

#[test]
fn composite_layouts_stack_panels() {
    let composer = LayoutComposer::default();
    let a = composer.compose(&mapper("r", 4), &mapper("c", 5), &LayoutInputs::default());
    let b = composer.compose(&mapper("r", 4), &mapper("c", 2), &LayoutInputs::default());

    let h = CompositeLayout::horizontal(vec![a.clone(), b.clone()], 20.0);
    assert_eq!(h.total_width, a.total_width + 20.0 + b.total_width);
    assert_eq!(h.total_height, a.total_height.max(b.total_height));
    assert_eq!(h.panel_origins(), vec![(0.0, 0.0), (a.total_width + 20.0, 0.0)]);

    let v = CompositeLayout::vertical(vec![a.clone(), b], 20.0);
    assert_eq!(v.total_height, 2.0 * a.total_height + 20.0);

    let empty = CompositeLayout::horizontal(Vec::new(), 20.0);
    assert_eq!((empty.total_width, empty.total_height), (0.0, 0.0));
}
