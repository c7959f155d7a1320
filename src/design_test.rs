#![allow(clippy::float_cmp)]

use std::time::{Duration, Instant};

use super::*;
use crate::geometry::Viewport;
use crate::reducer::reduce;

fn make_element(id: &str, x: f64, y: f64) -> DesignElement {
    DesignElement::new(
        id.to_string(),
        "box",
        Position::new(x, y),
        Dimensions::new(100.0, 40.0),
    )
}

fn doc_with_elements(specs: &[(&str, f64, f64)]) -> Document {
    let mut doc = Document::default();
    for (id, x, y) in specs {
        doc = reduce(doc, Action::AddElement { element: make_element(id, *x, *y) });
    }
    doc
}

fn select(doc: Document, ids: &[&str]) -> Document {
    reduce(
        doc,
        Action::SelectElements { ids: ids.iter().map(|s| (*s).to_string()).collect() },
    )
}

fn canvas_rect() -> Rect {
    Rect { x: 0.0, y: 0.0, width: 1200.0, height: 800.0 }
}

// =============================================================
// Pointer-down: selection semantics
// =============================================================

#[test]
fn plain_click_on_unselected_element_replaces_selection() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 0.0)]), &["e1"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e2".to_string()),
        Position::new(210.0, 10.0),
        Modifiers::default(),
    );
    assert_eq!(
        actions,
        vec![Action::SelectElements { ids: vec!["e2".to_string()] }]
    );
}

#[test]
fn plain_click_on_selected_element_keeps_selection_for_multi_drag() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 0.0)]), &["e1", "e2"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e1".to_string()),
        Position::new(10.0, 10.0),
        Modifiers::default(),
    );
    assert!(actions.is_empty());
    assert!(!controller.is_idle());
}

#[test]
fn shift_click_adds_unselected_element() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 0.0)]), &["e1"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e2".to_string()),
        Position::new(210.0, 10.0),
        Modifiers { shift: true, ..Default::default() },
    );
    assert_eq!(
        actions,
        vec![Action::SelectElements { ids: vec!["e1".to_string(), "e2".to_string()] }]
    );
}

#[test]
fn shift_click_removes_selected_element() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 0.0)]), &["e1", "e2"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e1".to_string()),
        Position::new(10.0, 10.0),
        Modifiers { shift: true, ..Default::default() },
    );
    assert_eq!(
        actions,
        vec![Action::SelectElements { ids: vec!["e2".to_string()] }]
    );
}

#[test]
fn canvas_click_clears_selection_and_starts_pan() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0)]), &["e1"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::Canvas,
        Position::new(500.0, 500.0),
        Modifiers::default(),
    );
    assert_eq!(actions, vec![Action::SelectElements { ids: Vec::new() }]);
    assert!(!controller.is_idle());
}

#[test]
fn canvas_click_with_empty_selection_emits_nothing() {
    let doc = doc_with_elements(&[("e1", 0.0, 0.0)]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::Canvas,
        Position::new(500.0, 500.0),
        Modifiers::default(),
    );
    assert!(actions.is_empty());
}

// =============================================================
// Drag: zoom-compensated translation of the whole selection
// =============================================================

#[test]
fn drag_at_zoom_two_moves_by_half_the_screen_delta() {
    // 20 screen pixels at zoom 2 is 10 canvas units.
    let mut doc = doc_with_elements(&[("e1", 50.0, 50.0)]);
    doc.design_view.viewport.zoom = 2.0;
    let doc = select(doc, &["e1"]);

    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e1".to_string()),
        Position::new(100.0, 100.0),
        Modifiers::default(),
    );
    let actions = controller.apply_pointer_move(&doc, Position::new(120.0, 100.0));

    assert_eq!(
        actions,
        vec![Action::UpdateElement {
            id: "e1".to_string(),
            patch: ElementPatch {
                position: Some(Position::new(60.0, 50.0)),
                ..Default::default()
            },
        }]
    );
}

#[test]
fn drag_moves_every_selected_element_by_the_same_delta() {
    let doc = select(
        doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 100.0)]),
        &["e1", "e2"],
    );
    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e1".to_string()),
        Position::new(10.0, 10.0),
        Modifiers::default(),
    );
    let actions = controller.apply_pointer_move(&doc, Position::new(15.0, 18.0));

    assert_eq!(actions.len(), 2);
    let positions: Vec<Position> = actions
        .iter()
        .filter_map(|a| match a {
            Action::UpdateElement { patch, .. } => patch.position,
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec![Position::new(5.0, 8.0), Position::new(205.0, 108.0)]);
}

#[test]
fn drag_deltas_accumulate_across_moves() {
    // The controller tracks the last pointer position, so each move emits
    // only the increment. Dispatching between moves keeps positions exact.
    let mut doc = select(doc_with_elements(&[("e1", 0.0, 0.0)]), &["e1"]);
    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e1".to_string()),
        Position::new(0.0, 0.0),
        Modifiers::default(),
    );
    for (x, expected) in [(10.0, 10.0), (25.0, 25.0), (40.0, 40.0)] {
        let actions = controller.apply_pointer_move(&doc, Position::new(x, 0.0));
        for action in actions {
            doc = reduce(doc, action);
        }
        assert_eq!(doc.design_view.element("e1").unwrap().position.x, expected);
    }
}

// =============================================================
// Resize: single-selection gate and handle math
// =============================================================

#[test]
fn resize_requires_exactly_one_selected_element() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 0.0)]), &["e1", "e2"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::ResizeHandle("e1".to_string(), ResizeHandle::Se),
        Position::new(100.0, 40.0),
        Modifiers::default(),
    );
    assert!(actions.is_empty());
    assert!(controller.is_idle());
}

#[test]
fn resize_ignores_handle_on_a_different_element_than_the_selection() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0), ("e2", 200.0, 0.0)]), &["e1"]);
    let mut controller = DesignController::new();
    let actions = controller.on_pointer_down(
        &doc,
        PointerTarget::ResizeHandle("e2".to_string(), ResizeHandle::Se),
        Position::new(300.0, 40.0),
        Modifiers::default(),
    );
    assert!(actions.is_empty());
    assert!(controller.is_idle());
}

#[test]
fn resize_southeast_emits_patched_geometry() {
    let doc = select(doc_with_elements(&[("e1", 10.0, 10.0)]), &["e1"]);
    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::ResizeHandle("e1".to_string(), ResizeHandle::Se),
        Position::new(110.0, 50.0),
        Modifiers::default(),
    );
    let actions = controller.apply_pointer_move(&doc, Position::new(130.0, 60.0));

    assert_eq!(
        actions,
        vec![Action::UpdateElement {
            id: "e1".to_string(),
            patch: ElementPatch {
                position: Some(Position::new(10.0, 10.0)),
                dimensions: Some(Dimensions::new(120.0, 50.0)),
                ..Default::default()
            },
        }]
    );
}

#[test]
fn resize_uses_total_delta_from_gesture_start() {
    // Two moves from the same gesture compute against the starting geometry,
    // so an undispatched intermediate patch cannot skew the result.
    let doc = select(doc_with_elements(&[("e1", 10.0, 10.0)]), &["e1"]);
    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::ResizeHandle("e1".to_string(), ResizeHandle::E),
        Position::new(110.0, 30.0),
        Modifiers::default(),
    );
    controller.apply_pointer_move(&doc, Position::new(120.0, 30.0));
    let actions = controller.apply_pointer_move(&doc, Position::new(140.0, 30.0));

    let Some(Action::UpdateElement { patch, .. }) = actions.first() else {
        panic!("expected an element update");
    };
    assert_eq!(patch.dimensions, Some(Dimensions::new(130.0, 40.0)));
}

#[test]
fn resize_compensates_for_zoom() {
    let mut doc = doc_with_elements(&[("e1", 10.0, 10.0)]);
    doc.design_view.viewport.zoom = 2.0;
    let doc = select(doc, &["e1"]);

    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::ResizeHandle("e1".to_string(), ResizeHandle::E),
        Position::new(0.0, 0.0),
        Modifiers::default(),
    );
    let actions = controller.apply_pointer_move(&doc, Position::new(40.0, 0.0));

    let Some(Action::UpdateElement { patch, .. }) = actions.first() else {
        panic!("expected an element update");
    };
    assert_eq!(patch.dimensions, Some(Dimensions::new(120.0, 40.0)));
}

// =============================================================
// Pan
// =============================================================

#[test]
fn pan_emits_viewport_moved_inverse_to_pointer() {
    let doc = doc_with_elements(&[]);
    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::Canvas,
        Position::new(100.0, 100.0),
        Modifiers::default(),
    );
    let actions = controller.apply_pointer_move(&doc, Position::new(130.0, 90.0));

    assert_eq!(
        actions,
        vec![Action::SetDesignViewport {
            viewport: Viewport { position: Position::new(-30.0, 10.0), zoom: 1.0 },
        }]
    );
}

// =============================================================
// Pointer-up / idle
// =============================================================

#[test]
fn pointer_up_returns_to_idle_from_any_gesture() {
    let doc = select(doc_with_elements(&[("e1", 0.0, 0.0)]), &["e1"]);
    let mut controller = DesignController::new();
    controller.on_pointer_down(
        &doc,
        PointerTarget::Element("e1".to_string()),
        Position::new(0.0, 0.0),
        Modifiers::default(),
    );
    assert!(!controller.is_idle());

    let actions = controller.on_pointer_up();
    assert!(actions.is_empty());
    assert!(controller.is_idle());

    // Moves after pointer-up do nothing.
    let actions = controller.apply_pointer_move(&doc, Position::new(50.0, 50.0));
    assert!(actions.is_empty());
}

// =============================================================
// Throttle
// =============================================================

#[test]
fn throttle_admits_first_event_and_blocks_within_window() {
    let mut throttle = FrameThrottle::default();
    let t0 = Instant::now();
    assert!(throttle.ready_at(t0));
    assert!(!throttle.ready_at(t0 + Duration::from_millis(5)));
    assert!(!throttle.ready_at(t0 + Duration::from_millis(15)));
    assert!(throttle.ready_at(t0 + Duration::from_millis(16)));
}

#[test]
fn throttle_window_restarts_after_each_admitted_event() {
    let mut throttle = FrameThrottle::default();
    let t0 = Instant::now();
    assert!(throttle.ready_at(t0));
    assert!(throttle.ready_at(t0 + Duration::from_millis(20)));
    assert!(!throttle.ready_at(t0 + Duration::from_millis(30)));
    assert!(throttle.ready_at(t0 + Duration::from_millis(36)));
}

// =============================================================
// Palette drop
// =============================================================

#[test]
fn drop_inserts_at_canvas_position_and_selects_it() {
    let mut doc = doc_with_elements(&[]);
    doc.design_view.viewport = Viewport { position: Position::new(10.0, 20.0), zoom: 2.0 };

    let mut controller = DesignController::new();
    let actions = controller.on_drop(
        &doc,
        "button",
        Position::new(150.0, 90.0),
        &Rect { x: 100.0, y: 50.0, width: 800.0, height: 600.0 },
        Some("user-1"),
    );

    assert_eq!(actions.len(), 2);
    let Action::AddElement { element } = &actions[0] else {
        panic!("expected an insert first");
    };
    assert_eq!(element.position, Position::new(20.0, 10.0));
    assert_eq!(element.dimensions, Dimensions::new(100.0, 40.0));
    assert_eq!(element.component_type, "button");
    assert_eq!(element.meta.created_by.as_deref(), Some("user-1"));
    assert_eq!(element.meta.source.as_deref(), Some("palette"));

    let Action::SelectElements { ids } = &actions[1] else {
        panic!("expected a selection second");
    };
    assert_eq!(ids, &vec![element.id.clone()]);
}

#[test]
fn drop_snaps_to_grid_when_enabled() {
    let mut doc = doc_with_elements(&[]);
    doc.design_view.canvas.snap_to_grid = true;
    doc.design_view.canvas.grid_size = 8.0;

    let mut controller = DesignController::new();
    let actions = controller.on_drop(&doc, "box", Position::new(13.0, 3.0), &canvas_rect(), None);

    let Action::AddElement { element } = &actions[0] else {
        panic!("expected an insert");
    };
    assert_eq!(element.position, Position::new(16.0, 0.0));
}

#[test]
fn drop_does_not_snap_when_disabled() {
    let doc = doc_with_elements(&[]);
    let mut controller = DesignController::new();
    let actions = controller.on_drop(&doc, "box", Position::new(13.0, 3.0), &canvas_rect(), None);

    let Action::AddElement { element } = &actions[0] else {
        panic!("expected an insert");
    };
    assert_eq!(element.position, Position::new(13.0, 3.0));
}

#[test]
fn drop_styles_follow_the_editor_theme() {
    let mut doc = doc_with_elements(&[]);
    doc.settings.theme = "light".to_string();
    let mut controller = DesignController::new();
    let actions = controller.on_drop(&doc, "box", Position::new(0.0, 0.0), &canvas_rect(), None);

    let Action::AddElement { element } = &actions[0] else {
        panic!("expected an insert");
    };
    assert_eq!(element.props["background"], "#F5F5F5");
}

// =============================================================
// Default container
// =============================================================

#[test]
fn ensure_default_container_inserts_once() {
    let doc = Document::default();
    let Some(action) = DesignController::ensure_default_container(&doc) else {
        panic!("expected an insert on an empty document");
    };
    let Action::AddElement { ref element } = action else {
        panic!("expected an insert action");
    };
    assert_eq!(element.id, DEFAULT_CONTAINER_ID);
    assert_eq!(element.component_type, "container");
    assert_eq!(
        element.dimensions,
        Dimensions::new(doc.design_view.canvas.width, doc.design_view.canvas.height)
    );

    let doc = reduce(doc, action);
    assert!(DesignController::ensure_default_container(&doc).is_none());
}
