//! Pointer gesture state machine for the design canvas.
//!
//! The controller sits between raw pointer events and the reducer: each
//! handler reads the current [`Document`], computes the intended change, and
//! returns [`Action`]s for the host to dispatch. It never mutates document
//! state itself, so it stays correct no matter how the host schedules
//! dispatches.
//!
//! Gestures follow the pointer-down → pointer-move → pointer-up lifecycle:
//! down on an element starts a selection drag, down on a resize handle
//! starts a resize (single selection only), down on the empty canvas clears
//! the selection and starts a pan. Pointer-move work is throttled to roughly
//! one display frame; pointer-up always returns the machine to idle, even
//! when it lands outside the canvas bounds.

#[cfg(test)]
#[path = "design_test.rs"]
mod design_test;

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::action::Action;
use crate::consts::{DEFAULT_CONTAINER_ID, DROP_HEIGHT, DROP_WIDTH, POINTER_THROTTLE_MS};
use crate::doc::{new_id, DesignElement, Document, ElementId, ElementPatch};
use crate::geometry::{snap_to_grid, Dimensions, Position, Rect, ResizeHandle};

/// Keyboard modifier keys held during a pointer event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// What the pointer-down event landed on, as resolved by the host's hit
/// testing. Pan only starts when the target is literally the canvas
/// background, never a child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// The empty canvas background.
    Canvas,
    /// An element body.
    Element(ElementId),
    /// A resize handle on a selected element.
    ResizeHandle(ElementId, ResizeHandle),
}

/// The active gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// Moving the selected elements; the delta applies uniformly to all.
    DraggingSelection {
        /// Screen-space pointer position at the previous event.
        last_client: Position,
    },
    /// Resizing the single selected element from one of its eight handles.
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        /// Screen-space pointer position at gesture start.
        start_client: Position,
        /// Element geometry at gesture start.
        start_position: Position,
        start_dimensions: Dimensions,
    },
    /// Panning the viewport by dragging the canvas background.
    Panning {
        last_client: Position,
    },
}

/// Rate limiter approximating one update per display frame.
///
/// A scheduling courtesy to the host render layer, not a correctness
/// mechanism: the reducer stays correct at unbounded dispatch frequency.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    last: Option<Instant>,
}

impl FrameThrottle {
    /// Whether enough time has passed since the last admitted event,
    /// measured against `now`. Admitting an event records it.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        let window = Duration::from_millis(POINTER_THROTTLE_MS);
        match self.last {
            Some(last) if now.duration_since(last) < window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// [`FrameThrottle::ready_at`] against the wall clock.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }
}

/// The design-view interaction controller, scoped to one canvas lifetime.
#[derive(Debug, Default)]
pub struct DesignController {
    gesture: Gesture,
    throttle: FrameThrottle,
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}

impl DesignController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is currently in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Handle pointer-down on a resolved target.
    ///
    /// Selection semantics: a plain click on an unselected element replaces
    /// the selection; shift-click toggles membership; clicking an already
    /// selected element keeps the selection so a multi-drag can start; a
    /// click on the empty canvas clears the selection and enters pan mode.
    pub fn on_pointer_down(
        &mut self,
        doc: &Document,
        target: PointerTarget,
        client: Position,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        match target {
            PointerTarget::Canvas => {
                self.gesture = Gesture::Panning { last_client: client };
                if doc.design_view.selected_elements.is_empty() {
                    Vec::new()
                } else {
                    vec![Action::SelectElements { ids: Vec::new() }]
                }
            }
            PointerTarget::Element(id) => {
                let selected = &doc.design_view.selected_elements;
                let actions = if modifiers.shift {
                    let mut ids = selected.clone();
                    if let Some(at) = ids.iter().position(|sel| sel == &id) {
                        ids.remove(at);
                    } else {
                        ids.push(id.clone());
                    }
                    vec![Action::SelectElements { ids }]
                } else if selected.contains(&id) {
                    Vec::new()
                } else {
                    vec![Action::SelectElements { ids: vec![id.clone()] }]
                };
                self.gesture = Gesture::DraggingSelection { last_client: client };
                actions
            }
            PointerTarget::ResizeHandle(id, handle) => {
                // Resize is only defined for a single selected element;
                // multi-selection resize math is unsupported.
                let selected = &doc.design_view.selected_elements;
                if selected.len() != 1 || selected[0] != id {
                    debug!(%id, "resize ignored outside single selection");
                    return Vec::new();
                }
                let Some(element) = doc.design_view.element(&id) else {
                    return Vec::new();
                };
                self.gesture = Gesture::Resizing {
                    id,
                    handle,
                    start_client: client,
                    start_position: element.position,
                    start_dimensions: element.dimensions,
                };
                Vec::new()
            }
        }
    }

    /// Handle a throttled pointer-move for the active gesture.
    pub fn on_pointer_move(&mut self, doc: &Document, client: Position) -> Vec<Action> {
        if self.gesture != Gesture::Idle && !self.throttle.ready() {
            return Vec::new();
        }
        self.apply_pointer_move(doc, client)
    }

    /// Gesture math for a pointer-move, bypassing the throttle. Exposed so
    /// hosts with their own frame scheduling can drive it directly.
    pub fn apply_pointer_move(&mut self, doc: &Document, client: Position) -> Vec<Action> {
        let zoom = doc.design_view.viewport.zoom;
        match &mut self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::DraggingSelection { last_client } => {
                let dx = (client.x - last_client.x) / zoom;
                let dy = (client.y - last_client.y) / zoom;
                *last_client = client;
                doc.design_view
                    .selected_elements
                    .iter()
                    .filter_map(|id| doc.design_view.element(id))
                    .map(|element| Action::UpdateElement {
                        id: element.id.clone(),
                        patch: ElementPatch {
                            position: Some(Position::new(
                                element.position.x + dx,
                                element.position.y + dy,
                            )),
                            ..Default::default()
                        },
                    })
                    .collect()
            }
            Gesture::Resizing { id, handle, start_client, start_position, start_dimensions } => {
                let dx = (client.x - start_client.x) / zoom;
                let dy = (client.y - start_client.y) / zoom;
                let (dimensions, position) = handle.apply(*start_dimensions, *start_position, dx, dy);
                vec![Action::UpdateElement {
                    id: id.clone(),
                    patch: ElementPatch {
                        position: Some(position),
                        dimensions: Some(dimensions),
                        ..Default::default()
                    },
                }]
            }
            Gesture::Panning { last_client } => {
                let dx = client.x - last_client.x;
                let dy = client.y - last_client.y;
                *last_client = client;
                let mut viewport = doc.design_view.viewport;
                viewport.pan_by(dx, dy);
                vec![Action::SetDesignViewport { viewport }]
            }
        }
    }

    /// Terminate the active gesture. Safe to call regardless of where the
    /// pointer-up landed; the host listens at the window level.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.gesture = Gesture::Idle;
        Vec::new()
    }

    /// Insert an element dropped from the palette.
    ///
    /// The screen position converts through the viewport transform, snaps to
    /// the grid when the canvas asks for it, and the new element is selected
    /// immediately.
    pub fn on_drop(
        &mut self,
        doc: &Document,
        component_type: &str,
        client: Position,
        canvas_rect: &Rect,
        created_by: Option<&str>,
    ) -> Vec<Action> {
        let mut position = doc.design_view.viewport.screen_to_canvas(client, canvas_rect);
        if doc.design_view.canvas.snap_to_grid {
            position = snap_to_grid(position, doc.design_view.canvas.grid_size);
        }
        let id = new_id();
        let mut element = DesignElement::new(
            id.clone(),
            component_type,
            position,
            Dimensions::new(DROP_WIDTH, DROP_HEIGHT),
        );
        element.props = placeholder_props(&doc.settings.theme);
        element.meta.created_by = created_by.map(str::to_string);
        element.meta.source = Some("palette".to_string());
        vec![
            Action::AddElement { element },
            Action::SelectElements { ids: vec![id] },
        ]
    }

    /// Create the document's root container if it does not exist yet.
    ///
    /// At most one element may carry the reserved default-container id; the
    /// check happens before insertion (and the reducer independently rejects
    /// duplicate ids).
    #[must_use]
    pub fn ensure_default_container(doc: &Document) -> Option<Action> {
        if doc.design_view.element(DEFAULT_CONTAINER_ID).is_some() {
            return None;
        }
        let mut element = DesignElement::new(
            DEFAULT_CONTAINER_ID.to_string(),
            "container",
            Position::default(),
            Dimensions::new(doc.design_view.canvas.width, doc.design_view.canvas.height),
        );
        element.name = "Container".to_string();
        element.props = placeholder_props(&doc.settings.theme);
        element.meta.source = Some("default".to_string());
        Some(Action::AddElement { element })
    }
}

/// Theme-appropriate placeholder styling for freshly inserted elements.
fn placeholder_props(theme: &str) -> serde_json::Value {
    if theme == "light" {
        json!({
            "background": "#F5F5F5",
            "border": "1px dashed #C0C0C0",
            "opacity": 1.0,
        })
    } else {
        json!({
            "background": "#2D2D2D",
            "border": "1px dashed #555555",
            "opacity": 1.0,
        })
    }
}
