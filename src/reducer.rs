//! Pure state transitions for the editor document.
//!
//! DESIGN
//! ======
//! [`reduce`] is total and exhaustive over [`Action`]: every action either
//! produces a consistently mutated document or hands the input back
//! untouched. Relational invariants live here and nowhere else — deleting a
//! node cascades to its connections, deleting an element prunes it from the
//! selection, deleting an artboard can never leave the current-artboard
//! pointer dangling. The repetitive list-CRUD cases all run through one
//! generic helper so each slice keeps the exact same contract: add appends
//! (rejecting duplicate ids), update merges by id leaving the rest alone,
//! delete filters by id.
//!
//! ERROR HANDLING
//! ==============
//! An update or delete referencing a nonexistent id is a silent no-op; this
//! favors availability over strictness, and the miss is logged at debug
//! level only. Undo and redo on an exhausted stack are no-ops returning the
//! input state. Nothing in this module panics.

#[cfg(test)]
#[path = "reducer_test.rs"]
mod reducer_test;

use tracing::{debug, info};

use crate::action::Action;
use crate::consts::HISTORY_LIMIT;
use crate::doc::{
    merge_value, Artboard, Breakpoint, DesignElement, Document, EditorView, FlowConnection,
    FlowNode, FlowVariable, HistoryEntry, RegistryEntry, Variable,
};

/// Anything living in an id-keyed document list.
pub(crate) trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for DesignElement {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for FlowNode {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for FlowConnection {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for FlowVariable {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for Variable {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for Artboard {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for Breakpoint {
    fn key(&self) -> &str {
        &self.id
    }
}
impl Keyed for RegistryEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Append an item unless its id is already taken. Enforces id uniqueness at
/// creation time (which is also what keeps the reserved default-container
/// identity singular).
fn push_unique<T: Keyed>(list: &mut Vec<T>, item: T, what: &str) {
    if list.iter().any(|existing| existing.key() == item.key()) {
        debug!(id = item.key(), what, "duplicate id rejected");
        return;
    }
    list.push(item);
}

/// Apply a mutation to the item matching `id`, if present.
fn update_by_id<T: Keyed>(list: &mut [T], id: &str, what: &str, apply: impl FnOnce(&mut T)) {
    match list.iter_mut().find(|item| item.key() == id) {
        Some(item) => apply(item),
        None => debug!(id, what, "update target not found"),
    }
}

/// Remove the item matching `id`. Returns whether anything was removed.
fn remove_by_id<T: Keyed>(list: &mut Vec<T>, id: &str, what: &str) -> bool {
    let before = list.len();
    list.retain(|item| item.key() != id);
    if list.len() == before {
        debug!(id, what, "delete target not found");
        return false;
    }
    true
}

/// Produce the next document state for an action.
///
/// Consumes and returns the document; the no-op paths (unknown action,
/// exhausted history stack, missing id) hand the same value back without
/// cloning.
#[must_use]
pub fn reduce(mut state: Document, action: Action) -> Document {
    match action {
        // ── View / canvas ───────────────────────────────────────
        Action::SetView { view } => {
            state.current_view = view;
            state
        }
        Action::UpdateCanvas { patch } => {
            let canvas = &mut state.design_view.canvas;
            if let Some(width) = patch.width {
                canvas.width = width;
            }
            if let Some(height) = patch.height {
                canvas.height = height;
            }
            if let Some(background) = patch.background {
                canvas.background = background;
            }
            if let Some(grid_size) = patch.grid_size {
                canvas.grid_size = grid_size;
            }
            if let Some(snap) = patch.snap_to_grid {
                canvas.snap_to_grid = snap;
            }
            if let Some(show) = patch.show_grid {
                canvas.show_grid = show;
            }
            state
        }
        Action::SetDesignViewport { viewport } => {
            state.design_view.viewport = viewport;
            let zoom = viewport.zoom;
            state.design_view.viewport.set_zoom(zoom);
            state
        }
        Action::SetFlowViewport { viewport } => {
            state.flow_view.viewport = viewport;
            let zoom = viewport.zoom;
            state.flow_view.viewport.set_zoom(zoom);
            state
        }

        // ── Design elements ─────────────────────────────────────
        Action::AddElement { element } => {
            push_unique(&mut state.design_view.elements, element, "element");
            state
        }
        Action::UpdateElement { id, patch } => {
            update_by_id(&mut state.design_view.elements, &id, "element", |element| {
                element.apply_patch(&patch);
            });
            state
        }
        Action::DeleteElement { id } => {
            if remove_by_id(&mut state.design_view.elements, &id, "element") {
                state.design_view.selected_elements.retain(|sel| sel != &id);
                if state.design_view.hovered_element.as_deref() == Some(id.as_str()) {
                    state.design_view.hovered_element = None;
                }
                // Drop stale child references so the tree never points at a
                // removed element.
                for element in &mut state.design_view.elements {
                    element.children.retain(|child| child != &id);
                }
            }
            state
        }
        Action::SelectElements { ids } => {
            state.design_view.selected_elements = ids
                .into_iter()
                .filter(|id| state.design_view.elements.iter().any(|e| &e.id == id))
                .collect();
            state
        }
        Action::HoverElement { id } => {
            state.design_view.hovered_element =
                id.filter(|id| state.design_view.elements.iter().any(|e| &e.id == id));
            state
        }

        // ── Flow graph ──────────────────────────────────────────
        Action::AddNode { node } => {
            push_unique(&mut state.flow_view.nodes, node, "node");
            state
        }
        Action::UpdateNode { id, patch } => {
            update_by_id(&mut state.flow_view.nodes, &id, "node", |node| {
                node.apply_patch(&patch);
            });
            state
        }
        Action::DeleteNode { id } => {
            if remove_by_id(&mut state.flow_view.nodes, &id, "node") {
                // Cascade: connections touching the node go with it.
                let severed: Vec<String> = state
                    .flow_view
                    .connections
                    .iter()
                    .filter(|c| c.source.node_id == id || c.target.node_id == id)
                    .map(|c| c.id.clone())
                    .collect();
                state
                    .flow_view
                    .connections
                    .retain(|c| c.source.node_id != id && c.target.node_id != id);
                state.flow_view.selected.node_ids.retain(|sel| sel != &id);
                state
                    .flow_view
                    .selected
                    .connection_ids
                    .retain(|sel| !severed.contains(sel));
            }
            state
        }
        Action::SelectNodes { node_ids } => {
            state.flow_view.selected.node_ids = node_ids
                .into_iter()
                .filter(|id| state.flow_view.nodes.iter().any(|n| &n.id == id))
                .collect();
            state
        }
        Action::AddConnection { connection } => {
            push_unique(&mut state.flow_view.connections, connection, "connection");
            state
        }
        Action::UpdateConnection { id, source, target } => {
            update_by_id(&mut state.flow_view.connections, &id, "connection", |connection| {
                if let Some(source) = source {
                    connection.source = source;
                }
                if let Some(target) = target {
                    connection.target = target;
                }
            });
            state
        }
        Action::DeleteConnection { id } => {
            if remove_by_id(&mut state.flow_view.connections, &id, "connection") {
                state.flow_view.selected.connection_ids.retain(|sel| sel != &id);
            }
            state
        }

        // ── Variables ───────────────────────────────────────────
        Action::AddVariable { variable } => {
            push_unique(&mut state.variables, variable, "variable");
            state
        }
        Action::UpdateVariable { id, patch } => {
            update_by_id(&mut state.variables, &id, "variable", |variable| {
                if let Some(name) = patch.name {
                    variable.name = name;
                }
                if let Some(kind) = patch.kind {
                    variable.kind = kind;
                }
                if let Some(value) = patch.value {
                    variable.value = value;
                }
            });
            state
        }
        Action::DeleteVariable { id } => {
            remove_by_id(&mut state.variables, &id, "variable");
            state
        }
        Action::AddFlowVariable { variable } => {
            push_unique(&mut state.flow_view.variables, variable, "flow variable");
            state
        }
        Action::UpdateFlowVariable { id, patch } => {
            update_by_id(&mut state.flow_view.variables, &id, "flow variable", |variable| {
                if let Some(name) = patch.name {
                    variable.name = name;
                }
                if let Some(kind) = patch.kind {
                    variable.kind = kind;
                }
                if let Some(value) = patch.value {
                    variable.value = value;
                }
                if let Some(scope) = patch.scope {
                    variable.scope = scope;
                }
                if let Some(is_constant) = patch.is_constant {
                    variable.is_constant = is_constant;
                }
            });
            state
        }
        Action::DeleteFlowVariable { id } => {
            remove_by_id(&mut state.flow_view.variables, &id, "flow variable");
            state
        }

        // ── Artboards / breakpoints ─────────────────────────────
        Action::AddArtboard { artboard } => {
            push_unique(&mut state.design_view.artboards, artboard, "artboard");
            state
        }
        Action::UpdateArtboard { id, patch } => {
            update_by_id(&mut state.design_view.artboards, &id, "artboard", |artboard| {
                if let Some(name) = patch.name {
                    artboard.name = name;
                }
                if let Some(position) = patch.position {
                    artboard.position = position;
                }
                if let Some(dimensions) = patch.dimensions {
                    artboard.dimensions = dimensions;
                }
            });
            state
        }
        Action::DeleteArtboard { id } => {
            if remove_by_id(&mut state.design_view.artboards, &id, "artboard")
                && state.design_view.current_artboard_id.as_deref() == Some(id.as_str())
            {
                // Fall back to the first remaining artboard rather than
                // leaving a dangling pointer.
                state.design_view.current_artboard_id =
                    state.design_view.artboards.first().map(|a| a.id.clone());
            }
            state
        }
        Action::SetCurrentArtboard { id } => {
            state.design_view.current_artboard_id =
                id.filter(|id| state.design_view.artboards.iter().any(|a| &a.id == id));
            state
        }
        Action::AddBreakpoint { breakpoint } => {
            push_unique(&mut state.design_view.breakpoints, breakpoint, "breakpoint");
            state
        }
        Action::UpdateBreakpoint { id, patch } => {
            update_by_id(&mut state.design_view.breakpoints, &id, "breakpoint", |breakpoint| {
                if let Some(name) = patch.name {
                    breakpoint.name = name;
                }
                if let Some(min_width) = patch.min_width {
                    breakpoint.min_width = min_width;
                }
            });
            state
        }
        Action::DeleteBreakpoint { id } => {
            if remove_by_id(&mut state.design_view.breakpoints, &id, "breakpoint")
                && state.design_view.current_breakpoint_id.as_deref() == Some(id.as_str())
            {
                state.design_view.current_breakpoint_id =
                    state.design_view.breakpoints.first().map(|b| b.id.clone());
            }
            state
        }
        Action::SetCurrentBreakpoint { id } => {
            state.design_view.current_breakpoint_id =
                id.filter(|id| state.design_view.breakpoints.iter().any(|b| &b.id == id));
            state
        }

        // ── Auxiliary registries ────────────────────────────────
        Action::RegistryAdd { slice, entry } => {
            push_unique(state.registries.slice_mut(slice), entry, "registry entry");
            state
        }
        Action::RegistryUpdate { slice, id, patch } => {
            update_by_id(state.registries.slice_mut(slice), &id, "registry entry", |entry| {
                merge_value(&mut entry.data, &patch);
            });
            state
        }
        Action::RegistryRemove { slice, id } => {
            remove_by_id(state.registries.slice_mut(slice), &id, "registry entry");
            state
        }

        // ── Settings / history / lifecycle ──────────────────────
        Action::UpdateSettings { patch } => {
            if let Some(auto_save) = patch.auto_save {
                state.settings.auto_save = auto_save;
            }
            if let Some(interval) = patch.auto_save_interval_ms {
                state.settings.auto_save_interval_ms = interval;
            }
            if let Some(theme) = patch.theme {
                state.settings.theme = theme;
            }
            state
        }
        Action::SaveHistory { description } => save_history(state, &description),
        Action::Undo => undo(state),
        Action::Redo => redo(state),
        Action::LoadEditor { state: loaded } => {
            info!("loading editor state");
            let mut next = *loaded;
            next.current_view = EditorView::Design;
            next
        }
        Action::ResetState { state: replacement } => {
            info!("resetting editor state");
            replacement.map_or_else(Document::default, |boxed| *boxed)
        }

        Action::Noop => state,
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// Checkpoint the live state.
///
/// The previous `current` entry moves onto the undo stack (capped at
/// [`HISTORY_LIMIT`], oldest dropped) and the redo branch is invalidated. A
/// checkpoint identical to the current one is skipped, so idle autosave
/// ticks do not flood the stack.
fn save_history(mut state: Document, description: &str) -> Document {
    let snapshot = state.snapshot();
    if snapshot == state.history.current.snapshot {
        return state;
    }
    let entry = HistoryEntry::new("checkpoint", description, snapshot);
    let previous = std::mem::replace(&mut state.history.current, entry);
    state.history.undo_stack.push(previous);
    if state.history.undo_stack.len() > HISTORY_LIMIT {
        state.history.undo_stack.remove(0);
    }
    state.history.redo_stack.clear();
    state
}

/// Step the document back one checkpoint.
///
/// Two cases keep this atomic and lossless:
/// - live edits exist past the current checkpoint: park them on the redo
///   stack and restore the current checkpoint, leaving the stacks' older
///   entries alone;
/// - the live state matches the current checkpoint: pop the previous entry,
///   restore its snapshot, and move the current entry to the redo stack.
///
/// An empty undo stack is a no-op either way.
fn undo(mut state: Document) -> Document {
    if state.history.undo_stack.is_empty() {
        return state;
    }
    let live = state.snapshot();
    if live != state.history.current.snapshot {
        let parked = HistoryEntry::new("undo", "Unsaved edits", live);
        let current_snapshot = state.history.current.snapshot.clone();
        state.history.redo_stack.push(parked);
        state.restore(&current_snapshot);
        return state;
    }
    let Some(previous) = state.history.undo_stack.pop() else {
        return state;
    };
    let displaced = std::mem::replace(&mut state.history.current, previous);
    state.history.redo_stack.push(displaced);
    let snapshot = state.history.current.snapshot.clone();
    state.restore(&snapshot);
    state
}

/// Step the document forward one checkpoint; mirror of [`undo`].
fn redo(mut state: Document) -> Document {
    let Some(next) = state.history.redo_stack.pop() else {
        return state;
    };
    let displaced = std::mem::replace(&mut state.history.current, next);
    state.history.undo_stack.push(displaced);
    let snapshot = state.history.current.snapshot.clone();
    state.restore(&snapshot);
    state
}
