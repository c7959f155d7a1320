//! The closed action union consumed by the reducer.
//!
//! Actions are the only way state changes: controllers and the binding layer
//! compute intended changes and emit `Action`s; the host threads them through
//! [`crate::reducer::reduce`]. The union serializes with a `type` tag in
//! SCREAMING_SNAKE_CASE so a host (or a collaboration transport) can deliver
//! actions as JSON; unrecognized tags deserialize to [`Action::Noop`], which
//! the reducer passes through untouched.

#[cfg(test)]
#[path = "action_test.rs"]
mod action_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::doc::{
    Artboard, Breakpoint, ConnectionEnd, DesignElement, Document, EditorView, ElementId,
    ElementPatch, FlowConnection, FlowNode, FlowVariable, NodeId, NodePatch, RegistryEntry,
    RegistrySlice, Variable, VariableScope,
};
use crate::geometry::Viewport;

/// Sparse update for the design canvas configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
}

/// Sparse update for the editor settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Sparse update for a document-level variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariablePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Sparse update for a flow-local variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowVariablePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<VariableScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_constant: Option<bool>,
}

/// Sparse update for an artboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtboardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<crate::geometry::Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<crate::geometry::Dimensions>,
}

/// Sparse update for a breakpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BreakpointPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
}

/// Every state transition the editor document supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // ── View / canvas ───────────────────────────────────────────
    SetView { view: EditorView },
    UpdateCanvas { patch: CanvasPatch },
    SetDesignViewport { viewport: Viewport },
    SetFlowViewport { viewport: Viewport },

    // ── Design elements ─────────────────────────────────────────
    AddElement { element: DesignElement },
    UpdateElement { id: ElementId, patch: ElementPatch },
    DeleteElement { id: ElementId },
    SelectElements { ids: Vec<ElementId> },
    HoverElement { id: Option<ElementId> },

    // ── Flow graph ──────────────────────────────────────────────
    AddNode { node: FlowNode },
    UpdateNode { id: NodeId, patch: NodePatch },
    DeleteNode { id: NodeId },
    SelectNodes { node_ids: Vec<NodeId> },
    AddConnection { connection: FlowConnection },
    UpdateConnection {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<ConnectionEnd>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionEnd>,
    },
    DeleteConnection { id: String },

    // ── Variables (two coexisting systems) ──────────────────────
    AddVariable { variable: Variable },
    UpdateVariable { id: String, patch: VariablePatch },
    DeleteVariable { id: String },
    AddFlowVariable { variable: FlowVariable },
    UpdateFlowVariable { id: String, patch: FlowVariablePatch },
    DeleteFlowVariable { id: String },

    // ── Artboards / breakpoints ─────────────────────────────────
    AddArtboard { artboard: Artboard },
    UpdateArtboard { id: String, patch: ArtboardPatch },
    DeleteArtboard { id: String },
    SetCurrentArtboard { id: Option<String> },
    AddBreakpoint { breakpoint: Breakpoint },
    UpdateBreakpoint { id: String, patch: BreakpointPatch },
    DeleteBreakpoint { id: String },
    SetCurrentBreakpoint { id: Option<String> },

    // ── Auxiliary registries (uniform list CRUD) ────────────────
    RegistryAdd { slice: RegistrySlice, entry: RegistryEntry },
    RegistryUpdate { slice: RegistrySlice, id: String, patch: Value },
    RegistryRemove { slice: RegistrySlice, id: String },

    // ── Settings / history / lifecycle ──────────────────────────
    UpdateSettings { patch: SettingsPatch },
    SaveHistory { description: String },
    Undo,
    Redo,
    /// Bridge from a persisted editor into the live reducer. Forces the
    /// design view.
    LoadEditor { state: Box<Document> },
    /// Replace the document with a fresh default (or a supplied one).
    ResetState {
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<Box<Document>>,
    },

    /// Catch-all for unrecognized wire tags; the reducer returns the input
    /// state untouched.
    #[serde(other)]
    Noop,
}
