//! Document model: the root state tree owned by the editor reducer.
//!
//! This module defines every entity the editor manipulates: design elements
//! on the absolute-positioned canvas, flow nodes and their connections in the
//! node-graph view, the two coexisting variable systems (document-level
//! `Variable` and flow-local `FlowVariable`), artboards and breakpoints,
//! undo/redo history entries, the auxiliary registry slices, and the
//! [`Document`] aggregate tying them together.
//!
//! Every type here serializes to a plain JSON tree so an external persistence
//! layer can store and restore a document (or any history snapshot) verbatim.
//! Sparse updates use the partial-struct pattern ([`ElementPatch`],
//! [`NodePatch`]): only present fields are applied, and `null` values inside
//! a props/data patch delete the corresponding keys.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::binding::{DataBinding, EventBinding};
use crate::geometry::{Dimensions, Position, Viewport};

/// Unique identifier for a design element. Stored as a string so reserved
/// identities (such as the default container) coexist with generated UUIDs.
pub type ElementId = String;

/// Unique identifier for a flow node.
pub type NodeId = String;

/// Generate a fresh string id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Milliseconds since the Unix epoch, for attribution timestamps.
#[must_use]
pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Merge a JSON object patch into a target value.
///
/// `null` entries delete keys, nested objects merge recursively, everything
/// else replaces. A non-object patch is ignored; a non-object target is
/// replaced by an empty object before merging.
pub(crate) fn merge_value(target: &mut Value, patch: &Value) {
    let Some(incoming) = patch.as_object() else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(existing) = target.as_object_mut() else {
        return;
    };
    for (key, value) in incoming {
        if value.is_null() {
            existing.remove(key);
        } else if value.is_object() && existing.get(key).is_some_and(Value::is_object) {
            if let Some(slot) = existing.get_mut(key) {
                merge_value(slot, value);
            }
        } else {
            existing.insert(key.clone(), value.clone());
        }
    }
}

// =============================================================================
// VIEWS
// =============================================================================

/// Which editor view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorView {
    /// The visual design canvas.
    #[default]
    Design,
    /// The node-graph logic editor.
    Flow,
    /// Both views side by side.
    Both,
}

// =============================================================================
// DESIGN VIEW
// =============================================================================

/// Creation/modification metadata carried by every design element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementMeta {
    /// Milliseconds since the Unix epoch at creation.
    pub created_at: u64,
    /// Milliseconds since the Unix epoch at the last mutation.
    pub updated_at: u64,
    /// User who created the element, if known.
    pub created_by: Option<String>,
    /// Where the element came from (palette drop, programmatic insert, ...).
    pub source: Option<String>,
}

/// A node in the design-view element tree.
///
/// Position and dimensions are always absolute in canvas space; nesting is
/// expressed through `children` id references, not coordinate inheritance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    /// Unique identifier within `DesignView::elements`.
    pub id: ElementId,
    /// Tag selecting a render primitive (box, text, container, grid, ...).
    pub component_type: String,
    /// Display name shown in the layers panel.
    pub name: String,
    /// Absolute canvas-space position.
    pub position: Position,
    /// Bounding box of the element.
    pub dimensions: Dimensions,
    /// Open-ended style/behavior bag (background, opacity, handlers, ...).
    pub props: Value,
    /// Prop name → data binding descriptor.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_bindings: BTreeMap<String, DataBinding>,
    /// Event name → event binding descriptor.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub event_bindings: BTreeMap<String, EventBinding>,
    /// Ids of nested child elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementId>,
    /// Attribution metadata.
    #[serde(default)]
    pub meta: ElementMeta,
}

impl DesignElement {
    /// Build an element with empty props and fresh metadata.
    #[must_use]
    pub fn new(id: ElementId, component_type: &str, position: Position, dimensions: Dimensions) -> Self {
        let now = now_ms();
        Self {
            id,
            component_type: component_type.to_string(),
            name: component_type.to_string(),
            position,
            dimensions,
            props: Value::Object(Map::new()),
            data_bindings: BTreeMap::new(),
            event_bindings: BTreeMap::new(),
            children: Vec::new(),
            meta: ElementMeta { created_at: now, updated_at: now, created_by: None, source: None },
        }
    }

    /// Apply a sparse update. Only present fields are touched; `props`
    /// merges per [`merge_value`]. Bumps the modification timestamp.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(ref component_type) = patch.component_type {
            self.component_type = component_type.clone();
        }
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(dimensions) = patch.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(ref props) = patch.props {
            merge_value(&mut self.props, props);
        }
        if let Some(ref data_bindings) = patch.data_bindings {
            self.data_bindings = data_bindings.clone();
        }
        if let Some(ref event_bindings) = patch.event_bindings {
            self.event_bindings = event_bindings.clone();
        }
        if let Some(ref children) = patch.children {
            self.children = children.clone();
        }
        self.meta.updated_at = now_ms();
    }
}

/// Sparse update for a design element. Only present fields are applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_bindings: Option<BTreeMap<String, DataBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_bindings: Option<BTreeMap<String, EventBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ElementId>>,
}

/// Static canvas configuration for the design view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// CSS background color of the canvas surface.
    pub background: String,
    pub grid_size: f64,
    pub snap_to_grid: bool,
    pub show_grid: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 1024.0,
            background: "#1E1E1E".to_string(),
            grid_size: 8.0,
            snap_to_grid: false,
            show_grid: true,
        }
    }
}

/// A positioned sub-region of the canvas used to frame a screen or page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artboard {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub dimensions: Dimensions,
}

/// A responsive breakpoint the design can be previewed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: String,
    pub name: String,
    pub min_width: f64,
}

/// The design-view slice of the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DesignView {
    pub canvas: CanvasConfig,
    pub elements: Vec<DesignElement>,
    /// Ids of the currently selected elements. Must only reference ids
    /// present in `elements`; the reducer prunes on delete.
    pub selected_elements: Vec<ElementId>,
    /// Id of the element under the pointer, if any.
    pub hovered_element: Option<ElementId>,
    pub artboards: Vec<Artboard>,
    /// Foreign key into `artboards`; never dangling.
    pub current_artboard_id: Option<String>,
    pub breakpoints: Vec<Breakpoint>,
    /// Foreign key into `breakpoints`; never dangling.
    pub current_breakpoint_id: Option<String>,
    pub viewport: Viewport,
}

impl DesignView {
    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&DesignElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

// =============================================================================
// FLOW VIEW
// =============================================================================

/// The kind of a flow node, selecting its parameter schema and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Contract,
    Wallet,
    Token,
    Nft,
    Logic,
    Api,
    Data,
    Ui,
    Function,
    Event,
    Variable,
}

impl NodeType {
    /// The wire tag for this type, matching the serde representation.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Wallet => "wallet",
            Self::Token => "token",
            Self::Nft => "nft",
            Self::Logic => "logic",
            Self::Api => "api",
            Self::Data => "data",
            Self::Ui => "ui",
            Self::Function => "function",
            Self::Event => "event",
            Self::Variable => "variable",
        }
    }
}

/// Whether a port accepts or produces connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A connection endpoint slot on a flow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPort {
    pub id: String,
    pub name: String,
    pub direction: PortDirection,
    /// Declared payload type. Not validated at connection time.
    pub data_type: String,
}

impl FlowPort {
    #[must_use]
    pub fn new(id: &str, name: &str, direction: PortDirection, data_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            direction,
            data_type: data_type.to_string(),
        }
    }
}

/// A node in the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: NodeId,
    /// Node kind, fixed at creation.
    pub kind: NodeType,
    pub position: Position,
    pub dimensions: Dimensions,
    pub ports: Vec<FlowPort>,
    /// Type-specific parameters, shaped by the node factory defaults.
    pub data: Value,
}

impl FlowNode {
    /// Apply a sparse update. `data` merges per [`merge_value`].
    pub fn apply_patch(&mut self, patch: &NodePatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(dimensions) = patch.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(ref ports) = patch.ports {
            self.ports = ports.clone();
        }
        if let Some(ref data) = patch.data {
            merge_value(&mut self.data, data);
        }
    }

    /// Look up a port by id.
    #[must_use]
    pub fn port(&self, port_id: &str) -> Option<&FlowPort> {
        self.ports.iter().find(|p| p.id == port_id)
    }
}

/// Sparse update for a flow node. Only present fields are applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<FlowPort>>,
    /// Data keys to merge or remove (null values delete keys, nested
    /// objects merge).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One end of a flow connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEnd {
    pub node_id: NodeId,
    pub port_id: String,
}

/// A directed edge between an output port and an input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConnection {
    pub id: String,
    pub source: ConnectionEnd,
    pub target: ConnectionEnd,
}

/// Scope of a flow-local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    #[default]
    Flow,
    Global,
}

/// A variable scoped to the flow view. Independent from the document-level
/// [`Variable`] registry; the two systems coexist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowVariable {
    pub id: String,
    pub name: String,
    /// Declared value type ("string", "number", ...).
    pub kind: String,
    pub value: Value,
    pub scope: VariableScope,
    pub is_constant: bool,
}

/// Selection state for the flow view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowSelection {
    pub node_ids: Vec<NodeId>,
    pub connection_ids: Vec<String>,
}

/// The flow-view slice of the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowView {
    pub nodes: Vec<FlowNode>,
    pub connections: Vec<FlowConnection>,
    pub variables: Vec<FlowVariable>,
    pub selected: FlowSelection,
    pub viewport: Viewport,
}

impl FlowView {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// =============================================================================
// VARIABLES / REGISTRIES
// =============================================================================

/// A document-level variable, resolvable by the binding layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    /// Declared value type ("string", "number", ...).
    pub kind: String,
    pub value: Value,
}

/// An opaque entry in one of the auxiliary registry slices. These slices are
/// structurally part of the document but not behaviorally exercised by the
/// editor core, so their payloads stay as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub data: Value,
}

/// Which auxiliary registry slice an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrySlice {
    Components,
    Assets,
    DataSources,
    Plugins,
    Locales,
    Deployments,
    Collaborators,
    AiModels,
    Panels,
}

/// The auxiliary registry slices, one list per concern.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Registries {
    pub components: Vec<RegistryEntry>,
    pub assets: Vec<RegistryEntry>,
    pub data_sources: Vec<RegistryEntry>,
    pub plugins: Vec<RegistryEntry>,
    pub locales: Vec<RegistryEntry>,
    pub deployments: Vec<RegistryEntry>,
    pub collaborators: Vec<RegistryEntry>,
    pub ai_models: Vec<RegistryEntry>,
    pub panels: Vec<RegistryEntry>,
}

impl Registries {
    /// Resolve a slice selector to its backing list.
    pub fn slice_mut(&mut self, slice: RegistrySlice) -> &mut Vec<RegistryEntry> {
        match slice {
            RegistrySlice::Components => &mut self.components,
            RegistrySlice::Assets => &mut self.assets,
            RegistrySlice::DataSources => &mut self.data_sources,
            RegistrySlice::Plugins => &mut self.plugins,
            RegistrySlice::Locales => &mut self.locales,
            RegistrySlice::Deployments => &mut self.deployments,
            RegistrySlice::Collaborators => &mut self.collaborators,
            RegistrySlice::AiModels => &mut self.ai_models,
            RegistrySlice::Panels => &mut self.panels,
        }
    }

    /// Immutable counterpart of [`Registries::slice_mut`].
    #[must_use]
    pub fn slice(&self, slice: RegistrySlice) -> &Vec<RegistryEntry> {
        match slice {
            RegistrySlice::Components => &self.components,
            RegistrySlice::Assets => &self.assets,
            RegistrySlice::DataSources => &self.data_sources,
            RegistrySlice::Plugins => &self.plugins,
            RegistrySlice::Locales => &self.locales,
            RegistrySlice::Deployments => &self.deployments,
            RegistrySlice::Collaborators => &self.collaborators,
            RegistrySlice::AiModels => &self.ai_models,
            RegistrySlice::Panels => &self.panels,
        }
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// The joint state captured by one history entry: both views plus the
/// variable-adjacent data registries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub design: DesignView,
    pub flow: FlowView,
    pub data: DataState,
}

/// Variable-adjacent registries captured alongside the two views.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataState {
    pub variables: Vec<Variable>,
    pub data_sources: Vec<RegistryEntry>,
}

/// An immutable checkpoint on the undo/redo timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// What produced the entry ("init", "checkpoint", "autosave", ...).
    pub kind: String,
    pub timestamp: u64,
    pub description: String,
    pub snapshot: Snapshot,
}

impl HistoryEntry {
    /// Build an entry around a snapshot, stamped now.
    #[must_use]
    pub fn new(kind: &str, description: &str, snapshot: Snapshot) -> Self {
        Self {
            id: new_id(),
            kind: kind.to_string(),
            timestamp: now_ms(),
            description: description.to_string(),
            snapshot,
        }
    }
}

/// The undo/redo timeline.
///
/// `current` always represents the latest checkpoint; `undo_stack` holds
/// entries older than it, `redo_stack` entries newer (populated only after
/// an undo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub undo_stack: Vec<HistoryEntry>,
    pub redo_stack: Vec<HistoryEntry>,
    pub current: HistoryEntry,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current: HistoryEntry::new("init", "Initial state", Snapshot::default()),
        }
    }
}

// =============================================================================
// SETTINGS / DOCUMENT
// =============================================================================

/// Per-editor behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    pub auto_save: bool,
    pub auto_save_interval_ms: u64,
    pub theme: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            auto_save_interval_ms: crate::consts::DEFAULT_AUTOSAVE_INTERVAL_MS,
            theme: "dark".to_string(),
        }
    }
}

/// The root in-memory state tree owned by the editor reducer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub current_view: EditorView,
    pub design_view: DesignView,
    pub flow_view: FlowView,
    /// Document-level variable registry (distinct from flow variables).
    pub variables: Vec<Variable>,
    pub history: History,
    pub registries: Registries,
    pub settings: EditorSettings,
}

impl Document {
    /// Look up a document-level variable by id.
    #[must_use]
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Capture the joint design/flow/data snapshot for a history entry.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            design: self.design_view.clone(),
            flow: self.flow_view.clone(),
            data: DataState {
                variables: self.variables.clone(),
                data_sources: self.registries.data_sources.clone(),
            },
        }
    }

    /// Restore a snapshot into the live views and data registries.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.design_view = snapshot.design.clone();
        self.flow_view = snapshot.flow.clone();
        self.variables = snapshot.data.variables.clone();
        self.registries.data_sources = snapshot.data.data_sources.clone();
    }
}
