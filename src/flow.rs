//! Node factory, parameter schemas, and graph editing for the flow view.
//!
//! DESIGN
//! ======
//! Every node enters the graph through [`NodeFactory::create_node`], which
//! layers `{base defaults} ← {type-specific defaults} ← {overrides}` in that
//! precedence order, merging the `data` bag as a nested object rather than
//! replacing it wholesale. The per-type defaults and the per-type parameter
//! schema both live in this module; adding a new [`NodeType`] means adding a
//! row to each table, and nothing else — the inputs panel walks the schema
//! registry generically.
//!
//! ERROR HANDLING
//! ==============
//! Connection creation validates direction (an edge runs output → input) and
//! endpoint existence, returning [`GraphError`] on violation. Port data-type
//! compatibility is intentionally not checked; the graph is permissive about
//! payload types.

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::action::Action;
use crate::doc::{
    merge_value, new_id, ConnectionEnd, Document, FlowConnection, FlowNode, FlowPort, NodeType,
    PortDirection,
};
use crate::geometry::{Dimensions, Position};

/// Why a connection attempt was rejected.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("port {port} not found on node {node}")]
    PortNotFound { node: String, port: String },
    #[error("connection must run from an output port to an input port")]
    DirectionMismatch,
}

/// Caller-supplied overrides for [`NodeFactory::create_node`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<FlowPort>>,
    /// Merged into the node's `data` as a nested object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Produces type-correct default [`FlowNode`] payloads.
pub struct NodeFactory;

impl NodeFactory {
    /// Build a node of the given type at a position, with optional
    /// overrides layered on top of the type defaults.
    #[must_use]
    pub fn create_node(kind: NodeType, position: Position, overrides: Option<&NodeOverrides>) -> FlowNode {
        let mut node = FlowNode {
            id: new_id(),
            kind,
            position,
            // Base defaults, before the type table applies.
            dimensions: Dimensions::new(200.0, 100.0),
            ports: Vec::new(),
            data: json!({ "type": kind.tag(), "label": default_label(kind) }),
        };

        node.dimensions = default_dimensions(kind);
        node.ports = default_ports(kind);
        merge_value(&mut node.data, &default_data(kind));

        if let Some(overrides) = overrides {
            if let Some(dimensions) = overrides.dimensions {
                node.dimensions = dimensions;
            }
            if let Some(ref ports) = overrides.ports {
                node.ports = ports.clone();
            }
            if let Some(ref data) = overrides.data {
                merge_value(&mut node.data, data);
            }
        }
        node
    }
}

/// Default bounding box per node type.
#[must_use]
pub fn default_dimensions(kind: NodeType) -> Dimensions {
    match kind {
        NodeType::Contract => Dimensions::new(240.0, 120.0),
        NodeType::Wallet => Dimensions::new(180.0, 80.0),
        NodeType::Token => Dimensions::new(200.0, 100.0),
        NodeType::Nft => Dimensions::new(200.0, 120.0),
        NodeType::Logic => Dimensions::new(180.0, 100.0),
        NodeType::Api => Dimensions::new(220.0, 110.0),
        NodeType::Data => Dimensions::new(200.0, 100.0),
        NodeType::Ui => Dimensions::new(180.0, 90.0),
        NodeType::Function => Dimensions::new(240.0, 150.0),
        NodeType::Event => Dimensions::new(180.0, 80.0),
        NodeType::Variable => Dimensions::new(180.0, 80.0),
    }
}

fn default_label(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Contract => "Contract",
        NodeType::Wallet => "Wallet",
        NodeType::Token => "Token",
        NodeType::Nft => "NFT",
        NodeType::Logic => "Logic",
        NodeType::Api => "API",
        NodeType::Data => "Data",
        NodeType::Ui => "UI",
        NodeType::Function => "Function",
        NodeType::Event => "Event",
        NodeType::Variable => "Variable",
    }
}

/// Default type-specific parameter bag per node type.
#[must_use]
pub fn default_data(kind: NodeType) -> Value {
    match kind {
        NodeType::Contract => json!({
            "chain": "ethereum",
            "address": "",
            "methods": [],
            "events": [],
        }),
        NodeType::Wallet => json!({
            "wallet_type": "metamask",
            "sender_address": "",
        }),
        NodeType::Token => json!({
            "standard": "erc20",
            "symbol": "",
            "decimals": 18,
        }),
        NodeType::Nft => json!({
            "standard": "erc721",
            "collection": "",
            "token_id": "",
        }),
        NodeType::Logic => json!({
            "operation": "and",
            "conditions": [],
        }),
        NodeType::Api => json!({
            "method": "GET",
            "url": "",
            "headers": {},
            "body": "",
        }),
        NodeType::Data => json!({
            "source": "static",
            "value": null,
            "path": "",
        }),
        NodeType::Ui => json!({
            "event": "click",
            "target_element": "",
        }),
        NodeType::Function => json!({
            "language": "javascript",
            "code": "",
            "inputs": [],
            "outputs": [],
        }),
        NodeType::Event => json!({
            "event_type": "custom",
            "payload": {},
        }),
        NodeType::Variable => json!({
            "name": "",
            "scope": "flow",
            "initial": null,
        }),
    }
}

/// Default port layout per node type.
#[must_use]
pub fn default_ports(kind: NodeType) -> Vec<FlowPort> {
    match kind {
        NodeType::Contract => vec![
            FlowPort::new("trigger", "Trigger", PortDirection::Input, "any"),
            FlowPort::new("result", "Result", PortDirection::Output, "any"),
        ],
        NodeType::Wallet => vec![
            FlowPort::new("account", "Account", PortDirection::Output, "address"),
        ],
        NodeType::Token => vec![
            FlowPort::new("amount", "Amount", PortDirection::Input, "number"),
            FlowPort::new("balance", "Balance", PortDirection::Output, "number"),
        ],
        NodeType::Nft => vec![
            FlowPort::new("token", "Token", PortDirection::Input, "any"),
            FlowPort::new("metadata", "Metadata", PortDirection::Output, "object"),
        ],
        NodeType::Logic => vec![
            FlowPort::new("a", "A", PortDirection::Input, "boolean"),
            FlowPort::new("b", "B", PortDirection::Input, "boolean"),
            FlowPort::new("out", "Out", PortDirection::Output, "boolean"),
        ],
        NodeType::Api => vec![
            FlowPort::new("request", "Request", PortDirection::Input, "object"),
            FlowPort::new("response", "Response", PortDirection::Output, "object"),
        ],
        NodeType::Data => vec![
            FlowPort::new("out", "Out", PortDirection::Output, "any"),
        ],
        NodeType::Ui => vec![
            FlowPort::new("fired", "Fired", PortDirection::Output, "any"),
        ],
        NodeType::Function => vec![
            FlowPort::new("args", "Args", PortDirection::Input, "any"),
            FlowPort::new("return", "Return", PortDirection::Output, "any"),
        ],
        NodeType::Event => vec![
            FlowPort::new("emit", "Emit", PortDirection::Output, "any"),
        ],
        NodeType::Variable => vec![
            FlowPort::new("set", "Set", PortDirection::Input, "any"),
            FlowPort::new("get", "Get", PortDirection::Output, "any"),
        ],
    }
}

// =============================================================================
// PARAMETER SCHEMAS
// =============================================================================

/// Input widget used for a node parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Select,
}

/// One named parameter in a node's inputs panel. Serializable so a host can
/// ship the schema to its form renderer; the registry itself is static.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterField {
    pub name: &'static str,
    pub kind: FieldType,
    /// Choices for [`FieldType::Select`] fields.
    pub options: Vec<&'static str>,
    pub helper_text: &'static str,
    pub required: bool,
}

impl ParameterField {
    fn text(name: &'static str, helper_text: &'static str, required: bool) -> Self {
        Self { name, kind: FieldType::Text, options: Vec::new(), helper_text, required }
    }

    fn number(name: &'static str, helper_text: &'static str) -> Self {
        Self { name, kind: FieldType::Number, options: Vec::new(), helper_text, required: false }
    }

    fn select(name: &'static str, options: Vec<&'static str>, helper_text: &'static str) -> Self {
        Self { name, kind: FieldType::Select, options, helper_text, required: true }
    }
}

static PARAMETER_SCHEMAS: LazyLock<HashMap<NodeType, Vec<ParameterField>>> = LazyLock::new(|| {
    let mut schemas = HashMap::new();
    schemas.insert(
        NodeType::Contract,
        vec![
            ParameterField::select("Chain", vec!["ethereum", "polygon", "arbitrum"], "Network the contract is deployed on"),
            ParameterField::text("Address", "Deployed contract address", true),
            ParameterField::text("Methods", "Comma-separated ABI method names", false),
            ParameterField::text("Events", "Comma-separated ABI event names", false),
        ],
    );
    schemas.insert(
        NodeType::Wallet,
        vec![
            ParameterField::select("Wallet Type", vec!["metamask", "walletconnect", "coinbase"], "Wallet provider used to sign"),
            ParameterField::text("Sender Address", "Address used to send transactions", false),
        ],
    );
    schemas.insert(
        NodeType::Token,
        vec![
            ParameterField::select("Standard", vec!["erc20", "erc777"], "Token standard"),
            ParameterField::text("Symbol", "Ticker symbol", false),
            ParameterField::number("Decimals", "Decimal places of the token"),
        ],
    );
    schemas.insert(
        NodeType::Nft,
        vec![
            ParameterField::select("Standard", vec!["erc721", "erc1155"], "NFT standard"),
            ParameterField::text("Collection", "Collection contract address", false),
            ParameterField::text("Token Id", "Token id within the collection", false),
        ],
    );
    schemas.insert(
        NodeType::Logic,
        vec![
            ParameterField::select("Operation", vec!["and", "or", "not", "xor"], "Boolean operation applied to the inputs"),
            ParameterField::text("Conditions", "Additional guard conditions", false),
        ],
    );
    schemas.insert(
        NodeType::Api,
        vec![
            ParameterField::select("Method", vec!["GET", "POST", "PUT", "DELETE"], "HTTP method"),
            ParameterField::text("Url", "Request URL", true),
            ParameterField::text("Headers", "JSON object of request headers", false),
            ParameterField::text("Body", "Request body template", false),
        ],
    );
    schemas.insert(
        NodeType::Data,
        vec![
            ParameterField::select("Source", vec!["static", "api", "variable"], "Where the value comes from"),
            ParameterField::text("Value", "Static value when the source is static", false),
            ParameterField::text("Path", "JSON path into the source payload", false),
        ],
    );
    schemas.insert(
        NodeType::Ui,
        vec![
            ParameterField::select("Event", vec!["click", "hover", "change"], "Element event that fires the node"),
            ParameterField::text("Target Element", "Id of the design element to watch", true),
        ],
    );
    schemas.insert(
        NodeType::Function,
        vec![
            ParameterField::select("Language", vec!["javascript", "typescript"], "Language the body is written in"),
            ParameterField::text("Code", "Function body", true),
            ParameterField::text("Inputs", "Comma-separated input names", false),
            ParameterField::text("Outputs", "Comma-separated output names", false),
        ],
    );
    schemas.insert(
        NodeType::Event,
        vec![
            ParameterField::text("Event Type", "Name of the emitted event", true),
            ParameterField::text("Payload", "JSON payload template", false),
        ],
    );
    schemas.insert(
        NodeType::Variable,
        vec![
            ParameterField::text("Name", "Variable name", true),
            ParameterField::select("Scope", vec!["flow", "global"], "Visibility of the variable"),
            ParameterField::text("Initial", "Initial value", false),
        ],
    );
    schemas
});

/// The ordered parameter list shown in the inputs panel for a node type.
#[must_use]
pub fn parameter_schema(kind: NodeType) -> &'static [ParameterField] {
    PARAMETER_SCHEMAS.get(&kind).map_or(&[], Vec::as_slice)
}

// =============================================================================
// GRAPH CONTROLLER
// =============================================================================

/// Graph-editing entry points layered over the reducer. Stateless; every
/// method reads the document and returns actions for the host to dispatch.
pub struct FlowController;

impl FlowController {
    /// Create a node of `kind` at `position` and select it.
    #[must_use]
    pub fn insert_node(kind: NodeType, position: Position, overrides: Option<&NodeOverrides>) -> Vec<Action> {
        let node = NodeFactory::create_node(kind, position, overrides);
        let id = node.id.clone();
        vec![
            Action::AddNode { node },
            Action::SelectNodes { node_ids: vec![id] },
        ]
    }

    /// Create a validated connection from an output port to an input port.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when either endpoint is missing or the ports
    /// do not run output → input. Data types are not checked.
    pub fn connect(
        doc: &Document,
        source_node: &str,
        source_port: &str,
        target_node: &str,
        target_port: &str,
    ) -> Result<Action, GraphError> {
        let source = doc
            .flow_view
            .node(source_node)
            .ok_or_else(|| GraphError::NodeNotFound(source_node.to_string()))?;
        let target = doc
            .flow_view
            .node(target_node)
            .ok_or_else(|| GraphError::NodeNotFound(target_node.to_string()))?;
        let out_port = source.port(source_port).ok_or_else(|| GraphError::PortNotFound {
            node: source_node.to_string(),
            port: source_port.to_string(),
        })?;
        let in_port = target.port(target_port).ok_or_else(|| GraphError::PortNotFound {
            node: target_node.to_string(),
            port: target_port.to_string(),
        })?;
        if out_port.direction != PortDirection::Output || in_port.direction != PortDirection::Input {
            return Err(GraphError::DirectionMismatch);
        }
        Ok(Action::AddConnection {
            connection: FlowConnection {
                id: new_id(),
                source: ConnectionEnd {
                    node_id: source_node.to_string(),
                    port_id: source_port.to_string(),
                },
                target: ConnectionEnd {
                    node_id: target_node.to_string(),
                    port_id: target_port.to_string(),
                },
            },
        })
    }
}
