#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::reducer::reduce;

const ALL_KINDS: [NodeType; 11] = [
    NodeType::Contract,
    NodeType::Wallet,
    NodeType::Token,
    NodeType::Nft,
    NodeType::Logic,
    NodeType::Api,
    NodeType::Data,
    NodeType::Ui,
    NodeType::Function,
    NodeType::Event,
    NodeType::Variable,
];

// =============================================================
// Node factory: per-type defaults
// =============================================================

#[test]
fn wallet_node_gets_wallet_defaults() {
    let node = NodeFactory::create_node(NodeType::Wallet, Position::new(10.0, 20.0), None);
    assert_eq!(node.kind, NodeType::Wallet);
    assert_eq!(node.position, Position::new(10.0, 20.0));
    assert_eq!(node.dimensions, Dimensions::new(180.0, 80.0));
    assert_eq!(node.data["type"], "wallet");
    assert_eq!(node.data["label"], "Wallet");
    assert_eq!(node.data["wallet_type"], "metamask");
    assert_eq!(node.ports.len(), 1);
    assert_eq!(node.ports[0].direction, PortDirection::Output);
}

#[test]
fn contract_node_defaults_to_ethereum() {
    let node = NodeFactory::create_node(NodeType::Contract, Position::default(), None);
    assert_eq!(node.dimensions, Dimensions::new(240.0, 120.0));
    assert_eq!(node.data["chain"], "ethereum");
    assert_eq!(node.data["address"], "");
}

#[test]
fn function_node_defaults_to_javascript() {
    let node = NodeFactory::create_node(NodeType::Function, Position::default(), None);
    assert_eq!(node.dimensions, Dimensions::new(240.0, 150.0));
    assert_eq!(node.data["language"], "javascript");
}

#[test]
fn every_kind_tags_its_data_with_its_wire_name() {
    for kind in ALL_KINDS {
        let node = NodeFactory::create_node(kind, Position::default(), None);
        assert_eq!(node.data["type"], kind.tag(), "{kind:?}");
        assert!(node.data["label"].is_string(), "{kind:?}");
    }
}

#[test]
fn every_kind_gets_its_table_dimensions_and_ports() {
    for kind in ALL_KINDS {
        let node = NodeFactory::create_node(kind, Position::default(), None);
        assert_eq!(node.dimensions, default_dimensions(kind), "{kind:?}");
        assert_eq!(node.ports, default_ports(kind), "{kind:?}");
        assert!(!node.ports.is_empty(), "{kind:?}");
    }
}

#[test]
fn generated_node_ids_are_unique() {
    let a = NodeFactory::create_node(NodeType::Data, Position::default(), None);
    let b = NodeFactory::create_node(NodeType::Data, Position::default(), None);
    assert_ne!(a.id, b.id);
}

// =============================================================
// Node factory: override layering
// =============================================================

#[test]
fn overrides_replace_dimensions_and_ports_wholesale() {
    let overrides = NodeOverrides {
        dimensions: Some(Dimensions::new(300.0, 300.0)),
        ports: Some(vec![FlowPort::new("only", "Only", PortDirection::Input, "any")]),
        data: None,
    };
    let node = NodeFactory::create_node(NodeType::Logic, Position::default(), Some(&overrides));
    assert_eq!(node.dimensions, Dimensions::new(300.0, 300.0));
    assert_eq!(node.ports.len(), 1);
    assert_eq!(node.ports[0].id, "only");
}

#[test]
fn data_overrides_merge_over_type_defaults() {
    let overrides = NodeOverrides {
        data: Some(json!({ "chain": "polygon", "custom": true })),
        ..Default::default()
    };
    let node = NodeFactory::create_node(NodeType::Contract, Position::default(), Some(&overrides));
    assert_eq!(node.data["chain"], "polygon");
    assert_eq!(node.data["custom"], true);
    // Untouched defaults survive the merge.
    assert_eq!(node.data["address"], "");
    assert_eq!(node.data["type"], "contract");
}

#[test]
fn nested_data_overrides_merge_instead_of_replacing() {
    let overrides = NodeOverrides {
        data: Some(json!({ "headers": { "authorization": "Bearer x" } })),
        ..Default::default()
    };
    let node = NodeFactory::create_node(NodeType::Api, Position::default(), Some(&overrides));
    assert_eq!(node.data["headers"]["authorization"], "Bearer x");
    assert_eq!(node.data["method"], "GET");
}

// =============================================================
// Parameter schemas
// =============================================================

#[test]
fn every_kind_has_a_nonempty_parameter_schema() {
    for kind in ALL_KINDS {
        assert!(!parameter_schema(kind).is_empty(), "{kind:?}");
    }
}

#[test]
fn contract_schema_lists_chain_first() {
    let schema = parameter_schema(NodeType::Contract);
    assert_eq!(schema[0].name, "Chain");
    assert_eq!(schema[0].kind, FieldType::Select);
    assert!(schema[0].options.contains(&"ethereum"));
}

#[test]
fn select_fields_always_carry_options() {
    for kind in ALL_KINDS {
        for field in parameter_schema(kind) {
            if field.kind == FieldType::Select {
                assert!(!field.options.is_empty(), "{kind:?} {}", field.name);
            } else {
                assert!(field.options.is_empty(), "{kind:?} {}", field.name);
            }
        }
    }
}

#[test]
fn parameter_fields_serialize_for_the_form_renderer() {
    let schema = parameter_schema(NodeType::Wallet);
    let wire = serde_json::to_value(schema).unwrap();
    assert_eq!(wire[0]["name"], "Wallet Type");
    assert_eq!(wire[0]["kind"], "select");
}

// =============================================================
// FlowController: insertion
// =============================================================

#[test]
fn insert_node_adds_and_selects_it() {
    let actions = FlowController::insert_node(NodeType::Wallet, Position::new(5.0, 5.0), None);
    assert_eq!(actions.len(), 2);

    let Action::AddNode { node } = &actions[0] else {
        panic!("expected an insert first");
    };
    assert_eq!(node.kind, NodeType::Wallet);
    assert_eq!(node.dimensions, Dimensions::new(180.0, 80.0));
    assert_eq!(node.data["type"], "wallet");

    let Action::SelectNodes { node_ids } = &actions[1] else {
        panic!("expected a selection second");
    };
    assert_eq!(node_ids, &vec![node.id.clone()]);
}

#[test]
fn inserted_node_lands_in_the_document_selected() {
    let mut doc = Document::default();
    for action in FlowController::insert_node(NodeType::Wallet, Position::default(), None) {
        doc = reduce(doc, action);
    }
    assert_eq!(doc.flow_view.nodes.len(), 1);
    assert_eq!(doc.flow_view.selected.node_ids, vec![doc.flow_view.nodes[0].id.clone()]);
    assert_eq!(doc.flow_view.nodes[0].data["type"], "wallet");
}

// =============================================================
// FlowController: connection validation
// =============================================================

fn doc_with_wallet_and_contract() -> (Document, String, String) {
    let mut doc = Document::default();
    let wallet = NodeFactory::create_node(NodeType::Wallet, Position::default(), None);
    let contract = NodeFactory::create_node(NodeType::Contract, Position::default(), None);
    let wallet_id = wallet.id.clone();
    let contract_id = contract.id.clone();
    doc = reduce(doc, Action::AddNode { node: wallet });
    doc = reduce(doc, Action::AddNode { node: contract });
    (doc, wallet_id, contract_id)
}

#[test]
fn connect_output_to_input_succeeds() {
    let (doc, wallet_id, contract_id) = doc_with_wallet_and_contract();
    let action = FlowController::connect(&doc, &wallet_id, "account", &contract_id, "trigger")
        .expect("valid connection");

    let Action::AddConnection { connection } = &action else {
        panic!("expected a connection action");
    };
    assert_eq!(connection.source.node_id, wallet_id);
    assert_eq!(connection.source.port_id, "account");
    assert_eq!(connection.target.node_id, contract_id);
    assert_eq!(connection.target.port_id, "trigger");
}

#[test]
fn connect_rejects_missing_source_node() {
    let (doc, _, contract_id) = doc_with_wallet_and_contract();
    let err = FlowController::connect(&doc, "ghost", "account", &contract_id, "trigger")
        .expect_err("missing node");
    assert!(matches!(err, GraphError::NodeNotFound(id) if id == "ghost"));
}

#[test]
fn connect_rejects_missing_port() {
    let (doc, wallet_id, contract_id) = doc_with_wallet_and_contract();
    let err = FlowController::connect(&doc, &wallet_id, "ghost", &contract_id, "trigger")
        .expect_err("missing port");
    assert!(matches!(err, GraphError::PortNotFound { port, .. } if port == "ghost"));
}

#[test]
fn connect_rejects_input_to_output() {
    let (doc, wallet_id, contract_id) = doc_with_wallet_and_contract();
    // trigger is an input, account is an output; reversed endpoints must fail.
    let err = FlowController::connect(&doc, &contract_id, "trigger", &wallet_id, "account")
        .expect_err("reversed direction");
    assert!(matches!(err, GraphError::DirectionMismatch));
}

#[test]
fn connect_rejects_output_to_output() {
    let mut doc = Document::default();
    let a = NodeFactory::create_node(NodeType::Wallet, Position::default(), None);
    let b = NodeFactory::create_node(NodeType::Event, Position::default(), None);
    let (a_id, b_id) = (a.id.clone(), b.id.clone());
    doc = reduce(doc, Action::AddNode { node: a });
    doc = reduce(doc, Action::AddNode { node: b });

    let err = FlowController::connect(&doc, &a_id, "account", &b_id, "emit")
        .expect_err("two outputs");
    assert!(matches!(err, GraphError::DirectionMismatch));
}

#[test]
fn connect_does_not_check_port_data_types() {
    // wallet account is "address", logic a is "boolean"; mismatched payload
    // types are allowed.
    let mut doc = Document::default();
    let wallet = NodeFactory::create_node(NodeType::Wallet, Position::default(), None);
    let logic = NodeFactory::create_node(NodeType::Logic, Position::default(), None);
    let (wallet_id, logic_id) = (wallet.id.clone(), logic.id.clone());
    doc = reduce(doc, Action::AddNode { node: wallet });
    doc = reduce(doc, Action::AddNode { node: logic });

    assert!(FlowController::connect(&doc, &wallet_id, "account", &logic_id, "a").is_ok());
}

#[test]
fn graph_errors_render_readable_messages() {
    let message = GraphError::PortNotFound { node: "n1".to_string(), port: "p1".to_string() };
    assert_eq!(message.to_string(), "port p1 not found on node n1");
    assert_eq!(
        GraphError::DirectionMismatch.to_string(),
        "connection must run from an output port to an input port"
    );
}
