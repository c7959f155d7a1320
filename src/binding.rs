//! Cross-view binding resolution and the outbound render contract.
//!
//! A binding is a declarative link from an element's prop or event to
//! something outside the element: a variable, a flow trigger, or a contract
//! call. Data bindings are resolved at render time — the consumer asks for
//! [`resolve_props`] (or a whole [`render_tree`]) and receives props with
//! live variable values substituted in. Event bindings are resolved at
//! dispatch time: [`fire_event`] turns a fired element event into
//! [`ElementAction`]s, and [`dispatch`] routes each action either back into
//! the reducer or out to the host subsystem that owns it.
//!
//! The reducer never consults this module; it is the render consumer's
//! collaborator.

#[cfg(test)]
#[path = "binding_test.rs"]
mod binding_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::action::{Action, VariablePatch};
use crate::doc::{DesignElement, Document};

/// Where a bound prop's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingSource {
    Variable,
    ContractState,
    Content,
    Api,
}

/// A declarative link from a prop to a value source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBinding {
    pub source_type: BindingSource,
    pub source_id: String,
}

/// What a bound event hands control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerType {
    Flow,
    Contract,
    Variable,
}

/// A declarative link from an element event to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBinding {
    pub handler_type: HandlerType,
    pub handler_id: String,
    /// Optional transform applied to the event payload (a method name for
    /// contract handlers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// The flat union of things an element event can ask the system to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementAction {
    Navigate { to: String },
    CallContract { contract_id: String, method: String, args: Value },
    SetVariable { variable_id: String, value: Value },
    TriggerFlow { flow_id: String, payload: Value },
    OpenUrl { url: String },
    Custom { name: String, payload: Value },
    EmitEvent { name: String, payload: Value },
}

/// Resolve an element's props against the document's variable registry.
///
/// A `variable` binding substitutes the live value under the bound prop
/// name; the other source types are declared but resolve externally, so
/// they pass through untouched. A binding referencing a missing variable is
/// skipped with a debug log.
#[must_use]
pub fn resolve_props(element: &DesignElement, doc: &Document) -> Value {
    let mut props = element.props.clone();
    if element.data_bindings.is_empty() {
        return props;
    }
    if !props.is_object() {
        props = Value::Object(serde_json::Map::new());
    }
    for (prop, binding) in &element.data_bindings {
        match binding.source_type {
            BindingSource::Variable => match doc.variable(&binding.source_id) {
                Some(variable) => {
                    if let Some(map) = props.as_object_mut() {
                        map.insert(prop.clone(), variable.value.clone());
                    }
                }
                None => debug!(prop, source = %binding.source_id, "bound variable not found"),
            },
            BindingSource::ContractState | BindingSource::Content | BindingSource::Api => {
                // Resolved by external collaborators; pass through.
            }
        }
    }
    props
}

/// Resolve a fired element event into the actions to dispatch.
///
/// Both the user-supplied handler's result (when it is a recognized
/// [`ElementAction`] shape) and the action derived from the event binding
/// are dispatched; they are not mutually exclusive. `payload` is the event
/// payload forwarded to flow triggers and variable writes.
#[must_use]
pub fn fire_event(
    element: &DesignElement,
    event: &str,
    handler_result: Option<ElementAction>,
    payload: &Value,
) -> Vec<ElementAction> {
    let mut actions = Vec::new();
    if let Some(action) = handler_result {
        actions.push(action);
    }
    if let Some(binding) = element.event_bindings.get(event) {
        actions.push(match binding.handler_type {
            HandlerType::Flow => ElementAction::TriggerFlow {
                flow_id: binding.handler_id.clone(),
                payload: payload.clone(),
            },
            HandlerType::Contract => ElementAction::CallContract {
                contract_id: binding.handler_id.clone(),
                method: binding.transform.clone().unwrap_or_default(),
                args: payload.clone(),
            },
            HandlerType::Variable => ElementAction::SetVariable {
                variable_id: binding.handler_id.clone(),
                value: payload.clone(),
            },
        });
    } else if actions.is_empty() {
        debug!(event, element = %element.id, "event fired with no binding or handler");
    }
    actions
}

/// Route one element action to its owning subsystem.
///
/// Variable writes come back as reducer actions; everything else belongs to
/// external collaborators (navigation, contract execution, flow runtime)
/// and is surfaced through logging until the host routes it.
#[must_use]
pub fn dispatch(action: &ElementAction) -> Option<Action> {
    match action {
        ElementAction::SetVariable { variable_id, value } => Some(Action::UpdateVariable {
            id: variable_id.clone(),
            patch: VariablePatch { value: Some(value.clone()), ..Default::default() },
        }),
        ElementAction::Navigate { to } => {
            info!(to, "navigate action routed to host");
            None
        }
        ElementAction::CallContract { contract_id, method, .. } => {
            info!(contract = %contract_id, method, "contract call routed to host");
            None
        }
        ElementAction::TriggerFlow { flow_id, .. } => {
            info!(flow = %flow_id, "flow trigger routed to host");
            None
        }
        ElementAction::OpenUrl { url } => {
            info!(url, "open-url action routed to host");
            None
        }
        ElementAction::Custom { name, .. } | ElementAction::EmitEvent { name, .. } => {
            info!(name, "custom action routed to host");
            None
        }
    }
}

// =============================================================================
// RENDER CONTRACT
// =============================================================================

/// One node of the outbound render tree: a component tag, its resolved
/// props, and its rendered children. The external element factory maps the
/// tag to a concrete visual primitive; this crate never does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub component_type: String,
    pub props: Value,
    pub children: Vec<RenderNode>,
}

/// Assemble the render tree for the whole design view.
///
/// Roots are elements not referenced as any other element's child. Child
/// references to missing elements are skipped with a warning, and an
/// element appearing in multiple parents renders only under the first —
/// the tree never recurses into a cycle.
#[must_use]
pub fn render_tree(doc: &Document) -> Vec<RenderNode> {
    let mut referenced: Vec<&str> = Vec::new();
    for element in &doc.design_view.elements {
        for child in &element.children {
            referenced.push(child);
        }
    }
    let mut visited: Vec<&str> = Vec::new();
    doc.design_view
        .elements
        .iter()
        .filter(|e| !referenced.contains(&e.id.as_str()))
        .filter_map(|e| render_element(doc, &e.id, &mut visited))
        .collect()
}

fn render_element<'a>(doc: &'a Document, id: &str, visited: &mut Vec<&'a str>) -> Option<RenderNode> {
    let Some(element) = doc.design_view.element(id) else {
        warn!(id, "render skipped unknown element reference");
        return None;
    };
    if visited.contains(&element.id.as_str()) {
        warn!(id, "render skipped repeated element reference");
        return None;
    }
    visited.push(&element.id);
    let children = element
        .children
        .iter()
        .filter_map(|child| render_element(doc, child, visited))
        .collect();
    Some(RenderNode {
        component_type: element.component_type.clone(),
        props: resolve_props(element, doc),
        children,
    })
}
