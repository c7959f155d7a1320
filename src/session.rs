//! Editor aggregate and explicit state-container wiring.
//!
//! The host supplies an [`Editor`] once at mount time; [`EditorSession`]
//! threads its persisted state through the reducer and keeps the live
//! [`Document`] plus the dispatch entry point together in one explicit
//! container — nothing here is ambient or global, so the core stays
//! host-agnostic and trivially testable.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::doc::{now_ms, Document, EditorSettings, RegistryEntry};
use crate::reducer::reduce;

/// A saved version label on an editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorVersion {
    pub id: String,
    pub label: String,
    pub created_at: u64,
}

/// A user with access to an editor. Presence fields are inert placeholders;
/// no concurrent-merge logic exists or is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub color: String,
}

/// The persisted editor aggregate handed in by the host at mount time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: u64,
    pub updated_at: u64,
    /// The persisted document, loaded into the live reducer via
    /// [`Action::LoadEditor`].
    pub state: Document,
    pub versions: Vec<EditorVersion>,
    pub collaborators: Vec<Collaborator>,
    pub settings: EditorSettings,
    /// Deployment environments, opaque to the core.
    pub environments: Vec<RegistryEntry>,
}

impl Editor {
    /// A fresh, empty editor owned by nobody.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let now = now_ms();
        Self {
            id: crate::doc::new_id(),
            name: name.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            state: Document::default(),
            versions: Vec::new(),
            collaborators: Vec::new(),
            settings: EditorSettings::default(),
            environments: Vec::new(),
        }
    }
}

/// Owns the live document for one editing session and funnels every state
/// change through the reducer.
#[derive(Debug, Default)]
pub struct EditorSession {
    doc: Document,
    /// Identity used for attribution on created entities.
    pub current_user: Option<String>,
}

impl EditorSession {
    /// Start a session on an empty default document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from a persisted editor. Equivalent to dispatching
    /// [`Action::LoadEditor`]; the design view becomes current.
    #[must_use]
    pub fn load(editor: &Editor) -> Self {
        let mut session = Self::default();
        session.dispatch(Action::LoadEditor { state: Box::new(editor.state.clone()) });
        session
    }

    /// The live document.
    #[must_use]
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Run one action through the reducer.
    pub fn dispatch(&mut self, action: Action) {
        let doc = std::mem::take(&mut self.doc);
        self.doc = reduce(doc, action);
    }

    /// Run a batch of actions in order.
    pub fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }
}
