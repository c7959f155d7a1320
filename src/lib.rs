//! In-memory editor core for the appboard no-code application builder.
//!
//! This crate owns the full lifecycle of the editor document: a reducer-driven
//! state tree backing both the design view (an absolute-positioned canvas of
//! nested elements) and the flow view (a node-graph logic editor with typed
//! ports), unified under one undo/redo history and one cross-view binding
//! layer. The host application layer is responsible only for wiring pointer
//! and keyboard events into the controllers, feeding the resulting
//! [`action::Action`]s back through [`reducer::reduce`], and rendering the
//! [`binding::RenderNode`] trees this crate produces.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Document model: design elements, flow graph, history, registries |
//! | [`action`] | The closed action union consumed by the reducer |
//! | [`reducer`] | Pure state transitions and undo/redo snapshotting |
//! | [`geometry`] | Viewport pan/zoom, coordinate transforms, resize math |
//! | [`design`] | Pointer gesture state machine for the design canvas |
//! | [`flow`] | Node factory, parameter schemas, and graph editing |
//! | [`binding`] | Data/event binding resolution and the render contract |
//! | [`session`] | Editor aggregate and explicit state-container wiring |
//! | [`autosave`] | Background history checkpoint scheduling |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod action;
pub mod autosave;
pub mod binding;
pub mod consts;
pub mod design;
pub mod doc;
pub mod flow;
pub mod geometry;
pub mod reducer;
pub mod session;
