//! Shared numeric constants for the editor core.

// ── Geometry ────────────────────────────────────────────────────

/// Minimum width/height an element may reach through a resize gesture.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Lowest permitted viewport zoom factor.
pub const ZOOM_MIN: f64 = 0.2;

/// Highest permitted viewport zoom factor.
pub const ZOOM_MAX: f64 = 3.0;

/// Zoom change per wheel tick or zoom-button press.
pub const ZOOM_STEP: f64 = 0.1;

// ── Design view ─────────────────────────────────────────────────

/// Default bounding box for an element inserted by palette drop.
pub const DROP_WIDTH: f64 = 100.0;
pub const DROP_HEIGHT: f64 = 40.0;

/// Reserved id of the single root container an editor document may carry.
pub const DEFAULT_CONTAINER_ID: &str = "default-container";

/// Pointer-move throttle window, roughly one display frame.
pub const POINTER_THROTTLE_MS: u64 = 16;

// ── History / autosave ──────────────────────────────────────────

/// Maximum retained undo entries; the oldest entry is dropped beyond this.
pub const HISTORY_LIMIT: usize = 50;

/// Autosave interval used when the editor settings carry none.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 3000;
