//! Geometry and viewport math for both editor views.
//!
//! Everything in this module is pure: positions and dimensions are plain
//! serializable values, the viewport converts between screen and canvas
//! space, and [`ResizeHandle::apply`] implements the eight-way resize math
//! used by the design canvas. No function here touches document state.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_ELEMENT_SIZE, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in canvas space (or screen space, at the transform boundary).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of an element or node bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { width: 100.0, height: 100.0 }
    }
}

/// An axis-aligned rectangle in screen space, used for the canvas element's
/// bounding box when converting pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Pan/zoom state for one editor view.
///
/// `position` is the canvas-space offset applied before scaling; `zoom` is a
/// scale factor clamped to `[ZOOM_MIN, ZOOM_MAX]` (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub position: Position,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { position: Position::default(), zoom: 1.0 }
    }
}

impl Viewport {
    /// Convert a screen-space pointer position into canvas coordinates.
    ///
    /// `canvas_rect` is the screen-space bounding box of the canvas element;
    /// the pointer is first made canvas-relative, then un-panned and
    /// un-zoomed.
    #[must_use]
    pub fn screen_to_canvas(&self, pointer: Position, canvas_rect: &Rect) -> Position {
        Position {
            x: (pointer.x - canvas_rect.x - self.position.x) / self.zoom,
            y: (pointer.y - canvas_rect.y - self.position.y) / self.zoom,
        }
    }

    /// Convert a canvas-space point back to screen coordinates.
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Position, canvas_rect: &Rect) -> Position {
        Position {
            x: canvas.x * self.zoom + self.position.x + canvas_rect.x,
            y: canvas.y * self.zoom + self.position.y + canvas_rect.y,
        }
    }

    /// Pan by a pointer delta. Drag-to-pan moves the viewport inversely to
    /// the pointer motion.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.position.x -= dx;
        self.position.y -= dy;
    }

    /// Set the zoom factor, clamped to the permitted range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Reset zoom to 1.0, leaving the pan offset alone.
    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }
}

/// Snap a canvas position to the nearest grid intersection.
///
/// A non-positive `grid_size` disables snapping and returns the input.
#[must_use]
pub fn snap_to_grid(position: Position, grid_size: f64) -> Position {
    if grid_size <= 0.0 {
        return position;
    }
    Position {
        x: (position.x / grid_size).round() * grid_size,
        y: (position.y / grid_size).round() * grid_size,
    }
}

/// One of the eight resize handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    /// Apply a resize delta to a starting bounding box.
    ///
    /// Corner handles affect both axes; edge handles affect one. Handles on
    /// the north/west sides translate the position by the consumed delta so
    /// the opposite edge stays anchored. Both resulting dimensions are
    /// floored at [`MIN_ELEMENT_SIZE`]; when the floor engages on a
    /// north/west handle the translation shrinks accordingly, keeping the
    /// anchored edge fixed.
    #[must_use]
    pub fn apply(self, start_dims: Dimensions, start_pos: Position, dx: f64, dy: f64) -> (Dimensions, Position) {
        let mut dims = start_dims;
        let mut pos = start_pos;

        // East/west affect width; west also translates x against the
        // anchored east edge.
        match self {
            Self::E | Self::Ne | Self::Se => {
                dims.width = (start_dims.width + dx).max(MIN_ELEMENT_SIZE);
            }
            Self::W | Self::Nw | Self::Sw => {
                dims.width = (start_dims.width - dx).max(MIN_ELEMENT_SIZE);
                pos.x = start_pos.x + (start_dims.width - dims.width);
            }
            Self::N | Self::S => {}
        }

        // North/south affect height; north also translates y against the
        // anchored south edge.
        match self {
            Self::S | Self::Se | Self::Sw => {
                dims.height = (start_dims.height + dy).max(MIN_ELEMENT_SIZE);
            }
            Self::N | Self::Ne | Self::Nw => {
                dims.height = (start_dims.height - dy).max(MIN_ELEMENT_SIZE);
                pos.y = start_pos.y + (start_dims.height - dims.height);
            }
            Self::E | Self::W => {}
        }

        (dims, pos)
    }
}
