//! Seams to the mapping backend and the surrounding page.
//!
//! Tile loading, pan/zoom animation, drawing and hit-testing all live behind
//! [`MapSurface`]. Labels, control highlights and the loading indicator live
//! behind [`PageSurface`].

use std::time::Duration;

use maud::Markup;

use crate::{BoundaryLayer, DamagePointLayer, Region};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Map center and zoom. Not validated here; the backend clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    #[error("map backend rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}

#[cfg_attr(test, mockall::automock)]
pub trait MapSurface {
    fn set_view(&mut self, view: Viewport) -> Result<(), SurfaceError>;
    /// Animate toward `view` over `duration`.
    fn fly_to(&mut self, view: Viewport, duration: Duration);
    fn open_popup(&mut self, anchor: LatLng, content: Markup);
    fn close_popup(&mut self);
    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), SurfaceError>;
    /// The backend reports hover/leave on these features back to the session.
    fn add_boundary_layer(&mut self, layer: &BoundaryLayer) -> Result<(), SurfaceError>;
    fn add_point_layer(&mut self, layer: &DamagePointLayer) -> Result<(), SurfaceError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PageSurface {
    fn set_current_view(&mut self, label: &str);
    fn set_points_count(&mut self, label: &str);
    fn set_control_active(&mut self, region: Region, active: bool);
    /// Fade out and remove the loading indicator.
    fn dismiss_loader(&mut self);
}
