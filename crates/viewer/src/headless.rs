//! Terminal-driven surfaces: every map and page command is written to the log.

use std::io::BufRead;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use maud::Markup;
use slog::{error, info, warn, Logger};

use crate::{
    BoundaryLayer, DamagePointLayer, LatLng, MapSurface, PageSurface, Region, SurfaceError,
    SessionHandle, TileLayer, UiEvent, Viewport,
};

pub struct LogMap {
    logger: Logger,
}

impl LogMap {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl MapSurface for LogMap {
    fn set_view(&mut self, view: Viewport) -> Result<(), SurfaceError> {
        info!(self.logger, "map: set view";
            "lat" => view.center.lat, "lng" => view.center.lng, "zoom" => view.zoom);
        Ok(())
    }

    fn fly_to(&mut self, view: Viewport, duration: Duration) {
        info!(self.logger, "map: fly to";
            "lat" => view.center.lat, "lng" => view.center.lng, "zoom" => view.zoom,
            "duration_ms" => duration.as_millis() as u64);
    }

    fn open_popup(&mut self, anchor: LatLng, content: Markup) {
        info!(self.logger, "map: open popup";
            "lat" => anchor.lat, "lng" => anchor.lng, "content" => content.into_string());
    }

    fn close_popup(&mut self) {
        info!(self.logger, "map: close popup");
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), SurfaceError> {
        info!(self.logger, "map: tile layer";
            "url" => &layer.url_template, "attribution" => &layer.attribution);
        Ok(())
    }

    fn add_boundary_layer(&mut self, layer: &BoundaryLayer) -> Result<(), SurfaceError> {
        let regions: Vec<&str> = layer
            .resolved_regions()
            .into_iter()
            .map(Region::key)
            .collect();
        info!(self.logger, "map: boundary layer";
            "features" => layer.len(), "regions" => regions.join(","));
        Ok(())
    }

    fn add_point_layer(&mut self, layer: &DamagePointLayer) -> Result<(), SurfaceError> {
        info!(self.logger, "map: damage point layer"; "points" => layer.len());
        Ok(())
    }
}

pub struct LogPage {
    logger: Logger,
    active: Option<Region>,
}

impl LogPage {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            active: None,
        }
    }
}

impl PageSurface for LogPage {
    fn set_current_view(&mut self, label: &str) {
        info!(self.logger, "page: current view"; "label" => label);
    }

    fn set_points_count(&mut self, label: &str) {
        info!(self.logger, "page: points count"; "label" => label);
    }

    fn set_control_active(&mut self, region: Region, active: bool) {
        // Only log transitions; the controller sweeps every control on each change.
        if active && self.active != Some(region) {
            self.active = Some(region);
            info!(self.logger, "page: control active"; "region" => region.key());
        } else if !active && self.active == Some(region) {
            self.active = None;
            info!(self.logger, "page: control inactive"; "region" => region.key());
        }
    }

    fn dismiss_loader(&mut self) {
        info!(self.logger, "page: loader dismissed");
    }
}

/// Parse a terminal command into a session event.
///
/// `focus <id>`, `hover <boundary name>`, `leave`, `reset`, `quit`.
pub fn parse_command(line: &str) -> Option<UiEvent> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match (command.to_lowercase().as_str(), rest) {
        ("focus", key) if !key.is_empty() => Some(UiEvent::FocusKey(key.to_string())),
        ("hover", name) if !name.is_empty() => Some(UiEvent::BoundaryHover {
            name: name.to_string(),
        }),
        ("leave", "") => Some(UiEvent::BoundaryLeave),
        ("reset", "") | ("zoom-out", "") => Some(UiEvent::ResetView),
        ("quit", "") | ("exit", "") => Some(UiEvent::Shutdown),
        _ => None,
    }
}

/// Send each parsed line of `input` to the session. Stops at `quit`, end of
/// input or a read error, then sends `Shutdown`. Returns how many events were
/// forwarded before that.
pub fn forward_commands<R: BufRead>(
    input: R,
    handle: &SessionHandle,
    logger: &Logger,
) -> usize {
    let mut forwarded = 0;
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(logger, "error reading command: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(UiEvent::Shutdown) => break,
            Some(event) => {
                if !handle.send(event) {
                    return forwarded;
                }
                forwarded += 1;
            }
            None => warn!(logger, "unrecognized command: {}", line.trim()),
        }
    }
    let _ = handle.send(UiEvent::Shutdown);
    forwarded
}

/// Read terminal commands on a plain OS thread. A blocked stdin read there
/// does not hold up runtime shutdown.
pub fn spawn_stdin_reader(handle: SessionHandle, logger: Logger) -> JoinHandle<usize> {
    thread::spawn(move || forward_commands(std::io::stdin().lock(), &handle, &logger))
}
