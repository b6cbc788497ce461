use async_trait::async_trait;
use geojson::FeatureCollection;
use maud::Markup;
use mockall::mock;
use serde_json::json;
use slog::{o, Discard, Drain, Logger, Never, OwnedKVList, Record, KV};
use std::fmt::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use viewer::{
    BoundaryLayer, DamagePointLayer, Dataset, DatasetFetcher, LatLng, LoadError, MapSession,
    MapSurface, PageSurface, Region, SessionConfig, SupersedePolicy, SurfaceError, TileLayer,
    Viewport,
};

mock! {
    pub Fetcher {}
    #[async_trait]
    impl DatasetFetcher for Fetcher {
        async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, LoadError>;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    SetView(Viewport),
    FlyTo(Viewport, Duration),
    OpenPopup { anchor: LatLng, content: String },
    ClosePopup,
    TileLayer(String),
    BoundaryLayer(usize),
    PointLayer(usize),
}

#[derive(Debug, Default)]
pub struct MapLog {
    pub calls: Vec<MapCall>,
    pub open_popups: usize,
    pub max_open_popups: usize,
    pub reject_set_view: bool,
}

impl MapLog {
    pub fn popup_calls(&self) -> Vec<MapCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, MapCall::OpenPopup { .. } | MapCall::ClosePopup))
            .cloned()
            .collect()
    }

    pub fn last_fly_to(&self) -> Option<Viewport> {
        self.calls.iter().rev().find_map(|c| match c {
            MapCall::FlyTo(view, _) => Some(*view),
            _ => None,
        })
    }
}

/// Map backend that records every command and tracks how many popups are
/// visible at once.
#[derive(Clone, Default)]
pub struct RecordingMap {
    pub log: Arc<Mutex<MapLog>>,
}

impl MapSurface for RecordingMap {
    fn set_view(&mut self, view: Viewport) -> Result<(), SurfaceError> {
        let mut log = self.log.lock().unwrap();
        if log.reject_set_view {
            return Err(SurfaceError::Rejected {
                operation: "set_view",
                reason: "map container missing".to_string(),
            });
        }
        log.calls.push(MapCall::SetView(view));
        Ok(())
    }

    fn fly_to(&mut self, view: Viewport, duration: Duration) {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(MapCall::FlyTo(view, duration));
    }

    fn open_popup(&mut self, anchor: LatLng, content: Markup) {
        let mut log = self.log.lock().unwrap();
        log.open_popups += 1;
        log.max_open_popups = log.max_open_popups.max(log.open_popups);
        log.calls.push(MapCall::OpenPopup {
            anchor,
            content: content.into_string(),
        });
    }

    fn close_popup(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.open_popups = log.open_popups.saturating_sub(1);
        log.calls.push(MapCall::ClosePopup);
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), SurfaceError> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(MapCall::TileLayer(layer.url_template.clone()));
        Ok(())
    }

    fn add_boundary_layer(&mut self, layer: &BoundaryLayer) -> Result<(), SurfaceError> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(MapCall::BoundaryLayer(layer.len()));
        Ok(())
    }

    fn add_point_layer(&mut self, layer: &DamagePointLayer) -> Result<(), SurfaceError> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(MapCall::PointLayer(layer.len()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PageLog {
    pub current_view: Option<String>,
    pub points_count: Option<String>,
    pub active_controls: Vec<Region>,
    pub loader_dismissed: bool,
}

#[derive(Clone, Default)]
pub struct RecordingPage {
    pub log: Arc<Mutex<PageLog>>,
}

impl PageSurface for RecordingPage {
    fn set_current_view(&mut self, label: &str) {
        self.log.lock().unwrap().current_view = Some(label.to_string());
    }

    fn set_points_count(&mut self, label: &str) {
        self.log.lock().unwrap().points_count = Some(label.to_string());
    }

    fn set_control_active(&mut self, region: Region, active: bool) {
        let mut log = self.log.lock().unwrap();
        log.active_controls.retain(|r| *r != region);
        if active {
            log.active_controls.push(region);
        }
    }

    fn dismiss_loader(&mut self) {
        self.log.lock().unwrap().loader_dismissed = true;
    }
}

pub struct TestSession {
    pub session: MapSession<RecordingMap, RecordingPage>,
    pub map: Arc<Mutex<MapLog>>,
    pub page: Arc<Mutex<PageLog>>,
}

pub fn test_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Drain that keeps every record as `msg key=value ...` lines.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl CapturedLogs {
    pub fn logger(&self) -> Logger {
        Logger::root(self.clone(), o!())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

struct LineSerializer<'a>(&'a mut String);

impl slog::Serializer for LineSerializer<'_> {
    fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
        let _ = write!(self.0, " {}={}", key, val);
        Ok(())
    }
}

impl Drain for CapturedLogs {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
        let mut line = record.msg().to_string();
        let mut serializer = LineSerializer(&mut line);
        let _ = record.kv().serialize(record, &mut serializer);
        let _ = values.serialize(record, &mut serializer);
        self.lines.lock().unwrap().push(line);
        Ok(())
    }
}

pub fn spawn_session(policy: SupersedePolicy) -> TestSession {
    spawn_session_with_logger(policy, test_logger())
}

pub fn spawn_session_with_logger(policy: SupersedePolicy, logger: Logger) -> TestSession {
    let map = RecordingMap::default();
    let page = RecordingPage::default();
    let (map_log, page_log) = (map.log.clone(), page.log.clone());
    let config = SessionConfig {
        policy,
        ..SessionConfig::default()
    };

    TestSession {
        session: MapSession::new(map, page, config, logger),
        map: map_log,
        page: page_log,
    }
}

pub fn test_tiles() -> TileLayer {
    TileLayer {
        url_template: "https://tiles.test/{z}/{x}/{y}.png".to_string(),
        attribution: "test".to_string(),
    }
}

pub fn boundaries_fixture() -> FeatureCollection {
    let feature = |name: &str| {
        json!({
            "type": "Feature",
            "properties": { "ADM1_EN": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[34.2, 31.2], [34.3, 31.2], [34.3, 31.3], [34.2, 31.2]]]
            }
        })
    };
    serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            feature("North Gaza"),
            feature("Gaza"),
            feature("Deir Al-Balah"),
            feature("Khan Younis"),
            feature("Rafah"),
        ]
    }))
    .unwrap()
}

pub fn damage_points_fixture() -> FeatureCollection {
    let point = |lng: f64, lat: f64| {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Point", "coordinates": [lng, lat] }
        })
    };
    serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            point(34.46, 31.50),
            point(34.30, 31.34),
            point(34.25, 31.29),
        ]
    }))
    .unwrap()
}

pub fn not_found(dataset: Dataset) -> LoadError {
    LoadError::Status {
        url: format!("https://data.test/{:?}.geojson", dataset),
        status: 404,
    }
}
