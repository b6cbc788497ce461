use std::{fmt, time::Duration};

use async_trait::async_trait;
use geojson::FeatureCollection;
use reqwest::Client;
use slog::{debug, error, info, Logger};

use crate::{
    BoundaryLayer, DamagePointLayer, MapSession, MapSurface, PageSurface, SurfaceError,
    TileLayer, OVERVIEW, OVERVIEW_LABEL, POINTS_COUNT_LABEL,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Boundaries,
    DamagePoints,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Boundaries => write!(f, "boundaries"),
            Dataset::DamagePoints => write!(f, "damage points"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, LoadError>;
}

/// Where each dataset lives: an `http(s)://` URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub boundaries: String,
    pub damage_points: String,
}

impl DataSources {
    pub fn source(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Boundaries => &self.boundaries,
            Dataset::DamagePoints => &self.damage_points,
        }
    }
}

/// Fetches over HTTP or from disk depending on the source. No retries.
pub struct SourceFetcher {
    logger: Logger,
    client: Client,
    sources: DataSources,
}

impl SourceFetcher {
    pub fn new(logger: Logger, sources: DataSources, user_agent: &str) -> Result<Self, LoadError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            logger,
            client,
            sources,
        })
    }

    async fn fetch_http(&self, url: &str) -> Result<String, LoadError> {
        debug!(self.logger, "requesting: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    async fn read_file(&self, path: &str) -> Result<String, LoadError> {
        debug!(self.logger, "reading: {}", path);
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.to_string(),
                source,
            })
    }
}

#[async_trait]
impl DatasetFetcher for SourceFetcher {
    async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, LoadError> {
        let source = self.sources.source(dataset);
        let body = if is_remote(source) {
            self.fetch_http(source).await?
        } else {
            self.read_file(source).await?
        };
        Ok(serde_json::from_str(&body)?)
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch both datasets concurrently; each result stands on its own.
pub async fn load_datasets<F: DatasetFetcher + ?Sized>(
    fetcher: &F,
) -> (
    Result<FeatureCollection, LoadError>,
    Result<FeatureCollection, LoadError>,
) {
    tokio::join!(
        fetcher.fetch(Dataset::Boundaries),
        fetcher.fetch(Dataset::DamagePoints)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    /// Setup failed before the dataset was requested.
    Skipped,
    Rendered { features: usize },
    Failed(String),
}

impl DatasetStatus {
    pub fn is_rendered(&self) -> bool {
        matches!(self, DatasetStatus::Rendered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub boundaries: DatasetStatus,
    pub damage_points: DatasetStatus,
    pub setup_error: Option<String>,
}

/// Bring up the map: overview, basemap, labels, then both datasets.
///
/// Never fails. Setup errors and per-dataset failures are logged and recorded
/// in the report, and the loader is dismissed whatever happened.
pub async fn initialize<M, P, F>(
    session: &mut MapSession<M, P>,
    fetcher: &F,
    tiles: &TileLayer,
    logger: &Logger,
) -> InitReport
where
    M: MapSurface,
    P: PageSurface,
    F: DatasetFetcher + ?Sized,
{
    info!(logger, "Starting to create the map...");
    let mut report = InitReport {
        boundaries: DatasetStatus::Skipped,
        damage_points: DatasetStatus::Skipped,
        setup_error: None,
    };

    match setup(session, fetcher, tiles, logger, &mut report).await {
        Ok(()) => info!(logger, "Map created successfully";
            "boundaries" => format!("{:?}", report.boundaries),
            "damage_points" => format!("{:?}", report.damage_points)),
        Err(e) => {
            error!(logger, "error initializing map: {}", e);
            report.setup_error = Some(e.to_string());
        }
    }

    session.controller_mut().page_mut().dismiss_loader();
    report
}

async fn setup<M, P, F>(
    session: &mut MapSession<M, P>,
    fetcher: &F,
    tiles: &TileLayer,
    logger: &Logger,
    report: &mut InitReport,
) -> Result<(), SurfaceError>
where
    M: MapSurface,
    P: PageSurface,
    F: DatasetFetcher + ?Sized,
{
    let controller = session.controller_mut();
    controller.map_mut().set_view(OVERVIEW)?;
    controller.map_mut().add_tile_layer(tiles)?;
    controller.page_mut().set_current_view(OVERVIEW_LABEL);
    controller.page_mut().set_points_count(POINTS_COUNT_LABEL);

    let (boundaries, damage_points) = load_datasets(fetcher).await;
    let map = session.controller_mut().map_mut();

    report.boundaries = match boundaries {
        Ok(collection) => {
            let layer = BoundaryLayer::from_collection(collection);
            render(Dataset::Boundaries, layer.len(), map.add_boundary_layer(&layer), logger)
        }
        Err(e) => failed(Dataset::Boundaries, e, logger),
    };
    report.damage_points = match damage_points {
        Ok(collection) => {
            let layer = DamagePointLayer::from_collection(collection);
            render(Dataset::DamagePoints, layer.len(), map.add_point_layer(&layer), logger)
        }
        Err(e) => failed(Dataset::DamagePoints, e, logger),
    };

    Ok(())
}

fn render(
    dataset: Dataset,
    features: usize,
    added: Result<(), SurfaceError>,
    logger: &Logger,
) -> DatasetStatus {
    match added {
        Ok(()) => {
            info!(logger, "{} layer added", dataset; "features" => features);
            DatasetStatus::Rendered { features }
        }
        Err(e) => failed(dataset, e, logger),
    }
}

fn failed(dataset: Dataset, err: impl fmt::Display, logger: &Logger) -> DatasetStatus {
    error!(logger, "error loading {}: {}", dataset, err);
    DatasetStatus::Failed(err.to_string())
}
