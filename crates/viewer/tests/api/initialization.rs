use crate::helpers::{
    boundaries_fixture, damage_points_fixture, not_found, spawn_session, test_logger, test_tiles,
    MapCall, MockFetcher,
};
use async_trait::async_trait;
use geojson::FeatureCollection;
use mockall::predicate::eq;
use std::time::Duration;
use tokio::sync::Barrier;
use viewer::{
    initialize, AnnotationSlot, Dataset, DatasetFetcher, DatasetStatus, LoadError, Region,
    SupersedePolicy, UiEvent, OVERVIEW, OVERVIEW_LABEL, POINTS_COUNT_LABEL,
};

fn fetcher_with(
    boundaries: fn() -> Result<FeatureCollection, LoadError>,
    damage_points: fn() -> Result<FeatureCollection, LoadError>,
) -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .with(eq(Dataset::Boundaries))
        .times(1)
        .returning(move |_| boundaries());
    fetcher
        .expect_fetch()
        .with(eq(Dataset::DamagePoints))
        .times(1)
        .returning(move |_| damage_points());
    fetcher
}

#[tokio::test]
async fn renders_both_layers_and_dismisses_the_loader() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    let fetcher = fetcher_with(|| Ok(boundaries_fixture()), || Ok(damage_points_fixture()));

    let report = initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()).await;

    assert_eq!(report.boundaries, DatasetStatus::Rendered { features: 5 });
    assert_eq!(report.damage_points, DatasetStatus::Rendered { features: 3 });
    assert_eq!(report.setup_error, None);

    let map = test.map.lock().unwrap();
    assert_eq!(
        map.calls,
        vec![
            MapCall::SetView(OVERVIEW),
            MapCall::TileLayer(test_tiles().url_template),
            MapCall::BoundaryLayer(5),
            MapCall::PointLayer(3),
        ]
    );
    let page = test.page.lock().unwrap();
    assert_eq!(page.current_view.as_deref(), Some(OVERVIEW_LABEL));
    assert_eq!(page.points_count.as_deref(), Some(POINTS_COUNT_LABEL));
    assert!(page.loader_dismissed);
}

#[tokio::test]
async fn failed_boundaries_still_render_damage_points() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    let fetcher = fetcher_with(
        || Err(not_found(Dataset::Boundaries)),
        || Ok(damage_points_fixture()),
    );

    let report = initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()).await;

    assert!(matches!(report.boundaries, DatasetStatus::Failed(ref e) if e.contains("404")));
    assert_eq!(report.damage_points, DatasetStatus::Rendered { features: 3 });
    assert_eq!(report.setup_error, None);

    let map = test.map.lock().unwrap();
    assert!(map.calls.contains(&MapCall::PointLayer(3)));
    assert!(!map
        .calls
        .iter()
        .any(|c| matches!(c, MapCall::BoundaryLayer(_))));
    let page = test.page.lock().unwrap();
    assert_eq!(page.points_count.as_deref(), Some(POINTS_COUNT_LABEL));
    assert!(page.loader_dismissed);
}

#[tokio::test]
async fn failed_damage_points_still_render_boundaries() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    let fetcher = fetcher_with(
        || Ok(boundaries_fixture()),
        || Err(not_found(Dataset::DamagePoints)),
    );

    let report = initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()).await;

    assert_eq!(report.boundaries, DatasetStatus::Rendered { features: 5 });
    assert!(!report.damage_points.is_rendered());
    assert!(test
        .map
        .lock()
        .unwrap()
        .calls
        .contains(&MapCall::BoundaryLayer(5)));
    assert!(test.page.lock().unwrap().loader_dismissed);
}

#[tokio::test]
async fn both_fetches_failing_still_completes() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    let fetcher = fetcher_with(
        || Err(not_found(Dataset::Boundaries)),
        || Err(not_found(Dataset::DamagePoints)),
    );

    let report = initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()).await;

    assert!(!report.boundaries.is_rendered());
    assert!(!report.damage_points.is_rendered());
    assert_eq!(report.setup_error, None);

    let page = test.page.lock().unwrap();
    assert!(page.loader_dismissed);
    assert_eq!(page.current_view.as_deref(), Some(OVERVIEW_LABEL));
    assert_eq!(page.points_count.as_deref(), Some(POINTS_COUNT_LABEL));
}

#[tokio::test]
async fn setup_errors_skip_the_datasets_but_dismiss_the_loader() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    test.map.lock().unwrap().reject_set_view = true;
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();

    let report = initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()).await;

    assert!(report
        .setup_error
        .as_deref()
        .is_some_and(|e| e.contains("set_view")));
    assert_eq!(report.boundaries, DatasetStatus::Skipped);
    assert_eq!(report.damage_points, DatasetStatus::Skipped);
    assert!(test.map.lock().unwrap().calls.is_empty());
    assert!(test.page.lock().unwrap().loader_dismissed);
}

/// Each fetch waits for the other one to start, so this only finishes when
/// both requests are in flight at the same time.
struct RendezvousFetcher {
    barrier: Barrier,
}

#[async_trait]
impl DatasetFetcher for RendezvousFetcher {
    async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, LoadError> {
        self.barrier.wait().await;
        match dataset {
            Dataset::Boundaries => Ok(boundaries_fixture()),
            Dataset::DamagePoints => Ok(damage_points_fixture()),
        }
    }
}

#[tokio::test]
async fn datasets_are_fetched_concurrently() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    let fetcher = RendezvousFetcher {
        barrier: Barrier::new(2),
    };

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()),
    )
    .await
    .expect("fetches ran one after the other");

    assert!(report.boundaries.is_rendered());
    assert!(report.damage_points.is_rendered());
}

#[tokio::test]
async fn boundaries_respond_to_hover_after_initialization() {
    let mut test = spawn_session(SupersedePolicy::LastWriteWins);
    let fetcher = fetcher_with(|| Ok(boundaries_fixture()), || Ok(damage_points_fixture()));
    initialize(&mut test.session, &fetcher, &test_tiles(), &test_logger()).await;

    test.session.dispatch(UiEvent::BoundaryHover {
        name: "Khan Younis".to_string(),
    });
    assert_eq!(
        test.session.controller().annotation(),
        AnnotationSlot::Open(Region::KhanYounis)
    );

    test.session.dispatch(UiEvent::BoundaryLeave);
    assert_eq!(
        test.session.controller().annotation(),
        AnnotationSlot::Closed
    );
}
