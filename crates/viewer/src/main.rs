use damage_map_core::write_file;
use slog::{error, info, o, warn, Logger};
use tokio::signal;
use viewer::{
    get_config_info, initialize, setup_logger, spawn_stdin_reader, templates, LogMap, LogPage,
    MapSession, SourceFetcher,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let (cli, config_source) = get_config_info();
    let logger = setup_logger(&cli);

    let sources = cli.data_sources();
    let tiles = cli.tile_layer();
    let session_config = cli.session_config();

    info!(logger, "Damage map viewer starting...");
    info!(logger, "  Config: {}", config_source);
    info!(logger, "  Boundaries: {}", sources.boundaries);
    info!(logger, "  Damage points: {}", sources.damage_points);
    info!(logger, "  Supersede policy: {:?}", session_config.policy);

    if let Some(page_out) = cli.page_out.as_deref() {
        let page = templates::map_page(&templates::PageConfig {
            title: "Gaza Damage Map",
            boundaries_url: &sources.boundaries,
            damage_points_url: &sources.damage_points,
            tile_url: &tiles.url_template,
            tile_attribution: &tiles.attribution,
        });
        write_file(page_out, &page.into_string())?;
        info!(logger, "page shell written to {}", page_out;
            "script" => templates::PAGE_SCRIPT, "stylesheet" => templates::PAGE_STYLESHEET);
    }

    let fetcher = SourceFetcher::new(
        logger.new(o!("component" => "loader")),
        sources,
        &cli.user_agent(),
    )?;

    let mut session = MapSession::new(
        LogMap::new(logger.new(o!("surface" => "map"))),
        LogPage::new(logger.new(o!("surface" => "page"))),
        session_config,
        logger.new(o!("component" => "session")),
    );

    let report = initialize(&mut session, &fetcher, &tiles, &logger).await;
    if report.setup_error.is_some() {
        warn!(logger, "continuing with a partially initialized map");
    }

    info!(
        logger,
        "commands: focus <region>, hover <boundary name>, leave, reset, quit"
    );
    // Detached: a read still blocked on stdin must not keep the process alive.
    let _commands = spawn_stdin_reader(
        session.handle(),
        logger.new(o!("component" => "commands")),
    );

    tokio::select! {
        _ = session.run() => {},
        _ = shutdown_signal(logger.clone()) => {
            info!(logger, "shutdown signal received");
        }
    }

    Ok(())
}

async fn shutdown_signal(logger: Logger) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(logger, "failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(logger, "failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
