use std::{process, sync::Arc, time::Duration};

use apalis::{
    layers::WorkerBuilderExt,
    prelude::{Monitor, WorkerBuilder, WorkerFactoryFn},
};
use apalis_sql::{Config as ApalisSqlConfig, postgres::PostgresStorage};
use menuhub::{
    application::{
        catalog::{DishService, MenuService, SubmenuService},
        error::AppError,
        jobs::{ReportWorkerContext, process_data_report_job},
        reports::DataReportService,
        repos::{CatalogExportRepo, HealthRepo, JobsRepo},
        seed::{CatalogSeeder, SeedFixture},
    },
    cache::{self, CacheClient, CacheConfig},
    config,
    domain::types::JobType,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(_) => run_seed(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    PostgresRepositories::run_job_migrations(repositories.pool())
        .await
        .map_err(|err| InfraError::database(format!("failed to set up job storage: {err}")))?;

    let cache = connect_cache(&settings).await?;
    let (menus, submenus, dishes) = build_catalog_services(&repositories, &cache);

    let export_repo: Arc<dyn CatalogExportRepo> = repositories.clone();
    let jobs_repo: Arc<dyn JobsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories.clone();

    let state = ApiState {
        menus: menus.clone(),
        submenus: submenus.clone(),
        dishes: dishes.clone(),
        reports: DataReportService::new(
            export_repo,
            jobs_repo,
            settings.reports.directory.clone(),
        ),
        seeder: CatalogSeeder::new(menus, submenus, dishes),
        db: health_repo,
    };

    let monitor_handle = spawn_job_monitor(&repositories, &settings.reports);

    let result = serve_http(&settings, state).await;

    monitor_handle.abort();
    let _ = monitor_handle.await;
    repositories.close().await;

    result
}

async fn run_seed(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = connect_cache(&settings).await?;
    let (menus, submenus, dishes) = build_catalog_services(&repositories, &cache);

    let path = settings.seed.fixture.clone();
    info!(
        target = "menuhub::seed",
        path = %path.display(),
        "Loading fixture"
    );

    let fixture = SeedFixture::from_file(&path).await?;
    let summary = CatalogSeeder::new(menus, submenus, dishes)
        .apply(fixture)
        .await?;

    info!(
        target = "menuhub::seed",
        menus = summary.menus,
        submenus = summary.submenus,
        dishes = summary.dishes,
        "Seed completed"
    );

    repositories.close().await;
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn connect_cache(settings: &config::Settings) -> Result<CacheClient, AppError> {
    cache::connect(&CacheConfig::from(&settings.cache))
        .await
        .map_err(|err| AppError::from(InfraError::cache(err.to_string())))
}

fn build_catalog_services(
    repositories: &Arc<PostgresRepositories>,
    cache: &CacheClient,
) -> (MenuService, SubmenuService, DishService) {
    (
        MenuService::new(repositories.clone(), cache.clone()),
        SubmenuService::new(repositories.clone(), cache.clone()),
        DishService::new(repositories.clone(), cache.clone()),
    )
}

fn spawn_job_monitor(
    repositories: &Arc<PostgresRepositories>,
    reports: &config::ReportSettings,
) -> tokio::task::JoinHandle<()> {
    let report_storage = PostgresStorage::new_with_config(
        repositories.pool().clone(),
        ApalisSqlConfig::new(JobType::DataReport.as_str()),
    );

    let context = ReportWorkerContext::new(reports.directory.clone());
    let report_worker = WorkerBuilder::new("data-report-worker")
        .concurrency(reports.concurrency.get() as usize)
        .data(context)
        .backend(report_storage)
        .build_fn(process_data_report_job);

    let monitor = Monitor::new().register(report_worker);

    tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "job monitor stopped");
        }
    })
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "menuhub::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let (stopped_tx, stopped_rx) = oneshot::channel::<()>();
    let grace = settings.server.graceful_shutdown;
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stopped_tx.send(());
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        _ = drain_deadline(stopped_rx, grace) => {
            warn!(
                target = "menuhub::http",
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

/// Resolves once shutdown has been requested and the grace period has elapsed.
async fn drain_deadline(stopped: oneshot::Receiver<()>, grace: Duration) {
    if stopped.await.is_err() {
        futures::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                futures::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "menuhub::http", "Shutdown requested");
}
