//! # babylog backend
//!
//! Daycare care log for babies: sleep checks with a live nap monitor and
//! overdue alarm, diaper/feeding/bottle logs, a per-day archive and a daily
//! email report to parents.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! Clients (web / tablet in the nap room)
//!     ↓
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (services, session grouping, sleep monitor)
//!     ↓
//! Storage Layer (CSV tables and YAML profiles per baby)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::models::care_log::{BottleLog, DiaperLog, FeedingLog};
use crate::domain::{
    BabyService, CareLogService, DailyLogService, EmailConfigService, LoggingReportSender, MonitorRegistry,
    ReportSender, ReportService, SleepCheckService, SmtpReportSender,
};
use crate::storage::csv::{BabyRepository, CareLogRepository, CsvConnection, SleepCheckRepository};
use crate::storage::{BabyStorage, SleepCheckFeed};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub baby_service: BabyService,
    pub sleep_check_service: SleepCheckService,
    pub monitors: MonitorRegistry,
    pub diaper_service: CareLogService<DiaperLog>,
    pub feeding_service: CareLogService<FeedingLog>,
    pub bottle_service: CareLogService<BottleLog>,
    pub daily_log_service: DailyLogService,
    pub report_service: ReportService,
}

/// Wire every service onto one data directory and report sender.
pub fn build_app_state(connection: CsvConnection, report_sender: Arc<dyn ReportSender>) -> AppState {
    let baby_repository: Arc<dyn BabyStorage> = Arc::new(BabyRepository::new(connection.clone()));
    let feed = Arc::new(SleepCheckFeed::new(Arc::new(SleepCheckRepository::new(connection.clone()))));

    let baby_service = BabyService::new(Arc::clone(&baby_repository));
    let sleep_check_service = SleepCheckService::new(Arc::clone(&feed), Arc::clone(&baby_repository));
    let monitors = MonitorRegistry::new(Arc::clone(&baby_repository), feed);

    let diaper_service = CareLogService::new(
        Arc::new(CareLogRepository::<DiaperLog>::new(connection.clone())),
        Arc::clone(&baby_repository),
    );
    let feeding_service = CareLogService::new(
        Arc::new(CareLogRepository::<FeedingLog>::new(connection.clone())),
        Arc::clone(&baby_repository),
    );
    let bottle_service = CareLogService::new(
        Arc::new(CareLogRepository::<BottleLog>::new(connection)),
        Arc::clone(&baby_repository),
    );

    let daily_log_service = DailyLogService::new(
        sleep_check_service.clone(),
        diaper_service.clone(),
        feeding_service.clone(),
        bottle_service.clone(),
    );
    let report_service = ReportService::new(baby_repository, daily_log_service.clone(), report_sender);

    AppState {
        baby_service,
        sleep_check_service,
        monitors,
        diaper_service,
        feeding_service,
        bottle_service,
        daily_log_service,
        report_service,
    }
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up data directory: {}", config.data_dir.display());
    let connection = CsvConnection::new(&config.data_dir)?;

    info!("Loading email config from {}", config.email_config_path.display());
    let email_config = EmailConfigService::load_config_or_default(&config.email_config_path);
    let report_sender: Arc<dyn ReportSender> = if email_config.is_enabled() {
        Arc::new(SmtpReportSender::new(email_config)?)
    } else {
        Arc::new(LoggingReportSender)
    };

    info!("Setting up application state");
    Ok(build_app_state(connection, report_sender))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed origin: {}", allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/babies", get(io::list_babies).post(io::create_baby))
        .route("/babies/:baby_id", get(io::get_baby).put(io::update_baby))
        .route(
            "/babies/:baby_id/sleep-checks",
            get(io::list_sleep_checks).post(io::record_sleep_check),
        )
        .route(
            "/babies/:baby_id/sleep-checks/:check_id",
            put(io::update_sleep_check).delete(io::delete_sleep_check),
        )
        .route("/babies/:baby_id/sleep-sessions", get(io::list_sleep_sessions))
        .route(
            "/babies/:baby_id/monitor",
            get(io::get_monitor_status).delete(io::close_monitor),
        )
        .route("/babies/:baby_id/monitor/start", post(io::start_sleep))
        .route("/babies/:baby_id/monitor/check", post(io::check_sleep))
        .route("/babies/:baby_id/monitor/stop", post(io::stop_sleep))
        .route("/babies/:baby_id/diapers", get(io::list_diapers).post(io::create_diaper))
        .route("/babies/:baby_id/diapers/:log_id", delete(io::delete_diaper))
        .route("/babies/:baby_id/feedings", get(io::list_feedings).post(io::create_feeding))
        .route("/babies/:baby_id/feedings/:log_id", delete(io::delete_feeding))
        .route("/babies/:baby_id/bottles", get(io::list_bottles).post(io::create_bottle))
        .route("/babies/:baby_id/bottles/:log_id", delete(io::delete_bottle))
        .route("/babies/:baby_id/daily-logs", get(io::list_daily_logs))
        .route("/babies/:baby_id/reports", post(io::send_report));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
