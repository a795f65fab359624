// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod recorder;
mod session;

use adminkit::{BulkOrchestrator, MemoryDirectory};
use adminkit_api::{
    ApiError, AuthenticatedActor, AuthenticationService, BulkActionForm, BulkActionResponse,
    CompleteSetupRequest, CompleteSetupResponse, ListActivitiesQuery, ListActivitiesResponse,
    LogActivityResponse, bulk_action, complete_setup, list_activities, log_activity,
};
use adminkit_audit::ActivityDraft;
use adminkit_domain::{ManagedUser, Role};
use adminkit_persistence::{ActivityLog, ConfigStore, DatabaseConnector, Persistence, SetupGate};
use axum::{
    Form, Json, Router,
    extract::{
        Query, State as AxumState,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::recorder::BlockingRecorder;
use crate::session::SessionActor;

/// adminkit server - activity log and bulk user administration over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file written by setup.
    #[arg(short, long, default_value = "./data/config.json")]
    config: PathBuf,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Bearer token accepted as an admin session.
    #[arg(long)]
    admin_token: Option<String>,

    /// Display name recorded for the admin session.
    #[arg(long, default_value = "Administrator")]
    admin_name: String,

    /// JSON file with the users to seed into the in-memory directory.
    #[arg(long)]
    users: Option<PathBuf>,
}

type Orchestrator = BulkOrchestrator<MemoryDirectory, BlockingRecorder>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// Where setup writes the configuration.
    store: Arc<ConfigStore>,
    /// The activity log, gated on setup.
    log: Arc<Persistence>,
    /// Applies bulk user actions and records them in `log`.
    orchestrator: Arc<Orchestrator>,
    /// Known session tokens.
    sessions: Arc<AuthenticationService>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error message.
    error: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl HttpError {
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::from("Internal server error"),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        debug!(%status, error = %err, "Request failed");
        Self {
            status,
            message: err.client_message().to_string(),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for HttpError {
    fn from(rejection: FormRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

/// Runs a synchronous API call on the blocking pool.
async fn run_blocking<T, F>(call: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result.map_err(HttpError::from),
        Err(e) => {
            error!(error = %e, "Blocking task failed");
            Err(HttpError::internal())
        }
    }
}

/// Handler for POST `/api/setup`.
async fn handle_complete_setup(
    AxumState(app_state): AxumState<AppState>,
    payload: Result<Json<CompleteSetupRequest>, JsonRejection>,
) -> Result<Json<CompleteSetupResponse>, HttpError> {
    let Json(request) = payload?;
    info!("Handling setup request");

    let store: Arc<ConfigStore> = Arc::clone(&app_state.store);
    let log: Arc<Persistence> = Arc::clone(&app_state.log);
    let response: CompleteSetupResponse =
        run_blocking(move || complete_setup(&store, &log, request)).await?;
    Ok(Json(response))
}

/// Handler for GET `/api/activity`.
async fn handle_list_activities(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<ListActivitiesQuery>,
) -> Result<Json<ListActivitiesResponse>, HttpError> {
    let log: Arc<Persistence> = Arc::clone(&app_state.log);
    let response: ListActivitiesResponse =
        run_blocking(move || list_activities(&log, actor.as_ref(), &query)).await?;
    Ok(Json(response))
}

/// Handler for POST `/api/activity`.
async fn handle_log_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    payload: Result<Json<ActivityDraft>, JsonRejection>,
) -> Result<Json<LogActivityResponse>, HttpError> {
    let Json(draft) = payload?;

    let log: Arc<Persistence> = Arc::clone(&app_state.log);
    let response: LogActivityResponse =
        run_blocking(move || log_activity(&log, actor.as_ref(), draft)).await?;
    Ok(Json(response))
}

/// Handler for POST `/dashboard/users`.
async fn handle_bulk_action(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    payload: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Json<BulkActionResponse>, HttpError> {
    let Form(pairs) = payload?;

    let response: BulkActionResponse = bulk_action(
        &app_state.orchestrator,
        actor.as_ref(),
        BulkActionForm::from_pairs(pairs),
    )
    .await?;
    Ok(Json(response))
}

/// Wires the configuration, activity log and orchestrator together.
fn build_state(
    config: &Path,
    directory: MemoryDirectory,
    sessions: AuthenticationService,
) -> AppState {
    let store: Arc<ConfigStore> = Arc::new(ConfigStore::new(config));
    let gate: Arc<SetupGate> = Arc::new(SetupGate::new(store.clone()));
    let log: Arc<Persistence> = Arc::new(ActivityLog::new(
        store.clone(),
        gate,
        DatabaseConnector::new(),
    ));
    let orchestrator: Orchestrator =
        BulkOrchestrator::new(directory, BlockingRecorder::new(Arc::clone(&log)));

    AppState {
        store,
        log,
        orchestrator: Arc::new(orchestrator),
        sessions: Arc::new(sessions),
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/setup", post(handle_complete_setup))
        .route("/api/activity", get(handle_list_activities))
        .route("/api/activity", post(handle_log_activity))
        .route("/dashboard/users", post(handle_bulk_action))
        .with_state(app_state)
}

fn load_users(path: &Path) -> Result<Vec<ManagedUser>, Box<dyn std::error::Error>> {
    let text: String = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing adminkit server");

    let directory: MemoryDirectory = if let Some(path) = &args.users {
        let users: Vec<ManagedUser> = load_users(path)?;
        info!(path = %path.display(), count = users.len(), "Seeding user directory");
        MemoryDirectory::with_users(users)
    } else {
        info!("Starting with an empty user directory");
        MemoryDirectory::new()
    };

    let mut sessions: AuthenticationService = AuthenticationService::new();
    if let Some(token) = args.admin_token {
        sessions.insert_session(
            token,
            AuthenticatedActor::new("admin", args.admin_name, Role::Admin),
        );
    } else {
        warn!("No admin token configured; admin endpoints will reject every request");
    }

    let app_state: AppState = build_state(&args.config, directory, sessions);
    info!(
        config = %args.config.display(),
        setup_complete = app_state.log.is_setup_complete(),
        "Configuration loaded"
    );

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
