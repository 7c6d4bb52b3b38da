//! Onboarding API for the Rust+ bridge
//!
//! Served through Home Assistant ingress. The wizard walks the user through
//! importing pairing credentials, listing devices and testing the
//! connection; every mutation reloads the state file first and writes it
//! back in full.

mod extract;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rp_core::{
    normalize_slice, normalize_str, ConnectionOutcome, Credentials, DeviceLists, PersistedState,
};
use rp_mqtt::DiscoveryPublisher;
use rp_probe::Prober;
use rp_storage::{StateStore, StorageError};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use extract::FormOrJson;

/// Largest accepted credentials upload
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Handle to the state file
    pub store: StateStore,
    /// Connectivity prober for the paired server
    pub prober: Prober,
    /// MQTT discovery publisher
    pub publisher: DiscoveryPublisher,
}

impl AppState {
    pub fn new(store: StateStore, prober: Prober, publisher: DiscoveryPublisher) -> Self {
        Self {
            store,
            prober,
            publisher,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

fn storage_error(e: StorageError) -> ApiError {
    warn!("Failed to save state: {}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to save state: {}", e),
    )
}

/// Wizard status - everything except the player token
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub paired: bool,
    pub server: String,
    pub port: u16,
    pub steam_id: String,
    pub has_player_token: bool,
    pub devices: DeviceLists,
    pub connection: ConnectionOutcome,
}

impl From<PersistedState> for StatusResponse {
    fn from(state: PersistedState) -> Self {
        let paired = state.credentials.is_paired();
        let Credentials {
            server,
            port,
            account_id,
            session_token,
        } = state.credentials;

        Self {
            version: env!("CARGO_PKG_VERSION"),
            paired,
            server,
            port,
            steam_id: account_id,
            has_player_token: !session_token.is_empty(),
            devices: state.devices,
            connection: state.connection,
        }
    }
}

/// Pasted credentials
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub json: Option<String>,
}

/// Device lists as raw JSON array text
#[derive(Debug, Deserialize)]
pub struct DevicesRequest {
    #[serde(default)]
    pub switches: Option<String>,
    #[serde(default)]
    pub alarms: Option<String>,
    #[serde(default)]
    pub cameras: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_status))
        .route("/api/status", get(get_status))
        .route("/api/import_json", post(import_json))
        .route(
            "/api/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/save_devices", post(save_devices))
        .route("/api/test_connection", post(test_connection))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(state: AppState, addr: &str) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Web UI listening on {}", addr);
    axum::serve(listener, router).await
}

// ==================== Handlers ====================

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET / and GET /api/status - Current wizard status
async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.store.load().await.into())
}

/// POST /api/import_json - Save pasted credentials
async fn import_json(
    State(state): State<AppState>,
    FormOrJson(request): FormOrJson<ImportRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let credentials = normalize_str(request.json.as_deref().unwrap_or_default())
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)))?;

    save_credentials(&state, credentials).await
}

/// POST /api/upload - Save credentials from an uploaded config file
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StatusResponse>, ApiError> {
    let upload_failed = |message: String| {
        error_response(StatusCode::BAD_REQUEST, format!("Upload failed: {}", message))
    };

    let mut contents = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_response(e.status(), format!("Upload failed: {}", e.body_text())))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| error_response(e.status(), format!("Upload failed: {}", e.body_text())))?;
            contents = Some(bytes);
            break;
        }
    }

    let bytes = contents.ok_or_else(|| upload_failed("No file uploaded".to_string()))?;
    let credentials = normalize_slice(&bytes).map_err(|e| upload_failed(e.to_string()))?;

    save_credentials(&state, credentials).await
}

/// Replace the stored credentials wholesale
///
/// The previous probe result described the old credentials, so it is reset.
async fn save_credentials(
    state: &AppState,
    credentials: Credentials,
) -> Result<Json<StatusResponse>, ApiError> {
    let paired = credentials.is_paired();
    let endpoint = credentials.endpoint();

    let updated = state
        .store
        .update(|s| {
            s.credentials = credentials;
            s.connection = ConnectionOutcome::default();
        })
        .await
        .map_err(storage_error)?;

    if paired {
        info!("Saved Rust+ credentials for {}", endpoint);
    } else {
        warn!("Saved incomplete Rust+ credentials");
    }
    Ok(Json(updated.into()))
}

/// POST /api/save_devices - Replace the device lists
///
/// All three lists are parsed before the state file is touched.
async fn save_devices(
    State(state): State<AppState>,
    FormOrJson(request): FormOrJson<DevicesRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let devices = DeviceLists::parse(
        request.switches.as_deref(),
        request.alarms.as_deref(),
        request.cameras.as_deref(),
    )
    .map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid devices JSON: {}", e),
        )
    })?;

    let count = devices.len();
    let updated = state
        .store
        .update(|s| s.devices = devices)
        .await
        .map_err(storage_error)?;

    info!("Saved {} device(s)", count);
    Ok(Json(updated.into()))
}

/// POST /api/test_connection - Probe the paired server and record the result
///
/// A failed probe is a normal outcome and still returns 200; only a failure
/// to record it is an error. On success the bridge device is announced over
/// MQTT.
async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<ConnectionOutcome>, ApiError> {
    let credentials = state.store.load().await.credentials;

    let outcome = match state.prober.probe(&credentials).await {
        Ok(()) => ConnectionOutcome::success(),
        Err(e) => ConnectionOutcome::failure(e.to_string()),
    };

    let recorded = outcome.clone();
    state
        .store
        .update(|s| s.connection = recorded)
        .await
        .map_err(storage_error)?;

    if outcome.ok {
        state.publisher.publish_discovery(&credentials.endpoint());
    }

    Ok(Json(outcome))
}
