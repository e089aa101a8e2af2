use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod email;
pub mod relay;
pub mod startup_checks;
pub mod tenants;

use email::{DispatchConfig, DynDispatcher};
use tenants::{ConfigError, TenantRegistry};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Attach permissive CORS headers for browser callers.
    pub cors: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    pub tenants_file: PathBuf,
    pub delivery_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Mailgate".to_string(),
            log_level: "info".to_string(),
            tenants_file: PathBuf::from("emailconfig.json"),
            delivery_timeout_secs: email::DEFAULT_DELIVERY_TIMEOUT.as_secs(),
        }
    }
}

impl AppConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}

impl Config {
    /// Reads the TOML configuration. `None` means the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(toml_edit::de::from_str::<Config>(&contents)?))
    }

    /// Like [`Config::read`], falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::read(path)?.unwrap_or_default())
    }
}

use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TenantRegistry>,
    pub dispatcher: DynDispatcher,
    pub delivery_timeout: Duration,
}

impl AppState {
    pub fn new(registry: TenantRegistry, dispatcher: DynDispatcher, config: &Config) -> Self {
        Self {
            registry: Arc::new(registry),
            dispatcher,
            delivery_timeout: config.app.delivery_timeout(),
        }
    }
}

pub fn create_app(app_state: AppState, server: &ServerConfig) -> Router {
    let send_email = post(relay::send_email_handler)
        .options(relay::preflight_handler)
        .fallback(relay::disallowed_method_handler);

    let router = Router::new()
        .route("/send-email", send_email)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        request_id = %uuid::Uuid::new_v4(),
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let user_agent = request
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state);

    if server.cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([axum::http::Method::OPTIONS, axum::http::Method::POST]),
        )
    } else {
        router
    }
}
