//! # cadastro: patient registration intake for a diabetes care center
//!
//! `cadastro` receives the registration form filled in at the reception desk, rebuilds the patient
//! record from it and stores the attached documents (exam reports, prescriptions, ID scans) in a
//! per-patient directory. It also answers the read-only patient listing used by the dashboard, and
//! ships a small client for submitting forms from the command line.
//!
//! ## Request Flow
//!
//! A browser (or [`client::ApiClient`]) posts `multipart/form-data` to `/api/pacientes`. Scalar
//! fields travel as plain text and structured ones JSON-encoded; documents travel under the
//! `documento` part. The [`intake`] pipeline decodes every text part according to its
//! [`intake::FieldKind`], writes the documents under `{uploads.root}/{cpf}/` and answers with the
//! record plus the public path of each stored file. Stored files are served back read-only under
//! `/uploads`.
//!
//! Staff accounts ([`auth`]) are optional for patient routes. When
//! `auth.protect_patient_routes` is enabled every `/api/*` and `/uploads/*` request needs a
//! bearer token from `/authentication/login`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use cadastro::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = cadastro::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     cadastro::telemetry::init_telemetry(config.enable_otel_export, "info")?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod intake;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::{middleware::require_user, password},
    config::CorsOrigin,
    db::{
        handlers::{PatientRepository, SeedPatients, Users},
        models::users::UserCreateDBRequest,
    },
    intake::IntakePipeline,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{self, HeaderValue},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::UserId;

/// Shared state handed to every handler.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .patients(Arc::new(SeedPatients::default()))
///     .intake(Arc::new(pipeline))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    /// Read-only patient listing
    pub patients: Arc<dyn PatientRepository>,
    #[builder(default)]
    pub users: Users,
    pub intake: Arc<IntakePipeline>,
}

impl AppState {
    /// State with the seeded patient listing and an empty account store.
    pub fn from_config(config: Config) -> Self {
        Self::with_repository(config, Arc::new(SeedPatients::default()))
    }

    pub fn with_repository(config: Config, patients: Arc<dyn PatientRepository>) -> Self {
        let intake = Arc::new(IntakePipeline::from_config(&config.intake, &config.uploads));
        AppState::builder().config(config).patients(patients).intake(intake).build()
    }
}

/// Create the initial admin account, or reset its password if it already exists.
///
/// Idempotent, so it can run on every startup.
#[instrument(skip_all, fields(email = %email))]
pub async fn create_initial_admin_user(users: &Users, email: &str, password: &str, params: password::Argon2Params) -> anyhow::Result<UserId> {
    let to_hash = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&to_hash, Some(params))).await??;

    if users.get_user_by_email(email).is_some() {
        let user = users.update_password(email, password_hash)?;
        debug!("Admin account already present, password updated");
        return Ok(user.id);
    }

    let user = users.create(&UserCreateDBRequest {
        name: "Administrador".to_string(),
        email: email.to_string(),
        password_hash,
        is_admin: true,
    })?;
    info!("Created initial admin account");
    Ok(user.id)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - `/authentication/*` login, registration and session lookup
/// - `/api/*` patient intake and listing, optionally behind [`require_user`]
/// - `/uploads/*` stored documents, when `uploads.serve` is set
/// - `/docs`, `/api-docs/openapi.json`, `/healthz`
/// - `/internal/metrics` when `enable_metrics` is set
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let config = &state.config;

    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/me", get(api::handlers::auth::me));

    let api_routes = Router::new()
        .route(
            "/pacientes",
            get(api::handlers::patients::list_patients).post(api::handlers::intake::create_patient),
        )
        .route("/pacientes/{id}", get(api::handlers::patients::get_patient))
        .route(
            "/paciente",
            post(api::handlers::patients::echo_patient).fallback(api::handlers::patients::method_not_allowed),
        )
        .route_layer(from_fn_with_state(state.clone(), require_user))
        .layer(DefaultBodyLimit::max(config.uploads.max_request_size));

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(auth_routes)
        .nest("/api", api_routes);

    if config.uploads.serve {
        let prefix = config.uploads.public_prefix.trim_end_matches('/');
        let uploads = Router::new()
            .nest_service(prefix, ServeDir::new(&config.uploads.root))
            .route_layer(from_fn_with_state(state.clone(), require_user));
        router = router.merge(uploads);
        debug!("Serving {} under {}", config.uploads.root.display(), prefix);
    }

    let mut router = router
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(create_cors_layer(&state.config)?);

    // Installs a process-wide recorder, so only one router per process may enable it
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    app_state: AppState,
}

impl Application {
    /// Create a new application serving the seeded patient listing
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_repository(config, Arc::new(SeedPatients::default())).await
    }

    /// Create a new application backed by the given patient listing
    pub async fn new_with_repository(config: Config, patients: Arc<dyn PatientRepository>) -> anyhow::Result<Self> {
        debug!("Starting cadastro with configuration: {:#?}", config.redacted());
        let state = AppState::with_repository(config, patients);

        if let Some(admin_password) = state.config.admin_password.as_deref() {
            create_initial_admin_user(
                &state.users,
                &state.config.admin_email,
                admin_password,
                state.config.auth.native.password.argon2_params(),
            )
            .await?;
        }

        Self::from_state(state)
    }

    pub fn from_state(app_state: AppState) -> anyhow::Result<Self> {
        let router = build_router(app_state.clone())?;
        Ok(Self { router, app_state })
    }

    pub fn state(&self) -> &AppState {
        &self.app_state
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.app_state.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Cadastro listening on http://{}, available at http://localhost:{}",
            bind_addr, self.app_state.config.port
        );

        self.serve_with_listener(listener, shutdown).await
    }

    /// Serve on an already-bound listener
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config, fast_argon2};

    #[tokio::test]
    async fn test_initial_admin_user_is_idempotent() {
        let users = Users::new();

        let first = create_initial_admin_user(&users, "admin@cadastro.local", "primeira-senha", fast_argon2())
            .await
            .unwrap();
        let second = create_initial_admin_user(&users, "admin@cadastro.local", "segunda-senha", fast_argon2())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(users.len(), 1);

        let admin = users.get_user_by_email("admin@cadastro.local").unwrap();
        assert!(admin.is_admin);
        assert!(password::verify_string("segunda-senha", &admin.password_hash).unwrap());
        assert!(!password::verify_string("primeira-senha", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_application_bootstraps_admin() {
        let mut config = create_test_config();
        config.admin_email = "chefe@clinica.local".to_string();
        config.admin_password = Some("senha-do-admin".to_string());
        let dir = tempfile::tempdir().unwrap();
        config.uploads.root = dir.path().to_path_buf();

        let app = Application::new(config).await.unwrap();
        let admin = app.state().users.get_user_by_email("chefe@clinica.local").unwrap();
        assert!(admin.is_admin);

        let server = app.into_test_server();
        let response = server
            .post("/authentication/login")
            .json(&serde_json::json!({ "email": "chefe@clinica.local", "password": "senha-do-admin" }))
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_healthz_and_docs() {
        let (app, _state, _uploads) = create_test_app(create_test_config());

        let response = app.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");

        let spec: serde_json::Value = app.get("/api-docs/openapi.json").await.json();
        assert!(spec["paths"]["/api/pacientes"].is_object());

        app.get("/docs").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let (app, _state, _uploads) = create_test_app(create_test_config());

        let response = app
            .method(http::Method::OPTIONS, "/api/pacientes")
            .add_header("origin", "http://localhost:3000")
            .add_header("access-control-request-method", "POST")
            .await;

        assert_eq!(
            response.header("access-control-allow-origin").to_str().unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_create_cors_layer_from_defaults() {
        let config = create_test_config();
        assert!(create_cors_layer(&config).is_ok());
    }
}
