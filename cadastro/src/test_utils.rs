//! Test utilities shared by the handler and integration tests.

use crate::{
    AppState, Application,
    api::models::users::{CurrentUser, UserResponse},
    auth::{password, session},
    config::{Config, UploadsConfig},
    db::models::users::UserCreateDBRequest,
};
use axum_test::TestServer;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "senha-de-teste-123";

/// Cheapest Argon2 parameters the algorithm accepts; hashing with the production defaults makes
/// the suite crawl.
pub fn fast_argon2() -> password::Argon2Params {
    password::Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        // The Prometheus recorder is process-wide; tests build many routers
        enable_metrics: false,
        enable_otel_export: false,
        ..Default::default()
    };

    let fast = fast_argon2();
    config.auth.native.password.argon2_memory_kib = fast.memory_kib;
    config.auth.native.password.argon2_iterations = fast.iterations;
    config.auth.native.password.argon2_parallelism = fast.parallelism;
    config
}

/// Point the default upload root at a fresh temporary directory. A root the test set
/// explicitly is left alone.
fn isolate_uploads(config: &mut Config) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create upload directory");
    if config.uploads.root == UploadsConfig::default().root {
        config.uploads.root = dir.path().to_path_buf();
    }
    dir
}

/// State for extractor-level tests. Keep the returned directory alive for the whole test.
pub fn create_test_state(mut config: Config) -> (AppState, TempDir) {
    let dir = isolate_uploads(&mut config);
    (AppState::from_config(config), dir)
}

pub fn create_test_app(config: Config) -> (TestServer, AppState, TempDir) {
    let (state, dir) = create_test_state(config);
    let app = Application::from_state(state.clone()).expect("Failed to create application");
    (app.into_test_server(), state, dir)
}

pub fn create_test_user(state: &AppState, is_admin: bool) -> UserResponse {
    let id = Uuid::new_v4().simple().to_string();
    let password_hash = password::hash_string_with_params(TEST_PASSWORD, Some(fast_argon2())).expect("Failed to hash test password");

    let user = state
        .users
        .create(&UserCreateDBRequest {
            name: format!("Usuário {}", &id[..8]),
            email: format!("teste_{id}@clinica.local"),
            password_hash,
            is_admin,
        })
        .expect("Failed to create test user");
    UserResponse::from(user)
}

/// `Authorization` header carrying a fresh session token for `user`
pub fn bearer(state: &AppState, user: &UserResponse) -> (String, String) {
    let token = session::create_session_token(&CurrentUser::from(user), &state.config).expect("Failed to create session token");
    ("authorization".to_string(), format!("Bearer {token}"))
}
