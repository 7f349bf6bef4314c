use axum::{Json, extract::State};
use tracing::info;

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    db::models::users::UserCreateDBRequest,
    errors::{Error, ErrorResponse},
};

const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos";

fn ensure_native_enabled(state: &AppState) -> Result<(), Error> {
    if !state.config.auth.native.enabled {
        return Err(Error::BadRequest {
            message: "Autenticação nativa desabilitada".to_string(),
        });
    }
    Ok(())
}

fn issue_token(state: &AppState, user: &UserResponse) -> Result<String, Error> {
    session::create_session_token(&CurrentUser::from(user), &state.config)
}

/// Register a new staff account
#[utoipa::path(
    post,
    path = "/authentication/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Registration disabled or invalid input", body = ErrorResponse),
        (status = 409, description = "An account with this email already exists", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse, Error> {
    ensure_native_enabled(&state)?;

    if !state.config.auth.native.allow_registration {
        return Err(Error::BadRequest {
            message: "Cadastro de usuários desabilitado".to_string(),
        });
    }

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    if name.is_empty() || !email.contains('@') {
        return Err(Error::BadRequest {
            message: "Nome e e-mail válidos são obrigatórios".to_string(),
        });
    }

    password::check_length(&request.password, &state.config.auth.native.password)?;

    // Fail before the expensive hash when the account exists
    if state.users.get_user_by_email(&email).is_some() {
        return Err(Error::Conflict {
            message: "Já existe uma conta com este e-mail".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let params = state.config.auth.native.password.argon2_params();
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created = state.users.create(&UserCreateDBRequest {
        name,
        email,
        password_hash,
        is_admin: false,
    })?;
    info!(user_id = %created.id, "Registered new account");

    let user = UserResponse::from(created);
    let token = issue_token(&state, &user)?;

    Ok(RegisterResponse(AuthResponse {
        user,
        token,
        message: "Cadastro realizado com sucesso".to_string(),
    }))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    ensure_native_enabled(&state)?;

    let user = state.users.get_user_by_email(&request.email).ok_or_else(|| Error::Unauthenticated {
        message: Some(INVALID_CREDENTIALS.to_string()),
    })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password;
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some(INVALID_CREDENTIALS.to_string()),
        });
    }

    state.users.record_login(user.id)?;
    let user = state.users.get_by_id(user.id).map(UserResponse::from).unwrap_or_else(|| UserResponse::from(user));
    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        user,
        token,
        message: "Login realizado com sucesso".to_string(),
    }))
}

/// Get the account behind the current session
#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
    ),
    security(
        ("BearerAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let user = state.users.get_by_id(current_user.id).ok_or_else(|| Error::Unauthenticated { message: None })?;
    Ok(Json(UserResponse::from(user)))
}
