use crate::{AppState, api::models::users::CurrentUser, auth::session, errors::{Error, Result}};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract the session token from an `Authorization: Bearer` header
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(token)): Bearer token present
/// - Some(Err(error)): Header present but not valid ASCII
fn bearer_token(parts: &Parts) -> Option<Result<&str>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    auth_str.strip_prefix("Bearer ").map(|token| Ok(token.trim()))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if !state.config.auth.native.enabled {
            trace!("Native authentication disabled, rejecting");
            return Err(Error::Unauthenticated { message: None });
        }

        let token = match bearer_token(parts) {
            Some(token) => token?,
            None => {
                trace!("No bearer token in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let user = session::verify_session_token(token, &state.config)?;

        // Tokens outlive the in-memory account store across restarts
        if state.users.get_by_id(user.id).is_none() {
            debug!("Session token for unknown user {}", user.id);
            return Err(Error::Unauthenticated {
                message: Some("Sessão inválida ou expirada".to_string()),
            });
        }

        debug!("Found bearer session user: {}", user.id);
        Ok(user)
    }
}
