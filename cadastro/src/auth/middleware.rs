use crate::{AppState, api::models::users::CurrentUser, errors::Error};
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::trace;

/// Rejects requests without a valid session when `auth.protect_patient_routes` is set.
///
/// Installed with `from_fn_with_state` on the `/api` router. Authentication goes through the
/// [`CurrentUser`] extractor, so the rejection body matches every other 401 in the service.
pub async fn require_user(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    if !state.config.auth.protect_patient_routes {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let user = CurrentUser::from_request_parts(&mut parts, &state).await?;
    trace!("Patient route accessed by {}", user.email);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
