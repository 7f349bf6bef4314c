//! OpenAPI documentation for the HTTP surface.
//!
//! The generated document is served at `/api-docs/openapi.json` and rendered with Scalar at
//! `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;
use crate::errors::ErrorResponse;

/// Security scheme for session tokens issued by `/authentication/login`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token returned by login or registration:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```\n\n\
                            Patient routes only require it when `auth.protect_patient_routes` is enabled.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::intake::create_patient,
        api::handlers::patients::list_patients,
        api::handlers::patients::get_patient,
        api::handlers::patients::echo_patient,
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::me,
    ),
    components(schemas(
        api::models::intake::IntakeResponse,
        api::models::patients::EchoResponse,
        api::models::auth::RegisterRequest,
        api::models::auth::LoginRequest,
        api::models::auth::AuthResponse,
        api::models::users::UserResponse,
        crate::db::models::patients::Patient,
        crate::intake::FieldKind,
        ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "pacientes", description = "Patient intake, listing and lookup"),
        (name = "authentication", description = "Staff login and registration"),
    ),
    info(
        title = "Cadastro API",
        description = "Patient registration intake for a diabetes care center.",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/pacientes",
            "/api/pacientes/{id}",
            "/api/paciente",
            "/authentication/register",
            "/authentication/login",
            "/authentication/me",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
