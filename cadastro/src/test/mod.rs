//! Cross-module tests: route protection and the HTTP client against a live server.

mod client_flow;

use crate::test_utils::{bearer, create_test_app, create_test_config, create_test_user};
use axum_test::multipart::{MultipartForm, Part};
use serde_json::json;

fn protected_config() -> crate::Config {
    let mut config = create_test_config();
    config.auth.protect_patient_routes = true;
    config
}

#[test_log::test(tokio::test)]
async fn test_protected_routes_reject_anonymous_requests() {
    let (app, _state, _uploads) = create_test_app(protected_config());

    app.get("/api/pacientes").await.assert_status_unauthorized();
    app.get("/api/pacientes/1").await.assert_status_unauthorized();
    app.post("/api/paciente")
        .json(&json!({ "nome": "Ana" }))
        .await
        .assert_status_unauthorized();

    let response = app
        .post("/api/pacientes")
        .multipart(MultipartForm::new().add_text("nome", "Ana"))
        .await;
    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());

    // Health check stays open
    app.get("/healthz").await.assert_status_ok();
}

#[test_log::test(tokio::test)]
async fn test_protected_routes_accept_session_token() {
    let (app, state, uploads) = create_test_app(protected_config());
    let user = create_test_user(&state, false);
    let (name, value) = bearer(&state, &user);

    app.get("/api/pacientes")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();

    let response = app
        .post("/api/pacientes")
        .add_header(name.clone(), value.clone())
        .multipart(
            MultipartForm::new().add_text("nome", "Ana Lima").add_text("cpf", "555").add_part(
                "documento",
                Part::bytes(b"%PDF-1.4".as_slice())
                    .file_name("laudo.pdf")
                    .mime_type("application/pdf"),
            ),
        )
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let stored = body["arquivos"][0].as_str().unwrap().to_string();
    assert!(stored.starts_with("/uploads/555/"));
    assert!(uploads.path().join("555").is_dir());

    // Stored documents sit behind the same check
    app.get(&stored).await.assert_status_unauthorized();
    let document = app.get(&stored).add_header(name, value).await;
    document.assert_status_ok();
    assert_eq!(document.as_bytes().as_ref(), b"%PDF-1.4");
}

#[test_log::test(tokio::test)]
async fn test_token_for_removed_account_is_rejected() {
    let (app, state, _uploads) = create_test_app(protected_config());
    let user = create_test_user(&state, false);
    let (name, value) = bearer(&state, &user);

    // Same signing key, fresh account store
    let (other_app, _other_state, _other_uploads) = create_test_app(protected_config());
    other_app
        .get("/api/pacientes")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_unauthorized();

    app.get("/api/pacientes").add_header(name, value).await.assert_status_ok();
}

#[test_log::test(tokio::test)]
async fn test_open_routes_ignore_missing_token() {
    let (app, _state, _uploads) = create_test_app(create_test_config());

    app.get("/api/pacientes").await.assert_status_ok();
    app.post("/api/paciente")
        .json(&json!({ "nome": "Ana" }))
        .await
        .assert_status_ok();
}
