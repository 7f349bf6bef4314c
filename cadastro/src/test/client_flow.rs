//! The HTTP client driving a real server bound to an ephemeral port.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{
    AppState, Application,
    client::{ApiClient, ClientError, IntakeForm, MemoryTokenStore, TokenStore},
    test_utils::{TEST_PASSWORD, create_test_config},
};

struct RunningServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
    _uploads: tempfile::TempDir,
}

impl RunningServer {
    async fn start(mut config: crate::Config) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        config.uploads.root = uploads.path().to_path_buf();

        let app = Application::from_state(AppState::from_config(config)).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(app.serve_with_listener(listener, async {
            let _ = rx.await;
        }));

        Self {
            base_url,
            shutdown: Some(tx),
            handle,
            _uploads: uploads,
        }
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn client_for(server: &RunningServer, tokens: Arc<MemoryTokenStore>) -> ApiClient {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    ApiClient::new(&server.base_url, tokens).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_client_registers_submits_and_lists() {
    let mut config = create_test_config();
    config.auth.protect_patient_routes = true;
    let server = RunningServer::start(config).await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, tokens.clone());

    // Protected before login
    let err = client.list_patients().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let auth = client
        .register("Recepção Central", "recepcao@clinica.local", TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(tokens.load().unwrap().as_deref(), Some(auth.token.as_str()));

    let me = client.me().await.unwrap();
    assert_eq!(me.email, "recepcao@clinica.local");
    assert!(!me.is_admin);

    let form = IntakeForm::new()
        .text("nome", "Ana Lima")
        .text("cpf", "321")
        .value("idade", &json!(42))
        .unwrap()
        .json("medicamentos", &json!([{ "nome": "Insulina NPH", "dose": "10UI" }]))
        .unwrap()
        .file("glicemia.pdf", Some("application/pdf"), b"glicemia capilar 110".to_vec());

    let response = client.submit_intake(form).await.unwrap();
    assert_eq!(response.message, "Paciente cadastrado com sucesso");
    assert_eq!(response.paciente["idade"], json!(42));
    assert_eq!(response.paciente["medicamentos"][0]["nome"], json!("Insulina NPH"));
    assert_eq!(response.arquivos.len(), 1);
    assert!(response.arquivos[0].starts_with("/uploads/321/"));

    let patients = client.list_patients().await.unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(client.get_patient("1").await.unwrap().nome, "Maria Souza");

    let echo = client.echo_patient(&json!({ "nome": "Ana" })).await.unwrap();
    assert_eq!(echo.message, "Paciente recebido com sucesso");

    client.logout().unwrap();
    assert!(matches!(client.me().await, Err(ClientError::NotAuthenticated)));

    server.stop().await;
}

#[test_log::test(tokio::test)]
async fn test_client_surfaces_server_errors() {
    let server = RunningServer::start(create_test_config()).await;
    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));

    let missing = client.get_patient("99").await.unwrap_err();
    match missing {
        ClientError::Http { status, message } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Paciente não encontrado");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let bad_login = client.login("ninguem@clinica.local", TEST_PASSWORD).await.unwrap_err();
    assert_eq!(bad_login.status(), Some(StatusCode::UNAUTHORIZED));

    server.stop().await;
}
