//! Client subcommands of the `cadastro` binary.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use super::{ApiClient, IntakeForm};
use crate::config::Command;
use crate::db::models::patients::Patient;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build the intake form from `--field name=value` pairs and `--file` paths
pub async fn build_form(fields: Vec<(String, String)>, files: Vec<PathBuf>) -> anyhow::Result<IntakeForm> {
    let mut form = fields
        .into_iter()
        .fold(IntakeForm::new(), |form, (name, value)| form.text(name, value));
    for path in files {
        form = form.file_from_path(&path).await?;
    }
    Ok(form)
}

/// Submit the form, then fetch the listing whatever the submission returned.
///
/// A failed submission is reported on stderr and does not stop the listing from being shown.
pub async fn submit_then_list(api: &ApiClient, form: IntakeForm) -> anyhow::Result<Vec<Patient>> {
    match api.submit_intake(form).await {
        Ok(response) => print_json(&response)?,
        Err(e) => {
            warn!(error = %e, "Intake submission failed");
            eprintln!("Erro ao cadastrar paciente: {e}");
        }
    }
    Ok(api.list_patients().await?)
}

/// Run a client subcommand. `Serve` is handled by the binary and is rejected here.
pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve => anyhow::bail!("`serve` is not a client command"),
        Command::Register {
            name,
            email,
            password,
            client,
        } => {
            let auth = client.client()?.register(&name, &email, &password).await?;
            info!("Registered {}", auth.user.email);
            print_json(&auth.user)
        }
        Command::Login { email, password, client } => {
            let auth = client.client()?.login(&email, &password).await?;
            info!("Logged in as {}", auth.user.email);
            print_json(&auth.user)
        }
        Command::Logout { client } => {
            client.client()?.logout()?;
            println!("Sessão encerrada");
            Ok(())
        }
        Command::Submit { fields, files, client } => {
            let api: ApiClient = client.client()?;
            let form = build_form(fields, files).await?;
            print_json(&submit_then_list(&api, form).await?)
        }
        Command::Patients { id: Some(id), client } => print_json(&client.client()?.get_patient(&id).await?),
        Command::Patients { id: None, client } => print_json(&client.client()?.list_patients().await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FormEntry, MemoryTokenStore};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_listing_is_fetched_after_failed_submission() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pacientes"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Erro ao cadastrar paciente" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/pacientes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "1",
                "nome": "Maria Souza",
                "cpf": "123.456.789-00",
                "data_nascimento": "1980-05-12",
                "tipo_diabetes": "Tipo 1",
                "telefone": "(11) 98888-7777",
                "email": "maria@example.com"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Arc::new(MemoryTokenStore::new())).unwrap();
        let patients = submit_then_list(&api, IntakeForm::new().text("nome", "Ana")).await.unwrap();

        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].nome, "Maria Souza");
    }

    #[tokio::test]
    async fn test_build_form_from_cli_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receita.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let form = build_form(
            vec![("nome".into(), "Ana".into()), ("cpf".into(), "123".into())],
            vec![path],
        )
        .await
        .unwrap();

        let entries = form.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            FormEntry::Text {
                name: "nome".into(),
                value: "Ana".into()
            }
        );
        match &entries[2] {
            FormEntry::File {
                name,
                file_name,
                content_type,
                ..
            } => {
                assert_eq!(name, "documento");
                assert_eq!(file_name, "receita.png");
                assert_eq!(content_type.as_deref(), Some("image/png"));
            }
            other => panic!("expected a file entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_form_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_form(vec![], vec![dir.path().join("nao-existe.pdf")]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_serve_is_not_a_client_command() {
        assert!(run(Command::Serve).await.is_err());
    }
}
