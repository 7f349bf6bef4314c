//! Seed-data patient repository.

use crate::db::errors::Result;
use crate::db::handlers::repository::PatientRepository;
use crate::db::models::patients::Patient;

/// Fixed, non-persistent patient records used for demonstration.
#[derive(Debug, Clone)]
pub struct SeedPatients {
    patients: Vec<Patient>,
}

impl SeedPatients {
    pub fn with_patients(patients: Vec<Patient>) -> Self {
        Self { patients }
    }
}

impl Default for SeedPatients {
    fn default() -> Self {
        Self::with_patients(vec![
            Patient {
                id: "1".to_string(),
                nome: "Maria Souza".to_string(),
                cpf: "123.456.789-00".to_string(),
                data_nascimento: "1985-03-12".to_string(),
                tipo_diabetes: "Tipo 1".to_string(),
                telefone: "(11) 98765-4321".to_string(),
                email: "maria.souza@example.com".to_string(),
            },
            Patient {
                id: "2".to_string(),
                nome: "João Pereira".to_string(),
                cpf: "987.654.321-00".to_string(),
                data_nascimento: "1972-11-05".to_string(),
                tipo_diabetes: "Tipo 2".to_string(),
                telefone: "(21) 91234-5678".to_string(),
                email: "joao.pereira@example.com".to_string(),
            },
        ])
    }
}

#[async_trait::async_trait]
impl PatientRepository for SeedPatients {
    async fn list(&self) -> Result<Vec<Patient>> {
        Ok(self.patients.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Patient>> {
        Ok(self.patients.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_order_is_stable() {
        let repo = SeedPatients::default();
        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let repo = SeedPatients::default();

        assert_eq!(repo.get_by_id("2").await.unwrap().unwrap().nome, "João Pereira");
        assert!(repo.get_by_id("3").await.unwrap().is_none());
        assert!(repo.get_by_id("").await.unwrap().is_none());
    }
}
