//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CADASTRO_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CADASTRO_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CADASTRO_UPLOADS__ROOT=/srv/uploads` sets the `uploads.root` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use cadastro::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`
//! - **Admin User**: `admin_email`, `admin_password` - account created on startup
//! - **Authentication**: `auth.native`, `auth.security`, `auth.protect_patient_routes`
//! - **Intake**: `intake.file_field`, `intake.identifier_field`, `intake.fields`
//! - **Uploads**: `uploads.root`, `uploads.public_prefix`, `uploads.serve`, size limits
//! - **Features**: `enable_metrics`, `enable_otel_export`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! CADASTRO_PORT=8080
//! CADASTRO_SECRET_KEY="change-me"
//! CADASTRO_AUTH__NATIVE__ALLOW_REGISTRATION=true
//! CADASTRO_UPLOADS__MAX_FILE_SIZE=20971520
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::auth::password::Argon2Params;
use crate::client::ClientArgs;
use crate::errors::Error;
use crate::intake::FieldSchema;

/// CLI args: config file location plus an optional client subcommand
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CADASTRO_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (the default when no subcommand is given)
    Serve,
    /// Create an account on a running server and store its session token
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CADASTRO_PASSWORD")]
        password: String,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Log in against a running server and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CADASTRO_PASSWORD")]
        password: String,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Forget the stored session token
    Logout {
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Submit a patient intake form, then print the patient listing
    Submit {
        /// Field as `name=value`; values are sent verbatim
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
        /// Attach a document
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Print all patients, or a single one by ID
    Patients {
        id: Option<String>,
        #[command(flatten)]
        client: ClientArgs,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty field name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

const REDACTED: &str = "<redacted>";

/// `CADASTRO_*` variables read by the command line rather than the server config
const CLI_ENV_KEYS: &[&str] = &["config", "api_url", "password", "token_file"];

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Email address for the initial admin user (created on startup)
    pub admin_email: String,
    /// Password for the initial admin user. No admin is created when unset.
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required when native auth is enabled)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// How multipart intake submissions are interpreted
    pub intake: IntakeConfig,
    /// Where uploaded documents are written and how they are exposed
    pub uploads: UploadsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Native email/password authentication
    pub native: NativeAuthConfig,
    /// Security settings (JWT, CORS)
    pub security: SecurityConfig,
    /// Require a bearer token on every `/api/*` route
    pub protect_patient_routes: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeAuthConfig {
    /// Enable native authentication (login/registration)
    pub enabled: bool,
    /// Allow new users to self-register
    pub allow_registration: bool,
    /// Password validation rules
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl PasswordConfig {
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

/// Security configuration for JWT and CORS.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// JWT token expiry duration
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// Intake form interpretation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Multipart field name that carries documents
    pub file_field: String,
    /// Record field whose value names the patient's upload directory
    pub identifier_field: String,
    /// Per-field decoding (`auto`, `text`, `json`). Entries are layered over the identifier
    /// defaults; set `cpf: auto` to opt a default back into decoding.
    #[serde(deserialize_with = "merge_identifier_defaults")]
    pub fields: FieldSchema,
}

fn merge_identifier_defaults<'de, D>(deserializer: D) -> Result<FieldSchema, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let configured = FieldSchema::deserialize(deserializer)?;
    Ok(FieldSchema::identifier_defaults().merged_with(configured))
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory under which per-patient folders are created
    pub root: PathBuf,
    /// URL prefix under which stored files are reported (and served, if enabled)
    pub public_prefix: String,
    /// Serve the upload root read-only under `public_prefix`
    pub serve: bool,
    /// Maximum size of a single document in bytes
    pub max_file_size: u64,
    /// Maximum size of a whole intake request body in bytes
    pub max_request_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            admin_email: "admin@cadastro.local".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            intake: IntakeConfig::default(),
            uploads: UploadsConfig::default(),
            enable_metrics: true,
            enable_otel_export: false,
        }
    }
}

impl Default for NativeAuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_registration: true,
            password: PasswordConfig::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
            // Secure defaults for production (Argon2id RFC recommendations)
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(24 * 60 * 60), // 24 hours
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                CorsOrigin::Url(Url::parse("http://localhost:3000").expect("static URL")), // Development frontend
            ],
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            file_field: "documento".to_string(),
            identifier_field: "cpf".to_string(),
            fields: FieldSchema::identifier_defaults(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public/uploads"),
            public_prefix: "/uploads".to_string(),
            serve: true,
            max_file_size: 10 * 1024 * 1024,     // 10 MB
            max_request_size: 50 * 1024 * 1024, // 50 MB
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.auth.native.enabled {
            if self.secret_key.is_none() {
                return Err(Error::Internal {
                    operation: "Config validation: Native authentication is enabled but secret_key is not configured. \
                     Please set CADASTRO_SECRET_KEY environment variable or add secret_key to config file."
                        .to_string(),
                });
            }

            if self.auth.native.password.min_length > self.auth.native.password.max_length {
                return Err(Error::Internal {
                    operation: format!(
                        "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                        self.auth.native.password.min_length, self.auth.native.password.max_length
                    ),
                });
            }

            if self.auth.native.password.min_length < 1 {
                return Err(Error::Internal {
                    operation: "Config validation: Invalid password configuration: min_length must be at least 1".to_string(),
                });
            }
        }

        if self.auth.protect_patient_routes && !self.auth.native.enabled {
            return Err(Error::Internal {
                operation: "Config validation: protect_patient_routes requires native authentication to issue tokens".to_string(),
            });
        }

        // Validate JWT expiry duration is reasonable
        if self.auth.security.jwt_expiry.as_secs() < 300 {
            return Err(Error::Internal {
                operation: "Config validation: JWT expiry duration is too short (minimum 5 minutes)".to_string(),
            });
        }

        if self.auth.security.jwt_expiry.as_secs() > 86400 * 30 {
            return Err(Error::Internal {
                operation: "Config validation: JWT expiry duration is too long (maximum 30 days)".to_string(),
            });
        }

        if self.auth.security.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        let has_wildcard = self
            .auth
            .security
            .cors
            .allowed_origins
            .iter()
            .any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && self.auth.security.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        if self.intake.file_field.trim().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: intake.file_field cannot be empty".to_string(),
            });
        }

        if self.intake.identifier_field.trim().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: intake.identifier_field cannot be empty".to_string(),
            });
        }

        let prefix = self.uploads.public_prefix.trim_end_matches('/');
        if !self.uploads.public_prefix.starts_with('/') || prefix.is_empty() {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: uploads.public_prefix ('{}') must start with '/' and name a path segment (e.g. /uploads)",
                    self.uploads.public_prefix
                ),
            });
        }

        if self.uploads.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_file_size cannot be 0".to_string(),
            });
        }

        if self.uploads.max_request_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_request_size cannot be 0".to_string(),
            });
        }

        if self.uploads.max_file_size > self.uploads.max_request_size as u64 {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: uploads.max_file_size ({}) cannot be greater than uploads.max_request_size ({})",
                    self.uploads.max_file_size, self.uploads.max_request_size
                ),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values. The CLI shares the
            // prefix for its own variables, which are not config keys.
            .merge(Env::prefixed("CADASTRO_").ignore(CLI_ENV_KEYS).split("__"))
    }

    /// Copy safe to log: secrets are replaced by a marker.
    pub fn redacted(&self) -> Config {
        let mask = |value: &Option<String>| value.as_ref().map(|_| REDACTED.to_string());
        Config {
            secret_key: mask(&self.secret_key),
            admin_password: mask(&self.admin_password),
            ..self.clone()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::FieldKind;
    use figment::Jail;
    use serial_test::serial;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
            command: None,
        }
    }

    fn valid_config() -> Config {
        Config {
            secret_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let config = Config {
            secret_key: Some("jwt-signing-key".to_string()),
            admin_password: Some("senha-do-admin".to_string()),
            ..Default::default()
        };

        let shown = format!("{:?}", config.redacted());
        assert!(!shown.contains("jwt-signing-key"));
        assert!(!shown.contains("senha-do-admin"));
        assert!(shown.contains("<redacted>"));
        assert_eq!(config.redacted().admin_email, config.admin_email);
        assert_eq!(Config::default().redacted().secret_key, None);
    }

    #[test]
    fn test_defaults_match_intake_contract() {
        let config = Config::default();

        assert_eq!(config.intake.file_field, "documento");
        assert_eq!(config.intake.identifier_field, "cpf");
        assert_eq!(config.intake.fields.kind_of("cpf"), FieldKind::Text);
        assert_eq!(config.uploads.public_prefix, "/uploads");
        assert_eq!(config.port, 3001);
    }

    #[test]
    #[serial]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
secret_key: hello
intake:
  file_field: anexos
  fields:
    cpf: text
    exames: json
uploads:
  root: /srv/cadastro/uploads
  max_file_size: 1024
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.intake.file_field, "anexos");
            assert_eq!(config.intake.identifier_field, "cpf"); // default
            assert_eq!(config.intake.fields.kind_of("exames"), FieldKind::Json);
            assert_eq!(config.intake.fields.kind_of("rg"), FieldKind::Text); // defaults kept
            assert_eq!(config.uploads.root, PathBuf::from("/srv/cadastro/uploads"));
            assert_eq!(config.uploads.max_file_size, 1024);
            assert_eq!(config.uploads.public_prefix, "/uploads");

            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "secret_key: hello\nport: 4000\n")?;

            jail.set_env("CADASTRO_HOST", "127.0.0.1");
            jail.set_env("CADASTRO_PORT", "8080");
            jail.set_env("CADASTRO_AUTH__NATIVE__ALLOW_REGISTRATION", "false");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert!(!config.auth.native.allow_registration);

            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_jwt_expiry_humantime() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
secret_key: hello
auth:
  security:
    jwt_expiry: "2h"
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;
            assert_eq!(config.auth.security.jwt_expiry, Duration::from_secs(2 * 60 * 60));
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_cli_variables_are_not_config_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("CADASTRO_SECRET_KEY", "k");
            jail.set_env("CADASTRO_CONFIG", "outro.yaml");
            jail.set_env("CADASTRO_API_URL", "http://localhost:3001");
            jail.set_env("CADASTRO_PASSWORD", "senha-segura");
            jail.set_env("CADASTRO_TOKEN_FILE", "/tmp/cadastro-token");

            let config = Config::load(&args("does-not-exist.yaml"))?;
            assert_eq!(config.secret_key.as_deref(), Some("k"));
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_intake_fields_extend_identifier_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
secret_key: hello
intake:
  fields:
    exames: json
    telefone: auto
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;
            let fields = &config.intake.fields;
            assert_eq!(fields.kind_of("exames"), FieldKind::Json);
            assert_eq!(fields.kind_of("cpf"), FieldKind::Text);
            assert_eq!(fields.kind_of("cep"), FieldKind::Text);
            assert_eq!(fields.kind_of("telefone"), FieldKind::Auto);
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "secret_key: hello\nuploadz: {}\n")?;
            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_missing_config_file_uses_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("CADASTRO_SECRET_KEY", "from-env");
            let config = Config::load(&args("does-not-exist.yaml"))?;
            assert_eq!(config.secret_key.as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn test_validation_native_auth_missing_secret() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("secret_key is not configured"));
    }

    #[test]
    fn test_validation_password_lengths() {
        let mut config = valid_config();
        config.auth.native.password.min_length = 10;
        config.auth.native.password.max_length = 5;
        assert!(config.validate().unwrap_err().to_string().contains("min_length"));
    }

    #[test]
    fn test_validation_protect_routes_requires_native_auth() {
        let mut config = valid_config();
        config.auth.native.enabled = false;
        config.auth.protect_patient_routes = true;
        assert!(config.validate().unwrap_err().to_string().contains("protect_patient_routes"));
    }

    #[test]
    fn test_validation_wildcard_with_credentials() {
        let mut config = valid_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        assert!(config.validate().is_err());

        config.auth.security.cors.allow_credentials = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_public_prefix() {
        for prefix in ["uploads", "/", ""] {
            let mut config = valid_config();
            config.uploads.public_prefix = prefix.to_string();
            assert!(config.validate().is_err(), "prefix {prefix:?} should be rejected");
        }

        let mut config = valid_config();
        config.uploads.public_prefix = "/arquivos/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_upload_sizes() {
        let mut config = valid_config();
        config.uploads.max_file_size = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.uploads.max_file_size = 100;
        config.uploads.max_request_size = 10;
        assert!(config.validate().unwrap_err().to_string().contains("max_request_size"));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(parse_key_val("cpf=123").unwrap(), ("cpf".to_string(), "123".to_string()));
        assert_eq!(parse_key_val("obs=a=b").unwrap(), ("obs".to_string(), "a=b".to_string()));
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
