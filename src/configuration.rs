use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "LOAN_TRACKER_JWT_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    pub auth: AuthSettings,
    #[serde(default)]
    pub mailer: MailerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    /// Keep users, loans and logs in process instead of PostgreSQL.
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: i64,
    #[serde(default = "default_link_token_hours")]
    pub link_token_hours: i64,
    /// Prefix of the links sent by mail, e.g. `https://loans.example.com`.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailerSettings {
    /// Mail relay endpoint. Without one, links are only written to the log.
    pub relay_url: Option<String>,
}

const MAX_ACCESS_TOKEN_MINUTES: i64 = 24 * 60;
const MAX_REFRESH_TOKEN_DAYS: i64 = 10 * 365;
const MAX_LINK_TOKEN_HOURS: i64 = 30 * 24;

fn default_access_token_minutes() -> i64 {
    15
}

fn default_refresh_token_days() -> i64 {
    7
}

fn default_link_token_hours() -> i64 {
    24
}

impl AuthSettings {
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_minutes)
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_days)
    }

    pub fn link_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.link_token_hours)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret is empty, set it in the configuration file or {JWT_SECRET_ENV}"
            )));
        }
        check_lifetime(
            "auth.access_token_minutes",
            self.auth.access_token_minutes,
            MAX_ACCESS_TOKEN_MINUTES,
        )?;
        check_lifetime(
            "auth.refresh_token_days",
            self.auth.refresh_token_days,
            MAX_REFRESH_TOKEN_DAYS,
        )?;
        check_lifetime(
            "auth.link_token_hours",
            self.auth.link_token_hours,
            MAX_LINK_TOKEN_HOURS,
        )
    }
}

fn check_lifetime(key: &str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value <= 0 || value > max {
        return Err(ConfigError::Message(format!(
            "{key} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // .json, .toml, .yaml, .yml
    let builder = config::Config::builder().add_source(config::File::with_name("configuration"));
    let mut settings = read_settings(builder)?;

    if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
        settings.auth.jwt_secret = secret;
    }

    settings.validate()?;
    Ok(settings)
}

fn read_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    const YAML: &str = r#"
app_host: 127.0.0.1
app_port: 8000
database:
  username: postgres
  password: postgres
  host: localhost
  port: 5432
  database_name: loans
auth:
  jwt_secret: not-so-secret
  public_base_url: http://localhost:8000
"#;

    fn from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
        read_settings(config::Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml)))
    }

    #[test]
    fn lifetimes_fall_back_to_defaults() {
        let settings = from_yaml(YAML).unwrap();
        assert_eq!(settings.auth.access_ttl(), chrono::Duration::minutes(15));
        assert_eq!(settings.auth.refresh_ttl(), chrono::Duration::days(7));
        assert_eq!(settings.auth.link_ttl(), chrono::Duration::hours(24));
        assert!(!settings.database.in_memory);
        assert!(settings.mailer.relay_url.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let yaml = YAML.replace("not-so-secret", "\"\"");
        let settings = from_yaml(&yaml).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn lifetimes_must_stay_in_range() {
        for (key, value) in [
            ("access_token_minutes", "0"),
            ("access_token_minutes", "1441"),
            ("refresh_token_days", "-1"),
            ("refresh_token_days", "1000000000000"),
            ("link_token_hours", "721"),
        ] {
            let yaml = format!("{YAML}  {key}: {value}\n");
            let settings = from_yaml(&yaml).unwrap();
            assert!(settings.validate().is_err(), "{key}: {value}");
        }

        let yaml = format!(
            "{YAML}  access_token_minutes: 1440\n  refresh_token_days: 3650\n  link_token_hours: 720\n"
        );
        assert!(from_yaml(&yaml).unwrap().validate().is_ok());
    }
}
