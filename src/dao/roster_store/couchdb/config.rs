use std::env;

use super::error::{CouchDaoError, CouchResult};

/// Database used when `COUCH_DB` is not set.
const DEFAULT_DATABASE: &str = "team-sorter";

/// Runtime configuration describing how to connect to CouchDB.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server origin, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding roster and event documents.
    pub database: String,
    /// Basic auth user, if any.
    pub username: Option<String>,
    /// Basic auth password, if any.
    pub password: Option<String>,
}

impl CouchConfig {
    /// Construct a configuration from explicit base URL and database name.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            username: None,
            password: None,
        }
    }

    /// Attach basic-auth credentials to the configuration.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Read the CouchDB settings from the environment.
    ///
    /// Returns `Ok(None)` when `COUCH_BASE_URL` is unset so callers can fall back to another
    /// backend. Credentials must be provided as a pair.
    pub fn from_env() -> CouchResult<Option<Self>> {
        let Some(base_url) = env::var("COUCH_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
        else {
            return Ok(None);
        };
        let database = env::var("COUCH_DB").unwrap_or_else(|_| DEFAULT_DATABASE.into());
        let config = Self::new(base_url, database);

        match (env::var("COUCH_USERNAME").ok(), env::var("COUCH_PASSWORD").ok()) {
            (Some(username), Some(password)) => {
                Ok(Some(config.with_credentials(username, password)))
            }
            (None, None) => Ok(Some(config)),
            (Some(_), None) => Err(CouchDaoError::MissingEnvVar {
                var: "COUCH_PASSWORD",
            }),
            (None, Some(_)) => Err(CouchDaoError::MissingEnvVar {
                var: "COUCH_USERNAME",
            }),
        }
    }
}
