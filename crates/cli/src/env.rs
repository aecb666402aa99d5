use std::collections::HashMap;
use std::fs;
use std::path::Path;

use connectors::api::auth::Credentials;
use tracing::debug;

use crate::error::CliError;

pub const CLIENT_ID_VAR: &str = "JOBSCOPE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "JOBSCOPE_CLIENT_SECRET";

/// Environment variable manager that loads from system and .env files
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
    sensitive_patterns: Vec<String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
            sensitive_patterns: Self::default_sensitive_patterns(),
        }
    }

    /// Loads `.env` from the working directory, then `~/.jobscope/.env`.
    /// Missing files are skipped; values already loaded are kept.
    pub fn load_default_files(&mut self) -> Result<(), CliError> {
        let mut candidates = vec![Path::new(".env").to_path_buf()];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".jobscope").join(".env"));
        }

        for path in candidates.iter().filter(|p| p.is_file()) {
            let content = fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
            })?;
            let mut loaded = HashMap::new();
            Self::parse_env_content(&content, &mut loaded)?;
            for (key, value) in loaded {
                self.vars.entry(key).or_insert(value);
            }
        }
        Ok(())
    }

    /// Load variables from a .env file, overriding existing values
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        let mut loaded = HashMap::new();
        Self::parse_env_content(&content, &mut loaded)?;
        for (key, value) in loaded {
            debug!("{} = {}", key, self.display_value(&key, &value));
            self.vars.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// API credentials, passed explicitly to the session.
    pub fn credentials(&self) -> Result<Credentials, CliError> {
        let id = self
            .get(CLIENT_ID_VAR)
            .ok_or(CliError::MissingCredential(CLIENT_ID_VAR))?;
        let secret = self
            .get(CLIENT_SECRET_VAR)
            .ok_or(CliError::MissingCredential(CLIENT_SECRET_VAR))?;
        Ok(Credentials::new(id, secret))
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.sensitive_patterns.iter().any(|p| key.contains(p))
    }

    fn display_value(&self, key: &str, value: &str) -> String {
        if self.is_sensitive(key) {
            "***".to_string()
        } else {
            value.to_string()
        }
    }

    fn parse_env_content(
        content: &str,
        vars: &mut HashMap<String, String>,
    ) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }

    fn default_sensitive_patterns() -> Vec<String> {
        ["password", "secret", "token", "key", "auth", "credential"]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
