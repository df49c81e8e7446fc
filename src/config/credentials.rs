use crate::config::types::BackendConfig;
use crate::ConfigError;

impl BackendConfig {
    /// Resolves the credential pool for the text-generation backend
    ///
    /// Literal `api-keys` come first, followed by the values of the
    /// environment variables named in `api-key-env`, in declaration order.
    /// Unset or blank variables are skipped with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - At least one credential
    /// * `Err(ConfigError)` - No usable credential was found
    pub fn resolve_keys(&self) -> Result<Vec<String>, ConfigError> {
        self.resolve_keys_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_keys_with<F>(&self, lookup: F) -> Result<Vec<String>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut keys: Vec<String> = self
            .api_keys
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        for name in &self.api_key_env {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => keys.push(value.trim().to_string()),
                _ => tracing::warn!("Environment variable {} is not set, skipping", name),
            }
        }

        if keys.is_empty() {
            return Err(ConfigError::Validation(
                "no backend API keys available (check api-keys / api-key-env)".to_string(),
            ));
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(api_keys: Vec<&str>, api_key_env: Vec<&str>) -> BackendConfig {
        BackendConfig {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_keys: api_keys.into_iter().map(String::from).collect(),
            api_key_env: api_key_env.into_iter().map(String::from).collect(),
            max_retries: 1,
            retry_delay_ms: 0,
            request_timeout_secs: 60,
        }
    }

    #[test]
    fn test_literal_keys_then_env_keys() {
        let config = backend(vec!["k1"], vec!["KEY_A", "KEY_B"]);
        let keys = config
            .resolve_keys_with(|name| match name {
                "KEY_A" => Some("ka".to_string()),
                "KEY_B" => Some("kb".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(keys, vec!["k1", "ka", "kb"]);
    }

    #[test]
    fn test_missing_env_vars_are_skipped() {
        let config = backend(vec![], vec!["KEY_A", "KEY_MISSING"]);
        let keys = config
            .resolve_keys_with(|name| (name == "KEY_A").then(|| "ka".to_string()))
            .unwrap();
        assert_eq!(keys, vec!["ka"]);
    }

    #[test]
    fn test_no_keys_is_an_error() {
        let config = backend(vec!["  "], vec!["KEY_MISSING"]);
        let result = config.resolve_keys_with(|_| None);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
