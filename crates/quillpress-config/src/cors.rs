use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let raw = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());
        Self::from_list(&raw)
    }

    /// Parses a comma-separated origin list. `*` allows any origin.
    pub fn from_list(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_trims_and_skips_blanks() {
        let config = CorsConfig::from_list(" http://a.test , ,http://b.test,");
        assert_eq!(
            config.allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert!(!config.allows_any());
    }

    #[test]
    fn test_wildcard() {
        assert!(CorsConfig::from_list("*").allows_any());
    }
}
