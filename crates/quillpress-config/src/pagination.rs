use crate::env_or;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Page-size policy for every listing endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl PaginationConfig {
    pub fn from_env() -> Self {
        Self::new(
            env_or("PAGINATION_DEFAULT_LIMIT", DEFAULT_LIMIT),
            env_or("PAGINATION_MAX_LIMIT", MAX_LIMIT),
        )
    }

    /// Keeps `1 <= default_limit <= max_limit`.
    pub fn new(default_limit: i64, max_limit: i64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = PaginationConfig::default();
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.max_limit, 100);
    }

    #[test]
    fn test_new_normalizes() {
        assert_eq!(
            PaginationConfig::new(500, 50),
            PaginationConfig::new(50, 50)
        );
        assert_eq!(PaginationConfig::new(0, 0).default_limit, 1);
        assert_eq!(PaginationConfig::new(-5, 20).default_limit, 1);
    }
}
