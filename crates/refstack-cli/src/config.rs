use refstack_core::debug::DEFAULT_DEBUG_DIR;
use refstack_core::normalize::DEFAULT_MAX_DIMENSION;
use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scratch directory for intermediate composites.
    pub debug_dir: PathBuf,
    /// Whether composites are written to `debug_dir` at all.
    pub debug_enabled: bool,
    /// Longest selfie edge after normalization.
    pub max_dimension: u32,
    /// Extra fonts loaded on top of the system font database.
    pub font_dir: Option<PathBuf>,
    /// Root against which logo and background keys resolve.
    pub asset_dir: PathBuf,
}

impl Config {
    /// Load configuration from `REFSTACK_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            debug_dir: lookup("REFSTACK_DEBUG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEBUG_DIR)),
            debug_enabled: lookup("REFSTACK_DEBUG_ENABLED")
                .map(|v| v != "0")
                .unwrap_or(true),
            max_dimension: parse_or(lookup("REFSTACK_MAX_DIMENSION"), DEFAULT_MAX_DIMENSION),
            font_dir: lookup("REFSTACK_FONT_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            asset_dir: lookup("REFSTACK_ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.debug_dir, PathBuf::from("tmp/v3-debug"));
        assert!(config.debug_enabled);
        assert_eq!(config.max_dimension, 1024);
        assert_eq!(config.font_dir, None);
        assert_eq!(config.asset_dir, PathBuf::from("."));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("REFSTACK_DEBUG_DIR", "/var/tmp/refs"),
            ("REFSTACK_DEBUG_ENABLED", "0"),
            ("REFSTACK_MAX_DIMENSION", "512"),
            ("REFSTACK_FONT_DIR", "/usr/share/fonts/custom"),
            ("REFSTACK_ASSET_DIR", "/srv/assets"),
        ]);
        assert_eq!(config.debug_dir, PathBuf::from("/var/tmp/refs"));
        assert!(!config.debug_enabled);
        assert_eq!(config.max_dimension, 512);
        assert_eq!(config.font_dir, Some(PathBuf::from("/usr/share/fonts/custom")));
        assert_eq!(config.asset_dir, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn test_unparseable_number_falls_back() {
        let config = config_from(&[("REFSTACK_MAX_DIMENSION", "huge")]);
        assert_eq!(config.max_dimension, 1024);
    }
}
