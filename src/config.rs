use std::time::Duration;

use crate::seed::{DEFAULT_ACADEMIC_YEAR, DEFAULT_TERM};

const DEFAULT_PRINT_DELAY_MS: u64 = 800;
const DEFAULT_DOWNLOAD_DELAY_MS: u64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub print_delay: Duration,
    pub download_delay: Duration,
    pub term: String,
    pub academic_year: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            print_delay: Duration::from_millis(DEFAULT_PRINT_DELAY_MS),
            download_delay: Duration::from_millis(DEFAULT_DOWNLOAD_DELAY_MS),
            term: DEFAULT_TERM.to_string(),
            academic_year: DEFAULT_ACADEMIC_YEAR.to_string(),
        }
    }
}

fn env_millis(key: &str, default: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_millis(ms)
}

fn env_label(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_label("EXAMD_LOG", "info"),
            print_delay: env_millis("EXAMD_PRINT_DELAY_MS", DEFAULT_PRINT_DELAY_MS),
            download_delay: env_millis("EXAMD_DOWNLOAD_DELAY_MS", DEFAULT_DOWNLOAD_DELAY_MS),
            term: env_label("EXAMD_TERM", DEFAULT_TERM),
            academic_year: env_label("EXAMD_ACADEMIC_YEAR", DEFAULT_ACADEMIC_YEAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dashboard_timings() {
        let cfg = Config::default();
        assert_eq!(cfg.print_delay, Duration::from_millis(800));
        assert_eq!(cfg.download_delay, Duration::from_millis(600));
        assert_eq!(cfg.term, "First Term");
        assert_eq!(cfg.academic_year, "2024");
    }

    #[test]
    fn unparseable_delay_falls_back() {
        assert_eq!(
            env_millis("EXAMD_TEST_UNSET_DELAY_KEY", 123),
            Duration::from_millis(123)
        );
        assert_eq!(env_label("EXAMD_TEST_UNSET_LABEL_KEY", "x"), "x");
    }
}
