/// Log line format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite cache location (file-backed, created if missing).
    pub database_url: String,
    /// Root of the JMA "bosai" API, without trailing slash.
    pub jma_base_url: String,
    pub jma_user_agent: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://weather_forecast.db".to_string()),
            jma_base_url: lookup("JMA_BASE_URL")
                .unwrap_or_else(|| "https://www.jma.go.jp/bosai".to_string())
                .trim_end_matches('/')
                .to_string(),
            jma_user_agent: lookup("JMA_USER_AGENT")
                .unwrap_or_else(|| "JmaWeatherApi/0.1".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_values() {
        let config = AppConfig::from_lookup(|_| None);

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite://weather_forecast.db");
        assert_eq!(config.jma_base_url, "https://www.jma.go.jp/bosai");
        assert!(config.jma_user_agent.contains("JmaWeatherApi"));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("JMA_BASE_URL", "http://127.0.0.1:9000/"),
            ("PORT", "3000"),
            ("LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.jma_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    #[should_panic(expected = "PORT must be a valid u16")]
    fn test_invalid_port_panics() {
        AppConfig::from_lookup(|k| (k == "PORT").then(|| "not-a-port".to_string()));
    }
}
