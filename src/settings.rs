use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: Url,
    pub api_key: String,
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
    pub courses_per_page: usize,
    pub orders_per_page: usize,
    /// IANA name used to decide what "today" is for tutor bookings.
    pub timezone: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // APP_API_KEY, APP_API_BASE_URL, ...
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .set_default("api_base_url", "http://localhost:3000")?
            .set_default("api_key", "")?
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("courses_per_page", 5)?
            .set_default("orders_per_page", 5)?
            .set_default("timezone", "Europe/Moscow")?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings
            .timezone
            .parse::<Tz>()
            .map_err(|err| ConfigError::Message(format!("invalid timezone: {err}")))?;
        Ok(settings)
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::Europe::Moscow)
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz()).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in ["APP_API_KEY", "APP_API_BASE_URL", "APP_PORT", "APP_TIMEZONE"] {
            // SAFETY: tests touching the environment run serially.
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.courses_per_page, 5);
        assert_eq!(settings.orders_per_page, 5);
        assert_eq!(settings.tz(), chrono_tz::Europe::Moscow);
        assert_eq!(settings.api_base_url.as_str(), "http://localhost:3000/");
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        // SAFETY: tests touching the environment run serially.
        unsafe {
            std::env::set_var("APP_API_KEY", "secret-key");
            std::env::set_var("APP_API_BASE_URL", "https://api.example.com");
            std::env::set_var("APP_PORT", "9090");
        }
        let settings = Settings::from_env().unwrap();
        clear_env();
        assert_eq!(settings.api_key, "secret-key");
        assert_eq!(settings.api_base_url.host_str(), Some("api.example.com"));
        assert_eq!(settings.port, 9090);
    }

    #[test]
    #[serial]
    fn test_rejects_unknown_timezone() {
        clear_env();
        // SAFETY: tests touching the environment run serially.
        unsafe { std::env::set_var("APP_TIMEZONE", "Mars/Olympus") };
        let result = Settings::from_env();
        clear_env();
        assert!(result.is_err());
    }
}
