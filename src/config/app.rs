use anyhow::Result;
use std::env;

pub const DEFAULT_MAX_STUDENTS_PER_COURSE: usize = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub max_students_per_course: usize,
    pub seed_database: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            max_students_per_course: DEFAULT_MAX_STUDENTS_PER_COURSE,
            seed_database: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.port);
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);
        let max_students_per_course = env::var("MAX_STUDENTS_PER_COURSE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.max_students_per_course);
        let seed_database = env::var("SEED_DATABASE")
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.seed_database);

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            max_students_per_course,
            seed_database,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
