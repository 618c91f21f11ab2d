use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::academic::TerminalLevels;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub academic: AcademicConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub enable_request_logging: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub allow_registration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicConfig {
    /// Level ids counting as terminal (final program year); gates
    /// student access to capstone documents.
    pub terminal_levels: Vec<i32>,
}

impl AcademicConfig {
    pub fn terminal_levels(&self) -> TerminalLevels {
        TerminalLevels::new(self.terminal_levels.iter().copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub dedup_window_secs: i64,
    pub dedup_capacity: usize,
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, specific env vars override.
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging =
                v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_REGISTRATION") {
            self.security.allow_registration =
                v.parse().unwrap_or(self.security.allow_registration);
        }

        // Academic overrides
        if let Ok(v) = env::var("ACADEMIC_TERMINAL_LEVELS") {
            self.academic.terminal_levels = v
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
        }

        // Audit overrides
        if let Ok(v) = env::var("AUDIT_DEDUP_WINDOW_SECS") {
            self.audit.dedup_window_secs = v.parse().unwrap_or(self.audit.dedup_window_secs);
        }
        if let Ok(v) = env::var("AUDIT_DEDUP_CAPACITY") {
            self.audit.dedup_capacity = v.parse().unwrap_or(self.audit.dedup_capacity);
        }
        if let Ok(v) = env::var("AUDIT_SWEEP_INTERVAL_SECS") {
            self.audit.sweep_interval_secs =
                v.parse().unwrap_or(self.audit.sweep_interval_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig { max_connections: 10, connection_timeout: 30 },
            api: ApiConfig {
                default_page_size: 20,
                max_page_size: 100,
                enable_request_logging: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7,
                allow_registration: true,
            },
            academic: AcademicConfig { terminal_levels: vec![4, 5] },
            audit: AuditConfig {
                dedup_window_secs: 60,
                dedup_capacity: 10_000,
                sweep_interval_secs: 300,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig { max_connections: 20, connection_timeout: 10 },
            api: ApiConfig {
                default_page_size: 20,
                max_page_size: 50,
                enable_request_logging: true,
                cors_origins: vec!["https://staging.archive.example.edu".to_string()],
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                allow_registration: true,
            },
            academic: AcademicConfig { terminal_levels: vec![4, 5] },
            audit: AuditConfig {
                dedup_window_secs: 300,
                dedup_capacity: 50_000,
                sweep_interval_secs: 300,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig { max_connections: 50, connection_timeout: 5 },
            api: ApiConfig {
                default_page_size: 20,
                max_page_size: 50,
                enable_request_logging: false,
                cors_origins: vec!["https://archive.example.edu".to_string()],
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                allow_registration: false,
            },
            academic: AcademicConfig { terminal_levels: vec![4, 5] },
            audit: AuditConfig {
                dedup_window_secs: 300,
                dedup_capacity: 50_000,
                sweep_interval_secs: 300,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
