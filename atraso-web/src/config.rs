//! Configuration module

use std::env;
use std::path::PathBuf;

/// Default artifact location (the original deployment's `artefactos/`
/// layout).
pub const DEFAULT_ARTIFACT_PATH: &str = "artefactos/modelo_atraso.json";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Trained pipeline artifact on local disk
    pub artifact_path: PathBuf,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            artifact_path: env::var("ATRASO_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_PATH)),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
