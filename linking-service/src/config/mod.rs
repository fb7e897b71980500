use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub stripe: StripeApiConfig,
    pub environment: String,
    pub log_level: String,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StripeApiConfig {
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let db_url =
            env::var("LINKING_DATABASE_URL").context("LINKING_DATABASE_URL must be set")?;
        let max_connections = env::var("LINKING_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?;
        let min_connections = env::var("LINKING_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;

        let api_base_url = env::var("STRIPE_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string());

        let environment =
            env::var("LINKING_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LINKING_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database: DatabaseConfig {
                url: Secret::new(db_url),
                max_connections,
                min_connections,
            },
            stripe: StripeApiConfig { api_base_url },
            environment,
            log_level,
            service_name: "linking-service".to_string(),
        })
    }
}
