use std::{env, path::PathBuf};

use anyhow::Result;

const DEFAULT_API_PORT: u16 = 8080;
const DEFAULT_PORTAL_PORT: u16 = 8081;
const DEFAULT_IMAGE_DIR: &str = "storage/images";

/// Runtime configuration, read once at startup. Every value has a usable
/// default so the demo runs with no environment at all.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_port: u16,
    pub portal_port: u16,
    /// Base URL the portal uses to reach the records API.
    pub api_base_url: String,
    pub image_dir: PathBuf,
    pub auth: AuthSettings,
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    /// The single accepted credential pair.
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_port = port_from_env("API_PORT", DEFAULT_API_PORT);
        let portal_port = port_from_env("PORTAL_PORT", DEFAULT_PORTAL_PORT);

        let api_base_url = env::var("API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| format!("http://127.0.0.1:{api_port}"));

        let image_dir = env::var("IMAGE_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR));

        Ok(Self {
            api_port,
            portal_port,
            api_base_url,
            image_dir,
            auth: AuthSettings::from_env(),
        })
    }
}

impl AuthSettings {
    fn from_env() -> Self {
        Self {
            username: string_from_env("ADMIN_USERNAME", "admin"),
            password: string_from_env("ADMIN_PASSWORD", "password"),
            jwt_secret: string_from_env("JWT_SECRET", "student-registry-demo-secret"),
            issuer: string_from_env("JWT_ISSUER", "student-registry"),
            audience: string_from_env("JWT_AUDIENCE", "student-registry-clients"),
        }
    }
}

fn port_from_env(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn string_from_env(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
