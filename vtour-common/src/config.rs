//! Configuration loading and uploads folder resolution

use crate::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default TCP port for the tour processing service
pub const DEFAULT_PORT: u16 = 5850;

/// Service configuration resolved at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Flat directory that uploaded originals are written to
    pub uploads_dir: PathBuf,
}

impl ServiceConfig {
    /// Resolve configuration following the priority order:
    /// 1. Environment variables (`VTOUR_PORT`, `VTOUR_UPLOADS_DIR`)
    /// 2. TOML config file (`vtour/config.toml` in the user config dir)
    /// 3. OS-dependent compiled default (fallback)
    pub fn resolve() -> Result<Self> {
        let file = load_config_file().ok();

        let port = resolve_port(file.as_ref())?;
        let uploads_dir = resolve_uploads_dir(file.as_ref());

        Ok(Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], port)),
            uploads_dir,
        })
    }

    /// Create the uploads directory if it does not exist yet
    pub fn ensure_uploads_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.uploads_dir)?;
        Ok(())
    }
}

fn resolve_port(file: Option<&toml::Value>) -> Result<u16> {
    if let Ok(raw) = std::env::var("VTOUR_PORT") {
        return raw
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("VTOUR_PORT is not a valid port: {raw}")));
    }

    if let Some(port) = file
        .and_then(|config| config.get("port"))
        .and_then(|value| value.as_integer())
    {
        return u16::try_from(port)
            .map_err(|_| Error::Config(format!("config file port out of range: {port}")));
    }

    Ok(DEFAULT_PORT)
}

fn resolve_uploads_dir(file: Option<&toml::Value>) -> PathBuf {
    if let Ok(dir) = std::env::var("VTOUR_UPLOADS_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(dir) = file
        .and_then(|config| config.get("uploads_dir"))
        .and_then(|value| value.as_str())
    {
        return PathBuf::from(dir);
    }

    default_uploads_dir()
}

/// Read the platform config file if present
fn load_config_file() -> Result<toml::Value> {
    let path = dirs::config_dir()
        .map(|d| d.join("vtour").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if !path.exists() {
        return Err(Error::Config(format!("Config file not found: {}", path.display())));
    }

    let contents = std::fs::read_to_string(&path)?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

/// OS-dependent default uploads folder path
fn default_uploads_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vtour").join("uploads"))
        .unwrap_or_else(|| PathBuf::from("./uploads"))
}
