//! Server Configuration
//!
//! Command-line flags with per-user data directory defaults.

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "lms-backend", version, about = "Learning-management backend API server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite database file (default: <data dir>/lms.db)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Directory for rolling log files (default: <data dir>/logs)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        match &self.db {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("lms.db")),
        }
    }

    pub fn log_path(&self) -> anyhow::Result<PathBuf> {
        match &self.log_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("logs")),
        }
    }
}

fn data_dir() -> anyhow::Result<PathBuf> {
    ProjectDirs::from("", "", "lms-backend")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .context("could not determine a data directory; pass --db and --log-dir")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["lms-backend"]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(config.db.is_none());
    }

    #[test]
    fn test_explicit_paths() {
        let config = ServerConfig::try_parse_from([
            "lms-backend",
            "--bind",
            "0.0.0.0:9000",
            "--db",
            "/tmp/lms.db",
            "--log-dir",
            "/tmp/logs",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.db_path().unwrap(), PathBuf::from("/tmp/lms.db"));
        assert_eq!(config.log_path().unwrap(), PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn test_rejects_bad_bind() {
        assert!(ServerConfig::try_parse_from(["lms-backend", "--bind", "nowhere"]).is_err());
    }
}
