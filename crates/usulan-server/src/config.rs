use core::panic;
use std::{fs, path::PathBuf};

use crate::error::Result;
pub use clap::Parser;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "USULAN_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "USULAN_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "USULAN_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server, as visible to users"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "USULAN_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db or similar, default is sqlite://[data-dir]/usulan.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "USULAN_DATA_DIR",
        help = "Data directory (database, stored images), default is system default like ~/.local/share/usulan",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "USULAN_FILES_DIR",
        help = "Directory for stored image files, default data_dir/storage"
    )]
    files_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "USULAN_UPLOAD_LIMIT_KB",
        default_value = "2048",
        help = "Maximum image upload size in KB"
    )]
    pub upload_limit_kb: usize,

    #[arg(
        long,
        env = "USULAN_DEFAULT_PAGE_SIZE",
        default_value = "5",
        help = "Default page size"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "USULAN_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

fn default_data_dir() -> String {
    let dir = dirs::data_dir()
        .map(|p| p.join("usulan"))
        .unwrap_or_else(|| PathBuf::from("usulan"));

    if !fs::exists(&dir).expect("Failed to check if data directory exists") {
        fs::create_dir_all(&dir).expect("Failed to create data directory");
    } else if !dir.is_dir() {
        panic!("Data directory is not a directory",)
    }

    dir.to_string_lossy().to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn files_dir(&self) -> PathBuf {
        self.files_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("storage"))
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/usulan.db?mode=rwc", self.data_dir))
    }
}
