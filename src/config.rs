// The JSON config file: read once at startup, rewritten in full after a new
// access token has been obtained. Keys this tool does not know about are
// carried through untouched.

use crate::auth::Credential;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "POCKET")]
    pub pocket: PocketConfig,
    #[serde(rename = "APP", default)]
    pub app: AppConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PocketConfig {
    pub consumer_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_use_tui")]
    pub use_tui: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_use_tui() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            use_tui: default_use_tui(),
            extra: Map::new(),
        }
    }
}

impl Config {
    pub fn credential(&self) -> Credential {
        Credential::new(
            self.pocket.consumer_key.clone(),
            self.pocket.access_token.clone().filter(|t| !t.is_empty()),
        )
    }

    /// Record the token from `credential`. Returns whether anything changed.
    pub fn store_credential(&mut self, credential: &Credential) -> bool {
        if self.pocket.access_token == credential.access_token {
            return false;
        }
        self.pocket.access_token = credential.access_token.clone();
        true
    }
}

/// `POCKET_RENAME_CONFIG` or `config.json` in the working directory.
pub fn path_from_env() -> PathBuf {
    std::env::var_os("POCKET_RENAME_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_PATH))
}

/// An open config file and its parsed contents.
pub struct ConfigFile {
    file: File,
    path: PathBuf,
    pub config: Config,
}

impl ConfigFile {
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw).with_context(|| format!("Parsing config file {}", path.display()))?;
        Ok(ConfigFile {
            file,
            path: path.to_path_buf(),
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole file with the current config, indented by four
    /// spaces.
    pub fn save(&mut self) -> Result<()> {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.config.serialize(&mut ser).context("Serializing config")?;
        out.push(b'\n');

        // The read left the cursor at the end; rewind and cut the old content.
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.file
            .write_all(&out)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;
        self.file.flush()?;
        Ok(())
    }
}
