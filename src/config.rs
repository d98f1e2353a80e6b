use crate::contract::DEFAULT_AUTHORITY;
use crate::storage::schema::DATABASE_NAME;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FriendstoreConfig {
    pub database: Option<String>,
    pub authority: Option<String>,
}

impl FriendstoreConfig {
    /// Configured authority, or the contract default
    pub fn authority(&self) -> &str {
        self.authority.as_deref().unwrap_or(DEFAULT_AUTHORITY)
    }

    /// Read a config file. A file that does not exist is `Ok(None)`.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("reading {}", path.display())));
            }
        };
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    /// Write the config as TOML; an existing file is replaced only with `overwrite`
    pub fn save(&self, path: &Path, overwrite: bool) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = match options.open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                anyhow::bail!("{} exists; pass --force to replace it", path.display());
            }
            Err(e) => return Err(anyhow::Error::new(e).context(format!("opening {}", path.display()))),
        };
        file.write_all(contents.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("friendstore.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".friendstore").join(DATABASE_NAME)
}

/// Pick the database path: explicit flag, then config, then the default under `base`
pub fn resolve_database_path(
    flag: Option<&Path>,
    config: Option<&FriendstoreConfig>,
    base: &Path,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_database_path_in(base))
}

/// Create the directory that will hold the database file
pub fn prepare_database_dir(db_path: &Path) -> anyhow::Result<()> {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display())),
        _ => Ok(()),
    }
}
