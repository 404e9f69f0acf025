// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env::current_dir;
use std::fs::read_to_string;
use std::path::PathBuf;

use revise_core::config::SchedulerConfig;
use revise_core::error::Fallible;
use revise_core::error::fail;

use crate::db::Database;

pub const DATABASE_FILE: &str = "revise.db";
pub const CONFIG_FILE: &str = "revise.toml";

/// A directory holding a review database and, optionally, a config file.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub config: SchedulerConfig,
}

impl Collection {
    /// Open the collection in `directory`, or in the working directory. The
    /// database is created if it does not exist yet.
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(directory) => PathBuf::from(directory),
            None => current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        let config = load_config(&directory)?;
        let db = Database::new(&directory.join(DATABASE_FILE))?;
        Ok(Self {
            directory,
            db,
            config,
        })
    }
}

fn load_config(directory: &std::path::Path) -> Fallible<SchedulerConfig> {
    let path = directory.join(CONFIG_FILE);
    if !path.exists() {
        log::debug!("No {CONFIG_FILE} in {}, using defaults", directory.display());
        return Ok(SchedulerConfig::default());
    }
    let source = read_to_string(&path)?;
    let config = SchedulerConfig::from_toml(&source)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use revise_core::error::ErrorKind;

    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_missing_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[test]
    fn test_creates_database() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let collection = Collection::new(Some(dir.display().to_string()))?;
        assert!(dir.join(DATABASE_FILE).exists());
        assert_eq!(collection.config, SchedulerConfig::default());
        Ok(())
    }

    #[test]
    fn test_reads_config() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        write(dir.join(CONFIG_FILE), "archive_grace_days = 3\n")?;
        let collection = Collection::new(Some(dir.display().to_string()))?;
        assert_eq!(collection.config.archive_grace_days, 3);
        Ok(())
    }

    #[test]
    fn test_bad_config() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        write(dir.join(CONFIG_FILE), "legacy_stages = []\n")?;
        let err = Collection::new(Some(dir.display().to_string())).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        Ok(())
    }
}
