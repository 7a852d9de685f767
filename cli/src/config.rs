use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DEFAULT_TABLE_FILE: &str = "foods.csv";

pub struct Config {
    pub table_path: PathBuf,
}

impl Config {
    /// Resolve the food table: an explicit `--table` wins, otherwise
    /// `<data dir>/foods.csv` must exist.
    pub fn load(table_override: Option<PathBuf>) -> Result<Self> {
        if let Some(table_path) = table_override {
            return Ok(Config { table_path });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "platter").context("Could not determine home directory")?;
        let table_path = proj_dirs.data_dir().join(DEFAULT_TABLE_FILE);

        if !table_path.exists() {
            bail!(
                "No food table found at {}. Pass --table <PATH> or copy a CSV export there",
                table_path.display()
            );
        }

        Ok(Config { table_path })
    }
}
