// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vgrid_app::{
    DEFAULT_BUFFER_SIZE, DEFAULT_ROW_HEIGHT, DEFAULT_VIEWPORT_HEIGHT, GridConfig,
    SelectionTracking, WindowSpec,
};

pub const APP_NAME: &str = "vgrid";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_DATA_FILE: &str = "transactions.json";
const DEFAULT_FILTER_DEBOUNCE: &str = "300ms";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            grid: Grid::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Grid {
    pub row_height: Option<f64>,
    pub buffer_size: Option<i64>,
    pub viewport_height: Option<f64>,
    pub filter_debounce: Option<String>,
    pub selection_tracking: Option<String>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            row_height: Some(DEFAULT_ROW_HEIGHT),
            buffer_size: Some(DEFAULT_BUFFER_SIZE as i64),
            viewport_height: Some(DEFAULT_VIEWPORT_HEIGHT),
            filter_debounce: Some(DEFAULT_FILTER_DEBOUNCE.to_owned()),
            selection_tracking: Some(SelectionTracking::Position.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("VGRID_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set VGRID_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [grid], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(row_height) = self.grid.row_height
            && !(row_height.is_finite() && row_height > 0.0)
        {
            bail!(
                "grid.row_height in {} must be positive, got {}",
                path.display(),
                row_height
            );
        }

        if let Some(buffer_size) = self.grid.buffer_size
            && buffer_size < 1
        {
            bail!(
                "grid.buffer_size in {} must be at least 1, got {}",
                path.display(),
                buffer_size
            );
        }

        if let Some(viewport_height) = self.grid.viewport_height
            && !(viewport_height.is_finite() && viewport_height >= 0.0)
        {
            bail!(
                "grid.viewport_height in {} must be non-negative, got {}",
                path.display(),
                viewport_height
            );
        }

        if let Some(debounce) = &self.grid.filter_debounce {
            parse_duration(debounce).with_context(|| {
                format!("grid.filter_debounce in {} is invalid", path.display())
            })?;
        }

        if let Some(tracking) = &self.grid.selection_tracking
            && SelectionTracking::parse(tracking).is_none()
        {
            bail!(
                "grid.selection_tracking in {} must be \"position\" or \"identity\", got {:?}",
                path.display(),
                tracking
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                level
            );
        }

        Ok(())
    }

    /// `[data].path`, then `VGRID_DATA_PATH`, then `transactions.json` in the
    /// working directory.
    pub fn data_path(&self) -> PathBuf {
        if let Some(path) = &self.data.path {
            return PathBuf::from(path);
        }
        if let Some(path) = env::var_os("VGRID_DATA_PATH") {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_DATA_FILE)
    }

    pub fn grid_config(&self) -> Result<GridConfig> {
        let row_height = self.grid.row_height.unwrap_or(DEFAULT_ROW_HEIGHT);
        let buffer_size = match self.grid.buffer_size {
            Some(size) => usize::try_from(size)
                .with_context(|| format!("grid.buffer_size out of range: {size}"))?,
            None => DEFAULT_BUFFER_SIZE,
        };
        let window = WindowSpec::new(row_height, buffer_size)
            .ok_or_else(|| anyhow!("grid.row_height must be positive, got {row_height}"))?;

        let tracking = self
            .grid
            .selection_tracking
            .as_deref()
            .unwrap_or(SelectionTracking::Position.as_str());
        let selection_tracking = SelectionTracking::parse(tracking)
            .ok_or_else(|| anyhow!("unknown grid.selection_tracking {tracking:?}"))?;

        Ok(GridConfig {
            window,
            viewport_height: self
                .grid
                .viewport_height
                .unwrap_or(DEFAULT_VIEWPORT_HEIGHT),
            filter_debounce: self.filter_debounce()?,
            selection_tracking,
        })
    }

    pub fn filter_debounce(&self) -> Result<Duration> {
        parse_duration(
            self.grid
                .filter_debounce
                .as_deref()
                .unwrap_or(DEFAULT_FILTER_DEBOUNCE),
        )
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to an explicit path")
        })?;
        Ok(data_root.join(APP_NAME).join("vgrid.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# vgrid config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Optional. Defaults to $VGRID_DATA_PATH, then ./{}\n# path = \"/absolute/path/to/transactions.json\"\n\n[grid]\nrow_height = {}\nbuffer_size = {}\nviewport_height = {}\nfilter_debounce = \"{}\"\n# \"position\" keeps selections on row indices, \"identity\" follows records\nselection_tracking = \"position\"\n\n[log]\n# RUST_LOG overrides this when set\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/vgrid/vgrid.log)\n# file = \"/absolute/path/to/vgrid.log\"\n",
            path.display(),
            DEFAULT_DATA_FILE,
            DEFAULT_ROW_HEIGHT,
            DEFAULT_BUFFER_SIZE,
            DEFAULT_VIEWPORT_HEIGHT,
            DEFAULT_FILTER_DEBOUNCE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 1s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;
    use vgrid_app::SelectionTracking;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.log_level(), "info");

        let grid = config.grid_config()?;
        assert_eq!(grid.window.row_height, 40.0);
        assert_eq!(grid.window.buffer_size, 10);
        assert_eq!(grid.viewport_height, 600.0);
        assert_eq!(grid.filter_debounce, Duration::from_millis(300));
        assert_eq!(grid.selection_tracking, SelectionTracking::Position);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[grid]\nrow_height = 30\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[data], [grid], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[data]\npath = \"/data/tx.json\"\n[grid]\nrow_height = 24\nbuffer_size = 4\nviewport_height = 480.5\nfilter_debounce = \"1s\"\nselection_tracking = \"identity\"\n[log]\nlevel = \"debug\"\nfile = \"/tmp/vgrid-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.data_path(), PathBuf::from("/data/tx.json"));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/vgrid-test.log"));

        let grid = config.grid_config()?;
        assert_eq!(grid.window.row_height, 24.0);
        assert_eq!(grid.window.buffer_size, 4);
        assert_eq!(grid.viewport_height, 480.5);
        assert_eq!(grid.filter_debounce, Duration::from_secs(1));
        assert_eq!(grid.selection_tracking, SelectionTracking::Identity);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn grid_values_are_validated() -> Result<()> {
        let cases = [
            ("row_height = 0", "grid.row_height"),
            ("buffer_size = 0", "grid.buffer_size"),
            ("viewport_height = -1.0", "grid.viewport_height"),
            ("selection_tracking = \"row\"", "grid.selection_tracking"),
        ];
        for (line, key) in cases {
            let (_temp, path) = write_config(&format!("version = 1\n[grid]\n{line}\n"))?;
            let error = Config::load(&path).expect_err("invalid grid value should fail");
            let message = error.to_string();
            assert!(message.contains(key), "{line}: {message}");
            assert!(message.contains("config.toml"), "{line}: {message}");
        }
        Ok(())
    }

    #[test]
    fn invalid_debounce_names_the_key() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[grid]\nfilter_debounce = \"soon\"\n")?;
        let error = Config::load(&path).expect_err("invalid debounce should fail");
        let message = format!("{error:#}");
        assert!(message.contains("grid.filter_debounce"), "{message}");
        assert!(message.contains("invalid duration"), "{message}");
        Ok(())
    }

    #[test]
    fn unknown_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"loud\"\n")?;
        let error = Config::load(&path).expect_err("unknown level should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("VGRID_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("VGRID_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn data_path_prefers_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[data]\npath = \"/from/config.json\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("VGRID_DATA_PATH", "/from/env.json");
        }
        let config = Config::load(&path)?;
        let resolved = config.data_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("VGRID_DATA_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/config.json"));
        Ok(())
    }

    #[test]
    fn data_path_uses_env_then_working_directory_default() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        let config = Config::load(&path)?;

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("VGRID_DATA_PATH", "/from/env-only.json");
        }
        let from_env = config.data_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("VGRID_DATA_PATH");
        }
        assert_eq!(from_env, PathBuf::from("/from/env-only.json"));
        assert_eq!(config.data_path(), PathBuf::from("transactions.json"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("300ms")?, Duration::from_millis(300));
        assert_eq!(parse_duration("1s")?, Duration::from_secs(1));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert_eq!(parse_duration("0ms")?, Duration::ZERO);
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[grid]"));
        std::fs::write(&path, &example)?;

        let config = Config::load(&path)?;
        assert_eq!(config.grid_config()?.window.buffer_size, 10);
        Ok(())
    }
}
