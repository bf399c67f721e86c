// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use budgetboard_app::{DEFAULT_PAGE_SIZE, EntityKind, PAGE_SIZE_OPTIONS, SearchOptions};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "budgetboard";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_START_SCREEN: EntityKind = EntityKind::Engagements;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub search: Search,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            ui: Ui::default(),
            search: Search::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub start_screen: Option<String>,
    pub page_size: Option<usize>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            start_screen: Some(DEFAULT_START_SCREEN.as_str().to_owned()),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Overrides for the search defaults; unset keys keep the engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Search {
    pub match_all_words: Option<bool>,
    pub whole_words_only: Option<bool>,
    pub normalize_text: Option<bool>,
    pub exact_match: Option<bool>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("BUDGETBOARD_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set BUDGETBOARD_CONFIG_PATH to the config file"
            )
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
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [ui], and [search]",
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
        if let Some(data_path) = &self.data.path {
            validate_data_path(data_path)
                .with_context(|| format!("data.path in {}", path.display()))?;
        }

        if let Some(screen) = &self.ui.start_screen
            && EntityKind::parse(screen).is_none()
        {
            let known = EntityKind::ALL
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "ui.start_screen in {} is {screen:?}; use one of: {known}",
                path.display()
            );
        }

        if let Some(page_size) = self.ui.page_size
            && !PAGE_SIZE_OPTIONS.contains(&page_size)
        {
            bail!(
                "ui.page_size in {} must be one of {:?}, got {}",
                path.display(),
                PAGE_SIZE_OPTIONS,
                page_size
            );
        }

        Ok(())
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_data_path(),
        }
    }

    pub fn start_screen(&self) -> EntityKind {
        self.ui
            .start_screen
            .as_deref()
            .and_then(EntityKind::parse)
            .unwrap_or(DEFAULT_START_SCREEN)
    }

    pub fn page_size(&self) -> usize {
        self.ui.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn search_options(&self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            match_all_words: self
                .search
                .match_all_words
                .unwrap_or(defaults.match_all_words),
            whole_words_only: self
                .search
                .whole_words_only
                .unwrap_or(defaults.whole_words_only),
            normalize_text: self
                .search
                .normalize_text
                .unwrap_or(defaults.normalize_text),
            exact_match: self.search.exact_match.unwrap_or(defaults.exact_match),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# budgetboard config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Optional. Default is the platform data dir (for example ~/.local/share/budgetboard/budget.json)\n# path = \"/absolute/path/to/budget.json\"\n\n[ui]\nstart_screen = \"{}\"\npage_size = {}\n\n[search]\nmatch_all_words = false\nwhole_words_only = false\nnormalize_text = true\nexact_match = false\n",
            path.display(),
            DEFAULT_START_SCREEN.as_str(),
            DEFAULT_PAGE_SIZE,
        )
    }
}

pub fn default_data_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("BUDGETBOARD_DATA_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set BUDGETBOARD_DATA_PATH to the dataset file")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("budget.json"))
}

pub fn validate_data_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        bail!("dataset path must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "dataset path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    Ok(())
}
