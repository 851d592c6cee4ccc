// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const APP_NAME: &str = "javahub";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_RUN_DELAY: &str = "1200ms";
const DEFAULT_LLM_TIMEOUT: &str = "30s";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub llm: Llm,
    #[serde(default)]
    pub log: LogSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: CatalogSection::default(),
            ui: Ui::default(),
            llm: Llm::default(),
            log: LogSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ui {
    pub run_delay: Option<String>,
    pub start_topic: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            run_delay: Some(DEFAULT_RUN_DELAY.to_owned()),
            start_topic: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Llm {
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub extra_context: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Llm {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            base_url: Some(javahub_llm::DEFAULT_BASE_URL.to_owned()),
            model: Some(javahub_llm::DEFAULT_MODEL.to_owned()),
            extra_context: Some(String::new()),
            timeout: Some(DEFAULT_LLM_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("JAVAHUB_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set JAVAHUB_CONFIG_PATH to the config file")
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
                    "config file {} has no version; add `version = 1` at the top and keep values under [catalog], [ui], [llm] and [log]",
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
        if let Some(catalog) = &self.catalog.path
            && catalog.trim().is_empty()
        {
            bail!(
                "catalog.path in {} is empty; remove it to use the built-in catalog",
                path.display()
            );
        }

        if let Some(start) = &self.ui.start_topic
            && start.trim().is_empty()
        {
            bail!(
                "ui.start_topic in {} is empty; remove it to start on the first topic",
                path.display()
            );
        }

        for (key, value) in [
            ("ui.run_delay", self.ui.run_delay.as_deref()),
            ("llm.timeout", self.llm.timeout.as_deref()),
        ] {
            let Some(raw) = value else {
                continue;
            };
            if parse_duration(raw)? <= Duration::ZERO {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }

        if let Some(level) = &self.log.level {
            parse_level(level)
                .with_context(|| format!("invalid log.level in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.path.as_deref().map(PathBuf::from)
    }

    pub fn run_delay(&self) -> Result<Duration> {
        parse_duration(self.ui.run_delay.as_deref().unwrap_or(DEFAULT_RUN_DELAY))
    }

    pub fn start_topic(&self) -> Option<&str> {
        self.ui.start_topic.as_deref().map(str::trim)
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.enabled.unwrap_or(true)
    }

    pub fn llm_base_url(&self) -> &str {
        self.llm
            .base_url
            .as_deref()
            .unwrap_or(javahub_llm::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn llm_model(&self) -> &str {
        self.llm
            .model
            .as_deref()
            .unwrap_or(javahub_llm::DEFAULT_MODEL)
    }

    pub fn llm_timeout(&self) -> Result<Duration> {
        parse_duration(self.llm.timeout.as_deref().unwrap_or(DEFAULT_LLM_TIMEOUT))
    }

    pub fn llm_extra_context(&self) -> &str {
        self.llm.extra_context.as_deref().unwrap_or("")
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        parse_level(self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .as_deref()
            .filter(|file| !file.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# javahub config\n# Place this file at: {}\n\nversion = 1\n\n[catalog]\n# Optional. Default is the built-in catalog of sixteen topics.\n# path = \"/absolute/path/to/topics.toml\"\n\n[ui]\nrun_delay = \"{}\"\n# start_topic = \"java-basics-intro\"\n\n[llm]\nenabled = true\nbase_url = \"{}\"\nmodel = \"{}\"\nextra_context = \"\"\ntimeout = \"{}\"\n\n[log]\n# off, error, warn, info, debug or trace\nlevel = \"{}\"\n# Without a file, logs go to stderr only when RUST_LOG is set.\n# file = \"/tmp/javahub.log\"\n",
            path.display(),
            DEFAULT_RUN_DELAY,
            javahub_llm::DEFAULT_BASE_URL,
            javahub_llm::DEFAULT_MODEL,
            DEFAULT_LLM_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(raw.trim()).map_err(|_| {
        anyhow!("unknown log level {raw:?}; use one of off, error, warn, info, debug, trace")
    })
}

fn parse_duration(raw: &str) -> Result<Duration> {
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
        return Ok(Duration::from_secs(mins.saturating_mul(60)));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
