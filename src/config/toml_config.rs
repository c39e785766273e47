use crate::config::writer_config::{WriterConfig, UDP};
use crate::config::Config;
use crate::utils::error::{Result, SpectatorError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// 單一 datagram 可承載的最大 payload
pub const MAX_BUFFER_SIZE: usize = 65_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpectatorConfig {
    #[serde(default)]
    pub writer: WriterSection,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterSection {
    #[serde(default = "default_location")]
    pub location: String,
    pub buffer_size: Option<usize>,
    pub flush_interval_ms: Option<u64>,
}

fn default_location() -> String {
    UDP.to_string()
}

impl Default for WriterSection {
    fn default() -> Self {
        Self {
            location: default_location(),
            buffer_size: None,
            flush_interval_ms: None,
        }
    }
}

impl SpectatorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| SpectatorError::TomlError {
            message: e.to_string(),
        })
    }

    /// 替換環境變數 (例如 ${APP_NAME})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn buffer_size(&self) -> usize {
        self.writer.buffer_size.unwrap_or(0)
    }

    pub fn flush_interval(&self) -> Option<Duration> {
        self.writer.flush_interval_ms.map(Duration::from_millis)
    }

    /// Builds the runtime `Config`. The output location environment variable
    /// still takes precedence over the file.
    pub fn into_config(self) -> Result<Config> {
        self.validate()?;

        let mut writer_config = WriterConfig::with_buffer_size(&self.writer.location, self.buffer_size())?;
        if let Some(interval) = self.flush_interval() {
            writer_config = writer_config.with_flush_interval(interval);
        }

        let tags: Vec<(&str, &str)> = self
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        Ok(Config::new(writer_config, &tags))
    }
}

impl Validate for SpectatorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_location("writer.location", &self.writer.location)?;

        if let Some(size) = self.writer.buffer_size {
            validation::validate_range("writer.buffer_size", size, 0, MAX_BUFFER_SIZE)?;
        }

        if let Some(interval) = self.writer.flush_interval_ms {
            validation::validate_range("writer.flush_interval_ms", interval, 1, 3_600_000)?;
        }

        for (key, value) in &self.tags {
            validation::validate_non_empty_string("tags", key)?;
            validation::validate_non_empty_string(&format!("tags.{}", key), value)?;
        }

        Ok(())
    }
}
