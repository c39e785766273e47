#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;
pub mod writer_config;

pub use writer_config::WriterConfig;

use crate::domain::ports::WriterType;
use crate::utils::validation::is_empty_or_whitespace;
use std::collections::BTreeMap;

pub const CONTAINER_TAG: &str = "nf.container";
pub const PROCESS_TAG: &str = "nf.process";
pub const CONTAINER_ENV: &str = "TITUS_CONTAINER_NAME";
pub const PROCESS_ENV: &str = "TITUS_PROCESS_NAME";

/// Registry 設定：寫入器設定加上附加在每個量測器上的共通標籤
#[derive(Debug, Clone)]
pub struct Config {
    extra_tags: BTreeMap<String, String>,
    writer_config: WriterConfig,
}

impl Config {
    pub fn new(writer_config: WriterConfig, extra_tags: &[(&str, &str)]) -> Self {
        Self::with_env_lookup(writer_config, extra_tags, |name| std::env::var(name).ok())
    }

    pub(crate) fn with_env_lookup<F>(
        writer_config: WriterConfig,
        extra_tags: &[(&str, &str)],
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let extra_tags = calculate_tags(extra_tags, lookup);

        tracing::info!(
            "Config initialized with writer type: {}, buffer size: {}, location: {}",
            writer_config.writer_type(),
            writer_config.buffer_size(),
            writer_config.location()
        );
        if extra_tags.is_empty() {
            tracing::info!("Config initialized with no extra tags provided.");
        } else {
            for (key, value) in &extra_tags {
                tracing::info!("Config extra tag {}: {}", key, value);
            }
        }

        Self {
            extra_tags,
            writer_config,
        }
    }

    pub fn extra_tags(&self) -> &BTreeMap<String, String> {
        &self.extra_tags
    }

    pub fn writer_config(&self) -> &WriterConfig {
        &self.writer_config
    }

    pub fn writer_type(&self) -> WriterType {
        self.writer_config.writer_type()
    }

    pub fn writer_location(&self) -> &str {
        self.writer_config.location()
    }

    pub fn writer_buffer_size(&self) -> usize {
        self.writer_config.buffer_size()
    }
}

fn calculate_tags<F>(tags: &[(&str, &str)], lookup: F) -> BTreeMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut valid_tags = BTreeMap::new();

    for (env_name, tag) in [(CONTAINER_ENV, CONTAINER_TAG), (PROCESS_ENV, PROCESS_TAG)] {
        if let Some(value) = lookup(env_name).filter(|v| !is_empty_or_whitespace(v)) {
            valid_tags.insert(tag.to_string(), value);
        }
    }

    // 明確指定的標籤優先於環境變數
    for (key, value) in tags {
        if !is_empty_or_whitespace(key) && !is_empty_or_whitespace(value) {
            valid_tags.insert(key.to_string(), value.to_string());
        }
    }

    valid_tags
}
