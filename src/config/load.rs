use crate::config::types::ExtractionSettings;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

impl ExtractionSettings {
    /// 讀取設定檔；檔案不存在時使用預設值
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("設定檔不存在，使用預設值: {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}
