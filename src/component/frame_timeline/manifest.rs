use super::burst_expander::BurstConfig;
use super::frame_extractor::FrameRecord;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// 產生此次擷取所使用的參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestParameters {
    pub threshold: f64,
    pub width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_source: Option<String>,
}

/// 擷取結果清單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionManifest {
    pub movie_name: String,
    pub total_frames: usize,
    #[serde(rename = "shot_frames")]
    pub shot_frame_count: usize,
    #[serde(rename = "subtitle_frames")]
    pub subtitle_frame_count: usize,
    pub extraction_type: String,
    pub parameters: ManifestParameters,
    /// 連拍模式才有以下三個欄位
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_shots: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_per_shot: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    pub frames: Vec<FrameRecord>,
}

impl ExtractionManifest {
    /// 依畫面紀錄計算統計數量；`shot+subtitle` 兩邊都計入
    #[must_use]
    pub fn new(
        movie_name: impl Into<String>,
        extraction_type: impl Into<String>,
        parameters: ManifestParameters,
        frames: Vec<FrameRecord>,
    ) -> Self {
        let shot_frame_count = frames.iter().filter(|f| f.kind.contains_shot()).count();
        let subtitle_frame_count = frames.iter().filter(|f| f.kind.contains_subtitle()).count();

        Self {
            movie_name: movie_name.into(),
            total_frames: frames.len(),
            shot_frame_count,
            subtitle_frame_count,
            extraction_type: extraction_type.into(),
            parameters,
            total_shots: None,
            frames_per_shot: None,
            fps: None,
            frames,
        }
    }

    #[must_use]
    pub fn with_burst(mut self, total_shots: usize, config: BurstConfig) -> Self {
        self.total_shots = Some(total_shots);
        self.frames_per_shot = Some(config.frames_per_shot);
        self.fps = Some(config.fps);
        self
    }
}

/// 將 manifest 寫入 `output_dir/manifest.json`，直接覆蓋舊檔
pub fn write_manifest(manifest: &ExtractionManifest, output_dir: &Path) -> Result<PathBuf> {
    let manifest_path = output_dir.join(MANIFEST_FILENAME);
    let content =
        serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;

    fs::write(&manifest_path, content)
        .with_context(|| format!("無法寫入 manifest: {}", manifest_path.display()))?;

    info!("manifest 已儲存: {}", manifest_path.display());

    Ok(manifest_path)
}

/// 讀取端使用：回傳原始 JSON 內容
///
/// 檔案不存在或無法解析時回傳空的 manifest 形狀，不視為錯誤。
#[must_use]
pub fn read_manifest(path: &Path) -> Value {
    let parsed = fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok());

    parsed.unwrap_or_else(|| {
        debug!("manifest 不存在或無法解析: {}", path.display());
        empty_manifest()
    })
}

#[must_use]
pub fn empty_manifest() -> Value {
    json!({
        "frames": [],
        "movie_name": null,
        "total_frames": 0,
    })
}
