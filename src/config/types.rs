use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 預設設定檔名稱（位於工作目錄）
pub const DEFAULT_CONFIG_FILE: &str = "frame_curator.json";

pub const DEFAULT_THRESHOLD: f64 = 0.4;
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 240;
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 0.5;
pub const DEFAULT_CROP_PERCENT: u32 = 25;
pub const DEFAULT_BURST_FRAMES: u32 = 6;
pub const DEFAULT_BURST_FPS: u32 = 12;

/// 外部工具執行檔名稱或路徑
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub tesseract: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            tesseract: "tesseract".to_string(),
        }
    }
}

/// 擷取流程設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// 場景變換閾值 (0-1)，越低越敏感
    pub threshold: f64,
    /// 縮圖寬度 (px)
    pub thumbnail_width: u32,
    /// OCR 取樣間隔（秒）
    pub sample_interval: f64,
    /// OCR 裁切畫面底部的百分比
    pub crop_percent: u32,
    pub ocr_language: String,
    /// 連拍模式每個鏡頭擷取的張數
    pub burst_frames: u32,
    pub burst_fps: u32,
    /// 所有影片輸出的根目錄
    pub frames_root: PathBuf,
    /// manifest 內圖片路徑的 URL 前綴
    pub url_prefix: String,
    pub tools: ToolPaths,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            crop_percent: DEFAULT_CROP_PERCENT,
            ocr_language: "eng".to_string(),
            burst_frames: DEFAULT_BURST_FRAMES,
            burst_fps: DEFAULT_BURST_FPS,
            frames_root: PathBuf::from("static/frames"),
            url_prefix: "/static/frames".to_string(),
            tools: ToolPaths::default(),
        }
    }
}

impl ExtractionSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("場景閾值必須介於 0 與 1 之間: {}", self.threshold);
        }
        if self.thumbnail_width == 0 {
            bail!("縮圖寬度必須大於 0");
        }
        if self.sample_interval.is_nan() || self.sample_interval <= 0.0 {
            bail!("OCR 取樣間隔必須大於 0: {}", self.sample_interval);
        }
        if !(1..=100).contains(&self.crop_percent) {
            bail!("裁切百分比必須介於 1 與 100 之間: {}", self.crop_percent);
        }
        if self.burst_frames == 0 || self.burst_fps == 0 {
            bail!("連拍張數與 fps 必須大於 0");
        }
        Ok(())
    }
}
