use super::frame_extractor::{CaptureKind, FrameGrabber};
use super::subtitle_source::{SubtitleEvent, SubtitleSource};
use crate::tools::{CommandRunner, create_progress_bar, probe_media};
use anyhow::{Context, Result, bail};
use image::ImageReader;
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::path::Path;

/// 每取樣多少次輸出一次進度日誌
const PROGRESS_LOG_INTERVAL: usize = 100;

/// 辨識結果不超過此長度時視為沒有字幕
const MIN_TEXT_LENGTH: usize = 2;

/// 文字辨識引擎
pub trait TextRecognizer {
    fn recognize(&self, image: &Path) -> Result<String>;
}

/// 透過 tesseract CLI 辨識文字（輸出到 stdout）
pub struct TesseractRecognizer<'a> {
    runner: &'a dyn CommandRunner,
    tesseract: &'a str,
    language: &'a str,
}

impl<'a> TesseractRecognizer<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, tesseract: &'a str, language: &'a str) -> Self {
        Self {
            runner,
            tesseract,
            language,
        }
    }
}

impl TextRecognizer for TesseractRecognizer<'_> {
    fn recognize(&self, image: &Path) -> Result<String> {
        let args = vec![
            image.to_string_lossy().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.to_string(),
        ];

        let output = self
            .runner
            .run(self.tesseract, &args)
            .with_context(|| format!("無法執行 tesseract: {}", image.display()))?;

        if !output.success {
            bail!("tesseract 辨識失敗: {}", output.stderr.trim());
        }

        Ok(output.stdout)
    }
}

/// OCR 結果整理器
///
/// 合併空白、移除文字與基本標點以外的字元，過短的結果視為沒有字幕。
pub struct OcrTextCleaner {
    whitespace: Regex,
    disallowed: Regex,
}

impl OcrTextCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            disallowed: Regex::new(r#"[^\w\s'".,!?-]"#)?,
        })
    }

    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        let collapsed = self.whitespace.replace_all(raw.trim(), " ");
        let cleaned = self.disallowed.replace_all(&collapsed, "");
        let text = self.whitespace.replace_all(cleaned.trim(), " ").to_string();

        if text.chars().count() > MIN_TEXT_LENGTH {
            text
        } else {
            String::new()
        }
    }
}

/// 裁切畫面底部 `crop_percent`% 的區域另存
pub fn crop_bottom_band(source: &Path, target: &Path, crop_percent: u32) -> Result<()> {
    let image = ImageReader::open(source)
        .and_then(ImageReader::with_guessed_format)
        .with_context(|| format!("無法開啟畫面: {}", source.display()))?
        .decode()
        .with_context(|| format!("無法解碼畫面: {}", source.display()))?;

    let (width, height) = (image.width(), image.height());
    let crop_height = (height * crop_percent.min(100) / 100).max(1).min(height);

    image
        .crop_imm(0, height - crop_height, width, crop_height)
        .save(target)
        .with_context(|| format!("無法儲存裁切畫面: {}", target.display()))?;

    Ok(())
}

/// 邊緣觸發的字幕變化偵測
///
/// 從 0 秒開始每隔 `interval` 取樣直到 `duration`。
/// `sample` 回傳 `None` 表示該次取樣沒有畫面（略過，不影響比較基準），
/// `Some("")` 表示畫面上沒有字幕。
/// 只有文字和「前一次取樣」不同且非空時才記錄事件。
pub fn scan_samples(
    duration: f64,
    interval: f64,
    mut sample: impl FnMut(f64) -> Option<String>,
) -> Vec<SubtitleEvent> {
    let mut changes = Vec::new();
    let mut previous_text = String::new();

    if interval <= 0.0 {
        return changes;
    }

    for index in 0u32.. {
        let timestamp = f64::from(index) * interval;
        if timestamp >= duration {
            break;
        }

        let Some(text) = sample(timestamp) else {
            continue;
        };

        if text != previous_text {
            if !text.is_empty() {
                debug!("[{timestamp:.1}s] 新字幕: {text}");
                changes.push(SubtitleEvent::new(timestamp, text.clone()));
            }
            previous_text = text;
        }
    }

    changes
}

#[derive(Debug, Clone, Copy)]
pub struct OcrConfig {
    /// 取樣間隔（秒）
    pub sample_interval: f64,
    /// 裁切畫面底部的百分比
    pub crop_percent: u32,
}

/// 燒錄字幕的 OCR 取樣來源
pub struct OcrSampler<'a> {
    runner: &'a dyn CommandRunner,
    ffprobe: &'a str,
    grabber: &'a dyn FrameGrabber,
    recognizer: &'a dyn TextRecognizer,
    cleaner: OcrTextCleaner,
    config: OcrConfig,
}

impl<'a> OcrSampler<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        ffprobe: &'a str,
        grabber: &'a dyn FrameGrabber,
        recognizer: &'a dyn TextRecognizer,
        config: OcrConfig,
    ) -> Result<Self> {
        Ok(Self {
            runner,
            ffprobe,
            grabber,
            recognizer,
            cleaner: OcrTextCleaner::new()?,
            config,
        })
    }

    /// 擷取單一取樣畫面並辨識，暫存檔案辨識後立即刪除
    fn sample_at(&self, video: &Path, timestamp: f64, temp_dir: &Path) -> Option<String> {
        let frame_path = temp_dir.join(format!("ocr_frame_{timestamp:.3}.jpg"));
        let crop_path = temp_dir.join(format!("ocr_crop_{timestamp:.3}.png"));

        if let Err(e) = self
            .grabber
            .grab(video, timestamp, &frame_path, CaptureKind::Full)
        {
            debug!("取樣畫面擷取失敗 [{timestamp:.1}s]: {e:#}");
        }
        if !frame_path.exists() {
            return None;
        }

        let text = crop_bottom_band(&frame_path, &crop_path, self.config.crop_percent)
            .and_then(|()| self.recognizer.recognize(&crop_path))
            .map(|raw| self.cleaner.clean(&raw))
            .unwrap_or_else(|e| {
                debug!("OCR 失敗 [{timestamp:.1}s]: {e:#}");
                String::new()
            });

        for path in [&frame_path, &crop_path] {
            if path.exists() && fs::remove_file(path).is_err() {
                warn!("無法刪除暫存畫面: {}", path.display());
            }
        }

        Some(text)
    }
}

impl SubtitleSource for OcrSampler<'_> {
    fn name(&self) -> &'static str {
        "ocr"
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn produce_events(&self, video: &Path) -> Result<Vec<SubtitleEvent>> {
        let interval = self.config.sample_interval;
        info!("掃描燒錄字幕（每 {interval}s 取樣一次）...");

        let media = probe_media(self.runner, self.ffprobe, video)?;
        let duration = media.require_duration()?;
        match (media.width, media.height) {
            (Some(width), Some(height)) => info!("影片長度: {duration:.1}s, 解析度: {width}x{height}"),
            _ => info!("影片長度: {duration:.1}s"),
        }

        let temp_dir = tempfile::Builder::new()
            .prefix("frame_curator_ocr_")
            .tempdir()
            .context("無法建立 OCR 暫存資料夾")?;

        let total_samples = (duration / interval).ceil() as usize;
        let progress_bar = create_progress_bar(total_samples as u64, "OCR 取樣中...");
        let mut sample_count = 0;

        let changes = scan_samples(duration, interval, |timestamp| {
            sample_count += 1;
            progress_bar.inc(1);
            if sample_count % PROGRESS_LOG_INTERVAL == 0 {
                info!("已取樣 {sample_count}/{total_samples} ({timestamp:.0}s / {duration:.0}s)");
            }
            self.sample_at(video, timestamp, temp_dir.path())
        });

        progress_bar.finish_with_message("完成");
        info!("找到 {} 次字幕變化", changes.len());

        Ok(changes)
    }
}
