use super::timeline_merger::{EventKind, TimestampEvent};
use crate::tools::{CommandRunner, create_progress_bar, ensure_directory_exists, recreate_directory};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const THUMBS_DIR: &str = "thumbs";
pub const FULL_DIR: &str = "full";

/// 每處理多少個時間點輸出一次進度日誌
const PROGRESS_LOG_INTERVAL: usize = 50;

/// 擷取畫面的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// 縮放到指定寬度，高度依比例
    Thumbnail { width: u32 },
    /// 原始解析度
    Full,
}

/// 在指定時間點擷取單一畫面
///
/// 每次呼叫彼此獨立，不依賴時間軸或合併邏輯。
pub trait FrameGrabber {
    fn grab(
        &self,
        video: &Path,
        timestamp: f64,
        target: &Path,
        capture: CaptureKind,
    ) -> Result<()>;
}

/// 使用 ffmpeg `-ss` 跳轉並輸出一張 JPEG
pub struct FfmpegFrameGrabber<'a> {
    runner: &'a dyn CommandRunner,
    ffmpeg: &'a str,
}

impl<'a> FfmpegFrameGrabber<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, ffmpeg: &'a str) -> Self {
        Self { runner, ffmpeg }
    }

    fn build_args(video: &Path, timestamp: f64, target: &Path, capture: CaptureKind) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            timestamp.to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
        ];

        let quality = match capture {
            CaptureKind::Thumbnail { width } => {
                args.push("-vf".to_string());
                args.push(format!("scale={width}:-1"));
                "4"
            }
            CaptureKind::Full => "2",
        };

        args.extend([
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            quality.to_string(),
            "-y".to_string(),
            target.to_string_lossy().to_string(),
        ]);

        args
    }
}

impl FrameGrabber for FfmpegFrameGrabber<'_> {
    fn grab(
        &self,
        video: &Path,
        timestamp: f64,
        target: &Path,
        capture: CaptureKind,
    ) -> Result<()> {
        let args = Self::build_args(video, timestamp, target, capture);

        let output = self
            .runner
            .run(self.ffmpeg, &args)
            .with_context(|| format!("無法執行 ffmpeg 擷取畫面: {}", video.display()))?;

        if !output.success {
            bail!("ffmpeg 擷取畫面失敗 ({timestamp}s): {}", output.stderr.trim());
        }

        Ok(())
    }
}

/// 單張擷取畫面的紀錄，對應 manifest 中的一筆 frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(rename = "number")]
    pub sequence_number: usize,
    #[serde(rename = "thumbnail")]
    pub thumbnail_path: String,
    #[serde(rename = "full")]
    pub full_path: String,
    pub timecode: String,
    #[serde(rename = "timestamp")]
    pub source_timestamp: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "subtitle", default, skip_serializing_if = "Option::is_none")]
    pub subtitle_text: Option<String>,
    /// 連拍模式：所屬鏡頭序號
    #[serde(rename = "shot", default, skip_serializing_if = "Option::is_none")]
    pub shot_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_frame: Option<usize>,
}

/// 將秒數轉為 `HH:MM:SS.mmm`，毫秒部分直接截斷
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_timecode(timestamp: f64) -> String {
    let timestamp = timestamp.max(0.0);
    let hours = (timestamp / 3600.0).floor() as u64;
    let minutes = ((timestamp % 3600.0) / 60.0).floor() as u64;
    let seconds = (timestamp % 60.0).floor() as u64;
    let millis = ((timestamp % 1.0) * 1000.0) as u64;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[must_use]
pub fn frame_filename(sequence_number: usize) -> String {
    format!("frame_{sequence_number:05}.jpg")
}

/// 依時間軸逐一擷取縮圖與原尺寸畫面
///
/// 開始時清除重建 `thumbs/` 與 `full/`，輸出資料夾中的其他內容不動；
/// 不支援續跑。是否成功只看縮圖檔案是否存在；失敗的時間點不佔用序號，
/// 因此序號永遠從 1 開始連續遞增。
pub struct FrameExtractor<'a> {
    grabber: &'a dyn FrameGrabber,
    thumbnail_width: u32,
}

impl<'a> FrameExtractor<'a> {
    #[must_use]
    pub const fn new(grabber: &'a dyn FrameGrabber, thumbnail_width: u32) -> Self {
        Self {
            grabber,
            thumbnail_width,
        }
    }

    /// 擷取所有時間點
    ///
    /// `url_base` 為 manifest 中圖片路徑的前綴，例如 `/static/frames/silver-globe`
    pub fn extract_frames(
        &self,
        video: &Path,
        timeline: &[TimestampEvent],
        output_dir: &Path,
        url_base: &str,
    ) -> Result<Vec<FrameRecord>> {
        ensure_directory_exists(output_dir)?;
        let thumbs_dir = output_dir.join(THUMBS_DIR);
        let full_dir = output_dir.join(FULL_DIR);
        recreate_directory(&thumbs_dir)?;
        recreate_directory(&full_dir)?;

        let total = timeline.len();
        info!("開始擷取 {total} 個時間點的畫面");

        let progress_bar = create_progress_bar(total as u64, "擷取畫面中...");
        let mut records: Vec<FrameRecord> = Vec::with_capacity(total);

        for (index, event) in timeline.iter().enumerate() {
            let sequence_number = records.len() + 1;
            let filename = frame_filename(sequence_number);
            let thumb_path = thumbs_dir.join(&filename);
            let full_path = full_dir.join(&filename);
            let timestamp = event.time();

            let thumbnail = CaptureKind::Thumbnail {
                width: self.thumbnail_width,
            };
            if let Err(e) = self.grabber.grab(video, timestamp, &thumb_path, thumbnail) {
                debug!("縮圖擷取失敗 [{timestamp}s]: {e:#}");
            }
            // 原尺寸畫面的結果不另外檢查
            if let Err(e) = self.grabber.grab(video, timestamp, &full_path, CaptureKind::Full) {
                debug!("原尺寸畫面擷取失敗 [{timestamp}s]: {e:#}");
            }

            if thumb_path.exists() {
                records.push(FrameRecord {
                    sequence_number,
                    thumbnail_path: format!("{url_base}/{THUMBS_DIR}/{filename}"),
                    full_path: format!("{url_base}/{FULL_DIR}/{filename}"),
                    timecode: format_timecode(timestamp),
                    source_timestamp: timestamp,
                    kind: event.kind(),
                    subtitle_text: event.subtitle_text().map(str::to_string),
                    shot_number: event.burst_position().map(|p| p.shot),
                    burst_frame: event.burst_position().map(|p| p.frame),
                });
            } else {
                warn!("略過時間點 {timestamp}s：縮圖未建立");
                if full_path.exists() && fs::remove_file(&full_path).is_err() {
                    warn!("無法刪除未配對的畫面: {}", full_path.display());
                }
            }

            progress_bar.inc(1);
            let processed = index + 1;
            if processed % PROGRESS_LOG_INTERVAL == 0 || processed == total {
                info!("已處理 {processed}/{total} 個時間點");
            }
        }

        progress_bar.finish_with_message("完成");

        info!(
            "畫面擷取完成: 成功 {}, 失敗 {}",
            records.len(),
            total - records.len()
        );

        Ok(records)
    }
}
