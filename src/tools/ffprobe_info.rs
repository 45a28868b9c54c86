use super::command_runner::CommandRunner;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

/// 內嵌字幕串流資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStreamInfo {
    pub index: u32,
    pub codec_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub subtitle_streams: Vec<SubtitleStreamInfo>,
}

impl MediaInfo {
    #[must_use]
    pub fn has_subtitle_stream(&self) -> bool {
        !self.subtitle_streams.is_empty()
    }

    /// 取得影片長度，缺少時回傳錯誤
    pub fn require_duration(&self) -> Result<f64> {
        match self.duration_seconds {
            Some(duration) if duration > 0.0 => Ok(duration),
            _ => bail!("無法取得影片長度"),
        }
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    index: Option<u32>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片長度與串流資訊
pub fn probe_media(runner: &dyn CommandRunner, ffprobe: &str, path: &Path) -> Result<MediaInfo> {
    let args = vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let output = runner
        .run(ffprobe, &args)
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.success {
        bail!("ffprobe 執行失敗: {}", output.stderr.trim());
    }

    parse_ffprobe_output(&output.stdout)
}

fn parse_ffprobe_output(stdout: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput =
        serde_json::from_str(stdout).with_context(|| "無法解析 ffprobe 輸出")?;
    let streams = probe.streams.unwrap_or_default();

    let video_stream = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    // 影片長度優先從 format 取得，其次從視訊串流
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or_else(|| video_stream.and_then(|s| s.duration.as_ref()))
        .and_then(|d| d.parse::<f64>().ok());

    let subtitle_streams = streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("subtitle"))
        .map(|s| SubtitleStreamInfo {
            index: s.index.unwrap_or_default(),
            codec_name: s.codec_name.clone(),
        })
        .collect();

    Ok(MediaInfo {
        duration_seconds,
        width: video_stream.and_then(|s| s.width),
        height: video_stream.and_then(|s| s.height),
        subtitle_streams,
    })
}
