use super::subtitle_source::{SubtitleEvent, SubtitleSource};
use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 解析 SRT 字幕內容
///
/// 區塊以空行分隔：序號行、時間行 `HH:MM:SS,mmm --> ...`、一行以上文字。
/// 相同文字在整份檔案中只保留第一次出現的時間點，
/// 格式錯誤的區塊（少於 3 行或時間行無法解析）直接略過。
pub fn parse_srt_content(content: &str) -> Result<Vec<SubtitleEvent>> {
    let block_separator = Regex::new(r"\n\n+")?;
    let time_regex = Regex::new(r"^(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->")?;
    let tag_regex = Regex::new(r"<[^>]+>")?;

    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

    let mut subtitles = Vec::new();
    let mut seen_texts = HashSet::new();

    for block in block_separator.split(content.trim()) {
        let lines: Vec<&str> = block.trim().split('\n').collect();
        if lines.len() < 3 {
            continue;
        }

        let Some(start_time) = time_regex.captures(lines[1]).and_then(|caps| {
            let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            Some(
                f64::from(field(1)?) * 3600.0
                    + f64::from(field(2)?) * 60.0
                    + f64::from(field(3)?)
                    + f64::from(field(4)?) / 1000.0,
            )
        }) else {
            debug!("略過無法解析的字幕區塊: {}", lines[1]);
            continue;
        };

        let joined = lines[2..].join(" ");
        let text = tag_regex.replace_all(joined.trim(), "").trim().to_string();

        if !text.is_empty() && seen_texts.insert(text.clone()) {
            subtitles.push(SubtitleEvent::new(start_time, text));
        }
    }

    Ok(subtitles)
}

pub fn parse_srt_file(path: &Path) -> Result<Vec<SubtitleEvent>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("無法讀取字幕檔: {}", path.display()))?;
    parse_srt_content(&content)
}

/// 外部字幕檔來源
pub struct SrtFileSource {
    path: PathBuf,
}

impl SrtFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SubtitleSource for SrtFileSource {
    fn name(&self) -> &'static str {
        "srt_file"
    }

    fn produce_events(&self, _video: &Path) -> Result<Vec<SubtitleEvent>> {
        info!("解析字幕檔: {}", self.path.display());
        let subtitles = parse_srt_file(&self.path)?;
        info!("找到 {} 句不重複字幕", subtitles.len());
        Ok(subtitles)
    }
}
