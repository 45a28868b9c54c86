use super::srt_parser::parse_srt_file;
use super::subtitle_source::{SubtitleEvent, SubtitleSource};
use crate::tools::{CommandRunner, probe_media};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

/// 內嵌字幕串流來源
///
/// 影片沒有字幕串流時回傳空列表；有的話將第一條字幕串流
/// 轉成暫存 SRT 檔，交給字幕檔解析後刪除暫存檔。
pub struct EmbeddedSubtitleExtractor<'a> {
    runner: &'a dyn CommandRunner,
    ffmpeg: &'a str,
    ffprobe: &'a str,
}

impl<'a> EmbeddedSubtitleExtractor<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, ffmpeg: &'a str, ffprobe: &'a str) -> Self {
        Self {
            runner,
            ffmpeg,
            ffprobe,
        }
    }

    fn demux_first_stream(&self, video: &Path) -> Result<Vec<SubtitleEvent>> {
        let temp_srt = tempfile::Builder::new()
            .prefix("frame_curator_subs_")
            .suffix(".srt")
            .tempfile()
            .context("無法建立暫存字幕檔")?;

        let args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:s:0".to_string(),
            "-f".to_string(),
            "srt".to_string(),
            "-y".to_string(),
            temp_srt.path().to_string_lossy().to_string(),
        ];

        let output = self
            .runner
            .run(self.ffmpeg, &args)
            .with_context(|| format!("無法執行 ffmpeg 抽取字幕: {}", video.display()))?;

        if !output.success {
            warn!("ffmpeg 抽取字幕回傳失敗狀態: {}", output.stderr.trim());
        }

        let subtitles = if temp_srt.path().exists() {
            parse_srt_file(temp_srt.path())?
        } else {
            Vec::new()
        };

        if let Err(e) = temp_srt.close() {
            warn!("無法刪除暫存字幕檔: {e}");
        }

        Ok(subtitles)
    }
}

impl SubtitleSource for EmbeddedSubtitleExtractor<'_> {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn produce_events(&self, video: &Path) -> Result<Vec<SubtitleEvent>> {
        info!("檢查內嵌字幕串流...");

        let media = match probe_media(self.runner, self.ffprobe, video) {
            Ok(media) => media,
            Err(e) => {
                warn!("無法取得串流資訊，視為沒有內嵌字幕: {e:#}");
                return Ok(Vec::new());
            }
        };

        if !media.has_subtitle_stream() {
            info!("沒有內嵌字幕");
            return Ok(Vec::new());
        }

        let stream = &media.subtitle_streams[0];

        info!(
            "找到 {} 條字幕串流，使用 #{} ({})",
            media.subtitle_streams.len(),
            stream.index,
            stream.codec_name.as_deref().unwrap_or("unknown")
        );

        match self.demux_first_stream(video) {
            Ok(subtitles) => {
                info!("找到 {} 句不重複字幕", subtitles.len());
                Ok(subtitles)
            }
            Err(e) => {
                warn!("內嵌字幕抽取失敗: {e:#}");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CommandOutput;
    use std::cell::RefCell;
    use std::fs;

    /// 模擬 ffprobe 與 ffmpeg：ffmpeg 呼叫時將字幕寫入最後一個參數的路徑
    struct FakeMediaTools {
        probe_json: String,
        srt_content: String,
        demuxed_paths: RefCell<Vec<String>>,
    }

    impl CommandRunner for FakeMediaTools {
        fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
            if program == "ffprobe" {
                return Ok(CommandOutput::ok(self.probe_json.clone(), ""));
            }
            let target = args.last().cloned().unwrap_or_default();
            fs::write(&target, &self.srt_content)?;
            self.demuxed_paths.borrow_mut().push(target);
            Ok(CommandOutput::ok("", ""))
        }
    }

    fn fake_tools(probe_json: &str) -> FakeMediaTools {
        FakeMediaTools {
            probe_json: probe_json.to_string(),
            srt_content: "1\n00:00:02,000 --> 00:00:03,000\nEmbedded line\n\n\
                          2\n00:00:04,000 --> 00:00:05,000\nEmbedded line\n"
                .to_string(),
            demuxed_paths: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_no_subtitle_stream_returns_empty() {
        let tools = fake_tools(r#"{"streams": [{"codec_type": "video"}], "format": {}}"#);
        let extractor = EmbeddedSubtitleExtractor::new(&tools, "ffmpeg", "ffprobe");

        let events = extractor.produce_events(Path::new("/movie.mp4")).unwrap();

        assert!(events.is_empty());
        assert!(tools.demuxed_paths.borrow().is_empty());
    }

    #[test]
    fn test_demuxes_first_stream_and_removes_temp_file() {
        let tools = fake_tools(
            r#"{"streams": [{"index": 3, "codec_type": "subtitle", "codec_name": "subrip"}]}"#,
        );
        let extractor = EmbeddedSubtitleExtractor::new(&tools, "ffmpeg", "ffprobe");

        let events = extractor.produce_events(Path::new("/movie.mkv")).unwrap();

        assert_eq!(events, vec![SubtitleEvent::new(2.0, "Embedded line")]);
        let paths = tools.demuxed_paths.borrow();
        assert_eq!(paths.len(), 1);
        assert!(!Path::new(&paths[0]).exists());
    }

    #[test]
    fn test_probe_failure_returns_empty() {
        let tools = fake_tools("garbage");
        let extractor = EmbeddedSubtitleExtractor::new(&tools, "ffmpeg", "ffprobe");
        let events = extractor.produce_events(Path::new("/movie.mkv")).unwrap();
        assert!(events.is_empty());
    }
}
