use super::burst_expander::{BurstConfig, expand_bursts};
use super::embedded_subtitles::EmbeddedSubtitleExtractor;
use super::frame_extractor::{FrameExtractor, FrameGrabber};
use super::manifest::{ExtractionManifest, ManifestParameters, write_manifest};
use super::ocr_sampler::{OcrConfig, OcrSampler, TextRecognizer};
use super::scene_detector::{SceneDetector, detected_shot_count};
use super::srt_parser::SrtFileSource;
use super::subtitle_source::{SubtitleSource, SubtitleStrategy};
use super::timeline_merger::merge_timeline;
use crate::config::ExtractionSettings;
use crate::tools::{CommandRunner, recreate_directory, validate_file_exists};
use anyhow::{Context, Result, bail};
use console::style;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// 要擷取的事件串流
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamSelection {
    #[default]
    Both,
    ShotsOnly,
    SubtitlesOnly,
    /// 每個鏡頭開頭連拍數張，不處理字幕
    Burst,
}

impl StreamSelection {
    #[must_use]
    pub const fn shots_enabled(self) -> bool {
        !matches!(self, Self::SubtitlesOnly)
    }

    #[must_use]
    pub const fn subtitles_enabled(self) -> bool {
        matches!(self, Self::Both | Self::SubtitlesOnly)
    }
}

/// 單次擷取的輸入
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub video_path: PathBuf,
    /// 未指定時使用影片檔名
    pub movie_name: Option<String>,
    /// 輸出子資料夾名稱；未指定時直接輸出到根目錄
    pub output_name: Option<String>,
    pub streams: StreamSelection,
    pub subtitle_strategy: SubtitleStrategy,
}

impl ExtractionRequest {
    #[must_use]
    pub fn movie_name(&self) -> String {
        self.movie_name.clone().unwrap_or_else(|| {
            self.video_path
                .file_stem()
                .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string())
        })
    }

    #[must_use]
    pub fn output_dir(&self, settings: &ExtractionSettings) -> PathBuf {
        self.output_name
            .as_ref()
            .map_or_else(|| settings.frames_root.clone(), |name| settings.frames_root.join(name))
    }

    /// 是否輸出到專屬的子資料夾；直接寫入根目錄時不可整個清除
    #[must_use]
    pub const fn has_own_output_dir(&self) -> bool {
        self.output_name.is_some()
    }

    #[must_use]
    pub fn url_base(&self, settings: &ExtractionSettings) -> String {
        let prefix = settings.url_prefix.trim_end_matches('/');
        self.output_name
            .as_ref()
            .map_or_else(|| prefix.to_string(), |name| format!("{prefix}/{name}"))
    }

    /// manifest 中的 `extraction_type`
    #[must_use]
    pub const fn extraction_type(&self) -> &'static str {
        match (self.streams, self.subtitle_strategy.is_ocr()) {
            (StreamSelection::ShotsOnly, _) => "shot_detection",
            (StreamSelection::Burst, _) => "burst",
            (StreamSelection::Both, true) => "shots_and_ocr_subtitles",
            (StreamSelection::Both, false) => "shots_and_subtitles",
            (StreamSelection::SubtitlesOnly, true) => "ocr_subtitles",
            (StreamSelection::SubtitlesOnly, false) => "subtitles",
        }
    }
}

/// 擷取結果摘要
#[derive(Debug)]
pub struct ExtractionResult {
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    pub timeline_events: usize,
    pub total_frames: usize,
    pub shot_frames: usize,
    pub subtitle_frames: usize,
}

/// 影片畫面時間軸建構器
///
/// 四階段流程，全部同步依序執行：
/// 1. 鏡頭變換偵測
/// 2. 字幕變化偵測（OCR / 字幕檔 / 內嵌字幕）
/// 3. 合併為單一時間軸（連拍模式改為展開每個鏡頭）
/// 4. 擷取縮圖與原尺寸畫面並寫出 manifest
///
/// 指定子資料夾時整個重建；直接輸出到根目錄時只重建 `thumbs/` 與 `full/`，
/// 根目錄下其他影片的輸出不受影響。
pub struct FrameTimelineBuilder<'a> {
    settings: &'a ExtractionSettings,
    runner: &'a dyn CommandRunner,
    grabber: &'a dyn FrameGrabber,
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> FrameTimelineBuilder<'a> {
    #[must_use]
    pub const fn new(
        settings: &'a ExtractionSettings,
        runner: &'a dyn CommandRunner,
        grabber: &'a dyn FrameGrabber,
        recognizer: &'a dyn TextRecognizer,
    ) -> Self {
        Self {
            settings,
            runner,
            grabber,
            recognizer,
        }
    }

    pub fn run(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        let video = request.video_path.as_path();
        validate_file_exists(video).context("找不到影片檔案")?;

        let subtitle_source = if request.streams.subtitles_enabled() {
            Some(self.subtitle_source(&request.subtitle_strategy)?)
        } else {
            None
        };

        let burst = if request.streams == StreamSelection::Burst {
            Some(self.burst_config()?)
        } else {
            None
        };

        let movie_name = request.movie_name();
        let output_dir = request.output_dir(self.settings);
        info!("處理影片: {} ({movie_name})", video.display());
        info!("輸出資料夾: {}", output_dir.display());

        // 1. 鏡頭變換偵測
        let shots = if request.streams.shots_enabled() {
            println!("{} 偵測鏡頭變換...", style("[1/4]").dim());
            self.detect_shots(video)?
        } else {
            Vec::new()
        };

        // 2. 字幕變化偵測
        let subtitles = match &subtitle_source {
            Some(source) => {
                println!("{} 偵測字幕變化 ({})...", style("[2/4]").dim(), source.name());
                let subtitles = source
                    .produce_events(video)
                    .with_context(|| format!("字幕偵測失敗 ({})", source.name()))?;
                println!("  找到 {} 句字幕", subtitles.len());
                subtitles
            }
            None => Vec::new(),
        };

        // 3. 合併時間軸
        let timeline = if let Some(config) = burst {
            println!("{} 展開連拍時間點...", style("[3/4]").dim());
            expand_bursts(&shots, config)
        } else {
            println!("{} 合併時間軸...", style("[3/4]").dim());
            merge_timeline(&shots, &subtitles)
        };
        println!("  共 {} 個時間點", timeline.len());
        if timeline.is_empty() {
            warn!("時間軸為空，將輸出沒有畫面的 manifest");
        }

        // 4. 擷取畫面並寫出 manifest
        println!("{} 擷取畫面...", style("[4/4]").dim());
        if request.has_own_output_dir() {
            recreate_directory(&output_dir)?;
        }
        let extractor = FrameExtractor::new(self.grabber, self.settings.thumbnail_width);
        let frames = extractor.extract_frames(
            video,
            &timeline,
            &output_dir,
            &request.url_base(self.settings),
        )?;

        let mut manifest = ExtractionManifest::new(
            movie_name,
            request.extraction_type(),
            self.manifest_parameters(request, subtitle_source.as_deref()),
            frames,
        );
        if let Some(config) = burst {
            manifest = manifest.with_burst(shots.len(), config);
        }
        let manifest_path = write_manifest(&manifest, &output_dir)?;

        Ok(ExtractionResult {
            manifest_path,
            output_dir,
            timeline_events: timeline.len(),
            total_frames: manifest.total_frames,
            shot_frames: manifest.shot_frame_count,
            subtitle_frames: manifest.subtitle_frame_count,
        })
    }

    fn detect_shots(&self, video: &Path) -> Result<Vec<f64>> {
        let threshold = self.settings.threshold;
        let detector = SceneDetector::new(self.runner, &self.settings.tools.ffmpeg, threshold);
        let shots = detector.detect_shots(video)?;

        if detected_shot_count(&shots) == 0 {
            bail!("未偵測到任何鏡頭變換，請嘗試降低閾值（目前: {threshold}）");
        }

        println!("  找到 {} 個鏡頭", shots.len());
        Ok(shots)
    }

    fn burst_config(&self) -> Result<BurstConfig> {
        BurstConfig::new(self.settings.burst_frames, self.settings.burst_fps)
    }

    fn subtitle_source(&self, strategy: &SubtitleStrategy) -> Result<Box<dyn SubtitleSource + 'a>> {
        let tools = &self.settings.tools;
        let source: Box<dyn SubtitleSource + 'a> = match strategy {
            SubtitleStrategy::File(path) => {
                validate_file_exists(path).context("找不到字幕檔")?;
                Box::new(SrtFileSource::new(path))
            }
            SubtitleStrategy::Embedded => Box::new(EmbeddedSubtitleExtractor::new(
                self.runner,
                &tools.ffmpeg,
                &tools.ffprobe,
            )),
            SubtitleStrategy::Ocr => Box::new(OcrSampler::new(
                self.runner,
                &tools.ffprobe,
                self.grabber,
                self.recognizer,
                OcrConfig {
                    sample_interval: self.settings.sample_interval,
                    crop_percent: self.settings.crop_percent,
                },
            )?),
        };
        Ok(source)
    }

    fn manifest_parameters(
        &self,
        request: &ExtractionRequest,
        subtitle_source: Option<&dyn SubtitleSource>,
    ) -> ManifestParameters {
        let uses_ocr = subtitle_source.is_some() && request.subtitle_strategy.is_ocr();
        ManifestParameters {
            threshold: self.settings.threshold,
            width: self.settings.thumbnail_width,
            sample_interval: uses_ocr.then_some(self.settings.sample_interval),
            crop_percent: uses_ocr.then_some(self.settings.crop_percent),
            subtitle_source: subtitle_source.map(|source| source.name().to_string()),
        }
    }
}
