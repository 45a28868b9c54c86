use anyhow::Result;
use clap::Parser;
use console::style;
use frame_curator::component::frame_timeline::{
    ExtractionRequest, ExtractionResult, FfmpegFrameGrabber, FrameTimelineBuilder,
    StreamSelection, SubtitleStrategy, TesseractRecognizer,
};
use frame_curator::config::{DEFAULT_CONFIG_FILE, ExtractionSettings, save_settings};
use frame_curator::init;
use frame_curator::tools::SystemRunner;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// 從影片的鏡頭變換與字幕變化擷取畫面，輸出瀏覽用的 manifest
#[derive(Parser, Debug)]
#[command(name = "frame_curator", version, about)]
struct Cli {
    /// 影片檔案路徑
    video: PathBuf,

    /// 影片名稱（預設為檔名）
    #[arg(short, long)]
    name: Option<String>,

    /// 輸出子資料夾名稱（例如 silver-globe）
    #[arg(short, long)]
    output: Option<String>,

    /// 場景變換閾值 0.0-1.0，越低偵測到越多鏡頭
    #[arg(short, long)]
    threshold: Option<f64>,

    /// 縮圖寬度
    #[arg(short, long)]
    width: Option<u32>,

    /// 外部 SRT 字幕檔
    #[arg(long, conflicts_with = "ocr")]
    srt: Option<PathBuf>,

    /// 以 OCR 辨識燒錄在畫面上的字幕
    #[arg(long)]
    ocr: bool,

    /// OCR 取樣間隔（秒）
    #[arg(short, long)]
    sample_interval: Option<f64>,

    /// OCR 裁切畫面底部的百分比
    #[arg(short, long)]
    crop_percent: Option<u32>,

    /// tesseract 語言
    #[arg(long)]
    ocr_lang: Option<String>,

    /// 只擷取鏡頭變換
    #[arg(long, conflicts_with = "subs_only")]
    shots_only: bool,

    /// 只擷取字幕變化
    #[arg(long)]
    subs_only: bool,

    /// 連拍模式：每個鏡頭開頭擷取多張，不處理字幕
    #[arg(long, conflicts_with_all = ["srt", "ocr", "shots_only", "subs_only"])]
    burst: bool,

    /// 連拍模式每個鏡頭的張數
    #[arg(short, long, requires = "burst")]
    frames: Option<u32>,

    /// 連拍 fps
    #[arg(long, requires = "burst")]
    fps: Option<u32>,

    /// 設定檔路徑
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// 將實際使用的設定寫回設定檔
    #[arg(long)]
    save_config: bool,

    /// 輸出除錯日誌
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Result<ExtractionSettings> {
        let mut settings = ExtractionSettings::load(&self.config)?;

        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(width) = self.width {
            settings.thumbnail_width = width;
        }
        if let Some(interval) = self.sample_interval {
            settings.sample_interval = interval;
        }
        if let Some(percent) = self.crop_percent {
            settings.crop_percent = percent;
        }
        if let Some(lang) = &self.ocr_lang {
            settings.ocr_language.clone_from(lang);
        }
        if let Some(frames) = self.frames {
            settings.burst_frames = frames;
        }
        if let Some(fps) = self.fps {
            settings.burst_fps = fps;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn request(&self) -> ExtractionRequest {
        let streams = if self.burst {
            StreamSelection::Burst
        } else if self.shots_only {
            StreamSelection::ShotsOnly
        } else if self.subs_only {
            StreamSelection::SubtitlesOnly
        } else {
            StreamSelection::Both
        };

        let subtitle_strategy = match (&self.srt, self.ocr) {
            (Some(path), _) => SubtitleStrategy::File(path.clone()),
            (None, true) => SubtitleStrategy::Ocr,
            (None, false) => SubtitleStrategy::Embedded,
        };

        ExtractionRequest {
            video_path: self.video.clone(),
            movie_name: self.name.clone(),
            output_name: self.output.clone(),
            streams,
            subtitle_strategy,
        }
    }
}

fn run(cli: &Cli) -> Result<ExtractionResult> {
    let settings = cli.settings()?;
    if cli.save_config {
        save_settings(&settings, &cli.config)?;
        info!("設定已儲存: {}", cli.config.display());
    }

    let request = cli.request();
    println!("{}", style("=== 影片畫面擷取 ===").cyan().bold());
    println!("  影片: {}", request.video_path.display());
    println!("  名稱: {}", request.movie_name());
    println!("  輸出: {}", request.output_dir(&settings).display());

    let runner = SystemRunner;
    let tools = &settings.tools;
    let grabber = FfmpegFrameGrabber::new(&runner, &tools.ffmpeg);
    let recognizer = TesseractRecognizer::new(&runner, &tools.tesseract, &settings.ocr_language);

    FrameTimelineBuilder::new(&settings, &runner, &grabber, &recognizer).run(&request)
}

fn print_summary(result: &ExtractionResult) {
    println!();
    println!("{}", style("=== 擷取摘要 ===").cyan().bold());
    println!("  時間點: {} 個", result.timeline_events);
    println!("  畫面: {} 張", style(result.total_frames).green());
    println!("  - 鏡頭變換: {}", result.shot_frames);
    println!("  - 字幕變化: {}", result.subtitle_frames);
    println!("  manifest: {}", result.manifest_path.display());

    info!(
        "擷取完成 - 畫面: {}, 鏡頭: {}, 字幕: {}, 輸出: {}",
        result.total_frames,
        result.shot_frames,
        result.subtitle_frames,
        result.output_dir.display()
    );
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(if cli.verbose { "debug" } else { "info" });

    match run(&cli) {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("擷取失敗: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
