//! 影片畫面時間軸元件
//!
//! 四階段流程：
//! 1. 鏡頭變換偵測（ffmpeg select + showinfo）
//! 2. 字幕變化偵測（OCR 取樣 / SRT 字幕檔 / 內嵌字幕串流）
//! 3. 合併為去重、依時間排序的時間軸
//! 4. 擷取縮圖與原尺寸畫面，輸出 manifest.json
//!
//! 連拍模式略過字幕，將每個鏡頭起點展開為一組固定間隔的時間點。

mod burst_expander;
mod embedded_subtitles;
mod frame_extractor;
mod main;
mod manifest;
mod ocr_sampler;
mod scene_detector;
mod srt_parser;
mod subtitle_source;
mod timeline_merger;

pub use burst_expander::{BurstConfig, BurstPosition, expand_bursts};
pub use embedded_subtitles::EmbeddedSubtitleExtractor;
pub use frame_extractor::{
    CaptureKind, FULL_DIR, FfmpegFrameGrabber, FrameExtractor, FrameGrabber, FrameRecord,
    THUMBS_DIR, format_timecode, frame_filename,
};
pub use main::{ExtractionRequest, ExtractionResult, FrameTimelineBuilder, StreamSelection};
pub use manifest::{
    ExtractionManifest, MANIFEST_FILENAME, ManifestParameters, empty_manifest, read_manifest,
    write_manifest,
};
pub use ocr_sampler::{
    OcrConfig, OcrSampler, OcrTextCleaner, TesseractRecognizer, TextRecognizer, crop_bottom_band,
    scan_samples,
};
pub use scene_detector::{FIRST_SHOT_TIMESTAMP, SceneDetector, detected_shot_count};
pub use srt_parser::{SrtFileSource, parse_srt_content, parse_srt_file};
pub use subtitle_source::{SubtitleEvent, SubtitleSource, SubtitleStrategy};
pub use timeline_merger::{EventKind, TimestampEvent, TimestampKey, merge_timeline};
