use anyhow::Result;
use std::path::{Path, PathBuf};

/// 字幕內容變化事件：字幕開始顯示的時間點與文字
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEvent {
    pub time: f64,
    pub text: String,
}

impl SubtitleEvent {
    #[must_use]
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// 字幕來源
///
/// 每個實作輸出依時間排序的字幕變化事件，每次內容變化一筆，
/// 讓時間軸合併不需要知道字幕是怎麼取得的。
pub trait SubtitleSource {
    /// 用於日誌與 manifest 的來源名稱
    fn name(&self) -> &'static str;

    fn produce_events(&self, video: &Path) -> Result<Vec<SubtitleEvent>>;
}

/// 字幕取得策略（互斥）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleStrategy {
    /// 取樣畫面底部並以 OCR 辨識燒錄字幕
    Ocr,
    /// 解析外部字幕檔
    File(PathBuf),
    /// 從影片容器內的第一條字幕串流抽取
    Embedded,
}

impl SubtitleStrategy {
    #[must_use]
    pub const fn is_ocr(&self) -> bool {
        matches!(self, Self::Ocr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_event_new() {
        let event = SubtitleEvent::new(1.5, "Hello");
        assert!((event.time - 1.5).abs() < f64::EPSILON);
        assert_eq!(event.text, "Hello");
    }

    #[test]
    fn test_strategy_is_ocr() {
        assert!(SubtitleStrategy::Ocr.is_ocr());
        assert!(!SubtitleStrategy::Embedded.is_ocr());
        assert!(!SubtitleStrategy::File(PathBuf::from("a.srt")).is_ocr());
    }
}
