use super::burst_expander::BurstPosition;
use super::subtitle_source::SubtitleEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// 時間軸事件類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "shot")]
    Shot,
    #[serde(rename = "subtitle")]
    Subtitle,
    #[serde(rename = "shot+subtitle")]
    ShotAndSubtitle,
}

impl EventKind {
    #[must_use]
    pub const fn contains_shot(self) -> bool {
        matches!(self, Self::Shot | Self::ShotAndSubtitle)
    }

    #[must_use]
    pub const fn contains_subtitle(self) -> bool {
        matches!(self, Self::Subtitle | Self::ShotAndSubtitle)
    }
}

/// 合併用的時間鍵：四捨五入到毫秒的整數
///
/// 只消除浮點表示誤差，不提供容許範圍；
/// 不同偵測器在相近但不同毫秒上的事件仍是兩筆。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampKey(i64);

impl TimestampKey {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * 1000.0).round() as i64)
    }
}

/// 合併後的時間軸事件
///
/// 欄位只能透過建構函式設定，字幕文字存在若且唯若類型含字幕。
/// 連拍模式的事件另外帶有所屬鏡頭與連拍序號。
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampEvent {
    time: f64,
    kind: EventKind,
    subtitle_text: Option<String>,
    burst: Option<BurstPosition>,
}

impl TimestampEvent {
    #[must_use]
    pub const fn shot(time: f64) -> Self {
        Self {
            time,
            kind: EventKind::Shot,
            subtitle_text: None,
            burst: None,
        }
    }

    /// 連拍畫面，類型固定為 `Shot`
    #[must_use]
    pub const fn burst_frame(time: f64, position: BurstPosition) -> Self {
        Self {
            time,
            kind: EventKind::Shot,
            subtitle_text: None,
            burst: Some(position),
        }
    }

    #[must_use]
    pub fn subtitle(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            kind: EventKind::Subtitle,
            subtitle_text: Some(text.into()),
            burst: None,
        }
    }

    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    #[must_use]
    pub fn subtitle_text(&self) -> Option<&str> {
        self.subtitle_text.as_deref()
    }

    #[must_use]
    pub const fn burst_position(&self) -> Option<BurstPosition> {
        self.burst
    }

    fn attach_subtitle(&mut self, text: &str) {
        self.kind = EventKind::ShotAndSubtitle;
        self.subtitle_text = Some(text.to_string());
    }
}

/// 合併鏡頭時間點與字幕事件為單一時間軸
///
/// 1. 每個鏡頭時間點建立 `Shot` 事件（同鍵只保留一筆）
/// 2. 字幕事件落在既有時間鍵上時升級為 `ShotAndSubtitle`，否則建立 `Subtitle`
/// 3. 依時間遞增輸出
///
/// 同一時間鍵上有多句字幕時，後到的文字覆蓋先前的文字。
#[must_use]
pub fn merge_timeline(shots: &[f64], subtitles: &[SubtitleEvent]) -> Vec<TimestampEvent> {
    let mut timeline: BTreeMap<TimestampKey, TimestampEvent> = BTreeMap::new();

    for &time in shots {
        timeline
            .entry(TimestampKey::from_seconds(time))
            .or_insert_with(|| TimestampEvent::shot(time));
    }

    for subtitle in subtitles {
        match timeline.entry(TimestampKey::from_seconds(subtitle.time)) {
            Entry::Occupied(mut entry) => entry.get_mut().attach_subtitle(&subtitle.text),
            Entry::Vacant(entry) => {
                entry.insert(TimestampEvent::subtitle(subtitle.time, &subtitle.text));
            }
        }
    }

    timeline.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_upgrades_matching_shot() {
        let shots = [0.0, 2.5, 7.0];
        let subtitles = [SubtitleEvent::new(2.5, "Hello")];

        let timeline = merge_timeline(&shots, &subtitles);

        assert_eq!(
            timeline,
            vec![
                TimestampEvent::shot(0.0),
                TimestampEvent {
                    time: 2.5,
                    kind: EventKind::ShotAndSubtitle,
                    subtitle_text: Some("Hello".to_string()),
                    burst: None,
                },
                TimestampEvent::shot(7.0),
            ]
        );
    }

    #[test]
    fn test_merge_interleaves_by_time() {
        let shots = [0.0, 10.0];
        let subtitles = [
            SubtitleEvent::new(12.0, "Later"),
            SubtitleEvent::new(4.0, "Earlier"),
        ];

        let timeline = merge_timeline(&shots, &subtitles);
        let times: Vec<f64> = timeline.iter().map(TimestampEvent::time).collect();
        let kinds: Vec<EventKind> = timeline.iter().map(TimestampEvent::kind).collect();

        assert_eq!(times, vec![0.0, 4.0, 10.0, 12.0]);
        assert_eq!(
            kinds,
            vec![
                EventKind::Shot,
                EventKind::Subtitle,
                EventKind::Shot,
                EventKind::Subtitle
            ]
        );
        assert_eq!(timeline[1].subtitle_text(), Some("Earlier"));
    }

    #[test]
    fn test_merge_length_is_distinct_key_count() {
        let shots = [0.0, 1.0, 1.0, 3.0];
        let subtitles = [
            SubtitleEvent::new(1.0, "a"),
            SubtitleEvent::new(2.0, "b"),
            SubtitleEvent::new(3.0, "c"),
        ];

        let timeline = merge_timeline(&shots, &subtitles);

        assert_eq!(timeline.len(), 4);
        assert!(timeline.len() <= shots.len() + subtitles.len());
    }

    #[test]
    fn test_merge_coalesces_within_same_millisecond() {
        // 0.1 + 0.2 與 0.3 的浮點誤差落在同一毫秒
        let timeline = merge_timeline(&[0.1 + 0.2], &[SubtitleEvent::new(0.3, "x")]);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].kind(), EventKind::ShotAndSubtitle);

        // 相差 1 毫秒以上不合併
        let timeline = merge_timeline(&[1.000], &[SubtitleEvent::new(1.002, "y")]);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_merge_later_subtitle_on_same_key_upgrades_and_replaces_text() {
        let subtitles = [
            SubtitleEvent::new(5.0, "first"),
            SubtitleEvent::new(5.0, "second"),
        ];
        let timeline = merge_timeline(&[], &subtitles);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].time(), 5.0);
        assert_eq!(timeline[0].kind(), EventKind::ShotAndSubtitle);
        assert_eq!(timeline[0].subtitle_text(), Some("second"));
    }

    #[test]
    fn test_merge_subtitle_on_shot_then_another_keeps_latest_text() {
        let subtitles = [SubtitleEvent::new(3.0, "one"), SubtitleEvent::new(3.0, "two")];
        let timeline = merge_timeline(&[3.0], &subtitles);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].kind(), EventKind::ShotAndSubtitle);
        assert_eq!(timeline[0].subtitle_text(), Some("two"));
    }

    #[test]
    fn test_merge_without_subtitles_is_all_shots() {
        let shots = [0.0, 1.5, 4.0];
        let timeline = merge_timeline(&shots, &[]);
        assert_eq!(timeline.len(), 3);
        assert!(timeline.iter().all(|e| e.kind() == EventKind::Shot));
        assert!(timeline.iter().all(|e| e.subtitle_text().is_none()));
    }

    #[test]
    fn test_event_kind_flags() {
        assert!(EventKind::Shot.contains_shot());
        assert!(!EventKind::Shot.contains_subtitle());
        assert!(EventKind::ShotAndSubtitle.contains_shot());
        assert!(EventKind::ShotAndSubtitle.contains_subtitle());
        assert!(EventKind::Subtitle.contains_subtitle());
        assert_eq!(
            serde_json::to_string(&EventKind::ShotAndSubtitle).unwrap(),
            "\"shot+subtitle\""
        );
    }

    #[test]
    fn test_timestamp_key_rounds_to_millis() {
        assert_eq!(TimestampKey::from_seconds(2.5), TimestampKey(2500));
        assert_eq!(TimestampKey::from_seconds(0.041_708), TimestampKey(42));
    }
}
