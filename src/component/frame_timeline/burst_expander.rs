use super::timeline_merger::TimestampEvent;
use anyhow::{Result, bail};
use log::info;

/// 連拍畫面在影片中的位置，兩者皆從 1 開始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstPosition {
    pub shot: usize,
    pub frame: usize,
}

/// 連拍參數：每個鏡頭開頭擷取 `frames_per_shot` 張，間隔 `1 / fps` 秒
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstConfig {
    pub frames_per_shot: u32,
    pub fps: u32,
}

impl BurstConfig {
    pub fn new(frames_per_shot: u32, fps: u32) -> Result<Self> {
        if frames_per_shot == 0 {
            bail!("每個鏡頭的連拍張數必須大於 0");
        }
        if fps == 0 {
            bail!("連拍 fps 必須大於 0");
        }
        Ok(Self {
            frames_per_shot,
            fps,
        })
    }

    #[must_use]
    pub fn frame_interval(self) -> f64 {
        1.0 / f64::from(self.fps)
    }
}

/// 將每個鏡頭起點展開為一組連拍時間點
///
/// 依鏡頭順序輸出，不與其他時間點合併；
/// 兩個鏡頭相距太近時連拍時間可能重疊，仍各自保留。
#[must_use]
pub fn expand_bursts(shots: &[f64], config: BurstConfig) -> Vec<TimestampEvent> {
    let interval = config.frame_interval();
    let frames_per_shot = config.frames_per_shot as usize;

    info!(
        "每個鏡頭擷取 {} 張 ({} fps)，預計共 {} 張",
        config.frames_per_shot,
        config.fps,
        shots.len() * frames_per_shot
    );

    shots
        .iter()
        .enumerate()
        .flat_map(|(shot_index, &shot_start)| {
            (0..config.frames_per_shot).map(move |k| {
                TimestampEvent::burst_frame(
                    f64::from(k).mul_add(interval, shot_start),
                    BurstPosition {
                        shot: shot_index + 1,
                        frame: k as usize + 1,
                    },
                )
            })
        })
        .collect()
}
