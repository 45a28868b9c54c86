use crate::tools::CommandRunner;
use anyhow::Result;
use log::{debug, warn};
use regex::Regex;
use std::path::Path;

/// 第一個畫面一律視為鏡頭起點
pub const FIRST_SHOT_TIMESTAMP: f64 = 0.0;

/// 鏡頭變換偵測器
///
/// 使用 ffmpeg `select='gt(scene,T)',showinfo` 濾鏡，
/// 從 stderr 中解析被選取畫面的 `pts_time`。
pub struct SceneDetector<'a> {
    runner: &'a dyn CommandRunner,
    ffmpeg: &'a str,
    /// 場景變換閾值 (0-1)，越低越敏感
    threshold: f64,
}

impl<'a> SceneDetector<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, ffmpeg: &'a str, threshold: f64) -> Self {
        Self {
            runner,
            ffmpeg,
            threshold,
        }
    }

    /// 偵測鏡頭起點
    ///
    /// 結果已去重並遞增排序，且一定包含 0.0。
    /// ffmpeg 執行失敗或沒有輸出時只回傳 0.0，由呼叫端決定如何處理。
    pub fn detect_shots(&self, video: &Path) -> Result<Vec<f64>> {
        debug!("鏡頭偵測設定: threshold={}", self.threshold);

        let filter = format!("select='gt(scene,{})',showinfo", self.threshold);
        let args = vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-an".to_string(),
            "-sn".to_string(),
            "-vf".to_string(),
            filter,
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ];

        let stderr = match self.runner.run(self.ffmpeg, &args) {
            Ok(output) => {
                if !output.success {
                    warn!("ffmpeg 鏡頭偵測回傳失敗狀態: {}", video.display());
                }
                output.stderr
            }
            Err(e) => {
                warn!("無法執行 ffmpeg 鏡頭偵測: {e:#}");
                String::new()
            }
        };

        parse_showinfo_output(&stderr)
    }
}

/// 解析 showinfo 輸出
///
/// 格式: `[Parsed_showinfo_1 @ 0x...] n:   0 pts:   1001 pts_time:0.041708 ...`
fn parse_showinfo_output(output: &str) -> Result<Vec<f64>> {
    let pts_regex = Regex::new(r"pts_time:(\d+\.?\d*)")?;

    let mut timestamps = vec![FIRST_SHOT_TIMESTAMP];
    timestamps.extend(
        output
            .lines()
            .filter_map(|line| pts_regex.captures(line))
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse::<f64>().ok()),
    );

    // 完全相同的浮點值才視為重複
    timestamps.sort_by(f64::total_cmp);
    timestamps.dedup();

    debug!("偵測到 {} 個鏡頭起點", timestamps.len());

    Ok(timestamps)
}

/// 扣除預設的 0.0 之後實際偵測到的鏡頭數
#[must_use]
pub fn detected_shot_count(shots: &[f64]) -> usize {
    shots.iter().filter(|&&t| t != FIRST_SHOT_TIMESTAMP).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CommandOutput;
    use std::cell::RefCell;

    struct CannedRunner {
        stderr: String,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl CannedRunner {
        fn new(stderr: &str) -> Self {
            Self {
                stderr: stderr.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for CannedRunner {
        fn run(&self, _program: &str, args: &[String]) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(args.to_vec());
            Ok(CommandOutput::ok("", self.stderr.clone()))
        }
    }

    struct BrokenRunner;

    impl CommandRunner for BrokenRunner {
        fn run(&self, program: &str, _args: &[String]) -> Result<CommandOutput> {
            anyhow::bail!("{program} not found")
        }
    }

    #[test]
    fn test_parse_showinfo_output() {
        let output = r"
[Parsed_showinfo_1 @ 0x7f9b8c] n:   0 pts:  30030 pts_time:2.5 duration:1001
[Parsed_showinfo_1 @ 0x7f9b8c] n:   1 pts:  84084 pts_time:7 duration:1001
frame=  200 fps=0.0 q=-0.0 size=N/A time=00:00:08.00 bitrate=N/A
";
        let shots = parse_showinfo_output(output).unwrap();
        assert_eq!(shots, vec![0.0, 2.5, 7.0]);
    }

    #[test]
    fn test_parse_showinfo_output_dedups_and_sorts() {
        let output = "pts_time:7.0\npts_time:2.5\npts_time:2.5\npts_time:0.0\n";
        let shots = parse_showinfo_output(output).unwrap();
        assert_eq!(shots, vec![0.0, 2.5, 7.0]);
        assert_eq!(detected_shot_count(&shots), 2);
    }

    #[test]
    fn test_parse_showinfo_output_empty_keeps_first_frame() {
        let shots = parse_showinfo_output("").unwrap();
        assert_eq!(shots, vec![0.0]);
        assert_eq!(detected_shot_count(&shots), 0);
    }

    #[test]
    fn test_detect_shots_builds_select_filter() {
        let runner = CannedRunner::new("[Parsed_showinfo_1 @ 0x1] n:0 pts:1 pts_time:3.25");
        let detector = SceneDetector::new(&runner, "ffmpeg", 0.3);

        let shots = detector.detect_shots(Path::new("/movies/film.mp4")).unwrap();

        assert_eq!(shots, vec![0.0, 3.25]);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&"select='gt(scene,0.3)',showinfo".to_string()));
        assert!(calls[0].contains(&"/movies/film.mp4".to_string()));
    }

    #[test]
    fn test_detect_shots_tool_failure_yields_only_first_frame() {
        let detector = SceneDetector::new(&BrokenRunner, "ffmpeg", 0.4);
        let shots = detector.detect_shots(Path::new("/movies/film.mp4")).unwrap();
        assert_eq!(shots, vec![0.0]);
    }
}
