use anyhow::{Context, Result};
use log::debug;
use std::process::Command;

/// 外部工具執行結果
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn ok(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// 外部工具（ffmpeg / ffprobe / tesseract）的呼叫介面
///
/// 各元件透過此 trait 呼叫外部程式，測試時可替換為回傳固定輸出的假實作。
/// 呼叫為同步阻塞，沒有逾時。
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// 以 `std::process::Command` 實際執行外部程式
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!("執行 {program} {}", args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("無法執行 {program}"))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_constructors() {
        let ok = CommandOutput::ok("out", "err");
        assert!(ok.success);
        assert_eq!(ok.stdout, "out");
        assert_eq!(ok.stderr, "err");

        let failed = CommandOutput::failed("boom");
        assert!(!failed.success);
        assert!(failed.stdout.is_empty());
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner;
        let result = runner.run("definitely-not-a-real-binary-xyz", &[]);
        assert!(result.is_err());
    }
}
