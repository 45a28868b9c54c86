use indicatif::{ProgressBar, ProgressStyle};

/// 建立共用樣式的進度條
#[must_use]
pub fn create_progress_bar(len: u64, message: &'static str) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
    progress_bar.set_style(style);
    progress_bar.set_message(message);
    progress_bar
}
