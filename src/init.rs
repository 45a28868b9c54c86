use env_logger::Env;

/// 初始化日誌，`RUST_LOG` 優先於 `default_level`
pub fn init(default_level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}
