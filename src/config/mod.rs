pub mod load;
pub mod save;
pub mod types;

pub use save::save_settings;
pub use types::{
    DEFAULT_BURST_FPS, DEFAULT_BURST_FRAMES, DEFAULT_CONFIG_FILE, DEFAULT_CROP_PERCENT,
    DEFAULT_SAMPLE_INTERVAL, DEFAULT_THRESHOLD, DEFAULT_THUMBNAIL_WIDTH, ExtractionSettings,
    ToolPaths,
};
