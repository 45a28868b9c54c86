mod command_runner;
mod ffprobe_info;
mod path_validator;
mod progress;

pub use command_runner::{CommandOutput, CommandRunner, SystemRunner};
pub use ffprobe_info::{MediaInfo, SubtitleStreamInfo, probe_media};
pub use path_validator::{ensure_directory_exists, recreate_directory, validate_file_exists};
pub use progress::create_progress_bar;
