use std::path::PathBuf;

const APP_DIR: &str = "mpv-nowplaying";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Where mpv listens when started with
/// `--input-ipc-server=~/.config/mpv/mpv.sock` (usually set in mpv.conf).
pub fn default_mpv_socket_path() -> PathBuf {
    home_dir().join(".config").join("mpv").join("mpv.sock")
}

pub fn data_dir() -> PathBuf {
    // ~/.local/share/ on macOS too, rather than Application Support
    home_dir().join(".local").join("share").join(APP_DIR)
}

pub fn config_dir() -> PathBuf {
    home_dir().join(".config").join(APP_DIR)
}
