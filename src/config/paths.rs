//! Configuration file location
//!
//! `RANCHER_INSPECT_CONFIG_DIR` wins. Otherwise `$XDG_CONFIG_HOME/rancher-inspect`
//! when set, then the platform config directory from `directories`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const APP_NAME: &str = "rancher-inspect";
const CONFIG_DIR_ENV: &str = "RANCHER_INSPECT_CONFIG_DIR";

/// Directory holding `config.yaml`
pub fn config_dir() -> PathBuf {
    if let Some(dir) = env_path(CONFIG_DIR_ENV) {
        return dir;
    }
    if cfg!(not(windows)) {
        if let Some(xdg) = env_path("XDG_CONFIG_HOME") {
            return xdg.join(APP_NAME);
        }
    }
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".config").join(APP_NAME))
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Create `path` and its parents if missing
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
