//! Standard paths used by the `with` launcher

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::resolver::SearchPath;

/// Overrides the installation directory
pub const APP_DIR_VAR: &str = "WITH_APP_DIR";

/// Standard `with` paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// User-defined contexts (~/.with)
    pub user_root: PathBuf,
    /// Installation directory holding the launcher and built-in contexts
    pub app_dir: PathBuf,
    /// Built-in contexts (<app_dir>/builtin)
    pub builtin_root: PathBuf,
    /// Intermediary launcher script (<app_dir>/with.sh)
    pub launcher: PathBuf,
    /// Config file (~/.config/with/config.json)
    pub config_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        let config_file = dirs::config_dir()
            .unwrap_or_else(|| home.join(".config"))
            .join("with")
            .join("config.json");

        let app_dir = app_dir_from(env::var_os(APP_DIR_VAR));

        Self::from_roots(home.join(".with"), app_dir, config_file)
    }

    /// Paths rooted at explicit user and installation directories
    ///
    /// Relative roots are anchored at the current directory.
    pub fn from_roots(user_root: PathBuf, app_dir: PathBuf, config_file: PathBuf) -> Self {
        let user_root = absolutize(&user_root);
        let app_dir = absolutize(&app_dir);
        Self {
            builtin_root: app_dir.join("builtin"),
            launcher: app_dir.join("with.sh"),
            user_root,
            app_dir,
            config_file,
        }
    }

    /// Search path: user root, configured extras, then built-ins
    pub fn search_path(&self, config: &Config) -> SearchPath {
        let mut dirs = vec![self.user_root.clone()];
        dirs.extend(config.extra_paths.iter().map(|p| expand_home(p)));
        dirs.push(self.builtin_root.clone());
        SearchPath::new(dirs)
    }
}

/// Installation directory from the override variable, if set
fn app_dir_from(var: Option<OsString>) -> PathBuf {
    match var {
        Some(dir) if !dir.is_empty() => absolutize(Path::new(&dir)),
        _ => default_app_dir(),
    }
}

/// `<exe_dir>/../share/with` for installed layouts, else the exe directory
fn default_app_dir() -> PathBuf {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let share = exe_dir.join("../share/with");
    if share.is_dir() {
        share
    } else {
        exe_dir
    }
}

/// Anchor a relative path at the current directory
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
