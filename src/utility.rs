//! Settings and log directory resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use tracing::warn;

/// Name of the per-user working folder
pub const FOLDER_NAME: &str = ".finstats";

/// Resolve the working folder below `cwd` or `home`.
///
/// A `.finstats` folder in the current working directory wins; otherwise
/// the one in the home directory is used and created on demand.
fn get_finstats_dir(cwd: &Path, home: &Path) -> PathBuf {
    let local = cwd.join(FOLDER_NAME);
    if local.exists() {
        return local;
    }

    let temp_path = home.join(FOLDER_NAME);
    ensure_dir(&temp_path);
    temp_path
}

/// Create `path` if missing; returns whether it is a directory afterwards
fn ensure_dir(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }
    match fs::create_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("cannot create folder {}: {}", path.display(), e);
            false
        }
    }
}

/// Working folder holding the settings file and logs
pub static FINSTATS_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    get_finstats_dir(&cwd, &home)
});

/// Get path for a file in the working folder
pub fn get_file_path(filename: &str) -> PathBuf {
    FINSTATS_DIR.join(filename)
}

/// Get path for a sub folder of the working folder, creating it if needed
pub fn get_folder_path(folder_name: &str) -> PathBuf {
    let folder_path = FINSTATS_DIR.join(folder_name);
    ensure_dir(&folder_path);
    folder_path
}
