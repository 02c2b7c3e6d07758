//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "cl";
const ORGANIZATION: &str = "asli";
const APPLICATION: &str = "shipdeck";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory for persistent application data.
///
/// - Linux: `$XDG_DATA_HOME/shipdeck` or `~/.local/share/shipdeck`
/// - macOS: `~/Library/Application Support/cl.asli.shipdeck`
/// - Windows: `C:\Users\<User>\AppData\Roaming\asli\shipdeck\data`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory for logs.
///
/// - Linux: `$XDG_CACHE_HOME/shipdeck` or `~/.cache/shipdeck`
/// - macOS: `~/Library/Caches/cl.asli.shipdeck`
/// - Windows: `C:\Users\<User>\AppData\Local\asli\shipdeck\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the grid preferences database.
pub fn settings_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("settings.db"))
}

/// Path to the latest log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}

/// Maximum number of archived log files to keep.
const MAX_OLD_LOGS: usize = 10;

/// Archives `latest.log` under a timestamped name and prunes old logs.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    if fs::create_dir_all(&cache).is_err() {
        return;
    }
    let latest = cache.join("latest.log");

    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let archived = cache.join(format!("{timestamp}.log"));
        let _ = fs::rename(&latest, &archived);
    }

    cleanup_old_logs(&cache, MAX_OLD_LOGS);
}

/// Removes archived logs beyond the newest `keep`.
fn cleanup_old_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != "latest.log"
        })
        .collect();

    // Oldest first
    logs.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    if logs.len() > keep {
        for entry in logs.iter().take(logs.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_latest_and_newest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("latest.log"), "now").unwrap();
        for i in 0..4 {
            fs::write(dir.path().join(format!("2025010{i}_000000.log")), "old").unwrap();
        }
        fs::write(dir.path().join("settings.db"), "").unwrap();

        cleanup_old_logs(dir.path(), 2);

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"latest.log".to_string()));
        assert!(names.contains(&"settings.db".to_string()));
    }
}
