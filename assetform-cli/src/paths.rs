//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "assetform";
const APPLICATION: &str = "assetform";

/// Name of the log file written by the current run.
const LATEST_LOG: &str = "latest.log";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Default location of `config.toml`.
///
/// - Linux: `$XDG_CONFIG_HOME/assetform/config.toml`
/// - macOS: `~/Library/Application Support/dev.assetform.assetform/config.toml`
/// - Windows: `C:\Users\<User>\AppData\Roaming\assetform\assetform\config\config.toml`
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory holding `latest.log` and archived logs.
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Archives the previous `latest.log` under a timestamped name and prunes
/// old archives. Returns the path for this run's log.
pub fn prepare_log_file() -> Option<PathBuf> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir).ok()?;

    let latest = dir.join(LATEST_LOG);
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, dir.join(format!("{}.log", timestamp)));
    }
    prune_logs(&dir, MAX_OLD_LOGS);

    Some(latest)
}

/// Removes the oldest archived logs in `dir` beyond `keep`.
///
/// Returns the number of files removed.
fn prune_logs(dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut archived: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    if archived.len() <= keep {
        return 0;
    }

    archived.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    let excess = archived.len() - keep;
    archived
        .iter()
        .take(excess)
        .filter(|e| fs::remove_file(e.path()).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_latest_and_newest_archives() {
        let dir = std::env::temp_dir().join(format!("assetform-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            fs::write(dir.join(format!("2024010{}_000000.log", i)), "").unwrap();
        }
        fs::write(dir.join(LATEST_LOG), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        assert_eq!(prune_logs(&dir, 3), 2);
        assert!(dir.join(LATEST_LOG).exists());
        assert!(dir.join("notes.txt").exists());
        assert_eq!(prune_logs(&dir, 3), 0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
