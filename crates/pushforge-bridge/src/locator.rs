use std::path::{Path, PathBuf};

use tracing::debug;

/// Where adb usually lives when it isn't on `PATH`.
pub fn adb_candidates(home: Option<&Path>, sdk_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = sdk_roots
        .iter()
        .map(|root| root.join("platform-tools").join("adb"))
        .collect();
    candidates.push(PathBuf::from("/usr/local/bin/adb"));
    candidates.push(PathBuf::from("/opt/homebrew/bin/adb"));
    if let Some(home) = home {
        candidates.push(home.join("Library/Android/sdk/platform-tools/adb"));
        candidates.push(home.join("Android/Sdk/platform-tools/adb"));
    }
    candidates
}

/// Resolves the adb binary: explicit override, then `PATH`, then the SDK
/// install locations.
pub fn find_adb(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }
    if let Ok(path) = which::which("adb") {
        debug!(path = %path.display(), "adb found on PATH");
        return Some(path);
    }

    let home = std::env::var_os("HOME").map(PathBuf::from);
    let sdk_roots: Vec<PathBuf> = ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
        .iter()
        .filter_map(|key| std::env::var_os(key))
        .map(PathBuf::from)
        .collect();

    adb_candidates(home.as_deref(), &sdk_roots)
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Whether `program` (a bare name or a path) can be executed.
pub fn tool_exists(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }
    which::which(program).is_ok()
}
