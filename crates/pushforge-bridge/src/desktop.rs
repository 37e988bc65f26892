//! Installed desktop application discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use pushforge_core::device::sort_apps;
use pushforge_core::AppInfo;

use crate::errors::{InventoryError, ProcessError};
use crate::process::{args, ProcessRunner};

#[derive(Deserialize)]
struct BundleInfo {
    #[serde(rename = "CFBundleIdentifier")]
    identifier: Option<String>,
    #[serde(rename = "CFBundleDisplayName")]
    display_name: Option<String>,
    #[serde(rename = "CFBundleName")]
    name: Option<String>,
}

/// Reads an `Info.plist` already converted to JSON. Bundles without an
/// identifier yield `None`.
pub fn parse_bundle_info(json: &str, fallback_name: &str) -> Option<AppInfo> {
    let info: BundleInfo = serde_json::from_str(json).ok()?;
    let id = info.identifier.filter(|id| !id.is_empty())?;
    let name = info
        .display_name
        .or(info.name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());
    Some(AppInfo::new(name, id))
}

async fn app_bundles(dir: &Path) -> Vec<PathBuf> {
    let mut bundles = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "skipping app directory");
            return bundles;
        }
    };
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "app") {
                    bundles.push(path);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "app directory read failed");
                break;
            }
        }
    }
    bundles.sort();
    bundles
}

/// Scans `dirs` for `.app` bundles and reads each bundle's metadata with
/// `plutil`. Results are deduplicated by id and sorted by name.
pub async fn discover_desktop_apps(
    runner: Arc<dyn ProcessRunner>,
    plutil: &str,
    dirs: &[PathBuf],
    timeout: Duration,
) -> Result<Vec<AppInfo>, InventoryError> {
    let mut apps = Vec::new();
    let mut seen = HashSet::new();

    for dir in dirs {
        for bundle in app_bundles(dir).await {
            let plist = bundle.join("Contents").join("Info.plist");
            if !plist.is_file() {
                continue;
            }
            let argv = args(["-convert", "json", "-o", "-"])
                .into_iter()
                .chain([plist.to_string_lossy().into_owned()])
                .collect::<Vec<_>>();
            let output = match runner.run(plutil, &argv, timeout).await {
                Ok(output) => output,
                Err(e @ ProcessError::NotFound { .. }) => return Err(e.into()),
                Err(e) => {
                    warn!(bundle = %bundle.display(), error = %e, "plutil failed");
                    continue;
                }
            };
            if !output.succeeded() {
                debug!(bundle = %bundle.display(), "unreadable Info.plist");
                continue;
            }
            let stem = bundle
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some(app) = parse_bundle_info(&output.stdout, &stem) {
                if seen.insert(app.bundle_id.clone()) {
                    apps.push(app);
                }
            }
        }
    }

    sort_apps(&mut apps);
    Ok(apps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Scripted, ScriptedRunner};

    #[test]
    fn bundle_info_prefers_display_name() {
        let app = parse_bundle_info(
            r#"{"CFBundleIdentifier":"com.tinyspeck.slackmacgap","CFBundleDisplayName":"Slack","CFBundleName":"slack"}"#,
            "Slack.app",
        )
        .unwrap();
        assert_eq!(app, AppInfo::new("Slack", "com.tinyspeck.slackmacgap"));
    }

    #[test]
    fn bundle_info_falls_back_to_file_name() {
        let app = parse_bundle_info(r#"{"CFBundleIdentifier":"org.example.tool"}"#, "Tool").unwrap();
        assert_eq!(app.name, "Tool");
    }

    #[test]
    fn bundle_without_id_is_skipped() {
        assert!(parse_bundle_info(r#"{"CFBundleName":"Orphan"}"#, "Orphan").is_none());
        assert!(parse_bundle_info("not json", "x").is_none());
    }

    fn fake_bundle(dir: &Path, name: &str) {
        let contents = dir.join(format!("{name}.app")).join("Contents");
        std::fs::create_dir_all(&contents).unwrap();
        std::fs::write(contents.join("Info.plist"), "<plist/>").unwrap();
    }

    #[tokio::test]
    async fn discovers_and_dedupes() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fake_bundle(a.path(), "Zed");
        fake_bundle(a.path(), "Broken");
        fake_bundle(b.path(), "Zed");
        std::fs::create_dir_all(a.path().join("NotAnApp")).unwrap();

        let runner = Arc::new(
            ScriptedRunner::new()
                .on("Zed.app", Scripted::ok(r#"{"CFBundleIdentifier":"dev.zed.Zed","CFBundleName":"Zed"}"#))
                .on("Broken.app", Scripted::fail(1, "bad plist")),
        );
        let apps = discover_desktop_apps(
            runner.clone(),
            "plutil",
            &[a.path().to_path_buf(), b.path().to_path_buf(), a.path().join("missing")],
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(apps, vec![AppInfo::new("Zed", "dev.zed.Zed")]);
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn missing_plutil_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fake_bundle(dir.path(), "Any");
        let runner = Arc::new(ScriptedRunner::new().on("plutil", Scripted::NotFound));
        let result = discover_desktop_apps(runner, "plutil", &[dir.path().to_path_buf()], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(InventoryError::ToolNotFound(_))));
    }
}
