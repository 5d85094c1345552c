//! Progressive web app integration.
//!
//! The service worker itself is produced by an external generator once the
//! site has been rendered. This module describes what that generator should
//! do ([`ServiceWorkerPlan`]), injects the PWA constants into client code and
//! writes the companion `sw-events.js` script.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::context::ResolvedDirs;

pub const SW_EVENTS_FILE: &str = "sw-events.js";
pub const SW_FILE: &str = "sw.js";
pub const WEBSITE_DIR: &str = "website";
pub const PRECACHE_PATTERN: &str = "**/*.{js,css,html,png,jpg,jpeg,gif,svg,woff,woff2,eot,ttf,otf}";

/// Replies to `skipWaiting` requests posted by the update notifier.
pub const SW_EVENTS_SCRIPT: &str = r#"self.addEventListener('message', e => {
  const replyPort = e.ports[0]
  const data = e.data
  if (!data || !replyPort) return
  if (replyPort && data.action === 'skipWaiting') {
    e.waitUntil(
      self.skipWaiting().then(
        () => replyPort.postMessage({ error: null }),
        error => replyPort.postMessage({ error })
      )
    )
  }
})
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwaOptions {
    /// Show a notification when a new worker is waiting
    #[serde(default = "default_true", alias = "notify_updates")]
    pub notify_updates: bool,

    /// Activate new workers without waiting for open tabs to close
    #[serde(default, alias = "skip_waiting")]
    pub skip_waiting: bool,

    /// Passed through to client code untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl Default for PwaOptions {
    fn default() -> Self {
        Self {
            notify_updates: true,
            skip_waiting: false,
            extra: Map::new(),
        }
    }
}

impl PwaOptions {
    /// `__PWA_ENABLED__` and `__PWA_OPTIONS__` as JSON literals.
    pub fn constants(&self) -> [(String, String); 2] {
        [
            ("__PWA_ENABLED__".to_string(), json!(true).to_string()),
            (
                "__PWA_OPTIONS__".to_string(),
                serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string()),
            ),
        ]
    }

    /// Client-side files to append to the app entry.
    pub fn enhance_app_files(&self) -> Vec<&'static str> {
        let mut files = vec!["pwa-inject.js"];
        if self.notify_updates {
            files.push("pwa-notifier-inject.js");
        }
        files
    }
}

/// Instructions for the external service-worker generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWorkerPlan {
    pub sw_dest: PathBuf,
    pub import_workbox_from: String,
    pub import_scripts: Vec<String>,
    pub glob_directory: PathBuf,
    pub glob_patterns: Vec<String>,
}

impl ServiceWorkerPlan {
    /// `public_path` is the client plan's public path.
    pub fn new(dirs: &ResolvedDirs, public_path: &str) -> Self {
        Self {
            sw_dest: dirs.resolve_peco_dir(&[WEBSITE_DIR, SW_FILE]),
            import_workbox_from: "local".to_string(),
            import_scripts: vec![format!("{public_path}{SW_EVENTS_FILE}")],
            glob_directory: dirs.resolve_peco_dir(&[WEBSITE_DIR]),
            glob_patterns: vec![PRECACHE_PATTERN.to_string()],
        }
    }
}

/// Write `sw-events.js` into the generated website directory.
pub fn write_sw_events(website_dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(website_dir)?;
    let path = website_dir.join(SW_EVENTS_FILE);
    fs::write(&path, SW_EVENTS_SCRIPT)?;
    tracing::debug!(path = %path.display(), "wrote service worker events script");
    Ok(path)
}
