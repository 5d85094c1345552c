//! Server-side render hooks.
//!
//! The view framework resolves routes and collects head tags; this module only
//! covers the sequencing contract around them: reject URLs the router
//! canonicalizes elsewhere, then expose the collected tags to the page
//! template through [`RenderHooks`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("404 not found: {0}")]
    NotFound(String),
}

/// Accept `url` only when the router resolves it to itself.
pub fn resolve_route(url: &str, resolved_full_path: &str) -> Result<(), RenderError> {
    if resolved_full_path != url {
        return Err(RenderError::NotFound(url.to_string()));
    }
    Ok(())
}

/// Head tags and attributes collected while rendering, pre-rendered to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub noscript: String,
    #[serde(default)]
    pub html_attrs: String,
    #[serde(default)]
    pub body_attrs: String,
}

/// Template-facing hooks; `render_start` must run before the others.
#[derive(Debug, Default)]
pub struct RenderHooks {
    meta: Option<MetaInfo>,
}

impl RenderHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the collected meta info. Emits nothing into the page.
    pub fn render_start(&mut self, collected: MetaInfo) -> String {
        self.meta = Some(collected);
        String::new()
    }

    /// Head block in the order meta, title, link, style, script, noscript.
    pub fn render_meta(&self) -> String {
        let Some(info) = &self.meta else {
            return String::new();
        };
        [
            &info.meta,
            &info.title,
            &info.link,
            &info.style,
            &info.script,
            &info.noscript,
        ]
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("\n")
    }

    pub fn render_html_attrs(&self) -> &str {
        self.meta.as_ref().map_or("", |info| info.html_attrs.as_str())
    }

    pub fn render_body_attrs(&self) -> &str {
        self.meta.as_ref().map_or("", |info| info.body_attrs.as_str())
    }
}
