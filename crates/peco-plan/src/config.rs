//! Site configuration loaded from `peco.toml` and the environment.
//!
//! Sources are layered with figment, later sources win:
//! defaults, then `peco.toml`, then `PECO_`-prefixed environment variables
//! (nested keys separated by `__`, e.g. `PECO_THEME__PATH`).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::css::StyleDialect;
use crate::error::{ConfigurationError, Result};
use crate::pwa::PwaOptions;

pub const CONFIG_FILE: &str = "peco.toml";

/// Site-level settings shared by the client and server plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public base path used for production builds
    #[serde(default = "default_root")]
    pub root: String,

    #[serde(default)]
    pub theme: ThemeSettings,

    #[serde(default)]
    pub css: StylesheetOptions,

    /// Present when the PWA integration is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwa: Option<PwaOptions>,

    /// Extra resolution aliases (alias → path)
    #[serde(default)]
    pub aliases: IndexMap<String, PathBuf>,
}

fn default_root() -> String {
    "/".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            theme: ThemeSettings::default(),
            css: StylesheetOptions::default(),
            pwa: None,
            aliases: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSettings {
    /// Theme root. Required to build a plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Source subdirectory inside the theme root
    #[serde(default = "default_src_dir")]
    pub src_dir: String,
}

fn default_src_dir() -> String {
    "src".to_string()
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            path: None,
            src_dir: default_src_dir(),
        }
    }
}

/// Option bags forwarded to the stylesheet loaders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylesheetOptions {
    /// Merged into every `postcss-loader` step
    #[serde(default)]
    pub postcss: Map<String, Value>,

    /// Preprocessor options keyed by dialect name (`sass`, `scss`, `less`, `stylus`)
    #[serde(flatten)]
    pub preprocessors: IndexMap<String, Map<String, Value>>,
}

impl StylesheetOptions {
    /// Every preprocessor key must name a dialect that has a preprocessor.
    pub fn validate(&self) -> Result<()> {
        for key in self.preprocessors.keys() {
            let dialect: StyleDialect = key.parse()?;
            if dialect.preprocessor().is_none() {
                return Err(ConfigurationError::InvalidValue(format!(
                    "css.{key}: plain css takes no preprocessor options"
                )));
            }
        }
        Ok(())
    }

    /// User options for a dialect's preprocessor. `.scss` falls back to the `sass` bag.
    pub fn preprocessor_options(&self, dialect: StyleDialect) -> Map<String, Value> {
        let bag = match dialect {
            StyleDialect::Css => None,
            StyleDialect::Scss => self
                .preprocessors
                .get("scss")
                .or_else(|| self.preprocessors.get("sass")),
            other => self.preprocessors.get(other.key()),
        };
        bag.cloned().unwrap_or_default()
    }
}

impl SiteConfig {
    /// Layered figment for a project directory.
    pub fn figment(dir: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(SiteConfig::default()))
            .merge(Toml::file(dir.as_ref().join(CONFIG_FILE)))
            .merge(Env::prefixed("PECO_").split("__"))
    }

    /// Load site config for a project directory. A missing `peco.toml` yields defaults.
    ///
    /// # Arguments
    ///
    /// * `dir` - Project directory that may contain `peco.toml`
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::Load`] when the file or an environment value does
    /// not deserialize.
    ///
    /// # Examples
    ///
    /// ```
    /// use peco_plan::SiteConfig;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// std::fs::write(
    ///     dir.path().join("peco.toml"),
    ///     "root = \"/docs/\"\n[theme]\npath = \"/themes/default\"\n",
    /// )
    /// .unwrap();
    ///
    /// let config = SiteConfig::load(dir.path()).unwrap();
    /// assert_eq!(config.root, "/docs/");
    /// assert_eq!(config.theme.src_dir, "src");
    /// ```
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let config: SiteConfig = Self::figment(dir).extract()?;
        tracing::debug!(root = %config.root, theme = ?config.theme.path, "loaded site config");
        Ok(config)
    }

    /// Create from serde_json::Value (for programmatic config)
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigurationError::InvalidValue(e.to_string()))
    }

    pub fn with_theme(mut self, path: impl Into<PathBuf>) -> Self {
        self.theme.path = Some(path.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.aliases.insert(alias.into(), path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.root, "/");
        assert!(config.theme.path.is_none());
        assert_eq!(config.theme.src_dir, "src");
        assert!(config.pwa.is_none());
        assert!(config.css.preprocessors.is_empty());
    }

    #[test]
    fn preprocessor_bags_are_flattened() {
        let config = SiteConfig::from_value(json!({
            "theme": { "path": "/themes/default" },
            "css": {
                "postcss": { "plugins": [] },
                "sass": { "precision": 4 },
                "stylus": { "compress": true }
            }
        }))
        .unwrap();

        assert_eq!(config.css.preprocessors.len(), 2);
        assert_eq!(
            config.css.preprocessor_options(StyleDialect::Scss)["precision"],
            json!(4)
        );
        assert!(config.css.preprocessor_options(StyleDialect::Less).is_empty());
        config.css.validate().unwrap();
    }

    #[test]
    fn scss_bag_wins_over_sass_bag() {
        let mut css = StylesheetOptions::default();
        css.preprocessors
            .insert("sass".into(), Map::from_iter([("a".into(), json!(1))]));
        css.preprocessors
            .insert("scss".into(), Map::from_iter([("b".into(), json!(2))]));

        let scss = css.preprocessor_options(StyleDialect::Scss);
        assert!(scss.contains_key("b"));
        assert!(!scss.contains_key("a"));
        assert!(css.preprocessor_options(StyleDialect::Sass).contains_key("a"));
    }

    #[test]
    fn unknown_dialect_key_is_rejected() {
        let mut css = StylesheetOptions::default();
        css.preprocessors.insert("sugarss".into(), Map::new());
        assert!(matches!(
            css.validate(),
            Err(ConfigurationError::UnknownDialect(name)) if name == "sugarss"
        ));

        let mut css = StylesheetOptions::default();
        css.preprocessors.insert("css".into(), Map::new());
        assert!(matches!(
            css.validate(),
            Err(ConfigurationError::InvalidValue(_))
        ));
    }
}
