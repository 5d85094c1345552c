//! Build context: the immutable input of plan construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::ConfigurationError;
use crate::schema::{SchemaProvider, SchemaSource};

/// Build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Unhashed filenames, style injection, source maps
    #[default]
    Development,
    /// Hashed filenames, CSS extraction, minification
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(ConfigurationError::InvalidValue(format!(
                "unknown mode '{other}', expected development or production"
            ))),
        }
    }
}

/// Which half of the universal app a plan compiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Browser bundle
    #[default]
    Client,
    /// Server-side rendering bundle
    Server,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Client => "client",
            Target::Server => "server",
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Target::Client)
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Target::Server)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Target::Client),
            "server" => Ok(Target::Server),
            other => Err(ConfigurationError::InvalidValue(format!(
                "unknown target '{other}', expected client or server"
            ))),
        }
    }
}

/// User-facing build flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// `None` means "not specified", which keeps minification on
    #[serde(default)]
    pub minimize: Option<bool>,

    /// `None` means "not specified", which keeps the progress bar on
    #[serde(default)]
    pub progress: Option<bool>,

    /// Forwarded to the progress reporter
    #[serde(default)]
    pub profile: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Project base directory, exposed as the `@base` alias
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_port() -> u16 {
    4000
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            minimize: None,
            progress: None,
            profile: false,
            debug: false,
            port: default_port(),
            base_dir: default_base_dir(),
        }
    }
}

impl BuildOptions {
    /// Minification stays on unless explicitly disabled.
    pub fn minimize_enabled(&self) -> bool {
        self.minimize != Some(false)
    }

    /// Progress reporting stays on unless explicitly disabled.
    pub fn progress_enabled(&self) -> bool {
        self.progress != Some(false)
    }
}

/// Named working directories resolved before planning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirs {
    /// Internal working directory (`.peco`)
    pub peco_dir: PathBuf,

    /// Extra module/loader search roots, searched before `node_modules`
    pub module_dirs: Vec<PathBuf>,

    /// Directory that invalidated filenames are reported relative to
    pub cwd: PathBuf,
}

impl ResolvedDirs {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref();
        Self {
            peco_dir: base.join(".peco"),
            module_dirs: Vec::new(),
            cwd: base.to_path_buf(),
        }
    }

    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dirs.push(dir.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Resolve a path inside the internal working directory.
    pub fn resolve_peco_dir(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.peco_dir.clone(), |path, part| path.join(part))
    }
}

/// Everything plan construction reads. Never mutated by the builder.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub mode: Mode,
    pub target: Target,
    pub options: BuildOptions,
    pub site: SiteConfig,
    pub dirs: ResolvedDirs,
    pub query_schema: Option<SchemaSource>,
}

impl BuildContext {
    pub fn new(mode: Mode, target: Target, site: SiteConfig, dirs: ResolvedDirs) -> Self {
        Self {
            mode,
            target,
            options: BuildOptions::default(),
            site,
            dirs,
            query_schema: None,
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Install an in-memory schema provider for `.gql` files.
    pub fn with_query_schema(mut self, provider: impl SchemaProvider + 'static) -> Self {
        self.query_schema = Some(SchemaSource::provider(provider));
        self
    }

    /// Sibling context for the other half of the build. Only values are copied.
    pub fn for_target(&self, target: Target) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// `/` while developing, the configured site root otherwise.
    pub fn public_path(&self) -> &str {
        if self.mode.is_development() {
            "/"
        } else {
            &self.site.root
        }
    }

    pub fn is_production_client(&self) -> bool {
        self.target.is_client() && self.mode.is_production()
    }
}
