use serde::Serialize;
use serde_json::Value;

/// Lifecycle plugins a plan can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginKind {
    /// Writes stylesheets to a separate artifact
    CssExtract,
    /// JavaScript minifier
    Minimizer,
    /// Corrects watcher timestamps in development
    Timefix,
    ProgressBar,
    /// Lifecycle reporter
    Reporter,
    /// Compile-time constant injection
    Constants,
}

impl PluginKind {
    pub fn key(&self) -> &'static str {
        match self {
            PluginKind::CssExtract => "css-extract",
            PluginKind::Minimizer => "minimizer",
            PluginKind::Timefix => "timefix",
            PluginKind::ProgressBar => "progress-bar",
            PluginKind::Reporter => "reporter",
            PluginKind::Constants => "constants",
        }
    }
}

/// A plugin the bundler should instantiate: constructor name plus arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginDescriptor {
    #[serde(rename = "name")]
    pub kind: PluginKind,
    pub constructor: String,
    pub args: Vec<Value>,
}

impl PluginDescriptor {
    pub fn new(kind: PluginKind, constructor: impl Into<String>) -> Self {
        Self {
            kind,
            constructor: constructor.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    /// First constructor argument, where option objects live.
    pub fn options(&self) -> Option<&Value> {
        self.args.first()
    }
}
