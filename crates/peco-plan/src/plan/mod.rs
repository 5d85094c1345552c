//! The frozen build plan handed to the bundler runtime, and the append-only
//! builder that assembles it.

mod plugin;
mod rule;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::alias::{AliasTable, normalize_path};
use crate::context::{Mode, Target};
use crate::error::{ConfigurationError, Result};
use crate::reporter::{LifecycleReporter, ReporterSettings};
use crate::rules::assets::{self, AssetDisposition};

pub use plugin::{PluginDescriptor, PluginKind};
pub use rule::{LoaderStep, Pattern, Rule, RuleCondition, ScriptInclude, VariantRule};

pub const JS_FILENAME_PRODUCTION: &str = "_peco/assets/js/[name].[chunkhash:6].js";
pub const JS_FILENAME_DEVELOPMENT: &str = "_peco/assets/js/[name].js";
pub const CSS_FILENAME: &str = "_peco/assets/css/styles.[chunkhash:6].css";

const VENDOR_MODULES: &str = "node_modules";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub filename: String,
    pub public_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolve {
    pub extensions: Vec<String>,
    pub modules: Vec<String>,
    pub alias: AliasTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveLoader {
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRules {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Optimization {
    pub minimize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Performance {
    pub hints: bool,
}

/// Fully resolved configuration for one (mode, target) pair.
///
/// Immutable: every accessor borrows, nothing hands out `&mut`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    mode: Mode,
    #[serde(rename = "name")]
    target: Target,
    output: Output,
    resolve: Resolve,
    resolve_loader: ResolveLoader,
    module: ModuleRules,
    plugins: Vec<PluginDescriptor>,
    optimization: Optimization,
    performance: Performance,
    #[serde(skip)]
    reporter: ReporterSettings,
    #[serde(skip)]
    cwd: PathBuf,
}

impl Plan {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn public_path(&self) -> &str {
        &self.output.public_path
    }

    pub fn resolve(&self) -> &Resolve {
        &self.resolve
    }

    pub fn resolve_loader(&self) -> &ResolveLoader {
        &self.resolve_loader
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.resolve.alias
    }

    pub fn rules(&self) -> &[Rule] {
        &self.module.rules
    }

    pub fn rule(&self, key: &str) -> Option<&Rule> {
        self.module.rules.iter().find(|rule| rule.key == key)
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn plugin(&self, kind: PluginKind) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|plugin| plugin.kind == kind)
    }

    pub fn has_plugin(&self, kind: PluginKind) -> bool {
        self.plugin(kind).is_some()
    }

    pub fn optimization(&self) -> Optimization {
        self.optimization
    }

    /// Typed reporter to register with the runtime's lifecycle events.
    pub fn reporter(&self) -> LifecycleReporter {
        LifecycleReporter::new(self.reporter, self.cwd.clone())
    }

    /// First rule that applies to `resource`, with the loader chain it selects.
    pub fn match_resource(&self, resource: &str) -> Option<(&Rule, &[LoaderStep])> {
        self.module.rules.iter().find_map(|rule| {
            rule.loaders_for(resource, &self.resolve.alias)
                .map(|steps| (rule, steps))
        })
    }

    /// How an asset of `size` bytes at `resource` would be emitted.
    pub fn asset_disposition(&self, resource: &str, size: u64) -> Option<AssetDisposition> {
        let (_, steps) = self.match_resource(resource)?;
        assets::disposition(steps, size)
    }

    /// Bundler configuration object.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigurationError::InvalidValue(e.to_string()))
    }
}

/// Append-only accumulator. [`PlanBuilder::freeze`] validates and produces the [`Plan`].
#[derive(Debug)]
pub struct PlanBuilder {
    mode: Mode,
    target: Target,
    output: Option<Output>,
    aliases: AliasTable,
    module_dirs: Vec<String>,
    rules: Vec<Rule>,
    plugins: Vec<PluginDescriptor>,
    reporter: ReporterSettings,
    cwd: PathBuf,
}

impl PlanBuilder {
    pub fn new(mode: Mode, target: Target) -> Self {
        Self {
            mode,
            target,
            output: None,
            aliases: AliasTable::new(),
            module_dirs: Vec::new(),
            rules: Vec::new(),
            plugins: Vec::new(),
            reporter: ReporterSettings {
                mode,
                debug: false,
                port: 0,
            },
            cwd: PathBuf::from("."),
        }
    }

    pub fn output(&mut self, filename: impl Into<String>, public_path: impl Into<String>) -> &mut Self {
        self.output = Some(Output {
            filename: filename.into(),
            public_path: public_path.into(),
        });
        self
    }

    pub fn alias(&mut self, alias: impl Into<String>, target: impl AsRef<Path>) -> Result<&mut Self> {
        self.aliases.insert(alias, target)?;
        Ok(self)
    }

    /// Searched for modules and loaders before `node_modules`.
    pub fn module_dir(&mut self, dir: impl AsRef<Path>) -> &mut Self {
        let dir = normalize_path(dir.as_ref());
        if !self.module_dirs.contains(&dir) {
            self.module_dirs.push(dir);
        }
        self
    }

    pub fn rule(&mut self, rule: Rule) -> &mut Self {
        tracing::trace!(key = %rule.key, "added rule");
        self.rules.push(rule);
        self
    }

    pub fn plugin(&mut self, plugin: PluginDescriptor) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    pub fn reporter(&mut self, settings: ReporterSettings, cwd: impl Into<PathBuf>) -> &mut Self {
        self.reporter = settings;
        self.cwd = cwd.into();
        self
    }

    /// Validate and freeze.
    ///
    /// # Errors
    ///
    /// - `MissingField` when no output was set
    /// - `DuplicateRule` when two rules share a key
    /// - `InvalidValue` when a rule references an alias missing from the table
    ///   or carries a pattern that does not compile
    pub fn freeze(self) -> Result<Plan> {
        let output = self
            .output
            .ok_or_else(|| ConfigurationError::missing("output", "call PlanBuilder::output"))?;

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.key.as_str()) {
                return Err(ConfigurationError::DuplicateRule(rule.key.clone()));
            }
            if let Some(source) = rule.invalid_patterns().first() {
                return Err(ConfigurationError::InvalidValue(format!(
                    "rule '{}' has an invalid pattern '{source}'",
                    rule.key
                )));
            }
            if let Some(alias) = rule
                .referenced_aliases()
                .into_iter()
                .find(|alias| !self.aliases.contains(alias))
            {
                return Err(ConfigurationError::InvalidValue(format!(
                    "rule '{}' references unknown alias '{alias}'",
                    rule.key
                )));
            }
        }

        let mut modules = self.module_dirs;
        modules.push(VENDOR_MODULES.to_string());
        let minimize = self
            .plugins
            .iter()
            .any(|plugin| plugin.kind == PluginKind::Minimizer);

        Ok(Plan {
            mode: self.mode,
            target: self.target,
            output,
            resolve: Resolve {
                extensions: vec![".js".to_string(), ".json".to_string()],
                modules: modules.clone(),
                alias: self.aliases,
            },
            resolve_loader: ResolveLoader { modules },
            module: ModuleRules { rules: self.rules },
            plugins: self.plugins,
            optimization: Optimization { minimize },
            performance: Performance { hints: false },
            reporter: self.reporter,
            cwd: self.cwd,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PlanBuilder {
        let mut builder = PlanBuilder::new(Mode::Development, Target::Client);
        builder.output(JS_FILENAME_DEVELOPMENT, "/");
        builder
    }

    #[test]
    fn duplicate_rule_keys_are_rejected() {
        let mut builder = builder();
        builder
            .rule(Rule::new("js", RuleCondition::test(r"\.js$")))
            .rule(Rule::new("js", RuleCondition::test(r"\.mjs$")));

        assert!(matches!(
            builder.freeze(),
            Err(ConfigurationError::DuplicateRule(key)) if key == "js"
        ));
    }

    #[test]
    fn unknown_alias_in_rule_is_rejected() {
        let mut builder = builder();
        builder.rule(Rule::new(
            "js",
            RuleCondition::test(r"\.js$").with_include(ScriptInclude {
                roots: vec!["@theme".into()],
                vendor_dir: "node_modules".into(),
            }),
        ));
        assert!(matches!(builder.freeze(), Err(ConfigurationError::InvalidValue(_))));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let mut builder = builder();
        builder.rule(Rule::new("images", RuleCondition::test(r"\.(png|gif")));
        assert!(matches!(
            builder.freeze(),
            Err(ConfigurationError::InvalidValue(message)) if message.contains("images")
        ));
    }

    #[test]
    fn output_is_required() {
        let builder = PlanBuilder::new(Mode::Production, Target::Server);
        assert!(matches!(
            builder.freeze(),
            Err(ConfigurationError::MissingField { field, .. }) if field == "output"
        ));
    }

    #[test]
    fn module_dirs_end_with_node_modules() {
        let mut builder = builder();
        builder.module_dir("/opt/peco/node_modules").module_dir("/opt/peco/node_modules/");
        let plan = builder.freeze().unwrap();
        assert_eq!(plan.resolve().modules, ["/opt/peco/node_modules", "node_modules"]);
        assert_eq!(plan.resolve_loader().modules, plan.resolve().modules);
        assert!(!plan.optimization().minimize);
    }
}
