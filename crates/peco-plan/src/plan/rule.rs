//! Rules, match conditions and loader steps.

use std::path::Path;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::alias::{AliasTable, is_under, normalize_path};
use crate::css::CssVariant;
use crate::schema::SchemaSource;

/// Regular expression, compiled once when constructed.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Option<Regex>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source).ok();
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    /// Invalid sources never match; [`PlanBuilder::freeze`](crate::plan::PlanBuilder::freeze)
    /// rejects them before a plan can be used.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|re| re.is_match(haystack))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Script inclusion: a file is included when it lives under one of the aliased
/// roots, or when its path does not go through a vendored-dependency directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptInclude {
    /// Alias keys whose targets are always transpiled
    pub roots: Vec<String>,
    /// Directory name marking pre-compiled vendored code
    pub vendor_dir: String,
}

impl ScriptInclude {
    pub fn matches(&self, path: &Path, aliases: &AliasTable) -> bool {
        let path = normalize_path(path);
        let under_root = self
            .roots
            .iter()
            .filter_map(|alias| aliases.get(alias))
            .any(|root| is_under(&path, root));
        under_root || !path.contains(self.vendor_dir.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Pattern>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_query: Option<Pattern>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<ScriptInclude>,
}

impl RuleCondition {
    pub fn test(pattern: &str) -> Self {
        Self {
            test: Some(Pattern::new(pattern)),
            ..Self::default()
        }
    }

    pub fn resource_query(pattern: &str) -> Self {
        Self {
            resource_query: Some(Pattern::new(pattern)),
            ..Self::default()
        }
    }

    pub fn with_include(mut self, include: ScriptInclude) -> Self {
        self.include = Some(include);
        self
    }

    /// `resource` may carry a `?query` suffix; `test` sees only the path,
    /// `resourceQuery` only the query.
    pub fn matches(&self, resource: &str, aliases: &AliasTable) -> bool {
        let (path, query) = split_resource(resource);

        if let Some(test) = &self.test {
            if !test.is_match(path) {
                return false;
            }
        }
        if let Some(pattern) = &self.resource_query {
            match query {
                Some(query) if pattern.is_match(query) => {}
                _ => return false,
            }
        }
        if let Some(include) = &self.include {
            if !include.matches(Path::new(path), aliases) {
                return false;
            }
        }
        true
    }
}

fn split_resource(resource: &str) -> (&str, Option<&str>) {
    match resource.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (resource, None),
    }
}

/// One named transform stage and its option bag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoaderStep {
    /// Use identifier, unique within a chain
    #[serde(rename = "name")]
    pub name: String,

    pub loader: String,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,

    /// Evaluated by the loader at transform time
    #[serde(rename = "useSchema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaSource>,
}

impl LoaderStep {
    /// A step whose loader is named after the step.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            loader: name.clone(),
            name,
            options: Map::new(),
            schema: None,
        }
    }

    pub fn loader(mut self, loader: impl Into<String>) -> Self {
        self.loader = loader.into();
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Merge `extra` over the current options; later keys win.
    pub fn merge_options(mut self, extra: &Map<String, Value>) -> Self {
        for (key, value) in extra {
            self.options.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn with_schema(mut self, schema: SchemaSource) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// One branch of a `oneOf` rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRule {
    #[serde(rename = "name")]
    pub variant: CssVariant,

    #[serde(flatten)]
    pub condition: RuleCondition,

    /// Authoring order; the bundler runs them last to first
    #[serde(rename = "use")]
    pub uses: Vec<LoaderStep>,
}

impl VariantRule {
    /// Loaders in the order they transform a file.
    pub fn execution_order(&self) -> impl Iterator<Item = &LoaderStep> {
        self.uses.iter().rev()
    }

    pub fn step(&self, name: &str) -> Option<&LoaderStep> {
        self.uses.iter().find(|step| step.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub key: String,

    #[serde(flatten)]
    pub condition: RuleCondition,

    /// Authoring order; the bundler runs them last to first
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<LoaderStep>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<VariantRule>,
}

impl Rule {
    pub fn new(key: impl Into<String>, condition: RuleCondition) -> Self {
        Self {
            key: key.into(),
            condition,
            uses: Vec::new(),
            one_of: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: LoaderStep) -> Self {
        self.uses.push(step);
        self
    }

    pub fn with_variant(mut self, variant: VariantRule) -> Self {
        self.one_of.push(variant);
        self
    }

    pub fn step(&self, name: &str) -> Option<&LoaderStep> {
        self.uses.iter().find(|step| step.name == name)
    }

    pub fn variant(&self, variant: CssVariant) -> Option<&VariantRule> {
        self.one_of.iter().find(|rule| rule.variant == variant)
    }

    /// Loaders in the order they transform a file.
    pub fn execution_order(&self) -> impl Iterator<Item = &LoaderStep> {
        self.uses.iter().rev()
    }

    /// Every alias key this rule depends on.
    pub fn referenced_aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = Vec::new();
        let conditions =
            std::iter::once(&self.condition).chain(self.one_of.iter().map(|v| &v.condition));
        for condition in conditions {
            if let Some(include) = &condition.include {
                aliases.extend(include.roots.iter().map(String::as_str));
            }
        }
        let steps = self
            .uses
            .iter()
            .chain(self.one_of.iter().flat_map(|v| v.uses.iter()));
        aliases.extend(steps.filter_map(|step| step.schema.as_ref()?.alias()));
        aliases
    }

    /// Pattern sources in this rule that failed to compile.
    pub fn invalid_patterns(&self) -> Vec<&str> {
        std::iter::once(&self.condition)
            .chain(self.one_of.iter().map(|v| &v.condition))
            .flat_map(|condition| [&condition.test, &condition.resource_query])
            .flatten()
            .filter(|pattern| !pattern.is_valid())
            .map(Pattern::as_str)
            .collect()
    }

    /// Resolve which loader chain applies to `resource`, honouring `oneOf`
    /// (first matching branch wins).
    pub fn loaders_for(&self, resource: &str, aliases: &AliasTable) -> Option<&[LoaderStep]> {
        if !self.condition.matches(resource, aliases) {
            return None;
        }
        if self.one_of.is_empty() {
            return Some(&self.uses);
        }
        self.one_of
            .iter()
            .find(|branch| branch.condition.matches(resource, aliases))
            .map(|branch| branch.uses.as_slice())
    }
}
