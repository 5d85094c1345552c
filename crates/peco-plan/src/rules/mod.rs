//! Rule factory for every non-stylesheet file category.

pub mod assets;

use serde_json::json;

use crate::context::BuildContext;
use crate::css::{self, StyleDialect};
use crate::plan::{LoaderStep, Rule, RuleCondition, ScriptInclude};
use crate::schema::SchemaSource;

pub use assets::{AssetDisposition, INLINE_LIMIT};

/// Alias keys whose targets are always transpiled, even under `node_modules`.
pub const TRANSPILED_ROOTS: [&str; 2] = ["@theme", "dot-peco"];

/// Builds individual rules from a build context.
#[derive(Debug, Clone, Copy)]
pub struct RuleFactory<'a> {
    ctx: &'a BuildContext,
}

impl<'a> RuleFactory<'a> {
    pub fn new(ctx: &'a BuildContext) -> Self {
        Self { ctx }
    }

    /// `<peco>` blocks inside single-file components. Must precede the script rule.
    pub fn block(&self) -> Rule {
        Rule::new("peco-block", RuleCondition::resource_query("blockType=peco"))
            .with_step(LoaderStep::new("peco-block-loader"))
    }

    pub fn script(&self) -> Rule {
        let include = ScriptInclude {
            roots: TRANSPILED_ROOTS.iter().map(|s| s.to_string()).collect(),
            vendor_dir: "node_modules".to_string(),
        };
        let babel = LoaderStep::new("babel-loader")
            .option("babelrc", false)
            .option(
                "presets",
                json!([[
                    "@babel/preset-env",
                    {
                        "loose": true,
                        "exclude": ["transform-regenerator", "transform-async-to-generator"]
                    }
                ]]),
            )
            .option(
                "plugins",
                json!([
                    "@babel/plugin-syntax-dynamic-import",
                    ["fast-async", { "spec": true }],
                    ["graphql-aot/babel"]
                ]),
            );

        Rule::new("js", RuleCondition::test(r"\.js$").with_include(include)).with_step(babel)
    }

    pub fn images(&self) -> Rule {
        assets::images()
    }

    pub fn svg(&self) -> Rule {
        assets::svg()
    }

    pub fn media(&self) -> Rule {
        assets::media()
    }

    pub fn fonts(&self) -> Rule {
        assets::fonts()
    }

    /// `.gql` files. The schema is handed over as a deferred source.
    pub fn query(&self) -> Rule {
        let schema = self
            .ctx
            .query_schema
            .clone()
            .unwrap_or_else(SchemaSource::data_file);
        Rule::new("graphql", RuleCondition::test(r"\.gql$"))
            .with_step(LoaderStep::new("graphql-aot").loader("graphql-aot/loader").with_schema(schema))
    }

    pub fn stylesheet(&self, dialect: StyleDialect) -> Rule {
        css::generate_variants(dialect, self.ctx).into_rule()
    }

    /// Every rule, in emission order.
    pub fn all(&self) -> Vec<Rule> {
        let mut rules = vec![
            self.block(),
            self.script(),
            self.images(),
            self.svg(),
            self.media(),
            self.fonts(),
            self.query(),
        ];
        rules.extend(StyleDialect::ALL.into_iter().map(|d| self.stylesheet(d)));
        rules
    }
}
