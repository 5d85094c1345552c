//! Stylesheet rules: one shared matcher per dialect, branching into a
//! CSS-Modules variant and a plain variant.
//!
//! Scoping is decided per import site (`import s from './a.css?module'`), not
//! per file, so both variants live side by side under the same `test` and the
//! `module` resource query picks between them.
//!
//! Loader chains are built in authoring order:
//!
//! 1. style stage (client only): extraction in production, injection in development
//! 2. `css-loader`, or `css-loader/locals` on the server
//! 3. `postcss-loader`
//! 4. dialect preprocessor, when the dialect has one
//!
//! The bundler executes them in reverse, so the preprocessor sees the source
//! first and the style stage sees the final CSS.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::BuildContext;
use crate::error::ConfigurationError;
use crate::plan::{LoaderStep, Rule, RuleCondition, VariantRule};

pub const LOCAL_IDENT_NAME: &str = "[local]_[hash:base64:8]";
pub const EXTRACT_LOADER: &str = "extract-css-loader";
pub const INJECT_LOADER: &str = "vue-style-loader";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleDialect {
    Css,
    Scss,
    Sass,
    Less,
    Stylus,
}

impl StyleDialect {
    /// Rule emission order.
    pub const ALL: [StyleDialect; 5] = [
        StyleDialect::Css,
        StyleDialect::Scss,
        StyleDialect::Sass,
        StyleDialect::Less,
        StyleDialect::Stylus,
    ];

    /// Rule key and option-bag key
    pub fn key(&self) -> &'static str {
        match self {
            StyleDialect::Css => "css",
            StyleDialect::Scss => "scss",
            StyleDialect::Sass => "sass",
            StyleDialect::Less => "less",
            StyleDialect::Stylus => "stylus",
        }
    }

    pub fn test_pattern(&self) -> &'static str {
        match self {
            StyleDialect::Css => r"\.css$",
            StyleDialect::Scss => r"\.scss$",
            StyleDialect::Sass => r"\.sass$",
            StyleDialect::Less => r"\.less$",
            StyleDialect::Stylus => r"\.styl(us)?$",
        }
    }

    /// Preprocessor loader, `None` for plain CSS.
    pub fn preprocessor(&self) -> Option<&'static str> {
        match self {
            StyleDialect::Css => None,
            StyleDialect::Scss | StyleDialect::Sass => Some("sass-loader"),
            StyleDialect::Less => Some("less-loader"),
            StyleDialect::Stylus => Some("stylus-loader"),
        }
    }

    /// Options applied before the user's bag.
    fn default_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        if let StyleDialect::Stylus = self {
            options.insert("preferPathResolver".into(), Value::from("webpack"));
        }
        options
    }
}

impl fmt::Display for StyleDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StyleDialect {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleDialect::ALL
            .into_iter()
            .find(|dialect| dialect.key() == s)
            .ok_or_else(|| ConfigurationError::UnknownDialect(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CssVariant {
    /// Locally scoped class names, selected by the `module` query
    Modules,
    /// Global class names
    Normal,
}

impl CssVariant {
    pub fn key(&self) -> &'static str {
        match self {
            CssVariant::Modules => "modules",
            CssVariant::Normal => "normal",
        }
    }

    /// Value of the css-loader `modules` flag.
    pub fn scoped(&self) -> bool {
        matches!(self, CssVariant::Modules)
    }

    fn condition(&self) -> RuleCondition {
        match self {
            CssVariant::Modules => RuleCondition::resource_query("module"),
            CssVariant::Normal => RuleCondition::default(),
        }
    }
}

/// The two sibling branches generated for one dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct CssVariants {
    pub dialect: StyleDialect,
    pub modules: VariantRule,
    pub normal: VariantRule,
}

impl CssVariants {
    /// Shared matcher with `modules` tried before `normal`.
    pub fn into_rule(self) -> Rule {
        Rule::new(
            self.dialect.key(),
            RuleCondition::test(self.dialect.test_pattern()),
        )
        .with_variant(self.modules)
        .with_variant(self.normal)
    }
}

/// Build the `modules` and `normal` branches for one stylesheet dialect.
///
/// Both branches share the dialect's test pattern. They differ only in the
/// `module` resource query and in the css-loader `modules` flag.
///
/// # Arguments
///
/// * `dialect` - Stylesheet language to generate loader chains for
/// * `ctx` - Build context; mode and target pick the style stage
///
/// # Examples
///
/// ```
/// use peco_plan::{BuildContext, CssVariant, Mode, ResolvedDirs, SiteConfig, StyleDialect, Target};
/// use peco_plan::generate_variants;
/// use serde_json::json;
///
/// let site = SiteConfig::default().with_theme("/site/theme");
/// let ctx = BuildContext::new(Mode::Production, Target::Client, site, ResolvedDirs::new("/site"));
///
/// let variants = generate_variants(StyleDialect::Scss, &ctx);
/// assert_eq!(variants.modules.variant, CssVariant::Modules);
///
/// let loaders: Vec<_> = variants.normal.uses.iter().map(|s| s.loader.as_str()).collect();
/// assert_eq!(loaders, ["extract-css-loader", "css-loader", "postcss-loader", "sass-loader"]);
/// assert_eq!(variants.modules.step("css-loader").unwrap().get("modules"), Some(&json!(true)));
/// ```
pub fn generate_variants(dialect: StyleDialect, ctx: &BuildContext) -> CssVariants {
    let branch = |variant: CssVariant| VariantRule {
        variant,
        condition: variant.condition(),
        uses: variant_loaders(dialect, variant, ctx),
    };
    CssVariants {
        dialect,
        modules: branch(CssVariant::Modules),
        normal: branch(CssVariant::Normal),
    }
}

/// Loader chain for one variant, in authoring order.
pub fn variant_loaders(
    dialect: StyleDialect,
    variant: CssVariant,
    ctx: &BuildContext,
) -> Vec<LoaderStep> {
    let production = ctx.mode.is_production();
    let server = ctx.target.is_server();
    let source_map = !production;
    let mut chain = Vec::with_capacity(4);

    if !server {
        chain.push(if production {
            LoaderStep::new(EXTRACT_LOADER)
        } else {
            LoaderStep::new(INJECT_LOADER)
        });
    }

    chain.push(
        LoaderStep::new("css-loader")
            .loader(if server {
                "css-loader/locals"
            } else {
                "css-loader"
            })
            .option("modules", variant.scoped())
            .option("sourceMap", source_map)
            .option("localIdentName", LOCAL_IDENT_NAME)
            .option("importLoaders", 1)
            .option("minimize", production),
    );

    chain.push(
        LoaderStep::new("postcss-loader")
            .option("sourceMap", source_map)
            .merge_options(&ctx.site.css.postcss),
    );

    if let Some(loader) = dialect.preprocessor() {
        let mut step = LoaderStep::new(loader)
            .option("sourceMap", source_map)
            .merge_options(&dialect.default_options())
            .merge_options(&ctx.site.css.preprocessor_options(dialect));
        if dialect == StyleDialect::Sass {
            step = step.option("indentedSyntax", true);
        }
        chain.push(step);
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::context::{Mode, ResolvedDirs, Target};
    use serde_json::json;

    fn ctx(mode: Mode, target: Target) -> BuildContext {
        BuildContext::new(
            mode,
            target,
            SiteConfig::default().with_theme("/themes/default"),
            ResolvedDirs::new("/site"),
        )
    }

    fn names(steps: &[LoaderStep]) -> Vec<&str> {
        steps.iter().map(|s| s.loader.as_str()).collect()
    }

    #[test]
    fn client_development_injects_styles() {
        let steps = variant_loaders(
            StyleDialect::Scss,
            CssVariant::Normal,
            &ctx(Mode::Development, Target::Client),
        );
        assert_eq!(
            names(&steps),
            ["vue-style-loader", "css-loader", "postcss-loader", "sass-loader"]
        );
        assert_eq!(steps[1].get("sourceMap"), Some(&json!(true)));
        assert_eq!(steps[1].get("minimize"), Some(&json!(false)));
    }

    #[test]
    fn client_production_extracts_styles() {
        let steps = variant_loaders(
            StyleDialect::Css,
            CssVariant::Modules,
            &ctx(Mode::Production, Target::Client),
        );
        assert_eq!(names(&steps), ["extract-css-loader", "css-loader", "postcss-loader"]);
        assert_eq!(steps[1].get("modules"), Some(&json!(true)));
        assert_eq!(steps[1].get("sourceMap"), Some(&json!(false)));
        assert_eq!(steps[2].get("sourceMap"), Some(&json!(false)));
    }

    #[test]
    fn server_uses_locals_without_style_stage() {
        for mode in [Mode::Development, Mode::Production] {
            let steps = variant_loaders(StyleDialect::Less, CssVariant::Normal, &ctx(mode, Target::Server));
            assert_eq!(names(&steps), ["css-loader/locals", "postcss-loader", "less-loader"]);
        }
    }

    #[test]
    fn execution_runs_preprocessor_first() {
        let variants = generate_variants(StyleDialect::Stylus, &ctx(Mode::Development, Target::Client));
        let order: Vec<_> = variants
            .normal
            .execution_order()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            order,
            ["stylus-loader", "postcss-loader", "css-loader", "vue-style-loader"]
        );
        assert_eq!(
            variants.normal.step("stylus-loader").unwrap().get("preferPathResolver"),
            Some(&json!("webpack"))
        );
    }

    #[test]
    fn indented_syntax_is_forced() {
        let mut context = ctx(Mode::Development, Target::Client);
        context.site.css.preprocessors.insert(
            "sass".into(),
            Map::from_iter([
                ("indentedSyntax".to_string(), json!(false)),
                ("sourceMap".to_string(), json!(false)),
            ]),
        );

        let sass = variant_loaders(StyleDialect::Sass, CssVariant::Normal, &context);
        let step = sass.last().unwrap();
        assert_eq!(step.get("indentedSyntax"), Some(&json!(true)));
        // the user's bag still overrides source-map toggling
        assert_eq!(step.get("sourceMap"), Some(&json!(false)));

        let scss = variant_loaders(StyleDialect::Scss, CssVariant::Normal, &context);
        assert_eq!(scss.last().unwrap().get("indentedSyntax"), Some(&json!(false)));
    }

    #[test]
    fn postcss_options_are_merged() {
        let mut context = ctx(Mode::Production, Target::Client);
        context
            .site
            .css
            .postcss
            .insert("plugins".into(), json!(["autoprefixer"]));

        let steps = variant_loaders(StyleDialect::Css, CssVariant::Normal, &context);
        let postcss = &steps[2];
        assert_eq!(postcss.get("plugins"), Some(&json!(["autoprefixer"])));
        assert_eq!(postcss.get("sourceMap"), Some(&json!(false)));
    }

    #[test]
    fn modules_branch_is_tried_first() {
        let rule = generate_variants(StyleDialect::Css, &ctx(Mode::Development, Target::Client)).into_rule();
        assert_eq!(rule.key, "css");
        assert_eq!(rule.one_of[0].variant, CssVariant::Modules);
        assert_eq!(rule.one_of[1].variant, CssVariant::Normal);
        assert!(rule.uses.is_empty());
    }

    #[test]
    fn dialect_names_round_trip() {
        for dialect in StyleDialect::ALL {
            assert_eq!(dialect.key().parse::<StyleDialect>().unwrap(), dialect);
        }
        assert!(matches!(
            "postcss".parse::<StyleDialect>(),
            Err(ConfigurationError::UnknownDialect(_))
        ));
    }
}
