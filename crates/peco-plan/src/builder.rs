//! Plan construction.

use crate::context::BuildContext;
use crate::error::{ConfigurationError, Result};
use crate::plan::{JS_FILENAME_DEVELOPMENT, JS_FILENAME_PRODUCTION, Plan, PlanBuilder};
use crate::plugins;
use crate::reporter::ReporterSettings;
use crate::rules::RuleFactory;

/// Derive the bundler plan for one (mode, target) pair.
///
/// Pure: reads nothing but `ctx` and performs no I/O, so equal contexts give
/// equal plans.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] when the theme root is unset, a
/// stylesheet option bag names an unknown dialect, or a user alias collides
/// with a built-in one. Nothing is returned on failure.
///
/// # Example
///
/// ```
/// use peco_plan::{BuildContext, Mode, PluginKind, ResolvedDirs, SiteConfig, Target, build_plan};
///
/// let site = SiteConfig::default().with_theme("/site/themes/default");
/// let ctx = BuildContext::new(Mode::Production, Target::Client, site, ResolvedDirs::new("/site"));
///
/// let plan = build_plan(&ctx).unwrap();
/// assert!(plan.has_plugin(PluginKind::Minimizer));
/// assert!(plan.output().filename.contains("[chunkhash:6]"));
/// ```
pub fn build_plan(ctx: &BuildContext) -> Result<Plan> {
    let _span = tracing::debug_span!("build_plan", mode = %ctx.mode, target = %ctx.target).entered();

    let theme = ctx
        .site
        .theme
        .path
        .as_ref()
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or_else(|| {
            ConfigurationError::missing(
                "theme.path",
                "Set [theme] path in peco.toml or PECO_THEME__PATH",
            )
        })?;
    ctx.site.css.validate()?;

    let mut builder = PlanBuilder::new(ctx.mode, ctx.target);

    let filename = if ctx.mode.is_production() {
        JS_FILENAME_PRODUCTION
    } else {
        JS_FILENAME_DEVELOPMENT
    };
    builder.output(filename, ctx.public_path());

    for dir in &ctx.dirs.module_dirs {
        builder.module_dir(dir);
    }

    builder
        .alias("@theme", theme)?
        .alias("@theme-src", theme.join(&ctx.site.theme.src_dir))?
        .alias("dot-peco", &ctx.dirs.peco_dir)?
        .alias("@data", ctx.dirs.resolve_peco_dir(&["data"]))?
        .alias("vue$", "vue/dist/vue.esm.js")?
        .alias("@base", &ctx.options.base_dir)?;
    for (alias, target) in &ctx.site.aliases {
        builder.alias(alias.clone(), target)?;
    }

    for rule in RuleFactory::new(ctx).all() {
        builder.rule(rule);
    }

    for plugin in plugins::activate(ctx) {
        builder.plugin(plugin);
    }
    builder.reporter(
        ReporterSettings {
            mode: ctx.mode,
            debug: ctx.options.debug,
            port: ctx.options.port,
        },
        &ctx.dirs.cwd,
    );

    let plan = builder.freeze()?;
    tracing::debug!(
        rules = plan.rules().len(),
        plugins = plan.plugins().len(),
        minimize = plan.optimization().minimize,
        "plan built"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::context::{Mode, ResolvedDirs, Target};

    #[test]
    fn missing_theme_fails() {
        let ctx = BuildContext::new(
            Mode::Development,
            Target::Client,
            SiteConfig::default(),
            ResolvedDirs::new("/site"),
        );
        let err = build_plan(&ctx).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingField { ref field, .. } if field == "theme.path"));
        assert!(err.hint().is_some());

        let empty = BuildContext::new(
            Mode::Production,
            Target::Client,
            SiteConfig::default().with_theme(""),
            ResolvedDirs::new("/site"),
        );
        assert!(matches!(
            build_plan(&empty),
            Err(ConfigurationError::MissingField { ref field, .. }) if field == "theme.path"
        ));
    }

    #[test]
    fn user_alias_cannot_shadow_builtin() {
        let site = SiteConfig::default()
            .with_theme("/themes/default")
            .with_alias("@theme", "/elsewhere");
        let ctx = BuildContext::new(Mode::Development, Target::Client, site, ResolvedDirs::new("/site"));
        assert!(matches!(
            build_plan(&ctx),
            Err(ConfigurationError::AliasCollision { .. })
        ));
    }

    #[test]
    fn builtin_aliases() {
        let site = SiteConfig::default()
            .with_theme("/themes/default")
            .with_alias("@components", "/site/components");
        let ctx = BuildContext::new(Mode::Development, Target::Client, site, ResolvedDirs::new("/site"));
        let plan = build_plan(&ctx).unwrap();
        let aliases = plan.aliases();

        assert_eq!(aliases.get("@theme"), Some("/themes/default"));
        assert_eq!(aliases.get("@theme-src"), Some("/themes/default/src"));
        assert_eq!(aliases.get("dot-peco"), Some("/site/.peco"));
        assert_eq!(aliases.get("@data"), Some("/site/.peco/data"));
        assert_eq!(aliases.get("vue$"), Some("vue/dist/vue.esm.js"));
        assert_eq!(aliases.get("@base"), Some("."));
        assert_eq!(aliases.get("@components"), Some("/site/components"));
    }
}
