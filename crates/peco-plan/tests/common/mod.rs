//! Shared test utilities for peco-plan tests

#![allow(dead_code)]

use peco_plan::{BuildContext, BuildOptions, Mode, Plan, ResolvedDirs, SiteConfig, Target, build_plan};

pub const SITE: &str = "/srv/site";
pub const THEME: &str = "/srv/site/node_modules/peco-theme-default";

/// Context with a theme installed as a dependency, the common layout.
pub fn context(mode: Mode, target: Target) -> BuildContext {
    BuildContext::new(
        mode,
        target,
        SiteConfig::default().with_theme(THEME),
        ResolvedDirs::new(SITE).with_module_dir("/opt/peco/node_modules"),
    )
}

pub fn context_with(mode: Mode, target: Target, options: BuildOptions) -> BuildContext {
    context(mode, target).with_options(options)
}

pub fn plan(mode: Mode, target: Target) -> Plan {
    build_plan(&context(mode, target)).expect("plan should build")
}
