//! Build plan compiler for the peco site generator.
//!
//! Given a [`BuildContext`] (mode, target, theme, user options), [`build_plan`]
//! derives the complete declarative configuration the bundler runtime
//! executes: rules with their loader chains, resolution aliases, output
//! templates and lifecycle plugins. The plan is frozen once built.
//!
//! The library only emits `tracing` events; install a subscriber to see them.

pub mod alias;
pub mod builder;
pub mod config;
pub mod context;
pub mod css;
pub mod error;
pub mod plan;
pub mod plugins;
pub mod pwa;
pub mod reporter;
pub mod rules;
pub mod schema;
pub mod ssr;

pub use alias::AliasTable;
pub use builder::build_plan;
pub use config::{SiteConfig, StylesheetOptions, ThemeSettings};
pub use context::{BuildContext, BuildOptions, Mode, ResolvedDirs, Target};
pub use css::{CssVariant, CssVariants, StyleDialect, generate_variants};
pub use error::{ConfigurationError, Result};
pub use plan::{LoaderStep, Plan, PluginDescriptor, PluginKind, Rule, VariantRule};
pub use pwa::{PwaOptions, ServiceWorkerPlan};
pub use reporter::{BuildStats, CompletionReport, JsonStats, LifecycleHooks, LifecycleReporter};
pub use rules::{AssetDisposition, RuleFactory};
pub use schema::{SchemaProvider, SchemaSource};
