//! Plugin activation table.
//!
//! Each entry pairs an activation predicate with a factory. The table is
//! evaluated once per plan, top to bottom; the resulting order is the order
//! plugins appear in the plan.

use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::context::BuildContext;
use crate::plan::{CSS_FILENAME, PluginDescriptor, PluginKind};

type Predicate = fn(&BuildContext) -> bool;
type Factory = fn(&BuildContext) -> PluginDescriptor;

const PLUGIN_TABLE: &[(PluginKind, Predicate, Factory)] = &[
    (PluginKind::CssExtract, BuildContext::is_production_client, css_extract),
    (PluginKind::Minimizer, minimizer_active, minimizer),
    (PluginKind::Timefix, is_development, timefix),
    (PluginKind::ProgressBar, progress_active, progress_bar),
    (PluginKind::Reporter, always, reporter),
    (PluginKind::Constants, always, constants),
];

/// Evaluate the table against a context.
pub fn activate(ctx: &BuildContext) -> Vec<PluginDescriptor> {
    PLUGIN_TABLE
        .iter()
        .filter_map(|(kind, active, factory)| {
            let on = active(ctx);
            tracing::debug!(plugin = kind.key(), active = on, "plugin activation");
            on.then(|| factory(ctx))
        })
        .collect()
}

fn always(_: &BuildContext) -> bool {
    true
}

fn is_development(ctx: &BuildContext) -> bool {
    ctx.mode.is_development()
}

fn progress_active(ctx: &BuildContext) -> bool {
    ctx.options.progress_enabled()
}

/// Server bundles and development builds are never minified.
fn minimizer_active(ctx: &BuildContext) -> bool {
    ctx.is_production_client() && ctx.options.minimize_enabled()
}

fn css_extract(_: &BuildContext) -> PluginDescriptor {
    PluginDescriptor::new(PluginKind::CssExtract, "mini-css-extract-plugin")
        .arg(json!({ "filename": CSS_FILENAME }))
}

fn minimizer(_: &BuildContext) -> PluginDescriptor {
    PluginDescriptor::new(PluginKind::Minimizer, "uglifyjs-webpack-plugin").arg(json!({
        "cache": true,
        "parallel": true,
        "uglifyOptions": {
            "output": { "comments": false, "beautify": false },
            "ie8": false
        }
    }))
}

fn timefix(_: &BuildContext) -> PluginDescriptor {
    PluginDescriptor::new(PluginKind::Timefix, "time-fix-plugin")
}

fn progress_bar(ctx: &BuildContext) -> PluginDescriptor {
    let color = if ctx.target.is_client() {
        "cyanBright"
    } else {
        "magentaBright"
    };
    PluginDescriptor::new(PluginKind::ProgressBar, "webpackbar").arg(json!({
        "name": ctx.target.as_str(),
        "color": color,
        "profile": ctx.options.profile
    }))
}

fn reporter(ctx: &BuildContext) -> PluginDescriptor {
    PluginDescriptor::new(PluginKind::Reporter, "peco-reporter").arg(json!({
        "mode": ctx.mode.as_str(),
        "debug": ctx.options.debug,
        "port": ctx.options.port
    }))
}

fn constants(ctx: &BuildContext) -> PluginDescriptor {
    let definitions = define_constants(ctx);
    PluginDescriptor::new(PluginKind::Constants, "webpack.DefinePlugin").arg(json!(definitions))
}

/// Identifiers replaced by JSON literals in compiled output.
pub fn define_constants(ctx: &BuildContext) -> IndexMap<String, String> {
    let literal = |value: Value| value.to_string();
    let mut definitions = IndexMap::new();
    definitions.insert(
        "process.env.NODE_ENV".to_string(),
        literal(json!(ctx.mode.as_str())),
    );
    definitions.insert(
        "process.browser".to_string(),
        literal(json!(ctx.target.is_client())),
    );
    definitions.insert(
        "process.server".to_string(),
        literal(json!(ctx.target.is_server())),
    );
    definitions.insert(
        "__PUBLIC_PATH__".to_string(),
        literal(json!(ctx.public_path())),
    );
    if let Some(pwa) = &ctx.site.pwa {
        definitions.extend(pwa.constants());
    }
    definitions
}
