use peco_plan::{BuildContext, BuildOptions, Mode, build_plan};
use serde_json::Value;

use super::{load_site, project_dir, resolved_dirs};
use crate::cli::{PlanArgs, TargetArg};
use crate::error::Result;

/// Print the plan JSON to stdout.
pub fn execute(args: PlanArgs) -> Result<()> {
    let output = render(&args)?;
    println!("{output}");
    Ok(())
}

/// Build the requested plans and serialize them.
///
/// A single target prints one plan object; `both` prints `[client, server]`.
pub fn render(args: &PlanArgs) -> Result<String> {
    let dir = project_dir(&args.project.dir)?;
    let site = load_site(&dir)?;
    let dirs = resolved_dirs(&dir, &args.module_dirs);
    let mode = Mode::from(args.project.mode);
    let options = BuildOptions {
        minimize: args.no_minimize.then_some(false),
        progress: args.no_progress.then_some(false),
        profile: args.profile,
        debug: args.debug,
        port: args.port,
        base_dir: dir.clone(),
    };

    let mut plans = Vec::new();
    for target in args.target.targets() {
        let ctx = BuildContext::new(mode, target, site.clone(), dirs.clone())
            .with_options(options.clone());
        let plan = build_plan(&ctx)?;
        tracing::info!(
            %mode,
            %target,
            rules = plan.rules().len(),
            plugins = plan.plugins().len(),
            "compiled plan"
        );
        plans.push(plan.to_value()?);
    }

    let value = match args.target {
        TargetArg::Both => Value::Array(plans),
        _ => plans.pop().unwrap_or(Value::Null),
    };
    let text = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}
