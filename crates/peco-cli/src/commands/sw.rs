use peco_plan::pwa::{self, ServiceWorkerPlan};
use peco_plan::{BuildContext, Mode, Target};
use serde::Serialize;

use super::{load_site, project_dir, resolved_dirs};
use crate::cli::SwArgs;
use crate::error::Result;
use crate::ui;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwOutput {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<ServiceWorkerPlan>,
    app_enhance_files: Vec<&'static str>,
}

pub fn execute(args: SwArgs) -> Result<()> {
    let output = render(&args)?;
    println!("{output}");
    Ok(())
}

/// Describe the service worker for the client build. With PWA off this is
/// `{"enabled": false}` and nothing is written.
pub fn render(args: &SwArgs) -> Result<String> {
    let dir = project_dir(&args.project.dir)?;
    let site = load_site(&dir)?;
    let dirs = resolved_dirs(&dir, &[]);

    let Some(options) = site.pwa.clone() else {
        ui::warning("PWA is not enabled in peco.toml; no service worker to plan");
        return Ok(serde_json::to_string_pretty(&SwOutput {
            enabled: false,
            plan: None,
            app_enhance_files: Vec::new(),
        })?);
    };

    let ctx = BuildContext::new(Mode::from(args.project.mode), Target::Client, site, dirs);
    let plan = ServiceWorkerPlan::new(&ctx.dirs, ctx.public_path());

    if !args.dry_run {
        let written = pwa::write_sw_events(&ctx.dirs.resolve_peco_dir(&[pwa::WEBSITE_DIR]))?;
        ui::success(&format!("Wrote {}", written.display()));
    }

    Ok(serde_json::to_string_pretty(&SwOutput {
        enabled: true,
        plan: Some(plan),
        app_enhance_files: options.enhance_app_files(),
    })?)
}
