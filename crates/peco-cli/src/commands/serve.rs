use std::path::Path;

use anyhow::Context;
use peco_plan::{Mode, SiteConfig};

use super::{load_site, project_dir};
use crate::cli::ServeArgs;
use crate::dev::{self, ServeOptions};
use crate::error::Result;

/// Serve `<dir>/.peco/website` (or the given root) until interrupted.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let dir = project_dir(&args.dir)?;
    let site = load_site(&dir)?;
    dev::serve(serve_options(&args, &site, &dir))
        .await
        .context("development server stopped")?;
    Ok(())
}

/// The service-worker stand-in replaces the real worker only on the
/// development server of a PWA-enabled site.
pub(crate) fn serve_options(args: &ServeArgs, site: &SiteConfig, dir: &Path) -> ServeOptions {
    let root = match &args.root {
        Some(root) if root.is_relative() => dir.join(root),
        Some(root) => root.clone(),
        None => dir.join(".peco").join(peco_plan::pwa::WEBSITE_DIR),
    };
    ServeOptions {
        root,
        port: args.port,
        service_worker: site.pwa.is_some() && Mode::from(args.mode).is_development(),
    }
}
