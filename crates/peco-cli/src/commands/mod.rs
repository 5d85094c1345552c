//! Command implementations.

mod plan;
mod serve;
mod sw;

use std::path::{Path, PathBuf};

use peco_plan::{ResolvedDirs, SiteConfig};

use crate::error::{CliError, Result};

pub use plan::{execute as plan_execute, render as render_plan};
pub use serve::execute as serve_execute;
pub use sw::{execute as sw_execute, render as render_sw};

/// Absolute project directory. Fails when it does not exist.
pub(crate) fn project_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(CliError::DirNotFound(dir.to_path_buf()));
    }
    Ok(std::path::absolute(dir)?)
}

/// Site config for a project, with a relative theme path anchored at the project.
pub(crate) fn load_site(dir: &Path) -> Result<SiteConfig> {
    let mut site = SiteConfig::load(dir)?;
    if let Some(theme) = site.theme.path.as_mut() {
        // an empty path stays empty so plan construction reports it as unset
        if theme.is_relative() && !theme.as_os_str().is_empty() {
            *theme = dir.join(&*theme);
        }
    }
    tracing::debug!(dir = %dir.display(), pwa = site.pwa.is_some(), "loaded project");
    Ok(site)
}

pub(crate) fn resolved_dirs(dir: &Path, module_dirs: &[PathBuf]) -> ResolvedDirs {
    module_dirs
        .iter()
        .fold(ResolvedDirs::new(dir), |dirs, module_dir| {
            dirs.with_module_dir(dir.join(module_dir))
        })
}
