//! Build lifecycle reporter.
//!
//! The bundler runtime calls [`LifecycleHooks`] when a watched file changes and
//! when a compilation finishes. The reporter keeps no state between calls, so
//! it can be shared across threads and invoked re-entrantly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

use crate::context::Mode;

/// Typed callbacks the runtime adapter invokes.
pub trait LifecycleHooks: Send + Sync {
    /// A watched file changed and a rebuild is starting.
    fn on_invalidated(&self, filename: &Path, changed_at: DateTime<Utc>);

    /// A compilation finished, successfully or not.
    fn on_completed(&self, stats: &dyn BuildStats);
}

/// Read-only view of compilation results.
pub trait BuildStats {
    fn has_errors(&self) -> bool;
    fn has_warnings(&self) -> bool;
    fn to_report(&self, format: &StatsFormat) -> String;
}

/// Which sections of the stats report to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsFormat {
    pub colors: bool,
    pub version: bool,
    pub built_at: bool,
}

impl StatsFormat {
    /// Colored diagnostics only.
    pub const DIAGNOSTICS: StatsFormat = StatsFormat {
        colors: true,
        version: false,
        built_at: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReporterSettings {
    pub mode: Mode,
    pub debug: bool,
    pub port: u16,
}

/// What a completed build prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReport {
    /// Full diagnostic report; nothing else is printed for this cycle
    Diagnostics(String),
    /// Development server is ready
    Ready {
        url: String,
        playground: Option<String>,
    },
    /// Production build without diagnostics
    Quiet,
}

impl CompletionReport {
    pub fn lines(&self) -> Vec<String> {
        match self {
            CompletionReport::Diagnostics(report) => vec![report.clone()],
            CompletionReport::Ready { url, playground } => {
                let mut lines = vec![format!("> Open {url}")];
                if let Some(playground) = playground {
                    lines.push(
                        format!("> GraphQL playground is available at {playground}")
                            .dimmed()
                            .to_string(),
                    );
                }
                lines
            }
            CompletionReport::Quiet => Vec::new(),
        }
    }
}

/// Stateless reporter for compiler lifecycle events.
///
/// Usually obtained from [`Plan::reporter`](crate::Plan::reporter), which
/// carries the plan's mode, debug flag and port.
///
/// # Examples
///
/// ```
/// use peco_plan::reporter::ReporterSettings;
/// use peco_plan::{CompletionReport, JsonStats, LifecycleReporter, Mode};
/// use serde_json::json;
///
/// let reporter = LifecycleReporter::new(
///     ReporterSettings { mode: Mode::Development, debug: false, port: 4000 },
///     "/site",
/// );
///
/// let ready = reporter.render_completed(&JsonStats(json!({})));
/// assert_eq!(ready.lines(), ["> Open http://localhost:4000"]);
///
/// let failed = reporter.render_completed(&JsonStats(json!({ "errors": ["boom"] })));
/// assert!(matches!(failed, CompletionReport::Diagnostics(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReporter {
    settings: ReporterSettings,
    cwd: PathBuf,
}

impl LifecycleReporter {
    pub fn new(settings: ReporterSettings, cwd: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            cwd: cwd.into(),
        }
    }

    pub fn settings(&self) -> ReporterSettings {
        self.settings
    }

    /// Rebuild notice, only while developing.
    pub fn render_invalidated(&self, filename: &Path, changed_at: DateTime<Utc>) -> Option<String> {
        if !self.settings.mode.is_development() {
            return None;
        }
        let relative = relative_to(filename, &self.cwd);
        let message = format!(
            "> Rebuilding due to changes made in {} at {}",
            relative.display().cyan(),
            changed_at.format("%a %b %d %Y %H:%M:%S GMT%z")
        );
        Some(message.dimmed().to_string())
    }

    pub fn render_completed(&self, stats: &dyn BuildStats) -> CompletionReport {
        if stats.has_errors() || (self.settings.debug && stats.has_warnings()) {
            return CompletionReport::Diagnostics(stats.to_report(&StatsFormat::DIAGNOSTICS));
        }
        if !self.settings.mode.is_development() {
            return CompletionReport::Quiet;
        }
        let url = format!("http://localhost:{}", self.settings.port);
        let playground = self.settings.debug.then(|| format!("{url}/__graphql"));
        CompletionReport::Ready { url, playground }
    }
}

/// `path` relative to `base`, climbing with `..` where they diverge. Paths
/// with no common root are returned unchanged.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<_> = path.components().collect();
    let base: Vec<_> = base.components().collect();
    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return path.iter().collect();
    }
    let mut relative: PathBuf = base[common..].iter().map(|_| "..").collect();
    relative.extend(&path[common..]);
    relative
}

impl LifecycleHooks for LifecycleReporter {
    fn on_invalidated(&self, filename: &Path, changed_at: DateTime<Utc>) {
        if let Some(line) = self.render_invalidated(filename, changed_at) {
            println!("{line}");
        }
    }

    fn on_completed(&self, stats: &dyn BuildStats) {
        for line in self.render_completed(stats).lines() {
            println!("{line}");
        }
    }
}

/// Stats from a raw JSON object, as emitted by the runtime.
///
/// Reading is permissive: anything that is not a non-empty `errors` /
/// `warnings` array counts as "none", so malformed stats never fail a build.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStats(pub Value);

impl JsonStats {
    fn entries(&self, key: &str) -> &[Value] {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn describe(entry: &Value) -> String {
        match entry {
            Value::String(message) => message.clone(),
            Value::Object(fields) => {
                let message = fields
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown problem");
                match fields.get("moduleName").and_then(Value::as_str) {
                    Some(module) => format!("{module}\n{message}"),
                    None => message.to_string(),
                }
            }
            other => other.to_string(),
        }
    }
}

impl BuildStats for JsonStats {
    fn has_errors(&self) -> bool {
        !self.entries("errors").is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.entries("warnings").is_empty()
    }

    fn to_report(&self, format: &StatsFormat) -> String {
        let mut sections = Vec::new();

        if format.version {
            if let Some(version) = self.0.get("version").and_then(Value::as_str) {
                sections.push(format!("Version: {version}"));
            }
        }
        if format.built_at {
            if let Some(built_at) = self.0.get("builtAt").and_then(Value::as_i64) {
                sections.push(format!("Built at: {built_at}"));
            }
        }

        for (key, label) in [("errors", "ERROR"), ("warnings", "WARNING")] {
            for entry in self.entries(key) {
                let heading = if !format.colors {
                    format!("{label} in")
                } else if key == "errors" {
                    format!("{label} in").red().bold().to_string()
                } else {
                    format!("{label} in").yellow().bold().to_string()
                };
                sections.push(format!("{heading} {}", Self::describe(entry)));
            }
        }

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingStats;

    impl BuildStats for FailingStats {
        fn has_errors(&self) -> bool {
            true
        }
        fn has_warnings(&self) -> bool {
            false
        }
        fn to_report(&self, format: &StatsFormat) -> String {
            assert_eq!(*format, StatsFormat::DIAGNOSTICS);
            "ERROR in ./src/index.js".to_string()
        }
    }

    fn reporter(mode: Mode, debug: bool) -> LifecycleReporter {
        LifecycleReporter::new(
            ReporterSettings {
                mode,
                debug,
                port: 4000,
            },
            "/site",
        )
    }

    #[test]
    fn errors_short_circuit_the_ready_line() {
        let report = reporter(Mode::Development, false).render_completed(&FailingStats);
        assert_eq!(
            report,
            CompletionReport::Diagnostics("ERROR in ./src/index.js".into())
        );
        assert!(report.lines().iter().all(|line| !line.contains("> Open")));
    }

    #[test]
    fn warnings_only_reported_in_debug() {
        let stats = JsonStats(json!({ "warnings": ["size limit exceeded"] }));

        let quiet = reporter(Mode::Development, false).render_completed(&stats);
        assert!(matches!(quiet, CompletionReport::Ready { playground: None, .. }));

        let debug = reporter(Mode::Development, true).render_completed(&stats);
        let CompletionReport::Diagnostics(text) = &debug else {
            panic!("expected diagnostics, got {debug:?}");
        };
        assert!(text.contains("size limit exceeded"));
    }

    #[test]
    fn ready_line_and_playground() {
        let report = reporter(Mode::Development, true).render_completed(&JsonStats(json!({})));
        assert_eq!(
            report,
            CompletionReport::Ready {
                url: "http://localhost:4000".into(),
                playground: Some("http://localhost:4000/__graphql".into()),
            }
        );
        assert_eq!(report.lines()[0], "> Open http://localhost:4000");
    }

    #[test]
    fn production_success_is_quiet() {
        let report = reporter(Mode::Production, true).render_completed(&JsonStats(json!({})));
        assert_eq!(report, CompletionReport::Quiet);
        assert!(report.lines().is_empty());
    }

    #[test]
    fn malformed_stats_count_as_clean() {
        for raw in [json!(null), json!("oops"), json!({ "errors": "many" }), json!({ "errors": [] })] {
            let stats = JsonStats(raw);
            assert!(!stats.has_errors());
            assert!(!stats.has_warnings());
        }
    }

    #[test]
    fn invalidation_is_relative_and_development_only() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T10:20:30Z")
            .unwrap()
            .with_timezone(&Utc);

        let line = reporter(Mode::Development, false)
            .render_invalidated(Path::new("/site/pages/about.md"), at)
            .unwrap();
        assert!(line.contains("pages/about.md"));
        assert!(!line.contains("/site/pages"));
        assert!(line.contains("Fri Mar 01 2024 10:20:30"));

        assert!(
            reporter(Mode::Production, false)
                .render_invalidated(Path::new("/site/a.md"), at)
                .is_none()
        );
    }

    #[test]
    fn invalidation_outside_cwd_climbs_up() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T10:20:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let line = LifecycleReporter::new(
            ReporterSettings {
                mode: Mode::Development,
                debug: false,
                port: 4000,
            },
            "/srv/site",
        )
        .render_invalidated(Path::new("/srv/other/a.js"), at)
        .unwrap();
        assert!(line.contains("../other/a.js"));

        assert_eq!(relative_to(Path::new("/other/a.js"), Path::new("/site")), Path::new("../other/a.js"));
        assert_eq!(relative_to(Path::new("/site/a.js"), Path::new("/site")), Path::new("a.js"));
        assert_eq!(relative_to(Path::new("/site"), Path::new("/site/pages")), Path::new(".."));
        assert_eq!(relative_to(Path::new("a.js"), Path::new("/site")), Path::new("a.js"));
    }

    #[test]
    fn report_sections_follow_format() {
        let stats = JsonStats(json!({
            "version": "4.46.0",
            "builtAt": 1700000000000i64,
            "errors": ["boom"]
        }));
        let plain = StatsFormat {
            colors: false,
            ..StatsFormat::DIAGNOSTICS
        };
        assert_eq!(stats.to_report(&plain), "ERROR in boom");

        let full = StatsFormat {
            colors: false,
            version: true,
            built_at: true,
        };
        assert_eq!(
            stats.to_report(&full),
            "Version: 4.46.0\n\nBuilt at: 1700000000000\n\nERROR in boom"
        );
    }

    #[test]
    fn report_lists_errors_with_module() {
        let stats = JsonStats(json!({
            "errors": [{ "moduleName": "./theme/index.js", "message": "Unexpected token" }]
        }));
        let format = StatsFormat {
            colors: false,
            ..StatsFormat::DIAGNOSTICS
        };
        assert_eq!(
            stats.to_report(&format),
            "ERROR in ./theme/index.js\nUnexpected token"
        );
    }
}
