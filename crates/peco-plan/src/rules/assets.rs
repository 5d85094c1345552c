//! Binary asset rules and their inlining policy.

use serde_json::Value;

use crate::plan::{LoaderStep, Rule, RuleCondition};

/// Payloads up to this many bytes are base64-inlined.
pub const INLINE_LIMIT: u64 = 10_000;

pub const IMAGE_NAME: &str = "_peco/assets/img/[name].[hash:8].[ext]";
pub const MEDIA_NAME: &str = "_peco/assets/media/[name].[hash:8].[ext]";
pub const FONT_NAME: &str = "_peco/assets/fonts/[name].[hash:8].[ext]";

const URL_LOADER: &str = "url-loader";
const FILE_LOADER: &str = "file-loader";

/// What the bundler does with an asset of a given size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDisposition {
    /// Embedded as a base64 data URL
    Inline,
    /// Written as a separate hashed file
    Emit { name: String },
}

fn inlined(key: &str, pattern: &str, name: &str) -> Rule {
    Rule::new(key, RuleCondition::test(pattern)).with_step(
        LoaderStep::new(URL_LOADER)
            .option("limit", INLINE_LIMIT)
            .option("name", name),
    )
}

pub(crate) fn images() -> Rule {
    inlined("images", r"\.(png|jpe?g|gif)(\?.*)?$", IMAGE_NAME)
}

/// Vector images are always emitted as files; some renderers mishandle
/// inlined SVG markup.
pub(crate) fn svg() -> Rule {
    Rule::new("svg", RuleCondition::test(r"\.(svg)(\?.*)?$"))
        .with_step(LoaderStep::new(FILE_LOADER).option("name", IMAGE_NAME))
}

pub(crate) fn media() -> Rule {
    inlined("media", r"\.(mp4|webm|ogg|mp3|wav|flac|aac)(\?.*)?$", MEDIA_NAME)
}

pub(crate) fn fonts() -> Rule {
    inlined("fonts", r"(?i)\.(woff2?|eot|ttf|otf)(\?.*)?$", FONT_NAME)
}

/// Apply a rule's asset loader to a payload size. `None` when the chain has
/// no asset loader.
pub fn disposition(steps: &[LoaderStep], size: u64) -> Option<AssetDisposition> {
    let step = steps
        .iter()
        .find(|step| step.loader == URL_LOADER || step.loader == FILE_LOADER)?;
    let name = step
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("[name].[hash:8].[ext]")
        .to_string();

    if step.loader == URL_LOADER {
        let limit = step.get("limit").and_then(Value::as_u64).unwrap_or(0);
        if size <= limit {
            return Some(AssetDisposition::Inline);
        }
    }
    Some(AssetDisposition::Emit { name })
}
