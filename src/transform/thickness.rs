//! Board thickness resolution for a part border.
//!
//! Newer borders carry the thickness as an attribute tag. Older ones do not,
//! so a missing or unreadable tag falls back to asking the operator.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::model::ElementId;
use crate::session::{Interaction, Metadata, NumberConstraints};

/// Thickness prompt text.
pub const THICKNESS_PROMPT: &str = "Please enter valid thickness:";

/// Parse a thickness tag value. Only finite positive numbers count.
pub fn parse_thickness(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t > 0.0)
}

/// Scan tags for a thickness. Later matching tags override earlier ones; an
/// unreadable tag keeps the value found so far. Returns 0 when nothing usable
/// was found.
pub fn thickness_from_tags(
    tags: &BTreeMap<String, String>,
    marker: &str,
    prompt: &mut dyn Interaction,
) -> f64 {
    let mut quantity = 0.0;

    for (tag, value) in tags {
        if !tag.contains(marker) {
            continue;
        }
        match parse_thickness(value) {
            Some(t) => {
                debug!("Thickness {} from tag {}", t, tag);
                quantity = t;
            }
            None => {
                warn!("Tag {} has unusable thickness '{}'", tag, value);
                prompt.message("Check if thickness is valid number");
            }
        }
    }

    quantity
}

/// Resolve the nominal thickness of a border, prompting when the tags do not
/// provide one. A declined prompt leaves the thickness at 0.
pub fn resolve_thickness<M: Metadata + ?Sized>(
    metadata: &M,
    border: ElementId,
    prompt: &mut dyn Interaction,
    config: &PipelineConfig,
) -> f64 {
    let tags = metadata.tags_of(border);
    let quantity = thickness_from_tags(&tags, &config.thickness_tag, prompt);
    if quantity > 0.0 {
        return quantity;
    }

    prompt.message("No board thickness specified");
    match prompt.prompt_number(
        THICKNESS_PROMPT,
        config.default_thickness,
        NumberConstraints::POSITIVE,
    ) {
        Some(answer) => answer,
        None => {
            warn!("Part {}: thickness prompt declined", border);
            quantity
        }
    }
}
