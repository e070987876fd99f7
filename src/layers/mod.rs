//! Layer depth policy: which drafting layers are cuts, and how deep.
//!
//! Route and pocket layers encode a fixed depth in their name. The full-depth
//! layer cuts through the whole board, so its depth is the part's nominal
//! thickness. Any other layer is annotation or reference geometry and resolves
//! to a depth of 0, which callers treat as "do not extrude".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Depth a layer rule cuts to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    /// Fixed depth independent of board thickness.
    Fixed(f64),
    /// The part's nominal board thickness.
    NominalThickness,
}

impl Depth {
    /// Depth for a board of the given thickness.
    pub fn for_thickness(&self, nominal_thickness: f64) -> f64 {
        match self {
            Depth::Fixed(depth) => *depth,
            Depth::NominalThickness => nominal_thickness,
        }
    }
}

/// A set of layer aliases sharing one depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthRule {
    pub aliases: Vec<String>,
    pub depth: Depth,
}

impl DepthRule {
    /// Create a rule from aliases.
    pub fn new<I, S>(aliases: I, depth: Depth) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            depth,
        }
    }
}

/// Normalized lookup key for a layer name.
fn layer_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Ordered, validated list of depth rules with a case-insensitive index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<DepthRule>", into = "Vec<DepthRule>")]
pub struct LayerTable {
    rules: Vec<DepthRule>,
    index: HashMap<String, usize>,
}

impl LayerTable {
    /// Build a table, rejecting empty rules, bad depths and repeated aliases.
    pub fn new(rules: Vec<DepthRule>) -> Result<Self> {
        let mut index = HashMap::new();

        for (i, rule) in rules.iter().enumerate() {
            if rule.aliases.is_empty() {
                return Err(ConvertError::EmptyLayerRule { index: i });
            }

            for alias in &rule.aliases {
                if let Depth::Fixed(depth) = rule.depth {
                    if !(depth.is_finite() && depth > 0.0) {
                        return Err(ConvertError::InvalidLayerDepth {
                            alias: alias.clone(),
                            depth,
                        });
                    }
                }

                if index.insert(layer_key(alias), i).is_some() {
                    return Err(ConvertError::DuplicateLayerAlias {
                        alias: alias.clone(),
                    });
                }
            }
        }

        Ok(Self { rules, index })
    }

    /// The shop's standard router layers.
    pub fn standard() -> Self {
        let rules = standard_rules();
        let mut index = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            for alias in &rule.aliases {
                index.entry(layer_key(alias)).or_insert(i);
            }
        }
        Self { rules, index }
    }

    /// Rules in table order.
    pub fn rules(&self) -> &[DepthRule] {
        &self.rules
    }

    /// Rule matching a layer name, if any.
    pub fn rule_for(&self, layer: &str) -> Option<&DepthRule> {
        self.index.get(&layer_key(layer)).map(|&i| &self.rules[i])
    }

    /// Check if curves on this layer are cut.
    pub fn is_cut_layer(&self, layer: &str) -> bool {
        self.rule_for(layer).is_some()
    }

    /// Extrusion depth for a layer, or 0 when the layer is not a cut layer.
    pub fn resolve_depth(&self, layer: &str, nominal_thickness: f64) -> f64 {
        self.rule_for(layer)
            .map(|rule| rule.depth.for_thickness(nominal_thickness))
            .unwrap_or(0.0)
    }
}

impl Default for LayerTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<DepthRule>> for LayerTable {
    type Error = ConvertError;

    fn try_from(rules: Vec<DepthRule>) -> Result<Self> {
        Self::new(rules)
    }
}

impl From<LayerTable> for Vec<DepthRule> {
    fn from(table: LayerTable) -> Self {
        table.rules
    }
}

/// Standard router layers. Host layer names cannot contain '/', so each
/// fraction also has its hyphenated spelling.
pub fn standard_rules() -> Vec<DepthRule> {
    vec![
        DepthRule::new(
            [
                "1/8 ROUTE",
                "EIGHTH ROUTE",
                "POCKET CUT 1/8",
                "1-8 ROUTE",
                "POCKET CUT 1-8",
            ],
            Depth::Fixed(0.125),
        ),
        DepthRule::new(
            [
                "1/4 ROUTE",
                "QUARTER ROUTE",
                "POCKET CUT 1/4",
                "1/4 ROUTER 1/4 DEPTH",
                "1-4 ROUTE",
                "POCKET CUT 1-4",
                "1-4 ROUTER 1-4 DEPTH",
            ],
            Depth::Fixed(0.25),
        ),
        DepthRule::new(
            ["3/8 ROUTE", "POCKET CUT 3/8", "3-8 ROUTE", "POCKET CUT 3-8"],
            Depth::Fixed(0.375),
        ),
        DepthRule::new(
            [
                "7/16 ROUTE",
                "POCKET CUT 7/16",
                "7-16 ROUTE",
                "POCKET CUT 7-16",
            ],
            Depth::Fixed(0.4375),
        ),
        DepthRule::new(["FULL DEPTH"], Depth::NominalThickness),
    ]
}

/// Depth for a layer under the standard table.
pub fn resolve_depth(layer: &str, nominal_thickness: f64) -> f64 {
    LayerTable::standard().resolve_depth(layer, nominal_thickness)
}
