//! SKU-side models: layouts, bucket keys, stored records and catalog statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::component::Domain;

/// Separator between SKU segments.
pub const SKU_SEPARATOR: char = '-';

/// Code used when a route or routing segment carries no information.
pub const STANDARD_CODE: &str = "STD";

/// The two SKU layouts that coexist in a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkuLayout {
    /// `DOMAIN-ROUTE-ROUTING-TYPE-SEQ`
    Legacy,
    /// `DOMAIN-TYPE-SEQ`
    #[default]
    Simplified,
}

impl SkuLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Simplified => "simplified",
        }
    }

    /// Number of `-` separated parts a SKU of this layout has.
    pub fn part_count(&self) -> usize {
        match self {
            Self::Legacy => 5,
            Self::Simplified => 3,
        }
    }
}

impl FromStr for SkuLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "simplified" => Ok(Self::Simplified),
            other => Err(format!("unknown SKU layout '{}'", other)),
        }
    }
}

/// The tuple sharing one sequence counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketKey {
    Legacy {
        domain: Domain,
        route: String,
        routing: String,
        type_code: String,
    },
    /// Domain is the family, the type token the sub-family.
    Simplified { domain: Domain, type_code: String },
}

impl BucketKey {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Legacy { domain, .. } | Self::Simplified { domain, .. } => *domain,
        }
    }

    pub fn type_code(&self) -> &str {
        match self {
            Self::Legacy { type_code, .. } | Self::Simplified { type_code, .. } => type_code.as_str(),
        }
    }

    pub fn layout(&self) -> SkuLayout {
        match self {
            Self::Legacy { .. } => SkuLayout::Legacy,
            Self::Simplified { .. } => SkuLayout::Simplified,
        }
    }

    /// `(domain, route, routing, type_code)` as stored in the counter table.
    /// Simplified keys leave route and routing empty, which no legacy key can.
    pub fn storage_columns(&self) -> (&'static str, &str, &str, &str) {
        match self {
            Self::Legacy {
                domain,
                route,
                routing,
                type_code,
            } => (domain.code(), route.as_str(), routing.as_str(), type_code.as_str()),
            Self::Simplified { domain, type_code } => (domain.code(), "", "", type_code.as_str()),
        }
    }

    /// Joins the bucket segments and the encoded sequence into a SKU string.
    pub fn render(&self, sequence_code: &str) -> String {
        let parts: Vec<&str> = match self {
            Self::Legacy {
                domain,
                route,
                routing,
                type_code,
            } => vec![
                domain.code(),
                route.as_str(),
                routing.as_str(),
                type_code.as_str(),
                sequence_code,
            ],
            Self::Simplified { domain, type_code } => {
                vec![domain.code(), type_code.as_str(), sequence_code]
            }
        };
        parts.join(&SKU_SEPARATOR.to_string())
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy {
                domain,
                route,
                routing,
                type_code,
            } => write!(f, "{}/{}/{}/{}", domain, route, routing, type_code),
            Self::Simplified { domain, type_code } => write!(f, "{}/{}", domain, type_code),
        }
    }
}

/// Component snapshot persisted with its SKU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkuRecord {
    pub sku: String,
    pub fingerprint: String,
    pub layout: SkuLayout,
    pub name: String,
    pub description: String,
    pub domain: Domain,
    pub component_type: String,
    pub route: String,
    pub routing: String,
    pub type_code: String,
    pub sequence: u64,
    pub manufacturer: Option<String>,
    pub manufacturer_part: Option<String>,
    pub quantity: Option<f64>,
    pub designator: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One row of a grouped count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub key: String,
    pub count: u64,
}

/// Catalog-wide aggregate figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: u64,
    pub by_domain: Vec<CategoryCount>,
    pub by_route: Vec<CategoryCount>,
    pub by_routing: Vec<CategoryCount>,
}

impl CatalogStats {
    pub fn count_for_domain(&self, domain: Domain) -> u64 {
        self.by_domain
            .iter()
            .find(|c| c.key == domain.code())
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_legacy_and_simplified() {
        let legacy = BucketKey::Legacy {
            domain: Domain::Mechanical,
            route: STANDARD_CODE.to_string(),
            routing: "BOLT".to_string(),
            type_code: "VISSER".to_string(),
        };
        assert_eq!(legacy.render("AAAB"), "MECA-STD-BOLT-VISSER-AAAB");

        let simplified = BucketKey::Simplified {
            domain: Domain::Electrical,
            type_code: "RESIST".to_string(),
        };
        assert_eq!(simplified.render("AAAA"), "ELEC-RESIST-AAAA");
        assert_eq!(simplified.storage_columns(), ("ELEC", "", "", "RESIST"));
    }

    #[test]
    fn test_layout_part_counts_match_rendering() {
        let key = BucketKey::Simplified {
            domain: Domain::Electrical,
            type_code: "DIODES".to_string(),
        };
        let sku = key.render("AAAA");
        assert_eq!(sku.split(SKU_SEPARATOR).count(), key.layout().part_count());
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Legacy".parse::<SkuLayout>(), Ok(SkuLayout::Legacy));
        assert!("wide".parse::<SkuLayout>().is_err());
    }
}
