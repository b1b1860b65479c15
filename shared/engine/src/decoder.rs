//! SKU decoding into human-readable parts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use partcode_models::{Domain, SkuLayout, SKU_SEPARATOR};
use partcode_utils::{PartcodeError, PartcodeResult};

use crate::codec::AlphabetCodec;
use crate::tables::ClassificationTables;

/// A SKU segment and what it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLabel {
    pub code: String,
    pub label: String,
}

impl CodeLabel {
    fn new(code: &str, label: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            label: label.unwrap_or(code).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSegment {
    pub code: String,
    /// `None` when the segment is not a valid sequence code.
    pub value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum DecodedSku {
    Legacy {
        domain: CodeLabel,
        route: CodeLabel,
        routing: CodeLabel,
        type_code: CodeLabel,
        sequence: SequenceSegment,
    },
    Simplified {
        domain: CodeLabel,
        type_code: CodeLabel,
        sequence: SequenceSegment,
    },
}

impl DecodedSku {
    pub fn layout(&self) -> SkuLayout {
        match self {
            Self::Legacy { .. } => SkuLayout::Legacy,
            Self::Simplified { .. } => SkuLayout::Simplified,
        }
    }

    pub fn domain(&self) -> &CodeLabel {
        match self {
            Self::Legacy { domain, .. } | Self::Simplified { domain, .. } => domain,
        }
    }

    pub fn type_code(&self) -> &CodeLabel {
        match self {
            Self::Legacy { type_code, .. } | Self::Simplified { type_code, .. } => type_code,
        }
    }

    pub fn sequence(&self) -> &SequenceSegment {
        match self {
            Self::Legacy { sequence, .. } | Self::Simplified { sequence, .. } => sequence,
        }
    }

    /// Process description, for legacy SKUs only.
    pub fn process(&self) -> Option<String> {
        match self {
            Self::Legacy {
                domain,
                route,
                routing,
                ..
            } => Some(describe_process(&domain.code, &route.code, &routing.code)),
            Self::Simplified { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkuDecoder {
    tables: Arc<ClassificationTables>,
    codec: AlphabetCodec,
}

impl SkuDecoder {
    pub fn new(tables: Arc<ClassificationTables>, codec: AlphabetCodec) -> Self {
        Self { tables, codec }
    }

    pub fn decode(&self, sku: &str) -> PartcodeResult<DecodedSku> {
        let normalized = sku.trim().to_uppercase();
        let parts: Vec<&str> = normalized.split(SKU_SEPARATOR).collect();

        match parts.as_slice() {
            [domain, route, routing, type_code, sequence] => Ok(DecodedSku::Legacy {
                domain: self.domain(domain),
                route: CodeLabel::new(route, self.tables.route_label(route)),
                routing: CodeLabel::new(routing, self.tables.routing_label(routing)),
                type_code: CodeLabel::new(type_code, self.tables.type_label(type_code)),
                sequence: self.sequence(sequence),
            }),
            [domain, type_code, sequence] => Ok(DecodedSku::Simplified {
                domain: self.domain(domain),
                type_code: CodeLabel::new(type_code, self.tables.type_label(type_code)),
                sequence: self.sequence(sequence),
            }),
            _ => Err(PartcodeError::invalid_sku_format(sku.trim(), parts.len())),
        }
    }

    fn domain(&self, code: &str) -> CodeLabel {
        CodeLabel::new(code, Domain::from_code(code).map(|d| d.label()))
    }

    fn sequence(&self, code: &str) -> SequenceSegment {
        SequenceSegment {
            code: code.to_string(),
            value: self.codec.decode(code).ok(),
        }
    }
}

/// Manufacturing process implied by a legacy bucket.
pub fn describe_process(domain: &str, route: &str, routing: &str) -> String {
    match (domain, route, routing) {
        ("ELEC", "ASS", "SMT") => "Assemblage par montage en surface (SMT)".to_string(),
        ("ELEC", "ASS", "THT") => "Assemblage par technologie traversante (THT)".to_string(),
        ("ELEC", "ASS", _) => "Assemblage électrique".to_string(),
        ("ELEC", "TEST", _) => "Test et validation électrique".to_string(),
        ("ELEC", "PROG", _) => "Programmation de composants".to_string(),
        ("ELEC", _, _) => format!("Processus électrique ({} → {})", route, routing),
        ("MECA", "USIN", "FRAI") => "Usinage par fraisage".to_string(),
        ("MECA", "USIN", "TOUR") => "Usinage par tournage".to_string(),
        ("MECA", "BEND", "BEND") => "Pliage de tôlerie".to_string(),
        ("MECA", "ASS", _) => "Assemblage mécanique".to_string(),
        ("MECA", "CTRL", _) => "Contrôle qualité mécanique".to_string(),
        ("MECA", _, _) => format!("Processus mécanique ({} → {})", route, routing),
        _ => format!("Processus {} ({} → {})", domain, route, routing),
    }
}
