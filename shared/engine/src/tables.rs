//! Classification tables.
//!
//! Ordered `(label, code)` lists drive route, routing and type classification
//! and the decoder's inverse lookups. Order matters: the first matching label
//! wins when classifying, and the first label carrying a code is the one shown
//! when decoding.

use std::path::Path;

use serde::{Deserialize, Serialize};

use partcode_utils::{PartcodeError, PartcodeResult};

use crate::normalizer::TYPE_CODE_WIDTH;

/// Longest route or routing code.
pub const SEGMENT_CODE_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCode {
    pub label: String,
    pub code: String,
}

impl LabelCode {
    fn new(label: &str, code: &str) -> Self {
        Self {
            label: label.to_string(),
            code: code.to_string(),
        }
    }
}

/// A `(route, routing)` pair that says the same thing twice, and what to use instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundantPair {
    pub route: String,
    pub routing: String,
    pub replacement_route: String,
    pub replacement_routing: String,
}

impl RedundantPair {
    fn new(route: &str, routing: &str, replacement_route: &str, replacement_routing: &str) -> Self {
        Self {
            route: route.to_string(),
            routing: routing.to_string(),
            replacement_route: replacement_route.to_string(),
            replacement_routing: replacement_routing.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTables {
    pub routes: Vec<LabelCode>,
    pub routings: Vec<LabelCode>,
    pub types: Vec<LabelCode>,
    #[serde(default)]
    pub redundant_pairs: Vec<RedundantPair>,
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassificationTables {
    /// Built-in rule set for electrical and mechanical BOMs.
    pub fn standard() -> Self {
        let routes = [
            // Electrical
            ("Assemblage", "ASS"),
            ("Connecteurs", "CONN"),
            ("Borniers", "TERM"),
            ("Communication", "COMM"),
            ("Contrôleurs", "CTRL"),
            ("Alimentation", "PWR"),
            ("Moteurs", "MOT"),
            // Mechanical
            ("ASSEMBLAGE MÉCANIQUE", "ASS"),
            ("ASSEMBLAGE SOUDÉ", "WELD"),
            ("PIÈCES USINÉES", "MACH"),
            ("PIÈCES PLIÉES", "BEND"),
            ("PIÈCES DÉCOUPÉES LASER", "LASR"),
            ("BOULONNERIE", "BOLT"),
            ("PLASTIQUE", "PLST"),
        ];

        let routings = [
            // Electrical
            ("Assemblage", "ASM"),
            ("Cosses, oeillets, fourchettes", "TERM"),
            ("Boitiers", "ENCL"),
            ("Fusibles", "FUSE"),
            ("Broches", "PIN"),
            ("Fil", "WIRE"),
            // Mechanical
            ("BOULONNERIE", "BOLT"),
            ("PIÈCES PLIÉES", "BEND"),
            ("ASSEMBLAGE MÉCANIQUE", "MECH"),
            ("COMPOSANTES MECANIQUES", "COMP"),
            ("PIÈCES DÉCOUPÉES LASER", "CUT"),
            ("PIÈCES USINÉES", "MILL"),
            ("PLASTIQUE (UHMW, LEXAN, ...)", "POLY"),
        ];

        let types = [
            // Electrical
            ("Résistances", "RESIST"),
            ("Condensateurs", "CONDEN"),
            ("Inductances", "INDUCT"),
            ("Diodes", "DIODES"),
            ("Transistors", "TRANSI"),
            ("Circuits intégrés", "CIRCUI"),
            ("Connecteurs", "CONNEC"),
            ("Relais", "RELAIS"),
            ("Fusibles", "FUSIBL"),
            ("Accessoires de borniers", "BORNIE"),
            ("Cosses, oeillets, fourchettes", "COSSES"),
            ("Broches", "BROCHE"),
            ("Fil", "FILAGE"),
            ("Boitiers", "BOITIE"),
            // Mechanical
            ("Pièces Pliées", "PLIAGE"),
            ("Pièces Usinées", "USINER"),
            ("Pièces Découpées", "DECOUP"),
            ("Boulonnerie", "VISSER"),
            ("Vis M3", "VISSM3"),
            ("Vis M4", "VISSM4"),
            ("Vis M5", "VISSM5"),
            ("Vis M6", "VISSM6"),
            ("Vis M8", "VISSM8"),
            ("Assemblage Mécanique", "MONTER"),
            ("Assemblage Final", "FINAL"),
            ("Sous-assemblage", "SOUSAS"),
            ("Plastique", "PLASTI"),
            ("Aluminium", "ALUMI"),
            ("Acier", "ACIER"),
            ("Inox", "INOX"),
            ("Composantes Mécaniques", "COMPNT"),
        ];

        let redundant_pairs = vec![
            RedundantPair::new("BOLT", "BOLT", "MECH", "BOLT"),
            RedundantPair::new("BEND", "BEND", "MECH", "BEND"),
            RedundantPair::new("LASR", "CUT", "LASR", "STD"),
            RedundantPair::new("CUT", "LASR", "LASR", "STD"),
            RedundantPair::new("ASS", "ASM", "ASS", "STD"),
            RedundantPair::new("ASM", "ASS", "ASM", "STD"),
        ];

        Self {
            routes: routes.iter().map(|(l, c)| LabelCode::new(l, c)).collect(),
            routings: routings.iter().map(|(l, c)| LabelCode::new(l, c)).collect(),
            types: types.iter().map(|(l, c)| LabelCode::new(l, c)).collect(),
            redundant_pairs,
        }
    }

    pub fn from_json_str(json: &str) -> PartcodeResult<Self> {
        let tables: Self = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn load(path: impl AsRef<Path>) -> PartcodeResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PartcodeError::configuration(format!("cannot read tables {}: {}", path.display(), e))
        })?;
        let tables = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            routes = tables.routes.len(),
            routings = tables.routings.len(),
            types = tables.types.len(),
            "Loaded classification tables"
        );
        Ok(tables)
    }

    /// Standard tables, or the file at `path` when one is configured.
    pub fn load_or_standard(path: Option<&str>) -> PartcodeResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::standard()),
        }
    }

    pub fn validate(&self) -> PartcodeResult<()> {
        check_codes("routes", &self.routes, SEGMENT_CODE_WIDTH)?;
        check_codes("routings", &self.routings, SEGMENT_CODE_WIDTH)?;
        check_codes("types", &self.types, TYPE_CODE_WIDTH)?;

        for pair in &self.redundant_pairs {
            for code in [
                &pair.route,
                &pair.routing,
                &pair.replacement_route,
                &pair.replacement_routing,
            ] {
                check_code("redundant_pairs", code, SEGMENT_CODE_WIDTH)?;
            }
            // Replacements must be final, or optimization could loop.
            if pair.route == partcode_models::STANDARD_CODE || pair.routing == partcode_models::STANDARD_CODE {
                return Err(PartcodeError::configuration(format!(
                    "redundant pair ({}, {}) may not contain STD",
                    pair.route, pair.routing
                )));
            }
            if self.redundant_replacement(&pair.replacement_route, &pair.replacement_routing).is_some() {
                return Err(PartcodeError::configuration(format!(
                    "replacement ({}, {}) is itself a redundant pair",
                    pair.replacement_route, pair.replacement_routing
                )));
            }
        }

        Ok(())
    }

    pub fn route_label(&self, code: &str) -> Option<&str> {
        first_label(&self.routes, code)
    }

    pub fn routing_label(&self, code: &str) -> Option<&str> {
        first_label(&self.routings, code)
    }

    pub fn type_label(&self, code: &str) -> Option<&str> {
        first_label(&self.types, code)
    }

    pub fn redundant_replacement(&self, route: &str, routing: &str) -> Option<(&str, &str)> {
        self.redundant_pairs
            .iter()
            .find(|p| p.route == route && p.routing == routing)
            .map(|p| (p.replacement_route.as_str(), p.replacement_routing.as_str()))
    }
}

fn first_label<'a>(entries: &'a [LabelCode], code: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| entry.code == code)
        .map(|entry| entry.label.as_str())
}

fn check_codes(table: &str, entries: &[LabelCode], max_width: usize) -> PartcodeResult<()> {
    for entry in entries {
        if entry.label.trim().is_empty() {
            return Err(PartcodeError::configuration(format!(
                "{}: empty label for code '{}'",
                table, entry.code
            )));
        }
        check_code(table, &entry.code, max_width)?;
    }
    Ok(())
}

fn check_code(table: &str, code: &str, max_width: usize) -> PartcodeResult<()> {
    let well_formed = !code.is_empty()
        && code.len() <= max_width
        && code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(PartcodeError::configuration(format!(
            "{}: code '{}' must be 1 to {} uppercase ASCII letters or digits",
            table, code, max_width
        )))
    }
}
