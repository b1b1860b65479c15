//! BOM CSV reader
//!
//! Maps spreadsheet exports to components. Electrical and mechanical BOMs use
//! different column headers; headers are matched case-insensitively.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use partcode_models::{Component, Domain};

/// Header aliases for one domain's BOM export.
#[derive(Debug, Clone)]
pub struct BomColumns {
    name: Vec<&'static str>,
    description: Vec<&'static str>,
    component_type: Vec<&'static str>,
    manufacturer: Vec<&'static str>,
    manufacturer_part: Vec<&'static str>,
    quantity: Vec<&'static str>,
    designator: Vec<&'static str>,
}

impl BomColumns {
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Electrical => Self {
                name: vec!["name"],
                description: vec!["description"],
                component_type: vec!["componenttype", "component type"],
                manufacturer: vec!["manufacturer"],
                manufacturer_part: vec!["manufacturer pn", "manufacturer part number"],
                quantity: vec!["quantity", "qty"],
                designator: vec!["designator"],
            },
            // Mechanical BOMs reuse the part number as the manufacturer part.
            Domain::Mechanical => Self {
                name: vec!["no. de pièce", "no de pièce", "no. de piece"],
                description: vec!["description française", "description francaise", "description"],
                component_type: vec!["type"],
                manufacturer: vec!["manufacturier"],
                manufacturer_part: vec!["no. de pièce", "no de pièce", "no. de piece"],
                quantity: vec!["qte totale", "qté totale"],
                designator: vec![],
            },
        }
    }
}

/// Components read from one BOM file.
#[derive(Debug, Clone)]
pub struct ParsedBom {
    pub filename: String,
    pub components: Vec<Component>,
    /// Messages carry the spreadsheet row number, header being row 1.
    pub parse_warnings: Vec<String>,
}

pub struct BomReader {
    domain: Domain,
    columns: BomColumns,
}

impl BomReader {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            columns: BomColumns::for_domain(domain),
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<ParsedBom> {
        let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.parse_bytes(&path.display().to_string(), &data)
    }

    pub fn parse_bytes(&self, filename: &str, data: &[u8]) -> Result<ParsedBom> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let mut components = Vec::new();
        let mut warnings = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let row_number = idx + 2;
            match result {
                Ok(record) => {
                    let raw: HashMap<&str, &str> = headers
                        .iter()
                        .enumerate()
                        .filter_map(|(i, h)| record.get(i).map(|v| (h.as_str(), v)))
                        .collect();

                    components.push(self.map_row(row_number, &raw, &mut warnings));
                }
                Err(e) => {
                    warnings.push(format!("Row {}: Parse error - {}", row_number, e));
                }
            }
        }

        tracing::info!(
            file = %filename,
            domain = %self.domain,
            rows = components.len(),
            warnings = warnings.len(),
            "Parsed BOM"
        );

        Ok(ParsedBom {
            filename: filename.to_string(),
            components,
            parse_warnings: warnings,
        })
    }

    fn map_row(&self, row_number: usize, raw: &HashMap<&str, &str>, warnings: &mut Vec<String>) -> Component {
        let text = |aliases: &[&str]| -> Option<String> {
            aliases
                .iter()
                .find_map(|alias| raw.get(alias))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let quantity = text(&self.columns.quantity).and_then(|value| {
            match value.replace(',', ".").parse::<f64>() {
                Ok(q) if q.is_finite() => Some(q),
                _ => {
                    warnings.push(format!("Row {}: Ignoring quantity '{}'", row_number, value));
                    None
                }
            }
        });

        // Validation happens in the engine; missing mandatory cells stay empty.
        Component {
            name: text(&self.columns.name).unwrap_or_default(),
            description: text(&self.columns.description),
            domain: self.domain.code().to_string(),
            component_type: text(&self.columns.component_type).unwrap_or_default(),
            manufacturer: text(&self.columns.manufacturer),
            manufacturer_part: text(&self.columns.manufacturer_part),
            quantity,
            designator: text(&self.columns.designator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_electrical_columns() {
        let csv = "Name,Description,ComponentType,Manufacturer,Manufacturer PN,Quantity,Designator\n\
                   R100,Résistance 1/4W,Résistances,Vishay,RN55C1000B,10,R1-R10\n\
                   ,,Diodes,,,abc,\n";

        let bom = BomReader::new(Domain::Electrical).parse_bytes("elec.csv", csv.as_bytes()).unwrap();
        assert_eq!(bom.components.len(), 2);

        let first = &bom.components[0];
        assert_eq!(first.name, "R100");
        assert_eq!(first.component_type, "Résistances");
        assert_eq!(first.manufacturer_part.as_deref(), Some("RN55C1000B"));
        assert_eq!(first.quantity, Some(10.0));
        assert_eq!(first.designator.as_deref(), Some("R1-R10"));
        assert_eq!(first.domain, "ELEC");

        let second = &bom.components[1];
        assert_eq!(second.name, "");
        assert_eq!(second.quantity, None);
        assert_eq!(bom.parse_warnings, vec!["Row 3: Ignoring quantity 'abc'".to_string()]);
    }

    #[test]
    fn test_mechanical_columns() {
        let csv = "No. de pièce,Description Française,Type,Manufacturier,QTE TOTALE\n\
                   VM6-20,Vis tête hexagonale,Boulonnerie,Würth,\"2,5\"\n";

        let bom = BomReader::new(Domain::Mechanical).parse_bytes("meca.csv", csv.as_bytes()).unwrap();
        let screw = &bom.components[0];
        assert_eq!(screw.name, "VM6-20");
        assert_eq!(screw.manufacturer_part.as_deref(), Some("VM6-20"));
        assert_eq!(screw.description.as_deref(), Some("Vis tête hexagonale"));
        assert_eq!(screw.manufacturer.as_deref(), Some("Würth"));
        assert_eq!(screw.quantity, Some(2.5));
        assert_eq!(screw.designator, None);
    }

    #[test]
    fn test_read_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        std::fs::write(&path, "name,componenttype\nLED rouge,LED\n").unwrap();

        let bom = BomReader::new(Domain::Electrical).read_path(&path).unwrap();
        assert_eq!(bom.components[0].component_type, "LED");
        assert!(BomReader::new(Domain::Electrical).read_path(&dir.path().join("missing.csv")).is_err());
    }
}
