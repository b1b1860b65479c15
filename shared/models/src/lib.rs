//! # Partcode Core Domain Models
//!
//! This crate contains the data types shared by the SKU engine, its store and
//! its callers.
//!
//! ## Key Models
//!
//! - **Component**: one bill-of-materials line handed over by the ingestion layer
//! - **Domain**: the closed set of engineering domains (ELEC, MECA)
//! - **BucketKey**: the tuple that shares one sequence counter, in either layout
//! - **SkuRecord**: the component snapshot persisted with its SKU
//! - **CatalogStats**: aggregate counts by domain, route and routing
//!
//! ## Validation
//!
//! `Component` derives `validator::Validate`. Name and type must be present
//! and must not be a spreadsheet placeholder; the domain must be ELEC or MECA.

pub mod component;
pub mod sku;


pub use component::*;
pub use sku::*;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_component_creation() {
        let component = Component::new("Résistance 100Ω", Domain::Electrical, "Résistances")
            .with_description("Résistance 1/4W 5%")
            .with_quantity(4.0)
            .with_designator("R1, R2");

        assert_eq!(component.domain, "ELEC");
        assert_eq!(component.parsed_domain(), Ok(Domain::Electrical));
        assert_eq!(component.effective_description(), "Résistance 1/4W 5%");
        assert!(component.validate().is_ok());
    }

    #[test]
    fn test_missing_description_is_not_a_validation_error() {
        let component = Component::new("D-ST 2,5", Domain::Electrical, "Accessoires de borniers");

        assert!(component.validate().is_ok());
        assert_eq!(component.effective_description(), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_component_serde_defaults_optional_fields() {
        let json = r#"{"name":"Vis M6","domain":"MECA","component_type":"Boulonnerie"}"#;
        let component: Component = serde_json::from_str(json).unwrap();

        assert_eq!(component.manufacturer, None);
        assert_eq!(component.quantity, None);
        assert_eq!(component.parsed_domain(), Ok(Domain::Mechanical));
    }

    #[test]
    fn test_record_serializes_domain_code() {
        let record = SkuRecord {
            sku: "ELEC-RESIST-AAAA".to_string(),
            fingerprint: "0f".repeat(16),
            layout: SkuLayout::Simplified,
            name: "Résistance 100Ω".to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            domain: Domain::Electrical,
            component_type: "Résistances".to_string(),
            route: "ELEC".to_string(),
            routing: STANDARD_CODE.to_string(),
            type_code: "RESIST".to_string(),
            sequence: 1,
            manufacturer: None,
            manufacturer_part: None,
            quantity: None,
            designator: None,
            created_at: chrono::Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["domain"], "ELEC");
        assert_eq!(value["layout"], "simplified");
    }
}
