//! Bucket classification from free-text component attributes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use partcode_models::{Domain, STANDARD_CODE};

use crate::normalizer::{fold, normalize_type};
use crate::tables::{ClassificationTables, LabelCode};

/// Route, routing and type token derived for one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub route: String,
    pub routing: String,
    pub type_code: String,
}

#[derive(Debug, Clone)]
pub struct BucketClassifier {
    tables: Arc<ClassificationTables>,
}

impl BucketClassifier {
    pub fn new(tables: Arc<ClassificationTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ClassificationTables {
        &self.tables
    }

    pub fn classify(&self, domain: Domain, component_type: &str) -> Classification {
        Classification {
            route: self.route_code(domain, component_type),
            routing: self.routing_code(component_type),
            type_code: self.type_code(component_type),
        }
    }

    /// Falls back to the domain code.
    pub fn route_code(&self, domain: Domain, component_type: &str) -> String {
        first_match(&self.tables.routes, component_type)
            .unwrap_or_else(|| domain.code())
            .to_string()
    }

    /// Falls back to `STD`.
    pub fn routing_code(&self, component_type: &str) -> String {
        first_match(&self.tables.routings, component_type)
            .unwrap_or(STANDARD_CODE)
            .to_string()
    }

    pub fn type_code(&self, component_type: &str) -> String {
        normalize_type(component_type, &self.tables.types)
    }
}

/// Labels and input are compared folded, the same way type labels are.
fn first_match<'a>(entries: &'a [LabelCode], component_type: &str) -> Option<&'a str> {
    let haystack = fold(component_type);
    entries
        .iter()
        .find(|entry| haystack.contains(&fold(&entry.label)))
        .map(|entry| entry.code.as_str())
}
