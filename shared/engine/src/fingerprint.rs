//! Content fingerprints and duplicate lookup.

use sha2::{Digest, Sha256};

use partcode_database::SkuStore;
use partcode_models::Component;
use partcode_utils::PartcodeResult;

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 32;

const FIELD_SEPARATOR: char = '\u{1f}';

/// Lowercase with whitespace runs collapsed to one space.
fn canonical(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digest over the identity fields: name, description, type, manufacturer
/// and manufacturer part. Missing and placeholder fields hash as empty
/// strings.
pub fn fingerprint(component: &Component) -> String {
    let component = component.cleaned();
    let fields = [
        component.name.as_str(),
        component.effective_description(),
        component.component_type.as_str(),
        component.manufacturer.as_deref().unwrap_or(""),
        component.manufacturer_part.as_deref().unwrap_or(""),
    ];

    let mut hasher = Sha256::new();
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
        }
        hasher.update(canonical(field).as_bytes());
    }

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// Finds the SKU already issued for a component's content.
#[derive(Clone)]
pub struct ContentDeduplicator {
    store: SkuStore,
}

impl ContentDeduplicator {
    pub fn new(store: SkuStore) -> Self {
        Self { store }
    }

    pub async fn find_existing(&self, component: &Component) -> PartcodeResult<Option<String>> {
        self.find_by_fingerprint(&fingerprint(component)).await
    }

    pub async fn find_by_fingerprint(&self, fingerprint: &str) -> PartcodeResult<Option<String>> {
        self.store.get_by_fingerprint(fingerprint).await
    }
}
