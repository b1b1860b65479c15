//! Redundancy elimination over `(route, routing, type)`.
//!
//! One pass applies the first matching rule:
//!
//! 1. route equals routing: route becomes `STD`.
//! 2. type and route contain one another: route becomes `STD`.
//! 3. type and routing contain one another: routing becomes `STD`.
//! 4. a known redundant `(route, routing)` pair is replaced.
//!
//! [`RedundancyOptimizer::optimize`] repeats the pass until nothing changes.

use std::sync::Arc;

use partcode_models::STANDARD_CODE;

use crate::classifier::Classification;
use crate::tables::ClassificationTables;

/// Enough for validated tables, which converge in at most four passes.
const MAX_PASSES: usize = 8;

#[derive(Debug, Clone)]
pub struct RedundancyOptimizer {
    tables: Arc<ClassificationTables>,
}

impl RedundancyOptimizer {
    pub fn new(tables: Arc<ClassificationTables>) -> Self {
        Self { tables }
    }

    pub fn optimize(&self, route: &str, routing: &str, type_code: &str) -> (String, String, String) {
        let mut current = (route.to_string(), routing.to_string());

        for _ in 0..MAX_PASSES {
            let next = self.single_pass(&current.0, &current.1, type_code);
            if next == current {
                break;
            }
            current = next;
        }

        (current.0, current.1, type_code.to_string())
    }

    pub fn optimize_classification(&self, classification: &Classification) -> Classification {
        let (route, routing, type_code) = self.optimize(
            &classification.route,
            &classification.routing,
            &classification.type_code,
        );
        Classification {
            route,
            routing,
            type_code,
        }
    }

    fn single_pass(&self, route: &str, routing: &str, type_code: &str) -> (String, String) {
        if route == routing {
            return (STANDARD_CODE.to_string(), routing.to_string());
        }

        if type_code.contains(route) || route.contains(type_code) {
            return (STANDARD_CODE.to_string(), routing.to_string());
        }

        if type_code.contains(routing) || routing.contains(type_code) {
            return (route.to_string(), STANDARD_CODE.to_string());
        }

        if let Some((new_route, new_routing)) = self.tables.redundant_replacement(route, routing) {
            return (new_route.to_string(), new_routing.to_string());
        }

        (route.to_string(), routing.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn optimizer() -> RedundancyOptimizer {
        RedundancyOptimizer::new(Arc::new(ClassificationTables::standard()))
    }

    fn optimized(route: &str, routing: &str, type_code: &str) -> (String, String) {
        let (route, routing, _) = optimizer().optimize(route, routing, type_code);
        (route, routing)
    }

    #[test]
    fn test_identical_route_and_routing() {
        assert_eq!(optimized("BOLT", "BOLT", "VISSER"), ("STD".to_string(), "BOLT".to_string()));
    }

    #[test]
    fn test_type_overlapping_route_or_routing() {
        assert_eq!(optimized("CONN", "PIN", "CONNEC"), ("STD".to_string(), "PIN".to_string()));
        assert_eq!(optimized("TERM", "FUSE", "FUSEXX"), ("TERM".to_string(), "STD".to_string()));
    }

    #[test]
    fn test_redundant_pair_replaced() {
        assert_eq!(optimized("LASR", "CUT", "DECOUP"), ("LASR".to_string(), "STD".to_string()));
        assert_eq!(optimized("ASS", "ASM", "MONTER"), ("ASS".to_string(), "STD".to_string()));
    }

    #[test]
    fn test_pass_through() {
        assert_eq!(optimized("ELEC", "STD", "RESIST"), ("ELEC".to_string(), "STD".to_string()));
        let (_, _, type_code) = optimizer().optimize("WELD", "MECH", "MONTER");
        assert_eq!(type_code, "MONTER");
    }

    proptest! {
        #[test]
        fn prop_optimize_is_idempotent(
            route in "(ASS|ASM|BOLT|BEND|LASR|CUT|ELEC|MECA|STD|[A-Z]{1,4})",
            routing in "(ASS|ASM|BOLT|BEND|LASR|CUT|STD|[A-Z]{1,4})",
            type_code in "[A-Z2-8]{1,6}",
        ) {
            let optimizer = optimizer();
            let once = optimizer.optimize(&route, &routing, &type_code);
            let twice = optimizer.optimize(&once.0, &once.1, &once.2);
            prop_assert_eq!(once, twice);
        }
    }
}
