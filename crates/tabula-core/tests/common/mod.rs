//! Common test utilities for tabula-core integration tests.

use tabula_core::filter::{Filter, FilterGroup};
use tabula_core::{Env, Row};

/// An environment with the standard library, panicking on failure.
#[allow(dead_code)]
pub fn std_env() -> Env {
    Env::with_standard_library().expect("standard library installs")
}

/// Parse a filter group from JSON, panicking with the input on failure.
#[allow(dead_code)]
pub fn parse_group(json: &str) -> FilterGroup {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("invalid group {}: {}", json, e))
}

/// Parse a filter node from JSON.
#[allow(dead_code)]
pub fn parse_filter(json: &str) -> Filter {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("invalid filter {}: {}", json, e))
}

/// Parse a row from a JSON object.
#[allow(dead_code)]
pub fn row(json: &str) -> Row {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("invalid row {}: {}", json, e))
}

/// Assert that `group` passes exactly the rows at `expected` indices.
#[allow(dead_code)]
pub fn assert_passes(env: &Env, group: &FilterGroup, rows: &[Row], expected: &[usize]) {
    let evaluator = env.evaluator();
    let passed: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| evaluator.evaluate(group, *row))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(passed, expected, "filter {:?}", group);
}
