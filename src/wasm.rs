//! JavaScript bindings for browser front ends.
//!
//! Inputs and outputs are plain JS objects converted through
//! `serde-wasm-bindgen`, using the serde shapes of the model types
//! (camelCase fields, constraints tagged by `type`).

use crate::model::{Constraint, ConstraintKind, Group, Individual};
use crate::parse::{parse_clusters, validate_constraints};
use crate::pipeline::{AllocationConfig, Allocator};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationResponse {
    groups: Vec<Group>,
    handled: bool,
    messages: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseResponse {
    clusters: Vec<Vec<u32>>,
    messages: Vec<String>,
}

fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Runs a full allocation.
///
/// `config` is an `AllocationConfig` object; omitted fields take their
/// defaults, and `seed` makes the run reproducible.
#[wasm_bindgen(js_name = allocateGroups)]
pub fn allocate_groups(
    roster: JsValue,
    constraints: JsValue,
    config: JsValue,
) -> Result<JsValue, JsError> {
    let roster: Vec<Individual> = from_value(roster).map_err(js_error)?;
    let constraints: Vec<Constraint> = from_value(constraints).map_err(js_error)?;
    let config: AllocationConfig = from_value(config).map_err(js_error)?;

    let outcome = Allocator::new(config)
        .allocate_seeded(&roster, &constraints)
        .map_err(js_error)?;

    let response = AllocationResponse {
        handled: outcome.handled,
        messages: outcome.messages,
        groups: outcome.allocation.into_groups(),
    };
    to_value(&response).map_err(js_error)
}

/// Returns the validation messages for the given setup; empty means the
/// allocation may run.
#[wasm_bindgen(js_name = validateConstraints)]
pub fn validate(
    roster: JsValue,
    group_count: usize,
    constraints: JsValue,
) -> Result<JsValue, JsError> {
    let roster: Vec<Individual> = from_value(roster).map_err(js_error)?;
    let constraints: Vec<Constraint> = from_value(constraints).map_err(js_error)?;
    let messages: Vec<String> = validate_constraints(&roster, group_count, &constraints)
        .iter()
        .map(ToString::to_string)
        .collect();
    to_value(&messages).map_err(js_error)
}

/// Parses one constraint field (`kind` is e.g. `"coLocation"`, the same
/// names `Constraint` uses for its `type` tag).
#[wasm_bindgen(js_name = parseClusters)]
pub fn parse(input: &str, kind: JsValue) -> Result<JsValue, JsError> {
    let kind: ConstraintKind = from_value(kind).map_err(js_error)?;
    let parsed = parse_clusters(input, kind);
    let response = ParseResponse {
        messages: parsed.issues.iter().map(ToString::to_string).collect(),
        clusters: parsed.clusters,
    };
    to_value(&response).map_err(js_error)
}
