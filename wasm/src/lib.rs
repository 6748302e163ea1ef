use graph_explorer::{Config, ExpansionState, GraphData, explore, parse_config};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_state(state_json: Option<&str>) -> Result<ExpansionState, String> {
    match state_json.map(str::trim) {
        None | Some("") => Ok(ExpansionState::default()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|error| format!("invalid expansion state: {error}")),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|error| error.to_string())
}

fn build(
    graph_json: &str,
    config_json: Option<&str>,
    state_json: Option<&str>,
) -> Result<String, String> {
    let graph: GraphData =
        serde_json::from_str(graph_json).map_err(|error| format!("invalid graph: {error}"))?;
    let config = match config_json {
        Some(raw) if !raw.trim().is_empty() => {
            parse_config(raw).map_err(|error| format!("invalid config: {error}"))?
        }
        _ => Config::default(),
    };
    let state = parse_state(state_json)?;
    to_json(&explore(&graph, &config, &state))
}

fn toggle(state_json: &str, apply: impl FnOnce(&mut ExpansionState)) -> Result<String, String> {
    let mut state = parse_state(Some(state_json))?;
    apply(&mut state);
    to_json(&state)
}

/// Builds the exploration graph and returns it as JSON.
#[wasm_bindgen]
pub fn build_exploration_json(
    graph_json: &str,
    config_json: Option<String>,
    state_json: Option<String>,
) -> Result<String, JsValue> {
    build(graph_json, config_json.as_deref(), state_json.as_deref()).map_err(to_js_error)
}

/// Flips one primary bucket and returns the new state JSON.
#[wasm_bindgen]
pub fn toggle_bucket_json(state_json: &str, start: usize) -> Result<String, JsValue> {
    toggle(state_json, |state| state.toggle_bucket(start)).map_err(to_js_error)
}

/// Flips one secondary group and returns the new state JSON.
#[wasm_bindgen]
pub fn toggle_group_json(state_json: &str, id: &str) -> Result<String, JsValue> {
    toggle(state_json, |state| state.toggle_group(id)).map_err(to_js_error)
}
