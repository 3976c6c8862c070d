//! WebAssembly bindings for LICA

use std::sync::OnceLock;

use lica_compiler::{build_payload, optimize_payload, parse_sources, SourceTexts};
use lica_core::{parse_suffix_list, Classification, Classifier, HeuristicSuffixes, PayloadStats, RulePayload};
use wasm_bindgen::prelude::*;

struct ClassifierState {
    classifier: Classifier,
    stats: PayloadStats,
    exact_suffixes: bool,
}

static CLASSIFIER_STATE: OnceLock<ClassifierState> = OnceLock::new();

/// Build the process-wide classifier from payload JSON and, optionally, the
/// text of a public suffix list.
#[wasm_bindgen]
pub fn init(payload_json: &str, psl_text: Option<String>) -> Result<(), JsValue> {
    if CLASSIFIER_STATE.get().is_some() {
        return Err(JsValue::from_str("Already initialized. Reload the page to reinitialize."));
    }

    let state = build_state(payload_json, psl_text.as_deref()).map_err(|e| JsValue::from_str(&e))?;

    CLASSIFIER_STATE
        .set(state)
        .map_err(|_| JsValue::from_str("Failed to set classifier state"))?;

    Ok(())
}

fn build_state(payload_json: &str, psl_text: Option<&str>) -> Result<ClassifierState, String> {
    let payload = RulePayload::from_json(payload_json).map_err(|e| format!("Failed to load payload: {}", e))?;

    let classifier = match psl_text {
        Some(text) => {
            let list = parse_suffix_list(text).map_err(|e| format!("Failed to load suffix list: {}", e))?;
            Classifier::build(&payload, list)
        }
        None => {
            warn("lica: no public suffix list given, using heuristic suffixes");
            Classifier::build(&payload, HeuristicSuffixes)
        }
    }
    .map_err(|e| format!("Failed to build classifier: {}", e))?;

    Ok(ClassifierState {
        classifier,
        stats: payload.stats(),
        exact_suffixes: psl_text.is_some(),
    })
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(_message: &str) {}

#[wasm_bindgen]
pub fn is_initialized() -> bool {
    CLASSIFIER_STATE.get().is_some()
}

#[wasm_bindgen]
pub fn get_payload_info() -> JsValue {
    let result = js_sys::Object::new();
    if let Some(state) = CLASSIFIER_STATE.get() {
        let stats = &state.stats;
        let _ = js_sys::Reflect::set(&result, &"initialized".into(), &JsValue::from(true));
        let _ = js_sys::Reflect::set(&result, &"topLevels".into(), &JsValue::from(stats.top_levels as u32));
        let _ = js_sys::Reflect::set(&result, &"subLevels".into(), &JsValue::from(stats.sub_levels as u32));
        let _ = js_sys::Reflect::set(&result, &"domainRules".into(), &JsValue::from(stats.domain_rules as u32));
        let _ = js_sys::Reflect::set(&result, &"hostRules".into(), &JsValue::from(stats.host_rules as u32));
        let _ = js_sys::Reflect::set(&result, &"pathRules".into(), &JsValue::from(stats.path_rules as u32));
        let _ = js_sys::Reflect::set(&result, &"ignoreDomains".into(), &JsValue::from(stats.ignore_domains as u32));
        let _ = js_sys::Reflect::set(&result, &"keywords".into(), &JsValue::from(stats.keywords as u32));
        let _ = js_sys::Reflect::set(&result, &"exactSuffixes".into(), &JsValue::from(state.exact_suffixes));
    } else {
        let _ = js_sys::Reflect::set(&result, &"initialized".into(), &JsValue::from(false));
    }
    result.into()
}

/// `[top_level, sub_level, reason]`, or an error before `init`. The title
/// may be omitted from JavaScript.
#[wasm_bindgen]
pub fn classify(url: &str, title: Option<String>) -> Result<js_sys::Array, JsValue> {
    let state = CLASSIFIER_STATE
        .get()
        .ok_or_else(|| JsValue::from_str("Not initialized. Call init() first."))?;

    let result = classify_with(&state.classifier, url, title.as_deref());
    let (top_level, sub_level, reason) = result.as_tuple();

    let out = js_sys::Array::new_with_length(3);
    out.set(0, JsValue::from_str(top_level));
    out.set(1, JsValue::from_str(sub_level));
    out.set(2, JsValue::from_str(reason));
    Ok(out)
}

fn classify_with(classifier: &Classifier, url: &str, title: Option<&str>) -> Classification {
    classifier.classify(url, title.unwrap_or(""))
}

/// Compile raw source documents into payload JSON, for extensions that ship
/// the sources instead of a prebuilt payload.
#[wasm_bindgen]
pub fn compile_sources(
    hierarchy: &str,
    domain_rules: &str,
    keywords: &str,
    stopwords: &str,
) -> Result<JsValue, JsValue> {
    let texts = SourceTexts {
        hierarchy,
        domain_rules,
        keywords,
        stopwords,
        site_groups: None,
    };
    let sources = parse_sources(&texts).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let (mut payload, build_stats) = build_payload(&sources);
    let optimize_stats = optimize_payload(&mut payload);

    let json = serde_json::to_string(&payload)
        .map_err(|e| JsValue::from_str(&format!("Failed to encode payload: {}", e)))?;

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"payload".into(), &JsValue::from_str(&json));
    let _ = js_sys::Reflect::set(&js_result, &"domainRules".into(), &JsValue::from(build_stats.domain_rules as u32));
    let _ = js_sys::Reflect::set(&js_result, &"keywordsBefore".into(), &JsValue::from(optimize_stats.keywords_before as u32));
    let _ = js_sys::Reflect::set(&js_result, &"keywordsAfter".into(), &JsValue::from(optimize_stats.keywords_after as u32));
    let _ = js_sys::Reflect::set(&js_result, &"notInUseDropped".into(), &JsValue::from((build_stats.not_in_use_dropped + optimize_stats.not_in_use_dropped) as u32));

    Ok(js_result.into())
}
