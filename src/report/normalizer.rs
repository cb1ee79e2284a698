//! Report Schema Normalizer
//!
//! `normalize` coerces any raw report object into the canonical investor
//! report shape. It is total and idempotent: every documented top-level key
//! ends up present and non-null, malformed nested structures are replaced
//! wholesale with their defaults, and running it twice changes nothing.
//! It runs at every write boundary, so stored reports never need ad-hoc
//! repair.

use serde_json::{Map, Value, json};

use crate::constants::report as defaults;

/// Canonical labels for problem clarity.
pub const CLARITY_LABELS: [&str; 3] = ["Clear", "Vague", "Not identified"];

/// Canonical labels for competitive moat strength.
pub const MOAT_LABELS: [&str; 3] = ["Strong", "Moderate", "Weak"];

/// Coercion rule for one top-level report key.
#[derive(Clone, Copy)]
enum FieldRule {
    /// Any non-object value becomes `{}`
    Object,
    /// Any non-array (or empty array) becomes the documented fallback
    Array(fn() -> Value),
    /// Closed label set with synonym mapping
    Clarity,
    Moat,
    /// Integer clamped to [1, 10]
    PainSeverity,
    /// Object guaranteed to carry a non-empty `summary`
    Recommendation,
}

/// The canonical report schema: 20 top-level keys, each with a default.
const SCHEMA: [(&str, FieldRule); 20] = [
    ("problem", FieldRule::Object),
    ("clarity_status", FieldRule::Clarity),
    ("pain_severity", FieldRule::PainSeverity),
    ("market", FieldRule::Object),
    ("market_size", FieldRule::Object),
    ("audience", FieldRule::Object),
    ("competition", FieldRule::Object),
    ("competitors", FieldRule::Array(default_competitors)),
    ("moat_status", FieldRule::Moat),
    ("business_model", FieldRule::Object),
    ("revenue_streams", FieldRule::Array(default_not_identified)),
    ("pricing", FieldRule::Object),
    ("team", FieldRule::Object),
    ("team_gaps", FieldRule::Array(default_not_identified)),
    ("legal", FieldRule::Object),
    ("legal_risks", FieldRule::Array(default_none_identified)),
    ("metrics", FieldRule::Object),
    ("growth_indicators", FieldRule::Array(default_not_identified)),
    ("recommendation", FieldRule::Recommendation),
    ("scores", FieldRule::Object),
];

fn default_competitors() -> Value {
    json!([{ "name": "No direct competitors identified", "threat": "Unknown" }])
}

fn default_not_identified() -> Value {
    json!(["Not identified"])
}

fn default_none_identified() -> Value {
    json!(["None identified"])
}

/// All canonical top-level keys, in schema order.
pub fn canonical_keys() -> impl Iterator<Item = &'static str> {
    SCHEMA.iter().map(|(key, _)| *key)
}

/// Normalize a raw report object into the canonical shape.
///
/// Unknown top-level keys are preserved; canonical keys are coerced in
/// place. A non-object input normalizes to the all-defaults report.
pub fn normalize(raw: &Value) -> Value {
    let mut out = match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    for (key, rule) in SCHEMA {
        let coerced = coerce(rule, out.get(key));
        out.insert(key.to_string(), coerced);
    }

    Value::Object(out)
}

fn coerce(rule: FieldRule, value: Option<&Value>) -> Value {
    match rule {
        FieldRule::Object => match value {
            Some(Value::Object(m)) => Value::Object(m.clone()),
            _ => json!({}),
        },
        FieldRule::Array(fallback) => match value {
            Some(Value::Array(items)) if !items.is_empty() => Value::Array(items.clone()),
            _ => fallback(),
        },
        FieldRule::Clarity => Value::String(normalize_clarity(value).to_string()),
        FieldRule::Moat => Value::String(normalize_moat(value).to_string()),
        FieldRule::PainSeverity => coerce_pain_severity(value),
        FieldRule::Recommendation => coerce_recommendation(value),
    }
}

/// Case-insensitive synonym mapping for clarity. Absent means no evidence
/// at all ("Not identified"); an unrecognized value means the agent said
/// something we cannot place, which gets the middle label.
fn normalize_clarity(value: Option<&Value>) -> &'static str {
    let Some(Value::String(s)) = value else {
        return "Not identified";
    };
    match s.trim().to_lowercase().as_str() {
        "clear" | "well defined" | "well-defined" | "specific" => "Clear",
        "vague" | "unclear" | "ambiguous" | "fuzzy" => "Vague",
        "not identified" | "not_identified" | "none" | "unknown" | "missing" => "Not identified",
        _ => "Vague",
    }
}

/// Moat synonym mapping; "Moderate" is the documented middle default for
/// both absent and unrecognized values.
fn normalize_moat(value: Option<&Value>) -> &'static str {
    let Some(Value::String(s)) = value else {
        return "Moderate";
    };
    match s.trim().to_lowercase().as_str() {
        "strong" | "high" | "defensible" => "Strong",
        "moderate" | "medium" | "average" => "Moderate",
        "weak" | "low" | "none" | "fragile" => "Weak",
        _ => "Moderate",
    }
}

fn coerce_pain_severity(value: Option<&Value>) -> Value {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => {
            let clamped = (n.round() as i64)
                .clamp(defaults::PAIN_SEVERITY_MIN, defaults::PAIN_SEVERITY_MAX);
            json!(clamped)
        }
        _ => json!(defaults::PAIN_SEVERITY_DEFAULT),
    }
}

fn coerce_recommendation(value: Option<&Value>) -> Value {
    let mut rec = match value {
        Some(Value::Object(m)) => m.clone(),
        _ => Map::new(),
    };

    let summary_missing = !matches!(
        rec.get("summary"),
        Some(Value::String(s)) if !s.trim().is_empty()
    );
    if summary_missing {
        rec.insert(
            "summary".to_string(),
            json!(defaults::DEFAULT_RECOMMENDATION_SUMMARY),
        );
    }
    if !matches!(rec.get("verdict"), Some(Value::String(_))) {
        rec.insert("verdict".to_string(), json!("Hold"));
    }

    Value::Object(rec)
}
