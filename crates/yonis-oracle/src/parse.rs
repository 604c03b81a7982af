use serde_json::{Map, Value};
use yonis_core::DiagnosticResult;

use crate::DiagnosticError;

const FIELDS: [&str; 3] = ["stateId", "analysis", "recommendation"];

/// Validate raw model output against the three-field contract.
pub fn parse_diagnosis(raw: &str) -> Result<DiagnosticResult, DiagnosticError> {
    if raw.trim().is_empty() {
        return Err(DiagnosticError::EmptyResponse);
    }

    let json_str = extract_json_object(raw)
        .ok_or_else(|| DiagnosticError::SchemaViolation("no JSON object in response".into()))?;

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| DiagnosticError::SchemaViolation(format!("invalid JSON: {e}")))?;

    let obj = value
        .as_object()
        .ok_or_else(|| DiagnosticError::SchemaViolation("response is not an object".into()))?;

    if let Some(extra) = obj.keys().find(|k| !FIELDS.contains(&k.as_str())) {
        return Err(DiagnosticError::SchemaViolation(format!(
            "unexpected field `{extra}`"
        )));
    }

    Ok(DiagnosticResult {
        state_id: state_id(required(obj, "stateId")?)?,
        analysis: string_field(obj, "analysis")?,
        recommendation: string_field(obj, "recommendation")?,
    })
}

/// Take the span from the first `{` to the last `}`. Strips code fences and
/// brace-free text around the object; a stray brace outside the object
/// widens the span and the parse fails.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, DiagnosticError> {
    obj.get(key)
        .ok_or_else(|| DiagnosticError::SchemaViolation(format!("missing field `{key}`")))
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String, DiagnosticError> {
    required(obj, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DiagnosticError::SchemaViolation(format!("`{key}` is not a string")))
}

// Models emit 52 or 52.0 interchangeably; both are accepted. Range is left
// to the taxonomy lookup.
fn state_id(value: &Value) -> Result<u32, DiagnosticError> {
    let bad = || DiagnosticError::SchemaViolation(format!("`stateId` is not an integer id: {value}"));

    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| bad());
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(raw: &str) -> bool {
        matches!(parse_diagnosis(raw), Err(DiagnosticError::SchemaViolation(_)))
    }

    #[test]
    fn well_formed_object() {
        let r = parse_diagnosis(r#"{"stateId": 52, "analysis": "A", "recommendation": "B"}"#)
            .unwrap();
        assert_eq!(r.state_id, 52);
        assert_eq!(r.analysis, "A");
        assert_eq!(r.recommendation, "B");
    }

    #[test]
    fn fenced_output_is_unwrapped() {
        let raw = "Here you go:\n```json\n{\"stateId\": 20, \"analysis\": \"x\", \"recommendation\": \"y\"}\n```";
        assert_eq!(parse_diagnosis(raw).unwrap().state_id, 20);
    }

    #[test]
    fn float_id_with_zero_fraction_is_accepted() {
        let r = parse_diagnosis(r#"{"stateId": 61.0, "analysis": "", "recommendation": ""}"#)
            .unwrap();
        assert_eq!(r.state_id, 61);
    }

    #[test]
    fn out_of_range_id_passes_through() {
        let r = parse_diagnosis(r#"{"stateId": 99, "analysis": "a", "recommendation": "b"}"#)
            .unwrap();
        assert_eq!(r.state_id, 99);
    }

    #[test]
    fn blank_payload_is_empty_response() {
        assert!(matches!(parse_diagnosis(""), Err(DiagnosticError::EmptyResponse)));
        assert!(matches!(parse_diagnosis(" \n "), Err(DiagnosticError::EmptyResponse)));
    }

    #[test]
    fn contract_violations() {
        assert!(violation(r#"{"stateId": 52, "analysis": "A"}"#));
        assert!(violation(r#"{"stateId": 52, "analysis": "A", "recommendation": "B", "mood": "x"}"#));
        assert!(violation(r#"{"stateId": "52", "analysis": "A", "recommendation": "B"}"#));
        assert!(violation(r#"{"stateId": 52.5, "analysis": "A", "recommendation": "B"}"#));
        assert!(violation(r#"{"stateId": -3, "analysis": "A", "recommendation": "B"}"#));
        assert!(violation(r#"{"stateId": 52, "analysis": 7, "recommendation": "B"}"#));
        assert!(violation("I cannot help with that."));
        assert!(violation("{ truncated"));
    }

    #[test]
    fn brace_in_leading_prose_is_rejected() {
        let raw = r#"note {a} then {"stateId": 52, "analysis": "A", "recommendation": "B"}"#;
        assert!(violation(raw));
    }

    #[test]
    fn serialized_result_parses_back() {
        let original = DiagnosticResult {
            state_id: 37,
            analysis: "Motion without direction.".into(),
            recommendation: "Sit still for ten minutes.".into(),
        };
        let raw = serde_json::to_string(&original).unwrap();
        assert_eq!(parse_diagnosis(&raw).unwrap(), original);
    }
}
