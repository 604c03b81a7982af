use serde_json::{json, Value};
use yonis_core::taxonomy::{Taxonomy, STATE_COUNT};

pub const TEMPERATURE: f32 = 0.7;

fn domain_note(id: u32) -> &'static str {
    match id {
        5 => " - most humans live here (37-55)",
        6 => " - rare (61+)",
        7 => " - extremely rare",
        _ => "",
    }
}

/// Compact listing of every domain and state for the model.
pub fn serialize_taxonomy(taxonomy: &Taxonomy) -> String {
    let mut out = String::with_capacity(4096);
    for domain in taxonomy.domains() {
        out.push_str(&format!(
            "{}. {} ({}){}\n",
            domain.id,
            domain.name,
            domain.subtitle,
            domain_note(domain.id)
        ));
        for state in &domain.states {
            out.push_str(&format!("  [{}] {}: {}\n", state.id, state.name, state.description));
        }
    }
    out
}

pub fn system_prompt(taxonomy: &Taxonomy) -> String {
    format!(
        "You are the systems architect of the 84 Yonis, a map of consciousness operating \
environments. Diagnose the user's current psychological state from their input and map it \
to exactly ONE of the {count} states.\n\n\
The framework: {domains} domains, 12 states each, ordered from inertia to liberation.\n\n\
{map}\n\
Tone:\n\
Ruthless, precise, compassionate but unsentimental. Mix systems engineering metaphors with \
ancient wisdom. Do not flatter. If they are stuck in \"Status Anxiety\" (state 52), say it. \
If they are in \"Territorial Obsession\" (state 20), say it.\n\n\
Output ONLY a JSON object with exactly these fields:\n\
{{\"stateId\": <integer 1-{count}>, \"analysis\": \"<sharp two-sentence diagnosis of why they \
are in this state>\", \"recommendation\": \"<direct directive on how to move to the next \
state>\"}}\n\
No other fields, no prose outside the object.",
        count = STATE_COUNT,
        domains = taxonomy.domains().len(),
        map = serialize_taxonomy(taxonomy),
    )
}

/// Structured-output schema sent alongside the request.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "stateId": {
                "type": "number",
                "description": "The integer ID of the state (1-84)"
            },
            "analysis": {
                "type": "string",
                "description": "A sharp, 2-sentence diagnosis of why they are in this state."
            },
            "recommendation": {
                "type": "string",
                "description": "A direct directive on how to move to the next state."
            }
        },
        "required": ["stateId", "analysis", "recommendation"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_every_state() {
        let tax = Taxonomy::standard();
        let prompt = system_prompt(&tax);
        for state in tax.states() {
            assert!(
                prompt.contains(&format!("[{}] {}", state.id, state.name)),
                "missing state {}",
                state.id
            );
        }
        assert!(prompt.contains("37-55"));
        assert!(prompt.contains("61+"));
    }

    #[test]
    fn schema_requires_exactly_three_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["stateId", "analysis", "recommendation"]);
        assert_eq!(schema["properties"].as_object().unwrap().len(), 3);
        assert_eq!(schema["additionalProperties"], false);
    }
}
