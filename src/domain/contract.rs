//! Structured output contract with the model gateway.
//!
//! The orchestrator demands a fixed reply shape from the gateway on every
//! extraction turn. [`decode_extraction`] is the single decode-and-validate
//! step: it either yields a conforming [`ExtractionReply`] or a
//! [`ContractViolation`] carrying the raw reply text, so callers branch on
//! one tagged outcome instead of probing types.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::feedback::{Category, FormPatch};

/// The JSON schema passed to the gateway on every extraction turn.
///
/// Top level: required `answer` (string), `form` (object), `formComplete`
/// (boolean), nothing else. The `form` object carries exactly the four form
/// fields, each nullable, with `category` constrained to the fixed labels.
pub static EXTRACTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "answer": {
                "type": "string",
                "description": "Conversational reply to the resident"
            },
            "form": {
                "type": "object",
                "properties": {
                    "title": { "type": ["string", "null"] },
                    "category": { "type": ["string", "null"], "enum": labels },
                    "description": { "type": ["string", "null"] },
                    "place": { "type": ["string", "null"] }
                },
                "additionalProperties": false
            },
            "formComplete": {
                "type": "boolean",
                "description": "Whether every form field has been collected"
            }
        },
        "required": ["answer", "form", "formComplete"],
        "additionalProperties": false
    })
});

/// A decoded, conforming reply from the model gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReply {
    /// Conversational reply to surface to the resident.
    pub answer: String,
    /// This turn's newly extracted field values.
    pub form: FormPatch,
    /// The gateway's own completion claim. Advisory only; the orchestrator
    /// recomputes completion from the merged form.
    pub form_complete: bool,
}

/// A gateway reply that does not conform to the extraction schema.
///
/// Violations are recovered locally (prior form kept, raw text surfaced);
/// they are never a turn failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("model reply does not conform to the extraction contract: {reason}")]
pub struct ContractViolation {
    /// Why decoding failed.
    pub reason: String,
    /// Raw text rendering of the offending reply.
    pub raw: String,
}

impl ContractViolation {
    fn new(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Consumes the violation, yielding the raw reply text.
    pub fn into_raw(self) -> String {
        self.raw
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReply {
    answer: String,
    form: Value,
    #[serde(rename = "formComplete")]
    form_complete: bool,
}

/// Decodes a structured gateway reply against the extraction contract.
///
/// A `form` delivered as a JSON-encoded string is decoded as the patch
/// shape before giving up; the far side of the contract is not guaranteed
/// to honor it.
pub fn decode_extraction(value: &Value) -> Result<ExtractionReply, ContractViolation> {
    let raw = || value.to_string();

    let reply: RawReply = serde_json::from_value(value.clone())
        .map_err(|e| ContractViolation::new(e.to_string(), raw()))?;

    let form = match &reply.form {
        Value::Object(_) => serde_json::from_value::<FormPatch>(reply.form.clone())
            .map_err(|e| ContractViolation::new(format!("invalid form patch: {}", e), raw()))?,
        Value::String(encoded) => serde_json::from_str::<FormPatch>(encoded).map_err(|e| {
            ContractViolation::new(format!("string-encoded form patch did not decode: {}", e), raw())
        })?,
        other => {
            return Err(ContractViolation::new(
                format!("form must be an object, got {}", type_name(other)),
                raw(),
            ))
        }
    };

    Ok(ExtractionReply {
        answer: reply.answer,
        form,
        form_complete: reply.form_complete,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_the_contract_keys() {
        let required = EXTRACTION_SCHEMA["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(required, vec!["answer", "form", "formComplete"]);
        assert_eq!(EXTRACTION_SCHEMA["additionalProperties"], json!(false));

        let form = &EXTRACTION_SCHEMA["properties"]["form"];
        let keys = form["properties"].as_object().unwrap();
        assert_eq!(keys.len(), 4);
        assert!(keys.contains_key("title"));
        assert!(keys.contains_key("category"));
        assert!(keys.contains_key("description"));
        assert!(keys.contains_key("place"));
        assert_eq!(form["additionalProperties"], json!(false));
        assert_eq!(
            form["properties"]["category"]["enum"],
            json!(["request", "question", "praise"])
        );
    }

    #[test]
    fn decodes_a_conforming_reply() {
        let value = json!({
            "answer": "Got it. What should I call this?",
            "form": {
                "title": null,
                "category": "request",
                "description": "street light is out",
                "place": "Chuo, Tokyo"
            },
            "formComplete": false
        });

        let reply = decode_extraction(&value).unwrap();
        assert_eq!(reply.answer, "Got it. What should I call this?");
        assert_eq!(reply.form.category, Some(Category::Request));
        assert_eq!(reply.form.title, None);
        assert!(!reply.form_complete);
    }

    #[test]
    fn decodes_a_string_encoded_form_patch() {
        let value = json!({
            "answer": "Thanks!",
            "form": "{\"title\":\"broken street light\"}",
            "formComplete": true
        });

        let reply = decode_extraction(&value).unwrap();
        assert_eq!(reply.form.title.as_deref(), Some("broken street light"));
        assert!(reply.form_complete);
    }

    #[test]
    fn rejects_a_missing_top_level_key() {
        let value = json!({
            "answer": "hello",
            "form": {}
        });
        let violation = decode_extraction(&value).unwrap_err();
        assert_eq!(violation.raw, value.to_string());
    }

    #[test]
    fn rejects_an_extra_top_level_key() {
        let value = json!({
            "answer": "hello",
            "form": {},
            "formComplete": false,
            "confidence": 0.9
        });
        assert!(decode_extraction(&value).is_err());
    }

    #[test]
    fn rejects_an_unknown_category_label() {
        let value = json!({
            "answer": "hello",
            "form": { "category": "complaint" },
            "formComplete": false
        });
        assert!(decode_extraction(&value).is_err());
    }

    #[test]
    fn rejects_an_undecodable_string_form() {
        let value = json!({
            "answer": "hello",
            "form": "not json at all",
            "formComplete": false
        });
        let violation = decode_extraction(&value).unwrap_err();
        assert!(violation.reason.contains("string-encoded"));
    }

    #[test]
    fn rejects_a_non_object_form() {
        let value = json!({
            "answer": "hello",
            "form": 42,
            "formComplete": false
        });
        let violation = decode_extraction(&value).unwrap_err();
        assert!(violation.reason.contains("number"));
    }

    #[test]
    fn violation_surfaces_raw_text() {
        let value = json!({"unexpected": true});
        let violation = decode_extraction(&value).unwrap_err();
        assert_eq!(violation.into_raw(), value.to_string());
    }
}
