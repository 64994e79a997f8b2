use common::error::AppError;
use serde::Deserialize;
use serde_json::Value;

/// Structured answer a backend is asked to embed in its output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    #[serde(rename = "encontrou", default)]
    pub found: bool,
    #[serde(rename = "referencia", default)]
    pub reference: Option<String>,
    /// Free-form label. Models send strings, numbers or nothing at all, so
    /// its shape never invalidates the verdict.
    #[serde(rename = "confianca", default)]
    pub confidence: Option<Value>,
}

impl Verdict {
    /// Annotation carried into the result when the backend reports confidence.
    pub fn context(&self) -> String {
        let label = match &self.confidence {
            Some(Value::String(label)) => label.trim().to_string(),
            Some(Value::Number(score)) => score.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => String::new(),
        };

        if label.is_empty() {
            String::new()
        } else {
            format!("Confiança: {label}")
        }
    }
}

/// Span from the first `{` to the last `}` of free-form model output.
///
/// Returns `None` when no such span exists.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    text.get(start..=end)
}

pub fn parse_verdict(raw: &str) -> Result<Verdict, AppError> {
    let json = extract_first_json_object(raw)
        .ok_or_else(|| AppError::LLMParsing("no JSON object found in model output".into()))?;

    serde_json::from_str::<Verdict>(json)
        .map_err(|e| AppError::LLMParsing(format!("Failed to parse model verdict: {e}")))
}
