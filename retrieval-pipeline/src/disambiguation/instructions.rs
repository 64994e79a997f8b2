use std::fmt::Write as _;

use crate::matching::MatchCandidate;

pub static DISAMBIGUATION_INSTRUCTIONS: &str = r#"Você é o juiz de uma gincana bíblica. O participante enviou uma frase que pode estar incompleta, parafraseada ou com erros de digitação.
Escolha, entre os versículos candidatos, aquele a que a frase se refere."#;

pub static DISAMBIGUATION_RESPONSE_FORMAT: &str = r#"Responda APENAS com JSON, sem explicações: {"encontrou": true, "referencia": "Livro Capítulo:Versículo", "confianca": "alta" | "media" | "baixa"}
Se nenhum candidato corresponder à frase, responda {"encontrou": false, "referencia": ""}."#;

/// Prompt embedding the user phrase and the shortlisted verses.
pub fn build_prompt(query: &str, candidates: &[MatchCandidate<'_>]) -> String {
    let mut listing = String::new();
    for candidate in candidates {
        let _ = writeln!(
            listing,
            "- {}: {}",
            candidate.item.reference(),
            candidate.item.text()
        );
    }

    // JSON-quote the phrase so quotes typed by the user cannot break the prompt framing.
    let quoted = serde_json::to_string(query).unwrap_or_else(|_| format!("\"{query}\""));

    format!(
        "{DISAMBIGUATION_INSTRUCTIONS}\n\nCandidatos:\n{listing}\nFrase do participante: {quoted}\n\n{DISAMBIGUATION_RESPONSE_FORMAT}"
    )
}
