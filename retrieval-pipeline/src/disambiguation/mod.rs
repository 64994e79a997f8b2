pub mod backend;
pub mod chat;
pub mod instructions;
pub mod ollama;
pub mod verdict;

use common::{error::AppError, storage::types::verse_record::VerseRecord};
use tracing::{debug, error, info, instrument, warn};

use crate::matching::MatchCandidate;
use backend::{GenerationBackend, SharedBackend};
use instructions::build_prompt;
use verdict::{parse_verdict, Verdict};

/// Verse chosen by a backend, with the annotation it attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<'a> {
    pub verse: &'a VerseRecord,
    pub context: String,
    pub backend: String,
}

/// Consults backends in priority order until one commits to a candidate.
#[derive(Clone, Default)]
pub struct Disambiguator {
    backends: Vec<SharedBackend>,
}

impl Disambiguator {
    pub const fn new(backends: Vec<SharedBackend>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|backend| backend.name()).collect()
    }

    /// Returns `None` when there are no candidates or no backend produced a
    /// usable positive verdict.
    pub async fn disambiguate<'a>(
        &self,
        query: &str,
        candidates: &[MatchCandidate<'a>],
    ) -> Option<Decision<'a>> {
        let top = candidates.first()?;
        let prompt = build_prompt(query, candidates);

        for backend in &self.backends {
            let verdict = match consult(backend.as_ref(), &prompt).await {
                Ok(verdict) => verdict,
                Err(err) if err.is_backend_failure() => {
                    warn!(backend = %backend.name(), error = %err, "Backend attempt failed; trying next");
                    continue;
                }
                Err(err) => {
                    error!(backend = %backend.name(), error = %err, "Unexpected backend error; trying next");
                    continue;
                }
            };

            if !verdict.found {
                info!(backend = %backend.name(), "Backend found no matching candidate; trying next");
                continue;
            }

            let verse = resolve_reference(&verdict, candidates).unwrap_or_else(|| {
                debug!(
                    backend = %backend.name(),
                    reference = ?verdict.reference,
                    "Reference is not among the candidates; using the top candidate"
                );
                top.item
            });

            info!(
                backend = %backend.name(),
                reference = %verse.reference(),
                "Backend resolved the phrase"
            );

            return Some(Decision {
                verse,
                context: verdict.context(),
                backend: backend.name().to_string(),
            });
        }

        None
    }
}

#[instrument(skip_all, fields(backend = %backend.name()))]
async fn consult(backend: &dyn GenerationBackend, prompt: &str) -> Result<Verdict, AppError> {
    let raw = match backend.timeout() {
        Some(limit) => tokio::time::timeout(limit, backend.generate(prompt))
            .await
            .map_err(|_| AppError::BackendTimeout {
                backend: backend.name().to_string(),
                timeout: limit,
            })??,
        None => backend.generate(prompt).await?,
    };

    parse_verdict(&raw)
}

fn resolve_reference<'a>(
    verdict: &Verdict,
    candidates: &[MatchCandidate<'a>],
) -> Option<&'a VerseRecord> {
    let wanted = verdict.reference.as_deref()?.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    candidates
        .iter()
        .find(|candidate| candidate.item.reference().to_lowercase() == wanted)
        .map(|candidate| candidate.item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Scored;
    use async_trait::async_trait;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct MockBackend {
        name: &'static str,
        timeout: Option<Duration>,
        reply: Reply,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn new(name: &'static str, reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                name,
                timeout: None,
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn with_timeout(name: &'static str, reply: Reply, timeout: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                timeout: Some(timeout),
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationBackend for MockBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn timeout(&self) -> Option<Duration> {
            self.timeout
        }

        async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Text(text) => Ok((*text).to_string()),
                Reply::Fail => Err(AppError::BackendUnreachable {
                    backend: self.name.to_string(),
                    reason: "connection refused".into(),
                }),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn verses() -> (VerseRecord, VerseRecord) {
        (
            VerseRecord::new("Mateus 4:4", "Nem só de pão viverá o homem"),
            VerseRecord::new("Deuteronômio 8:3", "o homem não viverá só de pão"),
        )
    }

    fn disambiguator(backends: &[Arc<MockBackend>]) -> Disambiguator {
        Disambiguator::new(
            backends
                .iter()
                .map(|backend| Arc::clone(backend) as SharedBackend)
                .collect(),
        )
    }

    #[tokio::test]
    async fn no_candidates_skips_backends() {
        let backend = MockBackend::new("primary", Reply::Text(r#"{"encontrou": true}"#));
        let result = disambiguator(&[Arc::clone(&backend)])
            .disambiguate("pao", &[])
            .await;
        assert!(result.is_none());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn backend_can_choose_a_lower_ranked_candidate() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&mateus, 2), Scored::new(&deut, 2)];
        let backend = MockBackend::new(
            "primary",
            Reply::Text(r#"Resposta: {"encontrou": true, "referencia": "deuteronômio 8:3", "confianca": "alta"}"#),
        );

        let decision = disambiguator(&[backend])
            .disambiguate("o homem nao vivera so de pao", &candidates)
            .await
            .expect("decision");

        assert_eq!(decision.verse.reference(), "Deuteronômio 8:3");
        assert_eq!(decision.context, "Confiança: alta");
        assert_eq!(decision.backend, "primary");
    }

    #[tokio::test]
    async fn numeric_confidence_does_not_discard_the_decision() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&mateus, 2), Scored::new(&deut, 2)];
        let backend = MockBackend::new(
            "primary",
            Reply::Text(r#"{"encontrou": true, "referencia": "Deuteronômio 8:3", "confianca": 0.9}"#),
        );

        let decision = disambiguator(&[backend])
            .disambiguate("o homem nao vivera so de pao", &candidates)
            .await
            .expect("decision");

        assert_eq!(decision.verse.reference(), "Deuteronômio 8:3");
        assert_eq!(decision.context, "Confiança: 0.9");
    }

    #[tokio::test]
    async fn timed_out_backend_falls_through_to_the_next() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&mateus, 2), Scored::new(&deut, 2)];
        let slow = MockBackend::with_timeout("slow", Reply::Hang, Duration::from_millis(50));
        let fallback = MockBackend::new(
            "fallback",
            Reply::Text(r#"{"encontrou": true, "referencia": "Mateus 4:4"}"#),
        );

        let decision = disambiguator(&[Arc::clone(&slow), Arc::clone(&fallback)])
            .disambiguate("nem so de pao", &candidates)
            .await
            .expect("decision");

        assert_eq!(slow.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert_eq!(decision.verse.reference(), "Mateus 4:4");
        assert_eq!(decision.backend, "fallback");
        assert!(decision.context.is_empty());
    }

    #[tokio::test]
    async fn failing_and_malformed_backends_are_skipped() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&mateus, 2), Scored::new(&deut, 1)];
        let down = MockBackend::new("down", Reply::Fail);
        let chatty = MockBackend::new("chatty", Reply::Text("Não sei dizer."));
        let last = MockBackend::new(
            "last",
            Reply::Text(r#"{"encontrou": true, "referencia": "Deuteronômio 8:3", "confianca": "media"}"#),
        );

        let decision = disambiguator(&[down, chatty, Arc::clone(&last)])
            .disambiguate("vivera o homem", &candidates)
            .await
            .expect("decision");

        assert_eq!(last.calls(), 1);
        assert_eq!(decision.verse.reference(), "Deuteronômio 8:3");
        assert_eq!(decision.context, "Confiança: media");
    }

    #[tokio::test]
    async fn negative_verdict_defers_to_the_next_backend() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&mateus, 2), Scored::new(&deut, 2)];
        let unsure = MockBackend::new("unsure", Reply::Text(r#"{"encontrou": false, "referencia": ""}"#));
        let sure = MockBackend::new(
            "sure",
            Reply::Text(r#"{"encontrou": true, "referencia": "Deuteronômio 8:3"}"#),
        );

        let decision = disambiguator(&[Arc::clone(&unsure), sure])
            .disambiguate("pao homem", &candidates)
            .await
            .expect("decision");

        assert_eq!(unsure.calls(), 1);
        assert_eq!(decision.backend, "sure");
    }

    #[tokio::test]
    async fn unknown_reference_resolves_to_the_top_candidate() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&deut, 3), Scored::new(&mateus, 2)];
        let backend = MockBackend::new(
            "primary",
            Reply::Text(r#"{"encontrou": true, "referencia": "Lucas 4:4", "confianca": "baixa"}"#),
        );

        let decision = disambiguator(&[backend])
            .disambiguate("pao homem", &candidates)
            .await
            .expect("decision");

        assert_eq!(decision.verse.reference(), "Deuteronômio 8:3");
        assert_eq!(decision.context, "Confiança: baixa");
    }

    #[tokio::test]
    async fn exhausted_backends_yield_no_decision() {
        let (mateus, deut) = verses();
        let candidates = [Scored::new(&mateus, 2), Scored::new(&deut, 2)];
        let first = MockBackend::new("first", Reply::Fail);
        let second = MockBackend::with_timeout("second", Reply::Hang, Duration::from_millis(20));
        let third = MockBackend::new("third", Reply::Text(r#"{"encontrou": false}"#));

        let result = disambiguator(&[Arc::clone(&first), Arc::clone(&second), Arc::clone(&third)])
            .disambiguate("pao homem", &candidates)
            .await;

        assert!(result.is_none());
        assert_eq!(
            [first.calls(), second.calls(), third.calls()],
            [1, 1, 1]
        );
    }

    #[tokio::test]
    async fn empty_backend_list_yields_no_decision() {
        let (mateus, _) = verses();
        let candidates = [Scored::new(&mateus, 1)];
        assert!(Disambiguator::default()
            .disambiguate("pao", &candidates)
            .await
            .is_none());
    }
}
