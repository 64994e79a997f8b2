use std::{env, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Wire protocol spoken by a disambiguation backend.
#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Ollama-style `/api/generate` endpoint returning `{"response": ...}`.
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions endpoint (Groq, OpenAI, ...).
    ChatCompletions,
}

/// One entry of the ordered backend list. Earlier entries are tried first.
#[derive(Clone, Deserialize, Debug)]
pub struct BackendConfig {
    pub name: String,
    #[serde(default)]
    pub kind: BackendKind,
    pub url: String,
    pub model: String,
    /// Absent or zero means the attempt is never cut short.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is not set inline.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub num_predict: Option<u32>,
    #[serde(default)]
    pub num_thread: Option<u32>,
    #[serde(default)]
    pub num_gpu: Option<u32>,
    #[serde(default)]
    pub low_vram: Option<bool>,
    #[serde(default = "default_json_format")]
    pub json_format: bool,
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|key| env::var(key).ok())
            })
            .filter(|key| !key.trim().is_empty())
    }

    /// Chat backends cannot be called without a key; generate endpoints need none.
    pub fn is_configured(&self) -> bool {
        match self.kind {
            BackendKind::Ollama => true,
            BackendKind::ChatCompletions => self.resolved_api_key().is_some(),
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    #[serde(default = "default_min_token_chars")]
    pub min_token_chars: usize,
    #[serde(default)]
    pub exact_min_query_chars: usize,
    #[serde(default = "default_boilerplate")]
    pub boilerplate: Vec<String>,
    /// Book names accepted in chapter headings. An empty list accepts any
    /// `<name> <number>` line whose name does not start with a number.
    #[serde(default = "default_canonical_books")]
    pub canonical_books: Vec<String>,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.candidate_limit == 0 {
            return Err(AppError::Validation(
                "candidate_limit must be greater than zero".to_string(),
            ));
        }

        for backend in &self.backends {
            if backend.url.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "backend '{}' has an empty url",
                    backend.name
                )));
            }
            if backend.model.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "backend '{}' has an empty model",
                    backend.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            http_port: default_http_port(),
            candidate_limit: default_candidate_limit(),
            min_token_chars: default_min_token_chars(),
            exact_min_query_chars: 0,
            boilerplate: default_boilerplate(),
            canonical_books: default_canonical_books(),
            backends: default_backends(),
        }
    }
}

fn default_corpus_path() -> String {
    "Portugues-All-Bible-Corrigida-Fiel.txt".to_string()
}

const fn default_http_port() -> u16 {
    3000
}

const fn default_candidate_limit() -> usize {
    3
}

const fn default_min_token_chars() -> usize {
    4
}

const fn default_json_format() -> bool {
    true
}

fn default_boilerplate() -> Vec<String> {
    vec![
        "Bíblia Almeida Corrigida Fiel".to_string(),
        "Sociedade Bíblica".to_string(),
    ]
}

pub const CANONICAL_BOOKS: [&str; 66] = [
    "Gênesis",
    "Êxodo",
    "Levítico",
    "Números",
    "Deuteronômio",
    "Josué",
    "Juízes",
    "Rute",
    "1 Samuel",
    "2 Samuel",
    "1 Reis",
    "2 Reis",
    "1 Crônicas",
    "2 Crônicas",
    "Esdras",
    "Neemias",
    "Ester",
    "Jó",
    "Salmos",
    "Provérbios",
    "Eclesiastes",
    "Cânticos",
    "Isaías",
    "Jeremias",
    "Lamentações",
    "Ezequiel",
    "Daniel",
    "Oséias",
    "Joel",
    "Amós",
    "Obadias",
    "Jonas",
    "Miquéias",
    "Naum",
    "Habacuque",
    "Sofonias",
    "Ageu",
    "Zacarias",
    "Malaquias",
    "Mateus",
    "Marcos",
    "Lucas",
    "João",
    "Atos",
    "Romanos",
    "1 Coríntios",
    "2 Coríntios",
    "Gálatas",
    "Efésios",
    "Filipenses",
    "Colossenses",
    "1 Tessalonicenses",
    "2 Tessalonicenses",
    "1 Timóteo",
    "2 Timóteo",
    "Tito",
    "Filemom",
    "Hebreus",
    "Tiago",
    "1 Pedro",
    "2 Pedro",
    "1 João",
    "2 João",
    "3 João",
    "Judas",
    "Apocalipse",
];

fn default_canonical_books() -> Vec<String> {
    CANONICAL_BOOKS.iter().map(ToString::to_string).collect()
}

fn default_backends() -> Vec<BackendConfig> {
    vec![BackendConfig {
        name: "local".to_string(),
        kind: BackendKind::Ollama,
        url: "http://localhost:11434/api/generate".to_string(),
        model: "llama3.1:8b".to_string(),
        timeout_secs: None,
        api_key: None,
        api_key_env: None,
        temperature: Some(0.0),
        num_predict: Some(100),
        num_thread: None,
        num_gpu: None,
        low_vram: None,
        json_format: true,
    }]
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
