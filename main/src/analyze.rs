use std::io::{self, BufRead, Write};

use clap::Parser;
use common::utils::config::get_config;
use retrieval_pipeline::VerseEngine;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Identify the Bible verses that phrases refer to.
#[derive(Debug, Parser)]
#[command(name = "analyze", version)]
struct Cli {
    /// Phrases to analyze. When none are given, one phrase is read per stdin line.
    phrases: Vec<String>,

    /// Override the configured corpus file.
    #[arg(long, env = "CORPUS_PATH")]
    corpus: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    let mut config = get_config()?;
    if let Some(corpus) = cli.corpus {
        config.corpus_path = corpus;
    }
    let engine = VerseEngine::from_config(&config)?;

    let mut stdout = io::stdout().lock();
    if cli.phrases.is_empty() {
        analyze_lines(&engine, io::stdin().lock(), &mut stdout).await?;
    } else {
        for phrase in &cli.phrases {
            emit(&engine, phrase, &mut stdout).await?;
        }
    }

    Ok(())
}

/// Analyze one phrase per input line, writing each result as soon as it is ready.
async fn analyze_lines(
    engine: &VerseEngine,
    input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for line in input.lines() {
        emit(engine, &line?, out).await?;
    }
    Ok(())
}

async fn emit(engine: &VerseEngine, phrase: &str, out: &mut impl Write) -> anyhow::Result<()> {
    if phrase.trim().is_empty() {
        return Ok(());
    }

    let result = engine.analyze(phrase).await;
    writeln!(out, "{}", serde_json::to_string(&result)?)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::{
        corpus::CorpusIndex, store::CorpusStore, types::verse_record::VerseRecord,
    };
    use retrieval_pipeline::{disambiguation::Disambiguator, RetrievalTuning};
    use std::{io::Cursor, sync::Arc};

    #[tokio::test]
    async fn writes_one_json_line_per_non_blank_input_line() {
        let store = CorpusStore::preloaded(CorpusIndex::from_verses([VerseRecord::new(
            "Salmos 23:1",
            "O Senhor é o meu pastor, nada me faltará.",
        )]));
        let engine = VerseEngine::new(
            Arc::new(store),
            Disambiguator::default(),
            RetrievalTuning::default(),
        );
        let input = Cursor::new("o senhor e o meu pastor\n\nhoje faz muito calor\n");
        let mut out = Vec::new();

        analyze_lines(&engine, input, &mut out)
            .await
            .expect("analysis succeeds");

        let output = String::from_utf8(out).expect("utf-8 output");
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["status"], "found");
        assert_eq!(lines[0]["reference"], "Salmos 23:1");
        assert_eq!(lines[1]["status"], "not_found");
    }
}
