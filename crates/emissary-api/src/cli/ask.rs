//! `emissary ask`: one question, answered on stdout as it streams.

use std::io::Write;

use emissary_core::relay::StreamCallback;
use emissary_types::content::ChatTurn;
use emissary_types::error::TokenError;
use emissary_types::generate::GenerateOptions;
use emissary_types::llm::ModelResponse;

use crate::conversation::ensure_question;
use crate::state::AppState;

/// Writes each token to `out` as soon as it arrives.
pub struct WriterCallback<W> {
    out: W,
}

impl<W: Write + Send> WriterCallback<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> StreamCallback for WriterCallback<W> {
    fn on_token(&mut self, token: &str) -> Result<(), TokenError> {
        self.out
            .write_all(token.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    fn on_complete(&mut self, response: &ModelResponse) {
        if let Err(e) = writeln!(self.out) {
            tracing::warn!("Failed to finish output: {e}");
        }
        tracing::debug!(
            chunks = response.chunks.len(),
            finish_reason = ?response.finish_reason,
            "Answer complete"
        );
    }
}

pub async fn ask(
    state: &AppState,
    vector_name: &str,
    question: &str,
    instructions: Option<String>,
    trace_id: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut turns: Vec<ChatTurn> = Vec::new();
    ensure_question(&mut turns, question);

    let options = GenerateOptions {
        trace_id,
        instructions,
        ..GenerateOptions::default()
    };

    if json {
        let mut sink = WriterCallback::new(std::io::sink());
        let result = state
            .orchestrator
            .generate(question, vector_name, &turns, &mut sink, options)
            .await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        console::style(vector_name).cyan().bold(),
        console::style(question).dim()
    );
    println!();

    let mut callback = WriterCallback::new(std::io::stdout());
    let result = state
        .orchestrator
        .generate(question, vector_name, &turns, &mut callback, options)
        .await?;

    println!();
    println!(
        "  {}",
        console::style(format!(
            "{} chars, {} content units",
            result.answer.chars().count(),
            result.metadata.contents.len()
        ))
        .dim()
    );

    Ok(())
}
