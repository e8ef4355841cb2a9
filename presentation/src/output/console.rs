//! Console output for answers, provider status and the tool catalog

use crate::progress::spinner::TurnSpinner;
use colored::Colorize;
use kin_application::AnswerStream;
use kin_domain::ToolCatalog;
use std::io::{self, Write};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Write answer chunks to `out` as they arrive.
    ///
    /// The spinner is cleared before the first chunk. Returns the number of
    /// chunks written; zero means the turn produced no text.
    pub async fn stream_answer<W: Write>(
        mut answer: AnswerStream,
        spinner: Option<&TurnSpinner>,
        out: &mut W,
    ) -> io::Result<usize> {
        let mut chunks = 0;
        while let Some(chunk) = answer.next().await {
            if chunks == 0
                && let Some(spinner) = spinner
            {
                spinner.finish();
            }
            out.write_all(chunk.as_bytes())?;
            out.flush()?;
            chunks += 1;
        }
        if let Some(spinner) = spinner {
            spinner.finish();
        }
        if chunks > 0 {
            writeln!(out)?;
        }
        Ok(chunks)
    }

    /// Color a status line by its outcome.
    pub fn format_status(line: &str) -> String {
        if line.contains(": reachable") {
            line.green().to_string()
        } else if line.starts_with("Error:") {
            line.red().to_string()
        } else {
            line.yellow().to_string()
        }
    }

    /// Human-readable catalog listing
    pub fn format_tools(catalog: &ToolCatalog) -> String {
        let mut output = format!("{}\n", "Available tools:".cyan().bold());
        for tool in catalog.list() {
            output.push_str(&format!("\n  {}\n", tool.name.bold()));
            output.push_str(&format!("    {}\n", tool.description));
            for (name, spec) in &tool.parameters.properties {
                let required = if tool.is_required(name) {
                    "required"
                } else {
                    "optional"
                };
                output.push_str(&format!(
                    "    - {} ({}, {}): {}\n",
                    name,
                    spec.param_type.as_str(),
                    required,
                    spec.description.dimmed()
                ));
            }
        }
        output
    }

    /// Format the catalog as JSON
    pub fn format_tools_json(catalog: &ToolCatalog) -> String {
        serde_json::to_string_pretty(catalog.list()).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kin_application::{
        ProviderSelector, RunTurnInput, RunTurnUseCase, ToolExecutorPort,
    };
    use kin_domain::{Credential, ParamType, ToolCall, ToolDefinition, ToolResult};
    use std::sync::Arc;

    struct NoTools(ToolCatalog);

    #[async_trait]
    impl ToolExecutorPort for NoTools {
        fn catalog(&self) -> &ToolCatalog {
            &self.0
        }

        async fn execute(&self, call: &ToolCall, _credential: Option<&Credential>) -> ToolResult {
            ToolResult::success(&call.id, &serde_json::Value::Null)
        }
    }

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(vec![
            ToolDefinition::new("search_family", "Search families by name").with_parameter(
                "query",
                ParamType::String,
                "Name to search for",
                true,
            ),
        ])
    }

    #[tokio::test]
    async fn test_stream_answer_writes_chunks() {
        colored::control::set_override(false);
        let use_case = RunTurnUseCase::new(
            Arc::new(ProviderSelector::new("gemini")),
            Arc::new(NoTools(catalog())),
        );
        let answer = use_case.run(RunTurnInput::new("hello"));

        let mut out = Vec::new();
        let chunks = ConsoleFormatter::stream_answer(answer, None, &mut out)
            .await
            .unwrap();

        assert_eq!(chunks, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error: Invalid AI provider 'gemini'.\n"
        );
    }

    #[test]
    fn test_format_tools_lists_parameters() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_tools(&catalog());
        assert!(text.contains("search_family"));
        assert!(text.contains("- query (string, required): Name to search for"));
    }

    #[test]
    fn test_format_tools_json() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_tools_json(&catalog())).unwrap();
        assert_eq!(json[0]["name"], "search_family");
        assert_eq!(
            json[0]["parameters"]["properties"]["query"]["type"],
            "string"
        );
    }
}
