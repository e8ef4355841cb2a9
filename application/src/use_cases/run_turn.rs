//! Run Turn use case.
//!
//! Answers one prompt with at most two model round trips:
//!
//! 1. Resolve the provider adapter (a bad name ends the turn immediately)
//! 2. Phase 1: the model sees the prompt and the tool catalog
//! 3. If it asked for tools, run them all concurrently
//! 4. Phase 2: the model sees the results and writes the answer
//!
//! The answer is delivered through an [`AnswerStream`]. The turn runs on its
//! own task, so dropping the stream or cancelling the token stops it.

use crate::config::TurnParams;
use crate::ports::provider_adapter::{GenerateRequest, ProviderAdapter, ResponseStream};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::provider_selector::ProviderSelector;
use crate::use_cases::tool_helpers::tool_args_preview;
use kin_domain::util::preview;
use kin_domain::{
    Credential, DomainError, Phase2Disposition, ProviderKind, ToolCall, ToolError, ToolResult,
    Turn, TurnError, TurnState,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffer size of the answer channel.
const ANSWER_CHANNEL_CAPACITY: usize = 8;

/// Input for the [`RunTurnUseCase`].
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    /// The user's prompt.
    pub prompt: String,
    /// Forwarded to authenticated tools; never shown to the model.
    pub credential: Option<Credential>,
    /// Provider name as the caller wrote it. `None` selects the default.
    pub provider: Option<String>,
}

impl RunTurnInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            credential: None,
            provider: None,
        }
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Chunks of the final answer, in order.
pub struct AnswerStream {
    receiver: mpsc::Receiver<String>,
}

impl AnswerStream {
    fn new(receiver: mpsc::Receiver<String>) -> Self {
        Self { receiver }
    }

    pub async fn next(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    pub async fn collect(mut self) -> Vec<String> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next().await {
            chunks.push(chunk);
        }
        chunks
    }

    pub async fn collect_text(self) -> String {
        self.collect().await.concat()
    }
}

/// Use case for running one turn.
#[derive(Clone)]
pub struct RunTurnUseCase {
    selector: Arc<ProviderSelector>,
    executor: Arc<dyn ToolExecutorPort>,
    params: TurnParams,
}

impl RunTurnUseCase {
    pub fn new(selector: Arc<ProviderSelector>, executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            selector,
            executor,
            params: TurnParams::default(),
        }
    }

    pub fn with_params(mut self, params: TurnParams) -> Self {
        self.params = params;
        self
    }

    pub fn run(&self, input: RunTurnInput) -> AnswerStream {
        self.run_with_cancellation(input, CancellationToken::new())
    }

    /// Start the turn on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_with_cancellation(
        &self,
        input: RunTurnInput,
        cancel: CancellationToken,
    ) -> AnswerStream {
        let (tx, rx) = mpsc::channel(ANSWER_CHANNEL_CAPACITY);
        let this = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Turn cancelled");
                }
                _ = tx.closed() => {
                    debug!("Answer receiver dropped, abandoning turn");
                }
                _ = this.drive(input, &tx) => {}
            }
        });

        AnswerStream::new(rx)
    }

    async fn drive(&self, input: RunTurnInput, tx: &mpsc::Sender<String>) {
        let RunTurnInput {
            prompt,
            credential,
            provider,
        } = input;

        let adapter = match self.selector.resolve(provider.as_deref()) {
            Ok(adapter) => adapter,
            Err(e) => {
                let e = DomainError::from(e);
                warn!(provider = ?provider, "Provider resolution failed: {}", e);
                let _ = tx.send(format!("Error: {}", e)).await;
                return;
            }
        };

        info!(
            provider = adapter.kind().as_str(),
            "Starting turn: {}",
            preview(&prompt, 100)
        );

        let answer = match self
            .negotiate(adapter.as_ref(), &prompt, credential.as_ref())
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Turn aborted: {}", e);
                format!("Error: {}", e)
            }
        };

        if answer.is_empty() {
            debug!("Turn produced no text");
            return;
        }
        let _ = tx.send(answer).await;
    }

    /// Run both phases against `adapter` and return the buffered answer.
    async fn negotiate(
        &self,
        adapter: &dyn ProviderAdapter,
        prompt: &str,
        credential: Option<&Credential>,
    ) -> Result<String, DomainError> {
        let kind = adapter.kind();
        let catalog = self.executor.catalog().clone();
        let mut turn = Turn::new();

        // Phase 1
        turn.begin_phase1()?;
        let stream = adapter.generate_stream(GenerateRequest::phase1(prompt, catalog.clone()));
        match tokio::time::timeout(
            self.params.adapter_timeout,
            drain_phase1(&mut turn, stream),
        )
        .await
        {
            Ok(drained) => drained?,
            Err(_) => {
                warn!(provider = kind.as_str(), phase = 1, "Adapter timed out");
                turn.fail(&timed_out(kind));
                return Ok(turn.finish());
            }
        }

        if turn.finish_phase1()? == TurnState::TextOnly {
            debug!(provider = kind.as_str(), "Model answered without tools");
            return Ok(turn.finish());
        }

        // Tools
        let calls = turn.begin_execution()?;
        info!(
            provider = kind.as_str(),
            "Model requested {} tool call(s)",
            calls.len()
        );
        let results = self.execute_tools(&calls, credential).await;
        turn.record_results(results)?;

        // Phase 2
        let round = turn.begin_phase2()?;
        let stream = adapter.generate_stream(GenerateRequest::phase2(prompt, catalog, round));
        match tokio::time::timeout(
            self.params.adapter_timeout,
            drain_phase2(&mut turn, stream),
        )
        .await
        {
            Ok(drained) => drained?,
            Err(_) => {
                warn!(provider = kind.as_str(), phase = 2, "Adapter timed out");
                turn.fail(&timed_out(kind));
            }
        }

        Ok(turn.finish())
    }

    /// Run every call concurrently, each under its own deadline.
    ///
    /// Results come back in call order; the turn re-associates them by id.
    async fn execute_tools(
        &self,
        calls: &[ToolCall],
        credential: Option<&Credential>,
    ) -> Vec<ToolResult> {
        let futures = calls.iter().map(|call| async move {
            debug!(
                tool = %call.function_name,
                call_id = %call.id,
                "Executing tool: {}",
                tool_args_preview(call)
            );
            match tokio::time::timeout(
                self.params.tool_timeout,
                self.executor.execute(call, credential),
            )
            .await
            {
                Ok(result) => {
                    if let Some(error) = result.error_message() {
                        warn!(tool = %call.function_name, call_id = %call.id, "Tool failed: {}", error);
                    }
                    result
                }
                Err(_) => {
                    warn!(tool = %call.function_name, call_id = %call.id, "Tool timed out");
                    ToolResult::failure(&call.id, &ToolError::Timeout)
                }
            }
        });

        futures::future::join_all(futures).await
    }
}

fn timed_out(kind: ProviderKind) -> String {
    format!("Error: AI provider '{}' timed out.", kind.display_name())
}

async fn drain_phase1(turn: &mut Turn, mut stream: ResponseStream) -> Result<(), TurnError> {
    while let Some(part) = stream.next().await {
        turn.absorb_phase1(part)?;
    }
    Ok(())
}

async fn drain_phase2(turn: &mut Turn, mut stream: ResponseStream) -> Result<(), TurnError> {
    while let Some(part) = stream.next().await {
        if turn.absorb_phase2(part)? == Phase2Disposition::ProtocolViolation {
            warn!("Model requested tools after receiving tool results; ignoring them");
            stream.close();
            break;
        }
    }
    Ok(())
}
