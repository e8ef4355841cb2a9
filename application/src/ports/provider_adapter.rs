//! Provider adapter port
//!
//! Defines the uniform contract every LLM backend is reduced to: a request
//! goes in, a finite stream of [`ResponsePart`]s comes out.

use async_trait::async_trait;
use kin_domain::{ProviderKind, ResponsePart, ToolCatalog, ToolRound};
use tokio::sync::mpsc;

/// Buffer size of the channel between an adapter's producer task and the
/// orchestrator.
pub const RESPONSE_CHANNEL_CAPACITY: usize = 32;

/// Producer half handed to an adapter's background task.
pub type PartSender = mpsc::Sender<ResponsePart>;

/// What the model is asked to do in one round.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub catalog: ToolCatalog,
    /// Present only in the second round: the first round's calls and their results.
    pub tool_round: Option<ToolRound>,
}

impl GenerateRequest {
    pub fn phase1(prompt: impl Into<String>, catalog: ToolCatalog) -> Self {
        Self {
            prompt: prompt.into(),
            catalog,
            tool_round: None,
        }
    }

    pub fn phase2(prompt: impl Into<String>, catalog: ToolCatalog, round: ToolRound) -> Self {
        Self {
            prompt: prompt.into(),
            catalog,
            tool_round: Some(round),
        }
    }

    pub fn is_phase2(&self) -> bool {
        self.tool_round.is_some()
    }
}

/// Consumer half of one generation.
///
/// Lazy, finite and not restartable. Dropping it (or calling
/// [`close`](Self::close)) tells the producer to stop.
pub struct ResponseStream {
    receiver: mpsc::Receiver<ResponsePart>,
}

impl ResponseStream {
    pub fn new(receiver: mpsc::Receiver<ResponsePart>) -> Self {
        Self { receiver }
    }

    /// Create a connected producer/consumer pair.
    pub fn channel() -> (PartSender, Self) {
        let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
        (tx, Self::new(rx))
    }

    /// A stream that yields `parts` and ends. Used by batched adapters and tests.
    pub fn from_parts(parts: Vec<ResponsePart>) -> Self {
        let (tx, rx) = mpsc::channel(parts.len().max(1));
        for part in parts {
            // Capacity equals the number of parts, so this cannot be full.
            let _ = tx.try_send(part);
        }
        Self::new(rx)
    }

    pub async fn next(&mut self) -> Option<ResponsePart> {
        self.receiver.recv().await
    }

    /// Stop accepting parts; the producer sees its sender closed.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Drain everything that remains.
    pub async fn collect_parts(mut self) -> Vec<ResponsePart> {
        let mut parts = Vec::new();
        while let Some(part) = self.next().await {
            parts.push(part);
        }
        parts
    }
}

/// A pluggable translation layer between one LLM vendor and the
/// Text / ToolCallRequest contract.
///
/// Implementations are long-lived singletons shared across concurrent turns,
/// so they must not keep per-turn state.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Start one generation round.
    ///
    /// Never fails: transport and vendor errors arrive as a final
    /// [`ResponsePart::Text`] describing the problem.
    fn generate_stream(&self, request: GenerateRequest) -> ResponseStream;

    /// Short operator-facing reachability string.
    async fn status(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_parts_yields_in_order_then_ends() {
        let stream = ResponseStream::from_parts(vec![
            ResponsePart::text("a"),
            ResponsePart::text("b"),
        ]);
        let parts = stream.collect_parts().await;
        assert_eq!(parts, vec![ResponsePart::text("a"), ResponsePart::text("b")]);
    }

    #[tokio::test]
    async fn test_empty_stream_ends_immediately() {
        let mut stream = ResponseStream::from_parts(vec![]);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_visible_to_producer() {
        let (tx, mut stream) = ResponseStream::channel();
        stream.close();
        assert!(tx.send(ResponsePart::text("late")).await.is_err());
        assert!(tx.is_closed());
    }

    #[test]
    fn test_request_phases() {
        let catalog = ToolCatalog::new(vec![]);
        let phase1 = GenerateRequest::phase1("hi", catalog.clone());
        assert!(!phase1.is_phase2());

        let round = ToolRound {
            preamble: String::new(),
            calls: vec![],
            results: vec![],
        };
        let phase2 = GenerateRequest::phase2("hi", catalog.clone(), round);
        assert!(phase2.is_phase2());
        assert!(phase2.catalog.shares_storage(&phase1.catalog));
    }
}
