//! The Turn: one prompt's bounded two-phase negotiation with a model.
//!
//! ```text
//! Idle ─▶ Phase1Pending ─┬─▶ TextOnly ──────────────────────────────────┬─▶ Done
//!                        └─▶ ToolCallsCollected ─▶ Executing ─▶ Phase2Pending ┘
//! ```
//!
//! A [`Turn`] owns the text buffer and the collected calls/results for one
//! request. It refuses out-of-order transitions, so a third adapter round is
//! unrepresentable rather than merely unlikely.

use super::response::ResponsePart;
use crate::tool::entities::ToolCall;
use crate::tool::value_objects::{ToolError, ToolResult};
use thiserror::Error;

/// Appended to the answer when the model asks for tools in the second round.
pub const PROTOCOL_VIOLATION_NOTICE: &str = "[Protocol violation: the model requested further tool calls after receiving tool results. They were not executed.]";

/// Maximum number of provider adapter calls per turn.
pub const MAX_ADAPTER_ROUNDS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    Idle,
    Phase1Pending,
    TextOnly,
    ToolCallsCollected,
    Executing,
    Phase2Pending,
    Done,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::Phase1Pending => "phase1_pending",
            TurnState::TextOnly => "text_only",
            TurnState::ToolCallsCollected => "tool_calls_collected",
            TurnState::Executing => "executing",
            TurnState::Phase2Pending => "phase2_pending",
            TurnState::Done => "done",
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error("cannot {action} while turn is {from}")]
    IllegalTransition {
        from: TurnState,
        action: &'static str,
    },
}

/// What the second round did with a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase2Disposition {
    /// Text was appended; keep draining.
    Continue,
    /// The model asked for tools again; the turn is over.
    ProtocolViolation,
}

/// Phase-1 tool calls paired with their results, handed to the second round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRound {
    /// Text the model wrote alongside its calls in phase 1, possibly empty.
    pub preamble: String,
    pub calls: Vec<ToolCall>,
    /// One result per call, in call order.
    pub results: Vec<ToolResult>,
}

impl ToolRound {
    pub fn pairs(&self) -> impl Iterator<Item = (&ToolCall, &ToolResult)> {
        self.calls.iter().zip(self.results.iter())
    }

    pub fn result_for(&self, tool_call_id: &str) -> Option<&ToolResult> {
        self.results.iter().find(|r| r.tool_call_id == tool_call_id)
    }
}

#[derive(Debug)]
pub struct Turn {
    state: TurnState,
    buffer: String,
    tool_calls: Vec<ToolCall>,
    tool_results: Vec<ToolResult>,
    adapter_rounds: u8,
    phase2_text_seen: bool,
}

impl Default for Turn {
    fn default() -> Self {
        Self::new()
    }
}

impl Turn {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            buffer: String::new(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            adapter_rounds: 0,
            phase2_text_seen: false,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn adapter_rounds(&self) -> u8 {
        self.adapter_rounds
    }

    fn expect(&self, state: TurnState, action: &'static str) -> Result<(), TurnError> {
        if self.state == state {
            Ok(())
        } else {
            Err(TurnError::IllegalTransition {
                from: self.state,
                action,
            })
        }
    }

    /// Count one more adapter call, refusing to exceed [`MAX_ADAPTER_ROUNDS`].
    fn start_round(&mut self, action: &'static str) -> Result<(), TurnError> {
        if self.adapter_rounds >= MAX_ADAPTER_ROUNDS {
            return Err(TurnError::IllegalTransition {
                from: self.state,
                action,
            });
        }
        self.adapter_rounds += 1;
        Ok(())
    }

    fn push_paragraph(&mut self, text: &str) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push_str("\n\n");
        }
        self.buffer.push_str(text);
    }

    // ==================== Phase 1 ====================

    pub fn begin_phase1(&mut self) -> Result<(), TurnError> {
        self.expect(TurnState::Idle, "begin phase 1")?;
        self.start_round("begin phase 1")?;
        self.state = TurnState::Phase1Pending;
        Ok(())
    }

    pub fn absorb_phase1(&mut self, part: ResponsePart) -> Result<(), TurnError> {
        self.expect(TurnState::Phase1Pending, "absorb a phase 1 part")?;
        match part {
            ResponsePart::Text(text) => self.buffer.push_str(&text),
            ResponsePart::ToolCallRequest(calls) => self.tool_calls.extend(calls),
        }
        Ok(())
    }

    /// Close phase 1; returns `TextOnly` or `ToolCallsCollected`.
    pub fn finish_phase1(&mut self) -> Result<TurnState, TurnError> {
        self.expect(TurnState::Phase1Pending, "finish phase 1")?;
        self.state = if self.tool_calls.is_empty() {
            TurnState::TextOnly
        } else {
            TurnState::ToolCallsCollected
        };
        Ok(self.state)
    }

    // ==================== Tool execution ====================

    pub fn begin_execution(&mut self) -> Result<Vec<ToolCall>, TurnError> {
        self.expect(TurnState::ToolCallsCollected, "execute tools")?;
        self.state = TurnState::Executing;
        Ok(self.tool_calls.clone())
    }

    /// Correlate results to calls by `tool_call_id`.
    ///
    /// Each result is consumed at most once, so duplicate ids from the model
    /// still get one result each. A call left without a result gets an error
    /// result; results matching no call are dropped.
    pub fn record_results(&mut self, results: Vec<ToolResult>) -> Result<(), TurnError> {
        self.expect(TurnState::Executing, "record tool results")?;
        let mut pool: Vec<Option<ToolResult>> = results.into_iter().map(Some).collect();
        self.tool_results = self
            .tool_calls
            .iter()
            .map(|call| {
                pool.iter_mut()
                    .find(|slot| matches!(slot, Some(r) if r.tool_call_id == call.id))
                    .and_then(Option::take)
                    .unwrap_or_else(|| {
                        ToolResult::failure(
                            &call.id,
                            &ToolError::Backend("tool call produced no result".to_string()),
                        )
                    })
            })
            .collect();
        Ok(())
    }

    // ==================== Phase 2 ====================

    pub fn begin_phase2(&mut self) -> Result<ToolRound, TurnError> {
        self.expect(TurnState::Executing, "begin phase 2")?;
        if self.tool_results.len() != self.tool_calls.len() {
            return Err(TurnError::IllegalTransition {
                from: self.state,
                action: "begin phase 2 before every call has a result",
            });
        }
        self.start_round("begin a third adapter round")?;
        self.state = TurnState::Phase2Pending;
        Ok(ToolRound {
            preamble: self.buffer.clone(),
            calls: self.tool_calls.clone(),
            results: self.tool_results.clone(),
        })
    }

    pub fn absorb_phase2(&mut self, part: ResponsePart) -> Result<Phase2Disposition, TurnError> {
        self.expect(TurnState::Phase2Pending, "absorb a phase 2 part")?;
        match part {
            ResponsePart::Text(text) => {
                if !self.phase2_text_seen {
                    self.phase2_text_seen = true;
                    self.push_paragraph(&text);
                } else {
                    self.buffer.push_str(&text);
                }
                Ok(Phase2Disposition::Continue)
            }
            ResponsePart::ToolCallRequest(_) => {
                self.push_paragraph(PROTOCOL_VIOLATION_NOTICE);
                self.state = TurnState::Done;
                Ok(Phase2Disposition::ProtocolViolation)
            }
        }
    }

    // ==================== Termination ====================

    /// End the turn early with a terminal message (timeouts, cancellation).
    pub fn fail(&mut self, message: &str) {
        self.push_paragraph(message);
        self.state = TurnState::Done;
    }

    /// Consume the turn and return the final answer text.
    pub fn finish(mut self) -> String {
        self.state = TurnState::Done;
        std::mem::take(&mut self.buffer)
    }
}
