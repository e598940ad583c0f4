//! The reasoning-agent control loop.
//!
//! One turn alternates between asking the [`Planner`] for a step, invoking the
//! selected tool, and feeding the tool's text output back as an observation,
//! until the planner emits a final answer or the iteration budget runs out.
//! Unknown tools and unparseable planner output are recovered in-loop as error
//! observations; only the budget bounds how long recovery may go on.

pub mod history;
pub mod planner;
pub mod prompt;
pub mod protocol;

use std::sync::Arc;

use history::ConversationWindow;
use planner::Planner;
use protocol::{Action, Directive};

use crate::config::AgentConfig;
use crate::tools::ToolRegistry;

/// Returned when the loop aborts: budget exhausted, persistent parse failures,
/// or an unreachable planner.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't understand that. Please try again.";

/// Per-session conversational state, threaded explicitly through each turn.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub window: ConversationWindow,
}

impl ChatSession {
    /// `history_window` is the number of exchanges the planner can see.
    pub fn new(history_window: usize) -> Self {
        Self {
            window: ConversationWindow::new(history_window),
        }
    }
}

/// Drives one conversation turn against a fixed tool registry.
pub struct AgentExecutor {
    planner: Arc<dyn Planner>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(planner: Arc<dyn Planner>, tools: ToolRegistry, config: &AgentConfig) -> Self {
        Self {
            planner,
            tools,
            max_iterations: config.max_iterations.max(1),
        }
    }

    /// Run one turn. Always returns an answer string; the only mutation of
    /// shared state is appending the completed `(input, answer)` exchange to
    /// the session window, exactly once, whatever path the turn took.
    pub async fn run_turn(&self, session: &mut ChatSession, input: &str) -> String {
        let answer = self.reason(session, input).await;
        session.window.record_exchange(input, &answer);
        answer
    }

    async fn reason(&self, session: &ChatSession, input: &str) -> String {
        let mut scratchpad = String::new();

        for iteration in 0..self.max_iterations {
            let rendered = prompt::render(&self.tools, &session.window, input, &scratchpad);
            let raw = match self.planner.propose(&rendered).await {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(error = %err, "planner unavailable, aborting turn");
                    return FALLBACK_ANSWER.to_string();
                }
            };

            match protocol::parse(&raw) {
                Ok(Directive {
                    thought,
                    action: Action::Finish { answer },
                }) => {
                    tracing::debug!(iteration, thought = %thought, "final answer");
                    return answer;
                }
                Ok(Directive {
                    thought,
                    action: Action::Invoke { tool, input: tool_input },
                }) => {
                    let observation = match self.tools.get(&tool) {
                        Some(t) => t.call(&tool_input).await,
                        None => format!(
                            "{tool} is not a valid tool, try one of [{}].",
                            self.tools.names().join(", ")
                        ),
                    };
                    tracing::debug!(
                        iteration,
                        thought = %thought,
                        tool = %tool,
                        input = %tool_input,
                        observation = %observation,
                        "step"
                    );
                    scratchpad.push_str(&format!(
                        " {thought}\nAction: {tool}\nAction Input: {tool_input}\nObservation: {observation}\nThought:"
                    ));
                }
                Err(_) => {
                    tracing::debug!(iteration, raw = %raw, "unparseable planner output, recovering");
                    scratchpad.push_str(
                        "\nObservation: Invalid format. Either use the Action/Action Input \
                         format, or give a Final Answer.\nThought:",
                    );
                }
            }
        }

        tracing::info!(max_iterations = self.max_iterations, "iteration budget exhausted");
        FALLBACK_ANSWER.to_string()
    }
}
