//! Parser for the planner's textual thought/action protocol.
//!
//! The planner emits free text in the shape
//!
//! ```text
//! Thought: <reasoning>
//! Action: <tool name>
//! Action Input: <tool input>
//! ```
//!
//! or, to end the turn,
//!
//! ```text
//! Thought: I now know the final answer
//! Final Answer: <answer>
//! ```
//!
//! One directive per iteration. When an output carries both an `Action:` and
//! a `Final Answer:`, the action wins: the loop always attempts the tool call
//! before accepting an answer in the same step.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("planner output matched neither an action nor a final answer")]
pub struct MalformedOutput;

/// What the planner decided this iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Invoke { tool: String, input: String },
    Finish { answer: String },
}

/// One parsed planner step: the free-text thought plus its single directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub thought: String,
    pub action: Action,
}

const ACTION_MARKER: &str = "Action:";
const INPUT_MARKER: &str = "Action Input:";
const FINAL_MARKER: &str = "Final Answer:";

pub fn parse(text: &str) -> Result<Directive, MalformedOutput> {
    // Action precedence over Final Answer when both appear.
    if let Some(action_pos) = text.find(ACTION_MARKER) {
        if let Some(input_pos) = text[action_pos..].find(INPUT_MARKER) {
            let input_pos = action_pos + input_pos;

            let tool_raw = &text[action_pos + ACTION_MARKER.len()..input_pos];
            let tool = clean_token(tool_raw);
            // The input runs to the end of the output, except when the planner
            // also emitted a premature final answer, which must not leak into
            // the tool call.
            let input_raw = &text[input_pos + INPUT_MARKER.len()..];
            let input_raw = match input_raw.find(FINAL_MARKER) {
                Some(final_pos) => &input_raw[..final_pos],
                None => input_raw,
            };
            let input = clean_token(input_raw);

            if !tool.is_empty() {
                return Ok(Directive {
                    thought: thought_before(text, action_pos),
                    action: Action::Invoke { tool, input },
                });
            }
        }
    }

    if let Some(final_pos) = text.find(FINAL_MARKER) {
        let answer = text[final_pos + FINAL_MARKER.len()..].trim().to_string();
        return Ok(Directive {
            thought: thought_before(text, final_pos),
            action: Action::Finish { answer },
        });
    }

    Err(MalformedOutput)
}

/// The free text preceding a marker, with any leading `Thought:` label
/// stripped.
fn thought_before(text: &str, pos: usize) -> String {
    let head = text[..pos].trim();
    head.strip_prefix("Thought:").unwrap_or(head).trim().to_string()
}

/// Trim a marker value, dropping decorative quotes and backticks models like
/// to wrap tool names in.
fn clean_token(raw: &str) -> String {
    let cleaned = raw.trim().trim_matches(['`', '"', '\'']);
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tool_invocation() {
        let directive = parse(
            "Thought: I should look up the weather\n\
             Action: get_current_weather\n\
             Action Input: London",
        )
        .unwrap();

        assert_eq!(directive.thought, "I should look up the weather");
        assert_eq!(
            directive.action,
            Action::Invoke {
                tool: "get_current_weather".into(),
                input: "London".into()
            }
        );
    }

    #[test]
    fn parses_final_answer() {
        let directive = parse(
            "Thought: I now know the final answer\n\
             Final Answer: It is sunny in Paris today.",
        )
        .unwrap();

        assert_eq!(
            directive.action,
            Action::Finish {
                answer: "It is sunny in Paris today.".into()
            }
        );
    }

    #[test]
    fn action_takes_precedence_over_final_answer() {
        let directive = parse(
            "Thought: almost done\n\
             Action: get_forecast_weather\n\
             Action Input: Tokyo\n\
             Final Answer: The forecast is mild.",
        )
        .unwrap();

        // the premature answer text must not bleed into the tool input
        assert_eq!(
            directive.action,
            Action::Invoke {
                tool: "get_forecast_weather".into(),
                input: "Tokyo".into()
            }
        );
    }

    #[test]
    fn strips_quotes_and_backticks_from_tool_name() {
        let directive = parse("Action: `get_current_date_time`\nAction Input: \"Oslo\"").unwrap();
        assert_eq!(
            directive.action,
            Action::Invoke {
                tool: "get_current_date_time".into(),
                input: "Oslo".into()
            }
        );
    }

    #[test]
    fn empty_action_input_is_allowed() {
        let directive = parse("Action: search_weather_knowledge\nAction Input:").unwrap();
        assert_eq!(
            directive.action,
            Action::Invoke {
                tool: "search_weather_knowledge".into(),
                input: String::new()
            }
        );
    }

    #[test]
    fn freeform_text_is_malformed() {
        assert_eq!(parse("The weather is probably fine."), Err(MalformedOutput));
    }

    #[test]
    fn action_without_input_falls_through_to_final_answer_or_error() {
        assert_eq!(parse("Action: get_current_weather"), Err(MalformedOutput));
        let directive = parse("Action: tool_without_input\nFinal Answer: done").unwrap();
        assert_eq!(directive.action, Action::Finish { answer: "done".into() });
    }

    #[test]
    fn multiline_final_answer_is_preserved() {
        let directive =
            parse("Thought: done\nFinal Answer: Line one.\nLine two with details.").unwrap();
        assert_eq!(
            directive.action,
            Action::Finish {
                answer: "Line one.\nLine two with details.".into()
            }
        );
    }
}
