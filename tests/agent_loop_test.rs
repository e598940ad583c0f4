mod helpers;

use std::sync::Arc;

use helpers::{
    agent_config, ApologeticTool, CountingEchoTool, FailingPlanner, RepeatPlanner, ScriptedPlanner,
};
use skycast::agent::{AgentExecutor, ChatSession, FALLBACK_ANSWER};
use skycast::tools::{Tool, ToolRegistry};

fn echo_registry() -> (Arc<CountingEchoTool>, ToolRegistry) {
    let counter = Arc::new(CountingEchoTool::default());
    let registry = ToolRegistry::new(vec![counter.clone() as Arc<dyn Tool>]).unwrap();
    (counter, registry)
}

#[tokio::test]
async fn tool_call_then_final_answer() {
    let planner = ScriptedPlanner::new(&[
        "Thought: I should check\nAction: echo\nAction Input: London",
        "Thought: I now know the final answer\nFinal Answer: It is sunny in London.",
    ]);
    let (counter, registry) = echo_registry();
    let agent = AgentExecutor::new(planner.clone(), registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "weather in London?").await;

    assert_eq!(answer, "It is sunny in London.");
    assert_eq!(counter.count(), 1);
    // the observation was fed back verbatim in the next prompt
    assert!(planner.prompt(1).contains("Observation: echo: London"));
    // the completed exchange landed in the window
    assert_eq!(session.window.len(), 2);
    assert!(session.window.render().contains("AI: It is sunny in London."));
}

#[tokio::test]
async fn budget_exhaustion_returns_fallback() {
    let planner = RepeatPlanner::new("Thought: again\nAction: echo\nAction Input: x");
    let (counter, registry) = echo_registry();
    let agent = AgentExecutor::new(planner, registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "loop forever").await;

    assert_eq!(answer, FALLBACK_ANSWER);
    // never more than five tool invocations per turn
    assert_eq!(counter.count(), 5);
    // history stays coherent: the turn is recorded with the fallback
    assert!(session.window.render().contains(FALLBACK_ANSWER));
}

#[tokio::test]
async fn persistent_parse_failures_also_terminate() {
    let planner = RepeatPlanner::new("I will just ramble without any directive.");
    let (counter, registry) = echo_registry();
    let agent = AgentExecutor::new(planner, registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "hello").await;

    assert_eq!(answer, FALLBACK_ANSWER);
    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn unknown_tool_recovers_with_error_observation() {
    let planner = ScriptedPlanner::new(&[
        "Thought: hmm\nAction: teleport\nAction Input: London",
        "Thought: done\nFinal Answer: recovered",
    ]);
    let (counter, registry) = echo_registry();
    let agent = AgentExecutor::new(planner.clone(), registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "hi").await;

    assert_eq!(answer, "recovered");
    assert_eq!(counter.count(), 0);
    assert!(planner.prompt(1).contains("teleport is not a valid tool"));
    assert!(planner.prompt(1).contains("[echo]"));
}

#[tokio::test]
async fn malformed_output_recovers_with_format_observation() {
    let planner = ScriptedPlanner::new(&[
        "no directive here at all",
        "Thought: ok\nFinal Answer: recovered after format error",
    ]);
    let (_, registry) = echo_registry();
    let agent = AgentExecutor::new(planner.clone(), registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "hi").await;

    assert_eq!(answer, "recovered after format error");
    assert!(planner.prompt(1).contains("Invalid format"));
}

#[tokio::test]
async fn action_wins_when_output_also_contains_final_answer() {
    let planner = ScriptedPlanner::new(&[
        "Thought: both\nAction: echo\nAction Input: Paris\nFinal Answer: premature answer",
        "Thought: now for real\nFinal Answer: the real answer",
    ]);
    let (counter, registry) = echo_registry();
    let agent = AgentExecutor::new(planner.clone(), registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "hi").await;

    // the tool call happened despite the premature final-answer text
    assert_eq!(counter.count(), 1);
    assert_eq!(answer, "the real answer");
    // and the tool received only the input, not the discarded answer text
    assert!(planner.prompt(1).contains("Observation: echo: Paris\nThought:"));
}

#[tokio::test]
async fn tool_error_text_is_just_an_observation() {
    let planner = ScriptedPlanner::new(&[
        "Thought: try it\nAction: broken\nAction Input: London",
        "Thought: tool failed\nFinal Answer: Sorry, no data right now.",
    ]);
    let registry = ToolRegistry::new(vec![Arc::new(ApologeticTool) as Arc<dyn Tool>]).unwrap();
    let agent = AgentExecutor::new(planner.clone(), registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "weather?").await;

    assert_eq!(answer, "Sorry, no data right now.");
    assert!(planner
        .prompt(1)
        .contains("Observation: Sorry, I couldn't retrieve the weather data"));
}

#[tokio::test]
async fn unreachable_planner_aborts_with_fallback() {
    let (_, registry) = echo_registry();
    let agent = AgentExecutor::new(Arc::new(FailingPlanner), registry, &agent_config());
    let mut session = ChatSession::new(4);

    let answer = agent.run_turn(&mut session, "hello").await;

    assert_eq!(answer, FALLBACK_ANSWER);
    assert_eq!(session.window.len(), 2);
}

#[tokio::test]
async fn history_window_slides_across_turns() {
    let planner = ScriptedPlanner::new(&[
        "Final Answer: first",
        "Final Answer: second",
        "Final Answer: third",
    ]);
    let (_, registry) = echo_registry();
    let agent = AgentExecutor::new(planner.clone(), registry, &agent_config());
    let mut session = ChatSession::new(2);

    agent.run_turn(&mut session, "one").await;
    agent.run_turn(&mut session, "two").await;
    agent.run_turn(&mut session, "three").await;

    let rendered = session.window.render();
    assert!(!rendered.contains("Human: one"));
    assert!(rendered.contains("Human: two"));
    assert!(rendered.contains("Human: three"));

    // the second turn's prompt saw the first exchange
    assert!(planner.prompt(1).contains("Human: one\nAI: first"));
}
