//! Sliding conversation-history window.

use std::collections::VecDeque;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn as the planner sees it.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Fixed-capacity buffer of recent exchanges. Capacity counts user/assistant
/// pairs; the oldest pair is evicted on overflow. Cleared only when the owning
/// session goes away; there is no persistence.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationWindow {
    /// `capacity` is the number of exchanges (pairs) retained, minimum 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a completed exchange, evicting the oldest if over capacity.
    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.turns.push_back(Turn {
            role: Role::User,
            content: user.to_string(),
        });
        self.turns.push_back(Turn {
            role: Role::Assistant,
            content: assistant.to_string(),
        });
        while self.turns.len() > self.capacity * 2 {
            self.turns.pop_front();
            self.turns.pop_front();
        }
    }

    /// Serialize for the prompt's history section.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| match t.role {
                Role::User => format!("Human: {}", t.content),
                Role::Assistant => format!("AI: {}", t.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_pairs_in_order() {
        let mut window = ConversationWindow::new(4);
        window.record_exchange("hi", "hello");
        assert_eq!(window.len(), 2);
        assert_eq!(window.render(), "Human: hi\nAI: hello");
    }

    #[test]
    fn evicts_oldest_exchange_on_overflow() {
        let mut window = ConversationWindow::new(2);
        window.record_exchange("one", "1");
        window.record_exchange("two", "2");
        window.record_exchange("three", "3");

        assert_eq!(window.len(), 4);
        let rendered = window.render();
        assert!(!rendered.contains("one"));
        assert!(rendered.contains("two"));
        assert!(rendered.contains("three"));
        // user turn of an exchange is never orphaned from its answer
        assert!(rendered.starts_with("Human: two"));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut window = ConversationWindow::new(0);
        window.record_exchange("a", "b");
        window.record_exchange("c", "d");
        assert_eq!(window.len(), 2);
        assert!(window.render().contains("c"));
    }
}
