//! # Message Log
//!
//! Append-only log of player-facing messages with a bounded window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Color tag attached to each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageColor {
    Default,
    Welcome,
    PlayerAttack,
    EnemyAttack,
    PlayerDeath,
    EnemyDeath,
    HealthRecovered,
    StatusEffect,
    Impossible,
    Descend,
}

/// One log entry. Repeats of the same text collapse into `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: MessageColor,
    pub count: u32,
}

impl Message {
    /// Text as displayed, with a repeat suffix when stacked.
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.text, self.count)
        } else {
            self.text.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageLog {
    /// Creates an empty log retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Appends a message, stacking it onto the previous entry if identical.
    pub fn add(&mut self, text: impl Into<String>, color: MessageColor) {
        let text = text.into();
        if let Some(last) = self.messages.back_mut() {
            if last.text == text {
                last.count += 1;
                return;
            }
        }

        self.messages.push_back(Message {
            text,
            color,
            count: 1,
        });
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// All retained messages, oldest first.
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.messages.iter()
    }

    /// The newest `count` messages, oldest first.
    pub fn recent(&self, count: usize) -> Vec<&Message> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.iter().skip(skip).collect()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MESSAGE_LOG_CAPACITY)
    }
}
