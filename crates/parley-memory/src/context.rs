// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembled for the next reply: recency window plus semantic matches.

use std::collections::{HashMap, HashSet};

use parley_core::{Turn, TurnId};

use crate::prompt::{NO_HISTORY, NO_SIMILAR, format_turns};

/// Everything the conversation engine needs from memory for one reply.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    /// The recency window, oldest first.
    pub recent: Vec<Turn>,
    /// Semantic matches not already in `recent`, most relevant first.
    pub similar: Vec<Turn>,
    /// True when the semantic side was skipped because embedding failed.
    pub degraded: bool,
}

impl ConversationContext {
    /// Combine both retrievals, dropping similar turns the window already shows.
    pub fn assemble(recent: Vec<Turn>, similar: Vec<Turn>, degraded: bool) -> Self {
        let in_window: HashSet<TurnId> = recent.iter().map(|t| t.id).collect();
        let similar = similar
            .into_iter()
            .filter(|t| !in_window.contains(&t.id))
            .collect();
        Self {
            recent,
            similar,
            degraded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty() && self.similar.is_empty()
    }

    /// Template bindings: `history` and `similar_messages`.
    pub fn bindings(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            ("history", format_turns(&self.recent, NO_HISTORY)),
            ("similar_messages", format_turns(&self.similar, NO_SIMILAR)),
        ])
    }
}
