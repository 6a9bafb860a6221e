// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed agent directory for tests that exercise the existence check.

use std::collections::HashSet;

use async_trait::async_trait;

use parley_core::{AgentDirectory, AgentId, ParleyError};

/// Knows exactly the agents it was built with.
#[derive(Debug, Default, Clone)]
pub struct StaticAgentDirectory {
    known: HashSet<AgentId>,
}

impl StaticAgentDirectory {
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: agents.into_iter().map(AgentId::new).collect(),
        }
    }
}

#[async_trait]
impl AgentDirectory for StaticAgentDirectory {
    async fn agent_exists(&self, agent_id: &AgentId) -> Result<bool, ParleyError> {
        Ok(self.known.contains(agent_id))
    }
}
