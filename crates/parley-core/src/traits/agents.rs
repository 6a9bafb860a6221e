// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent lookup used for optional referential validation.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::AgentId;

/// Answers whether an agent is known to the surrounding system.
///
/// The memory store works without one; when present, appends for unknown
/// agents are rejected.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn agent_exists(&self, agent_id: &AgentId) -> Result<bool, ParleyError>;
}
