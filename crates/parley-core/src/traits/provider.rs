// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation provider consumed by the conversation engine.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for generating an assistant reply from an assembled prompt.
///
/// Failures are [`ParleyError::ProviderUnavailable`] for transport problems
/// and [`ParleyError::ProviderError`] for non-success responses.
#[async_trait]
pub trait ReplyProvider: PluginAdapter {
    async fn generate_reply(&self, prompt: &str) -> Result<String, ParleyError>;
}
