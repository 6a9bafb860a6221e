// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt template rendering.
//!
//! Templates use `{{name}}` placeholders. Rendering is a pure function of
//! the template and its bindings; a placeholder without a binding is an
//! error rather than being left in the output.

use std::collections::HashMap;

use parley_core::{ParleyError, Turn};

/// Transcript text for an agent with no turns yet.
pub const NO_HISTORY: &str = "No previous conversation.";

/// Text for an empty set of semantic matches.
pub const NO_SIMILAR: &str = "No related messages.";

/// Placeholder names a conversation prompt may use.
pub const KNOWN_PLACEHOLDERS: &[&str] = &["history", "similar_messages", "message"];

/// Default reply prompt.
pub const DEFAULT_TEMPLATE: &str = "\
You are a helpful assistant. Use the conversation so far to answer the user's latest message.

Related earlier messages:
{{similar_messages}}

Conversation:
{{history}}
user: {{message}}
assistant:";

/// Substitute every `{{name}}` in `template` from `bindings`.
///
/// Whitespace inside the braces is ignored (`{{ history }}`).
pub fn render(template: &str, bindings: &HashMap<&str, String>) -> Result<String, ParleyError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(ParleyError::Template(format!(
                "unterminated placeholder at byte {}",
                template.len() - rest.len() + start
            )));
        };
        let name = after[..end].trim();
        let value = bindings.get(name).ok_or_else(|| {
            ParleyError::Template(format!("no value bound for placeholder `{name}`"))
        })?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Check that a template only uses placeholders from `known`.
pub fn validate_template(template: &str, known: &[&str]) -> Result<(), ParleyError> {
    let bindings: HashMap<&str, String> = known.iter().map(|k| (*k, String::new())).collect();
    render(template, &bindings).map(|_| ())
}

/// One `role: content` line per turn, or a fixed note when there are none.
pub fn format_transcript(turns: &[Turn]) -> String {
    format_turns(turns, NO_HISTORY)
}

pub(crate) fn format_turns(turns: &[Turn], empty: &str) -> String {
    if turns.is_empty() {
        return empty.to_string();
    }
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}
