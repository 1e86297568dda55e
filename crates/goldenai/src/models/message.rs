use serde::{Deserialize, Serialize};

use super::content::Content;
use super::provider::ProviderKind;
use super::role::Role;
use crate::errors::LlmResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

impl Default for Message {
    fn default() -> Self {
        Self::user()
    }
}

impl Message {
    /// Create a user message holding the given content
    pub fn new(content: Vec<Content>) -> Self {
        Message {
            role: Role::User,
            content,
        }
    }

    pub fn user() -> Self {
        Self::new(Vec::new())
    }

    pub fn assistant() -> Self {
        Self::user().with_role(Role::Assistant)
    }

    pub fn system() -> Self {
        Self::user().with_role(Role::System)
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Add any Content to the message
    pub fn with_content(mut self, content: Content) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(Content::from_text(text))
    }

    /// All text items joined with blank lines, documents skipped
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub(crate) fn check_target(&self, target: ProviderKind) -> LlmResult<()> {
        self.content
            .iter()
            .try_for_each(|content| content.check_target(target))
    }
}
