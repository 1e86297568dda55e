use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Provider family a request or a document is prepared for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}
