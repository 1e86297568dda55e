use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Conversational role a message is attributed to
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Assistant,
    System,
}
