use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User attributes as served by the backend.
///
/// Known fields are typed; anything else (e.g. `stats`) is kept in `extra`
/// so persisting a profile never drops data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_voice: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Voice the user picked on the backend, if any.
    pub fn preferred_voice(&self) -> Option<&str> {
        self.selected_voice.as_deref().filter(|v| !v.is_empty())
    }
}
