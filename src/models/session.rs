use crate::config::DEFAULT_VOICE;

use super::UserProfile;

/// Authentication and preference state of the current page.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_profile: Option<UserProfile>,
    pub selected_voice: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            user_profile: None,
            selected_voice: DEFAULT_VOICE.to_string(),
        }
    }
}

impl Session {
    /// True iff an access token is present and non-empty.
    pub fn is_logged_in(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Name for display (profile name, email, or "guest").
    pub fn display_name(&self) -> String {
        if !self.is_logged_in() {
            return "guest".to_string();
        }
        self.user_profile
            .as_ref()
            .and_then(|p| p.name.clone().or_else(|| p.email.clone()))
            .unwrap_or_else(|| "reader".to_string())
    }
}

/// Narration voices offered by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Voice {
    #[default]
    FemaleCalm,
    MaleLively,
    FemaleEnergetic,
    MaleWarm,
}

impl Voice {
    pub const ALL: [Voice; 4] = [
        Voice::FemaleCalm,
        Voice::MaleLively,
        Voice::FemaleEnergetic,
        Voice::MaleWarm,
    ];

    /// Backend identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::FemaleCalm => "voice1",
            Self::MaleLively => "voice2",
            Self::FemaleEnergetic => "voice3",
            Self::MaleWarm => "voice4",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FemaleCalm => "Voice 1 (female, calm)",
            Self::MaleLively => "Voice 2 (male, lively)",
            Self::FemaleEnergetic => "Voice 3 (female, energetic)",
            Self::MaleWarm => "Voice 4 (male, warm)",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.id() == id)
    }
}
