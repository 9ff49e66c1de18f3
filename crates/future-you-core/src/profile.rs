use crate::types::{EmotionalFocus, DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A user's onboarding answers and setup status, owned by their identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub future_description: String,
    #[serde(default)]
    pub time_horizon: String,
    #[serde(default, with = "focus_or_empty")]
    pub emotional_focus: Option<EmotionalFocus>,
    #[serde(default = "default_language", alias = "language")]
    pub language_code: String,
    #[serde(default, alias = "hasCompletedSetup")]
    pub setup_complete: bool,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Profile {
    /// The profile written at sign-up: identity fields only, setup pending.
    pub fn new_default(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            future_description: String::new(),
            time_horizon: String::new(),
            emotional_focus: None,
            language_code: default_language(),
            setup_complete: false,
        }
    }

    /// Apply a partial update. Fields absent from `patch` are left untouched.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
        if let Some(v) = &patch.display_name {
            self.display_name = v.clone();
        }
        if let Some(v) = &patch.future_description {
            self.future_description = v.clone();
        }
        if let Some(v) = &patch.time_horizon {
            self.time_horizon = v.clone();
        }
        if let Some(v) = patch.emotional_focus {
            self.emotional_focus = Some(v);
        }
        if let Some(v) = &patch.language_code {
            self.language_code = v.clone();
        }
        if let Some(v) = patch.setup_complete {
            self.setup_complete = v;
        }
    }

    /// Name used to address the user in prompts, falling back to the email.
    pub fn greeting_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

// ---------------------------------------------------------------------------
// ProfilePatch
// ---------------------------------------------------------------------------

/// Partial profile fields for merge updates. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_focus: Option<EmotionalFocus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_complete: Option<bool>,
}

impl ProfilePatch {
    /// The fields written when setup completes. Identity fields ride along so
    /// the document is whole even if the sign-up write was lost.
    pub fn setup(profile: &Profile) -> Self {
        Self {
            email: Some(profile.email.clone()),
            display_name: Some(profile.display_name.clone()),
            future_description: Some(profile.future_description.clone()),
            time_horizon: Some(profile.time_horizon.clone()),
            emotional_focus: profile.emotional_focus,
            language_code: Some(profile.language_code.clone()),
            setup_complete: Some(profile.setup_complete),
        }
    }

    pub fn language(code: impl Into<String>) -> Self {
        Self {
            language_code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Stored documents written before setup carry `emotionalFocus: ""`.
mod focus_or_empty {
    use crate::types::EmotionalFocus;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<EmotionalFocus>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(f) => f.serialize(s),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EmotionalFocus>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
