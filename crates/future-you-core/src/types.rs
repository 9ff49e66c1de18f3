use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ta,
    /// Tanglish: spoken Tamil written in the Roman alphabet.
    Tgl,
    Hi,
    Es,
    Fr,
    De,
    Pt,
    Ar,
    Ja,
    Ko,
    Zh,
}

pub const DEFAULT_LANGUAGE: &str = "en";

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Language::En,
            Language::Ta,
            Language::Tgl,
            Language::Hi,
            Language::Es,
            Language::Fr,
            Language::De,
            Language::Pt,
            Language::Ar,
            Language::Ja,
            Language::Ko,
            Language::Zh,
        ]
    }

    /// Look up a supported language by code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Language> {
        Language::all().iter().copied().find(|l| l.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ta => "ta",
            Language::Tgl => "tgl",
            Language::Hi => "hi",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Pt => "pt",
            Language::Ar => "ar",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Zh => "zh",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ta => "Tamil",
            Language::Tgl => "Tanglish",
            Language::Hi => "Hindi",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::Pt => "Portuguese",
            Language::Ar => "Arabic",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Zh => "Mandarin",
        }
    }

    pub fn native_label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ta => "தமிழ்",
            Language::Tgl => "Tanglish",
            Language::Hi => "हिन्दी",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::De => "Deutsch",
            Language::Pt => "Português",
            Language::Ar => "العربية",
            Language::Ja => "日本語",
            Language::Ko => "한국어",
            Language::Zh => "中文",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = crate::error::FutureYouError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| crate::error::FutureYouError::UnsupportedLanguage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// EmotionalFocus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionalFocus {
    Reassurance,
    Courage,
    Perspective,
    Calm,
    Strength,
}

impl EmotionalFocus {
    pub fn all() -> &'static [EmotionalFocus] {
        &[
            EmotionalFocus::Reassurance,
            EmotionalFocus::Courage,
            EmotionalFocus::Perspective,
            EmotionalFocus::Calm,
            EmotionalFocus::Strength,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionalFocus::Reassurance => "Reassurance",
            EmotionalFocus::Courage => "Courage",
            EmotionalFocus::Perspective => "Perspective",
            EmotionalFocus::Calm => "Calm",
            EmotionalFocus::Strength => "Strength",
        }
    }
}

impl fmt::Display for EmotionalFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmotionalFocus {
    type Err = crate::error::FutureYouError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionalFocus::all()
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::FutureYouError::InvalidEmotionalFocus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Time horizon
// ---------------------------------------------------------------------------

/// Choices offered by the first setup step. Stored profiles keep the raw string.
pub const TIME_HORIZONS: [&str; 3] = ["6 months", "1 year", "5 years"];

/// Validate a time horizon against the setup choices, returning the canonical string.
pub fn parse_time_horizon(s: &str) -> crate::error::Result<&'static str> {
    let trimmed = s.trim();
    TIME_HORIZONS
        .iter()
        .copied()
        .find(|h| *h == trimmed)
        .ok_or_else(|| crate::error::FutureYouError::InvalidTimeHorizon(s.to_string()))
}
