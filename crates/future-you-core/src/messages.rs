//! Hard-coded localised strings: generation fallbacks and auth error messages.
//!
//! Tamil has its own entries; every other language uses English.

use crate::types::Language;

fn is_tamil(language_code: &str) -> bool {
    Language::from_code(language_code) == Some(Language::Ta)
}

pub fn fallback_letter(language_code: &str) -> &'static str {
    if is_tamil(language_code) {
        "நான் இங்கே இருக்கிறேன்."
    } else {
        "I am here."
    }
}

pub fn fallback_prompt(language_code: &str) -> &'static str {
    if is_tamil(language_code) {
        "உங்களை நீங்களே எப்படி கவனித்துக் கொள்வீர்கள்?"
    } else {
        "How can you be kind to yourself?"
    }
}

pub fn fallback_response_letter(name: &str) -> String {
    format!(
        "Dear {name},\n\nThank you for showing up today. What you shared matters, \
         and the fact that you're reflecting shows incredible strength.\n\n\
         Keep going. I believe in you."
    )
}

pub const EMPTY_LETTER: &str = "I am here with you, always.";
pub const EMPTY_PROMPT: &str = "What is one small kindness you can offer yourself today?";
pub const EMPTY_RESPONSE_LETTER: &str =
    "You showed up today. That takes courage. I'm proud of you.";

// ---------------------------------------------------------------------------
// Auth messages
// ---------------------------------------------------------------------------

pub(crate) struct AuthMessages {
    pub invalid_credentials: &'static str,
    pub too_many_attempts: &'static str,
    pub network: &'static str,
    pub email_in_use: &'static str,
    pub weak_password: &'static str,
    pub generic: &'static str,
}

const AUTH_EN: AuthMessages = AuthMessages {
    invalid_credentials: "Invalid email or password",
    too_many_attempts: "Too many attempts. Please try again later.",
    network: "Network error. Check your connection and try again.",
    email_in_use: "This email is already registered.",
    weak_password: "Password should be at least 6 characters.",
    generic: "Something went wrong. Please try again.",
};

const AUTH_TA: AuthMessages = AuthMessages {
    invalid_credentials: "தவறான மின்னஞ்சல் அல்லது கடவுச்சொல்",
    too_many_attempts: "பல முறை முயற்சி செய்துவிட்டீர்கள். சிறிது நேரம் கழித்து மீண்டும் முயலவும்.",
    network: "இணைய இணைப்பில் சிக்கல். மீண்டும் முயலவும்.",
    email_in_use: "இந்த மின்னஞ்சல் ஏற்கனவே பதிவு செய்யப்பட்டுள்ளது.",
    weak_password: "கடவுச்சொல் குறைந்தது 6 எழுத்துகள் இருக்க வேண்டும்.",
    generic: "ஏதோ தவறு நடந்தது. மீண்டும் முயலவும்.",
};

pub(crate) fn auth_messages(language_code: &str) -> &'static AuthMessages {
    if is_tamil(language_code) {
        &AUTH_TA
    } else {
        &AUTH_EN
    }
}
