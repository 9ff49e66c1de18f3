//! Prompt builder: pure mapping from (profile, language) to completion requests.
//!
//! Profile fields are embedded verbatim. Nothing here sanitises or truncates
//! input, and nothing here fails: unknown language codes get the generic tone.

use crate::completion::CompletionRequest;
use crate::messages::{EMPTY_LETTER, EMPTY_PROMPT, EMPTY_RESPONSE_LETTER};
use crate::profile::Profile;
use crate::types::Language;

/// Temperature used for letters when no configuration overrides it.
pub const DEFAULT_LETTER_TEMPERATURE: f32 = 0.7;

const LETTER_USER_TEXT: &str = "Write me a letter to help me trust myself today.";
const RESPONSE_USER_TEXT: &str = "Generate a motivational response letter.";

const TANGLISH_INSTRUCTION: &str = "Write in Tanglish (Tamil spoken in English script).
CRITICAL STYLE RULES:
- Use Roman alphabet only.
- Tone: Informal, intimate, like a best friend or your own inner voice.
- Use natural conversational fillers like 'paa', 'dhan', 'machan' (if appropriate context), 'kanna'.
- Do NOT simply translate English formal sentences. Use spoken grammar.
- Example: Instead of \"Do not worry\", say \"Kavalai padadhe\" or \"Feel pannadhe\".
- Avoid very formal Tamil words. Use words like 'life', 'trust', 'courage' in English if that's how people speak, but mix it naturally with Tamil syntax.";

/// Tone and script requirement for a language code.
pub fn language_instruction(language_code: &str) -> String {
    match Language::from_code(language_code) {
        Some(Language::Ta) => {
            "Write in Tamil (Tamil Script). Tone: Soft, poetic, caring, like a wise elder or inner conscience."
                .to_string()
        }
        Some(Language::Tgl) => TANGLISH_INSTRUCTION.to_string(),
        Some(Language::Hi) => {
            "Write in Hindi. Tone: Warm, reassuring, 'apnapan' (sense of belonging). Avoid overly Sanskritized formal Hindi. Use Hindustani/conversational style."
                .to_string()
        }
        Some(Language::Es) => {
            "Write in Spanish. Tone: 'Cercano' (close), warm, gentle. Use 'tú' not 'usted'."
                .to_string()
        }
        Some(Language::Ar) => {
            "Write in Arabic. Tone: Poetic but accessible, warm, reassuring.".to_string()
        }
        Some(Language::En) => {
            "Write in English. Tone: Compassionate, calm, anchored.".to_string()
        }
        _ => "Write in the user's selected language. Tone: Compassionate, calm, anchored."
            .to_string(),
    }
}

fn focus_label(profile: &Profile) -> &str {
    profile.emotional_focus.map(|f| f.as_str()).unwrap_or("")
}

/// The future self's letter.
pub fn build_letter_prompt(profile: &Profile, temperature: f32) -> CompletionRequest {
    let focus = focus_label(profile);
    let instruction = format!(
        r#"You are the "Future Self" of the user.
The user is currently creating a connection with you to find emotional grounding.

User Profile:
- Name: "{name}"
- Time Horizon: "{horizon}"
- How they visualize you: "{description}"
- What they need from you right now (Emotional Focus): "{focus}"

Language Requirement:
{language}

Your Tone:
- Compassionate, calm, and anchored.
- Clear and strong, but gentle.
- Intimate and personal, using "I" (as the future self) and "You".
- Brevity is key. Keep it under 150 words.
- NO hustle culture advice. NO "work harder".

Goal:
- Acknowledge their current state.
- Validate their potential to become you.
- Specifically address their need for "{focus}".
- Offer a specific thought of reassurance based on the description they provided.
- End with a short, anchoring phrase."#,
        name = profile.display_name,
        horizon = profile.time_horizon,
        description = profile.future_description,
        language = language_instruction(&profile.language_code),
    );

    CompletionRequest {
        instruction,
        user_text: LETTER_USER_TEXT.to_string(),
        temperature: Some(temperature),
        empty_default: EMPTY_LETTER.to_string(),
    }
}

/// The one-sentence daily reflection question. Uses provider default temperature.
pub fn build_daily_prompt_request(profile: &Profile) -> CompletionRequest {
    let instruction = format!(
        r#"You write daily reflection questions on behalf of the user's "Future Self".
The user is "{name}", looking {horizon} ahead, who pictures their future self as: "{description}".

Language Requirement:
{language}"#,
        name = profile.display_name,
        horizon = profile.time_horizon,
        description = profile.future_description,
        language = language_instruction(&profile.language_code),
    );
    let user_text = format!(
        r#"Generate a single, short (1 sentence) daily reflection question for the user.
The goal is to help them align with their "Future Self".
Focus: {focus}

Do not repeat generic questions.
Make it specific to emotional state or mindset.
It should feel like a gentle invitation, not a task."#,
        focus = focus_label(profile),
    );

    CompletionRequest {
        instruction,
        user_text,
        temperature: None,
        empty_default: EMPTY_PROMPT.to_string(),
    }
}

/// The future self's reply to a saved reflection.
pub fn build_response_letter_prompt(
    profile: &Profile,
    prompt: &str,
    reflection: &str,
    temperature: f32,
) -> CompletionRequest {
    let instruction = format!(
        r#"You are the user's "Future Self" responding to their reflection.

User Profile:
- Name: "{name}"
- What they need (Emotional Focus): "{focus}"

The user was asked: "{prompt}"
They responded: "{reflection}"

Language Requirement:
{language}

Your Task:
- Write a short, heartfelt motivational response (under 120 words).
- Acknowledge what they shared.
- Provide encouragement and validation.
- Remind them of their strength and capability.
- End with a warm, empowering closing thought.

Tone:
- Compassionate, warm, and uplifting.
- Like a caring mentor or future version of themselves.
- NO toxic positivity. Be genuine and grounded.
- Personal and intimate, using "you" directly."#,
        name = profile.display_name,
        focus = focus_label(profile),
        language = language_instruction(&profile.language_code),
    );

    CompletionRequest {
        instruction,
        user_text: RESPONSE_USER_TEXT.to_string(),
        temperature: Some(temperature),
        empty_default: EMPTY_RESPONSE_LETTER.to_string(),
    }
}
