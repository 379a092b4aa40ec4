//! Prompt sources and the normalization applied to whatever they return.

use itertools::Itertools;
use tracing::warn;

use crate::error::ProviderError;
use crate::language::Language;
use crate::session::Mode;

/// Number of words requested for a casual prompt
pub const CASUAL_WORD_COUNT: usize = 300;
/// Rough length of a competition paragraph in words
pub const COMPETITION_WORD_COUNT: usize = 250;

pub const FALLBACK_TEXT_CASUAL: &str = "the quick brown fox jumps over the lazy dog programming is the art of telling another human what one wants the computer to do simplicity is the soul of efficiency \
learning to type faster requires practice and consistency never give up on your goals because consistency is key \
rust cargo and ratatui are powerful tools for building modern terminal applications \
always strive for excellence in everything you do and success will follow \
the journey of a thousand miles begins with a single step so keep moving forward";

pub const FALLBACK_TEXT_COMPETITION: &str = "The quick brown fox jumps over the lazy dog. Programming is the art of telling another human what one wants the computer to do. Simplicity is the soul of efficiency. \
In the realm of computer science, algorithms are the fundamental building blocks of software. They dictate how data is processed and how tasks are executed. \
Artificial intelligence is rapidly transforming the world, enabling machines to learn from data and make decisions. \
Climate change is a pressing global issue that requires immediate attention and collective action from all nations.";

/// Something that can produce prompt text for a mode
pub trait TextProvider {
    fn generate_prompt(&mut self, mode: Mode) -> Result<String, ProviderError>;
}

impl<T: TextProvider + ?Sized> TextProvider for Box<T> {
    fn generate_prompt(&mut self, mode: Mode) -> Result<String, ProviderError> {
        (**self).generate_prompt(mode)
    }
}

pub fn fallback_text(mode: Mode) -> &'static str {
    match mode {
        Mode::Casual => FALLBACK_TEXT_CASUAL,
        Mode::Competition => FALLBACK_TEXT_COMPETITION,
    }
}

/// Lowercase, keep only letters, digits and whitespace, then collapse whitespace
pub fn normalize_casual(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}

/// Flatten line breaks so the paragraph reads as one line
pub fn normalize_competition(text: &str) -> String {
    text.split_whitespace().join(" ")
}

fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Ask `provider` for a prompt and split it into words, falling back to the
/// built-in text on any error or empty result.
pub fn fetch_words<P: TextProvider + ?Sized>(provider: &mut P, mode: Mode) -> Vec<String> {
    let text = match provider.generate_prompt(mode) {
        Ok(text) => text,
        Err(err) => {
            warn!(%mode, error = %err, "prompt source failed, using built-in text");
            return fallback_words(mode);
        }
    };

    let normalized = match mode {
        Mode::Casual => normalize_casual(&text),
        Mode::Competition => normalize_competition(&text),
    };

    let words = split_words(&normalized);
    if words.is_empty() {
        warn!(%mode, "prompt source returned no usable text, using built-in text");
        return fallback_words(mode);
    }
    words
}

pub fn fallback_words(mode: Mode) -> Vec<String> {
    split_words(fallback_text(mode))
}

/// Generates prompts from the bundled word list
#[derive(Debug, Clone)]
pub struct WordListProvider {
    language: Language,
}

impl WordListProvider {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn english() -> Result<Self, ProviderError> {
        Ok(Self::new(Language::english()?))
    }
}

impl TextProvider for WordListProvider {
    fn generate_prompt(&mut self, mode: Mode) -> Result<String, ProviderError> {
        let text = match mode {
            Mode::Casual => self.language.get_random(CASUAL_WORD_COUNT).join(" "),
            Mode::Competition => self.language.get_paragraph(COMPETITION_WORD_COUNT),
        };

        if text.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(text)
    }
}

/// Always returns the same user-supplied prompt, whatever the mode
#[derive(Debug, Clone)]
pub struct StaticProvider {
    text: String,
}

impl StaticProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextProvider for StaticProvider {
    fn generate_prompt(&mut self, _mode: Mode) -> Result<String, ProviderError> {
        if self.text.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(self.text.clone())
    }
}

/// Serves only the built-in texts. Used when the word list cannot be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

impl TextProvider for FallbackProvider {
    fn generate_prompt(&mut self, mode: Mode) -> Result<String, ProviderError> {
        Ok(fallback_text(mode).to_string())
    }
}
