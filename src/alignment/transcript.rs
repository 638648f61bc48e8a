use crate::alignment::boundaries::build_boundaries;
use crate::error::AssessmentError;
use crate::types::{Symbol, WordBoundary};

/// Phone separator inside a phonemized word.
pub const PHONE_SEPARATOR: char = '/';

/// Punctuation the phonemizer preserves and that carries no phonemes.
const PUNCTUATION_MARKS: &[char] = &[
    ';', ':', ',', '.', '!', '?', '¡', '¿', '—', '…', '"', '«', '»', '“', '”',
    '(', ')', '{', '}', '[', ']',
];

/// Reference sentence with its phoneme transcription, split per word.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePhonemes {
    text: String,
    words: Vec<String>,
    phonemes_per_word: Vec<Vec<Symbol>>,
    phonemes: Vec<Symbol>,
    boundaries: Vec<WordBoundary>,
}

impl ReferencePhonemes {
    /// Builds from already-split words and their phoneme groups.
    pub fn new(
        text: impl Into<String>,
        words: Vec<String>,
        phonemes_per_word: Vec<Vec<Symbol>>,
    ) -> Result<Self, AssessmentError> {
        let boundaries = build_boundaries(&words, &phonemes_per_word)?;
        let phonemes = phonemes_per_word.iter().flatten().cloned().collect();
        Ok(Self {
            text: text.into(),
            words,
            phonemes_per_word,
            phonemes,
            boundaries,
        })
    }

    /// Parses phonemizer output such as `"h/ə/l/oʊ w/ɜː/l/d"` against its
    /// source text. Words are separated by whitespace, phones by `/`.
    pub fn from_phonemized(text: &str, sequence: &str) -> Result<Self, AssessmentError> {
        let words: Vec<String> = strip_punctuation(text)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let phonemes_per_word: Vec<Vec<Symbol>> = strip_punctuation(sequence)
            .split_whitespace()
            .map(|group| {
                group
                    .split(PHONE_SEPARATOR)
                    .filter(|phone| !phone.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        if words.len() != phonemes_per_word.len() {
            return Err(AssessmentError::precondition(format!(
                "reference text has {} words but its phoneme sequence has {} groups",
                words.len(),
                phonemes_per_word.len()
            )));
        }
        Self::new(text, words, phonemes_per_word)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn phonemes_per_word(&self) -> &[Vec<Symbol>] {
        &self.phonemes_per_word
    }

    /// Flat phoneme sequence, the concatenation of every word group.
    pub fn phonemes(&self) -> &[Symbol] {
        &self.phonemes
    }

    pub fn boundaries(&self) -> &[WordBoundary] {
        &self.boundaries
    }

    /// Phonemizer-style rendering of the groups.
    pub fn sequence(&self) -> String {
        self.phonemes_per_word
            .iter()
            .map(|group| group.join("/"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn strip_punctuation(s: &str) -> String {
    s.chars()
        .map(|c| if PUNCTUATION_MARKS.contains(&c) { ' ' } else { c })
        .collect()
}
