use std::collections::HashSet;

/// Words carrying no similarity signal, removed before comparison
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "her", "his", "i", "in", "is", "it", "its", "not", "of", "on", "or", "our", "she", "that",
    "the", "their", "they", "this", "to", "was", "we", "were", "will", "with", "you", "your",
];

/// Tokenizes a text blob into the word set used by the text-overlap metric
///
/// Lowercases, treats any non-alphanumeric character as a separator, and
/// drops stop words. Called once per item at snapshot load time so the
/// scoring hot loop never touches strings.
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}
