use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;

/// Refusal phrases a misbehaving backend may echo instead of a translation.
/// Matched case-insensitively against the returned text.
pub const REFUSAL_PHRASES: [&str; 4] = [
    "cannot translate",
    "unable to translate",
    "as an ai model",
    "i can't",
];

// Placeholder tokens the game substitutes at runtime: {0}, [1], %s, %d, %1$s.
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\d+\}|\[\d+\]|%(?:\d+\$)?[sd]").expect("placeholder regex"));

/// Screen a backend translation before it is accepted. On error the caller
/// substitutes the original source text for this line.
pub fn validate_translation(source: &str, translated: &str) -> anyhow::Result<()> {
    if translated.trim().is_empty() {
        return Err(anyhow!("empty_output"));
    }

    let lower = translated.to_lowercase();
    for phrase in REFUSAL_PHRASES {
        if lower.contains(phrase) {
            return Err(anyhow!("refusal_phrase:{phrase}"));
        }
    }

    let mut src_tokens: Vec<&str> = PLACEHOLDER_RE
        .find_iter(source)
        .map(|m| m.as_str())
        .collect();
    let mut tgt_tokens: Vec<&str> = PLACEHOLDER_RE
        .find_iter(translated)
        .map(|m| m.as_str())
        .collect();
    src_tokens.sort_unstable();
    tgt_tokens.sort_unstable();
    if src_tokens != tgt_tokens {
        return Err(anyhow!("placeholder_mismatch"));
    }

    Ok(())
}
