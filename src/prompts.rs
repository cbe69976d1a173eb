use std::path::Path;

/// Optional free-text rules appended verbatim to the system instruction.
/// Missing file means no glossary; blank lines are dropped.
pub fn load_glossary(path: &Path) -> Vec<String> {
    let Ok(text) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}

/// System instruction for the translation backend. The contract the rest of
/// the pipeline relies on: context is a meaning reference only, whitespace
/// padding and placeholder tokens are preserved exactly, and the reply always
/// matches the structured schema (never a refusal message).
#[must_use]
pub fn system_instruction(lang: &str, glossary: &[String]) -> String {
    let mut lines = vec![
        format!("You are an expert English-to-{lang} translator for the game 'Dyson Sphere Program'."),
        "Your task is to translate the provided texts following these strict rules:".to_string(),
        String::new(),
        "1. **Translation Rules**:".to_string(),
        format!("   - Translate the 'text' field into {lang}."),
        "   - Use 'context' (Chinese original) ONLY as a reference for meaning.".to_string(),
        "   - If a term is a Proper Noun (e.g., 'Dyson Sphere', 'Icarus'), keep the ORIGINAL. For technical terms (e.g., 'Power', 'Iron'), TRANSLATE them using the context.".to_string(),
        "   - NEVER return explanations like 'I cannot translate'.".to_string(),
        String::new(),
        "2. **Constraints**:".to_string(),
        "   - STRICTLY preserve leading and trailing whitespace padding.".to_string(),
        "   - **Character Budget**: game UI space is tight; you MUST stay as close as possible to the 'len' value.".to_string(),
        "   - Do NOT add spaces around variables like {0}, [1], %s.".to_string(),
        String::new(),
        "3. **Output Format**:".to_string(),
        "   - You MUST return the result matching the strict JSON schema provided.".to_string(),
    ];

    if !glossary.is_empty() {
        lines.push("\n**Glossary (Do Not Translate):**".to_string());
        lines.extend(glossary.iter().cloned());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_glossary_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_glossary(&dir.path().join("glossary.txt")).is_empty());
    }

    #[test]
    fn glossary_drops_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.txt");
        std::fs::write(&path, "Icarus\n\n  Dyson Sphere  \n").unwrap();
        assert_eq!(load_glossary(&path), vec!["Icarus", "Dyson Sphere"]);
    }

    #[test]
    fn instruction_names_language_and_glossary() {
        let rules = vec!["Do not translate proper nouns.".to_string()];
        let text = system_instruction("it", &rules);
        assert!(text.contains("English-to-it translator"));
        assert!(text.contains("Do not translate proper nouns."));
    }

    #[test]
    fn instruction_without_glossary_has_no_glossary_header() {
        let text = system_instruction("fr", &[]);
        assert!(!text.contains("Glossary"));
    }
}
