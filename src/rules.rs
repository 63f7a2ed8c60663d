// 🏷️ Label Normalization Rules - Rules as Data
// Maps near-miss survey labels ("Other or would rather not say",
// mis-encoded country names) onto canonical bucket labels

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationRule {
    /// Rule ID for tracing which rule fired
    pub id: String,

    /// Pattern to match (case-insensitive, `*` matches any run of characters)
    pub pattern: String,

    /// Canonical label the raw value is rewritten to
    pub canonical: String,

    /// Priority (higher = tried first)
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    0
}

impl NormalizationRule {
    pub fn new(id: &str, pattern: &str, canonical: &str) -> Self {
        NormalizationRule {
            id: id.to_string(),
            pattern: pattern.to_string(),
            canonical: canonical.to_string(),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Check if the whole text matches the pattern
    pub fn matches(&self, text: &str) -> bool {
        let pattern = self.pattern.to_lowercase();
        let text = text.trim().to_lowercase();

        if !pattern.contains('*') {
            return text == pattern;
        }

        let parts: Vec<&str> = pattern.split('*').collect();
        let (first, rest) = match parts.split_first() {
            Some(split) => split,
            None => return false,
        };
        let (last, middle) = match rest.split_last() {
            Some(split) => split,
            None => return false,
        };

        let Some(mut remaining) = text.strip_prefix(first) else {
            return false;
        };

        // Middle parts must appear in order
        for part in middle.iter().filter(|p| !p.is_empty()) {
            match remaining.find(part) {
                Some(pos) => remaining = &remaining[pos + part.len()..],
                None => return false,
            }
        }

        // Suffix must fit after everything already consumed
        remaining.ends_with(last)
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    rules: Vec<NormalizationRule>,
}

impl LabelNormalizer {
    /// Create a normalizer with no rules
    pub fn new() -> Self {
        LabelNormalizer { rules: Vec::new() }
    }

    /// Rules for the label variants seen in the survey export
    pub fn standard() -> Self {
        Self::from_rules(vec![
            NormalizationRule::new(
                "rather-not-say",
                "other*would rather not say",
                "Other/would rather not say",
            ),
            // Apostrophe arrives as a Windows-1252 byte, decoded as U+0092
            NormalizationRule::new("cote-divoire", "c*te d*ivoire", "Côte d’Ivoire"),
        ])
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let rules: Vec<NormalizationRule> =
            serde_json::from_str(&content).context("Failed to parse rules JSON")?;

        Ok(LabelNormalizer::from_rules(rules))
    }

    /// Create normalizer from a list of rules
    pub fn from_rules(mut rules: Vec<NormalizationRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        LabelNormalizer { rules }
    }

    pub fn add_rule(&mut self, rule: NormalizationRule) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Canonical label for `text`, if any rule matches
    pub fn normalize(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.canonical.as_str())
    }

    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_exact_pattern_is_whole_match() {
        let rule = NormalizationRule::new("t", "Yes", "Yes");

        assert!(rule.matches("yes"));
        assert!(rule.matches(" YES "));
        assert!(!rule.matches("yes please"));
    }

    #[test]
    fn test_wildcard_pattern() {
        let rule = NormalizationRule::new("t", "other*would rather not say", "X");

        assert!(rule.matches("Other or would rather not say"));
        assert!(rule.matches("Other / would rather not say"));
        assert!(rule.matches("Other/would rather not say"));
        assert!(!rule.matches("would rather not say"));
    }

    #[test]
    fn test_wildcard_prefix_and_suffix_do_not_overlap() {
        let rule = NormalizationRule::new("t", "ab*ba", "X");

        assert!(rule.matches("abba"));
        assert!(!rule.matches("aba"));
    }

    #[test]
    fn test_middle_parts_in_order() {
        let rule = NormalizationRule::new("t", "a*b*c", "X");

        assert!(rule.matches("a-b-c"));
        assert!(!rule.matches("a-c-b"));
    }

    #[test]
    fn test_standard_cote_divoire_variants() {
        let normalizer = LabelNormalizer::standard();

        assert_eq!(normalizer.normalize("Côte d\u{92}Ivoire"), Some("Côte d’Ivoire"));
        assert_eq!(normalizer.normalize("Côte dIvoire"), Some("Côte d’Ivoire"));
        assert_eq!(normalizer.normalize("Cote d'Ivoire"), Some("Côte d’Ivoire"));
        assert_eq!(normalizer.normalize("Canada"), None);
    }

    #[test]
    fn test_priority_order() {
        let mut normalizer = LabelNormalizer::new();
        normalizer.add_rule(NormalizationRule::new("general", "united*", "United States"));
        normalizer.add_rule(
            NormalizationRule::new("specific", "united kingdom", "United Kingdom").with_priority(10),
        );

        assert_eq!(normalizer.normalize("United Kingdom"), Some("United Kingdom"));
        assert_eq!(normalizer.normalize("United States of America"), Some("United States"));
        assert_eq!(normalizer.rule_count(), 2);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "uk", "pattern": "uk", "canonical": "United Kingdom", "priority": 5}}]"#
        )
        .unwrap();

        let normalizer = LabelNormalizer::from_file(file.path()).unwrap();
        assert_eq!(normalizer.normalize("UK"), Some("United Kingdom"));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(LabelNormalizer::from_file("/nonexistent/rules.json").is_err());
    }
}
