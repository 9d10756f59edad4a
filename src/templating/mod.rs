//! Literal placeholder substitution for materialized content.
//!
//! Two tokens are recognized, both derived from the resource name:
//!
//! | token | value | `codeReview` becomes |
//! |---|---|---|
//! | `{{name}}` | kebab-case | `code-review` |
//! | `{{NAME}}` | SCREAMING_SNAKE_CASE | `CODE_REVIEW` |
//!
//! Substitution is a plain string replacement. Anything else between braces is
//! left untouched and nothing is evaluated. Only content that is valid UTF-8 and
//! contains no NUL byte is treated as text; everything else passes through
//! byte-for-byte.

/// Placeholder values for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    kebab: String,
    screaming: String,
}

impl Placeholders {
    /// Placeholders for a resource name.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        let words = split_words(name);
        Self {
            kebab: words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("-"),
            screaming: words.iter().map(|w| w.to_uppercase()).collect::<Vec<_>>().join("_"),
        }
    }

    /// Value of `{{name}}`.
    #[must_use]
    pub fn kebab(&self) -> &str {
        &self.kebab
    }

    /// Value of `{{NAME}}`.
    #[must_use]
    pub fn screaming(&self) -> &str {
        &self.screaming
    }

    /// Substitutes both tokens in a string.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        text.replace("{{name}}", &self.kebab).replace("{{NAME}}", &self.screaming)
    }

    /// Substitutes tokens in text content; returns binary content unchanged.
    #[must_use]
    pub fn render(&self, content: Vec<u8>) -> Vec<u8> {
        if !is_text(&content) {
            return content;
        }
        match String::from_utf8(content) {
            Ok(text) if text.contains("{{") => self.apply(&text).into_bytes(),
            Ok(text) => text.into_bytes(),
            Err(e) => e.into_bytes(),
        }
    }
}

/// Whether content is eligible for substitution.
#[must_use]
pub fn is_text(content: &[u8]) -> bool {
    !content.contains(&0) && std::str::from_utf8(content).is_ok()
}

/// Splits on separators and lower-to-upper case transitions.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        for (name, kebab, screaming) in [
            ("code-review", "code-review", "CODE_REVIEW"),
            ("codeReview", "code-review", "CODE_REVIEW"),
            ("code_review v2", "code-review-v2", "CODE_REVIEW_V2"),
            ("PDF", "pdf", "PDF"),
        ] {
            let placeholders = Placeholders::for_name(name);
            assert_eq!(placeholders.kebab(), kebab, "{name}");
            assert_eq!(placeholders.screaming(), screaming, "{name}");
        }
    }

    #[test]
    fn test_apply_only_known_tokens() {
        let placeholders = Placeholders::for_name("codeReview");
        assert_eq!(
            placeholders.apply("# {{NAME}}\nUse {{name}} here, keep {{other}} and {{ name }}."),
            "# CODE_REVIEW\nUse code-review here, keep {{other}} and {{ name }}."
        );
    }

    #[test]
    fn test_binary_content_untouched() {
        let placeholders = Placeholders::for_name("x");
        let with_nul = b"{{name}}\0".to_vec();
        assert_eq!(placeholders.render(with_nul.clone()), with_nul);

        let invalid_utf8 = vec![0xff, b'{', b'{', b'n', b'a', b'm', b'e', b'}', b'}'];
        assert_eq!(placeholders.render(invalid_utf8.clone()), invalid_utf8);

        assert_eq!(placeholders.render(b"{{name}}".to_vec()), b"x".to_vec());
    }
}
