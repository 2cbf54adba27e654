//! Template scanning: locating `{{ ... }}` expression spans in text
//!
//! Matching is non-greedy and spans newlines. A span whose body is empty or
//! whitespace-only is not a template occurrence — `{{}}` passes through as
//! literal text.

use once_cell::sync::Lazy;
use regex::Regex;

static TEMPLATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("template pattern is valid"));

/// A located `{{ ... }}` span inside a larger template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    /// The full span including the braces
    pub full_match: String,
    /// The expression body, trimmed of surrounding whitespace
    pub expression: String,
    /// Byte offset of the span start
    pub start_index: usize,
    /// Byte offset one past the span end
    pub end_index: usize,
    /// Whether the span crosses a line break
    pub multiline: bool,
}

/// Check whether `text` contains at least one template expression.
pub fn has_template_expressions(text: &str) -> bool {
    TEMPLATE_PATTERN
        .captures_iter(text)
        .any(|c| !c[1].trim().is_empty())
}

/// Extract every template expression span in `text`, in order.
pub fn extract_template_expressions(text: &str) -> Vec<TemplateMatch> {
    TEMPLATE_PATTERN
        .captures_iter(text)
        .filter_map(|captures| {
            let full = captures.get(0).expect("group 0 always present");
            let body = &captures[1];
            let expression = body.trim();
            if expression.is_empty() {
                return None;
            }
            Some(TemplateMatch {
                full_match: full.as_str().to_string(),
                expression: expression.to_string(),
                start_index: full.start(),
                end_index: full.end(),
                multiline: full.as_str().contains('\n'),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_expression() {
        let matches = extract_template_expressions("Hello {{ item.name }}!");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].expression, "item.name");
        assert_eq!(matches[0].full_match, "{{ item.name }}");
        assert_eq!(matches[0].start_index, 6);
        assert_eq!(matches[0].end_index, 21);
        assert!(!matches[0].multiline);
    }

    #[test]
    fn test_multiple_expressions() {
        let matches = extract_template_expressions("{{a}} and {{b}}");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].expression, "a");
        assert_eq!(matches[1].expression, "b");
    }

    #[test]
    fn test_multiline_expression() {
        let text = "{{ item.a +\n item.b }}";
        let matches = extract_template_expressions(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].expression, "item.a +\n item.b");
        assert!(matches[0].multiline);
    }

    #[test]
    fn test_empty_spans_are_skipped() {
        assert!(!has_template_expressions("{{}}"));
        assert!(!has_template_expressions("{{   }}"));
        assert!(!has_template_expressions("no templates here"));
        assert!(extract_template_expressions("a {{}} b").is_empty());
    }

    #[test]
    fn test_non_greedy_matching() {
        let matches = extract_template_expressions("{{a}}text{{b}}");
        assert_eq!(matches[0].full_match, "{{a}}");
        assert_eq!(matches[1].full_match, "{{b}}");
    }

    #[test]
    fn test_has_template_expressions() {
        assert!(has_template_expressions("x = {{ 1 + 2 }}"));
        assert!(!has_template_expressions("x = { 1 + 2 }"));
    }
}
