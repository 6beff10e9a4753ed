//! Tolerant structured-text extraction
//!
//! Model output is expected to contain XML-like tag pairs (`<field>value</field>`)
//! but is not guaranteed to be well formed. The extractors here fail soft: a
//! field that is absent or has mismatched tags is simply reported as missing,
//! never as an error. First occurrence wins when a tag is repeated or nested.

/// Extract the value of the first `<name>...</name>` pair in `text`.
///
/// Locates the first start tag and the first end tag that follows it. The
/// value is trimmed; an empty tag pair yields `Some("")`, not `None`.
pub fn field(text: &str, name: &str) -> Option<String> {
    let start_tag = format!("<{}>", name);
    let end_tag = format!("</{}>", name);

    let start = text.find(&start_tag)? + start_tag.len();
    let end = text[start..].find(&end_tag)? + start;

    Some(text[start..end].trim().to_string())
}

/// Extract a comma-separated list field, trimming each element.
///
/// An empty value yields an empty vector; elements that trim to nothing are
/// dropped. Returns `None` only when the field itself is missing.
pub fn list_field(text: &str, name: &str) -> Option<Vec<String>> {
    let value = field(text, name)?;
    if value.is_empty() {
        return Some(Vec::new());
    }
    Some(
        value
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

/// Extract an integer field, returning `None` when the field is absent or
/// its value does not parse. Used for optional numeric filters, which are
/// silently omitted on a failed parse.
pub fn int_field(text: &str, name: &str) -> Option<i64> {
    field(text, name)?.parse().ok()
}

/// Extract an integer field with a default for unparseable values.
///
/// Returns `None` when the field is absent, but `Some(default)` when the tag
/// is present and its value fails to parse. This distinguishes "the model
/// said nothing" from "the model said something unusable".
pub fn int_field_or(text: &str, name: &str, default: i64) -> Option<i64> {
    let value = field(text, name)?;
    Some(value.parse().unwrap_or(default))
}

/// Extract the inner text of every `<name>...</name>` pair in `text`.
///
/// Blocks are found by slicing on occurrences of the opening tag; a section
/// without a closing tag is skipped. The number of blocks is unbounded here,
/// callers apply their own cap.
pub fn blocks(text: &str, name: &str) -> Vec<String> {
    let start_tag = format!("<{}>", name);
    let end_tag = format!("</{}>", name);

    text.split(&start_tag)
        .skip(1)
        .filter_map(|section| {
            section
                .split(&end_tag)
                .next()
                .filter(|_| section.contains(&end_tag))
                .map(|inner| inner.trim().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_basic() {
        let text = "prefix <summary>  hello world </summary> suffix";
        assert_eq!(field(text, "summary"), Some("hello world".to_string()));
    }

    #[test]
    fn test_field_missing() {
        assert_eq!(field("no tags here", "summary"), None);
    }

    #[test]
    fn test_field_missing_end_tag() {
        assert_eq!(field("<summary>unterminated", "summary"), None);
    }

    #[test]
    fn test_field_empty_is_present() {
        assert_eq!(field("<summary></summary>", "summary"), Some(String::new()));
    }

    #[test]
    fn test_field_first_occurrence_wins() {
        let text = "<k>first</k> <k>second</k>";
        assert_eq!(field(text, "k"), Some("first".to_string()));
    }

    #[test]
    fn test_field_end_tag_before_start_is_ignored() {
        // The end tag must follow the start tag.
        let text = "</k> stray <k>value</k>";
        assert_eq!(field(text, "k"), Some("value".to_string()));
    }

    #[test]
    fn test_list_field() {
        let text = "<keywords>alpha, beta , gamma</keywords>";
        assert_eq!(
            list_field(text, "keywords"),
            Some(vec![
                "alpha".to_string(),
                "beta".to_string(),
                "gamma".to_string()
            ])
        );
    }

    #[test]
    fn test_list_field_empty() {
        assert_eq!(list_field("<keywords></keywords>", "keywords"), Some(vec![]));
    }

    #[test]
    fn test_list_field_missing() {
        assert_eq!(list_field("nothing", "keywords"), None);
    }

    #[test]
    fn test_int_field() {
        assert_eq!(int_field("<min_importance>5</min_importance>", "min_importance"), Some(5));
        assert_eq!(int_field("<min_importance>high</min_importance>", "min_importance"), None);
        assert_eq!(int_field("no tag", "min_importance"), None);
    }

    #[test]
    fn test_int_field_or_defaults_on_parse_failure() {
        assert_eq!(
            int_field_or("<importance>notanumber</importance>", "importance", 5),
            Some(5)
        );
        assert_eq!(int_field_or("<importance>7</importance>", "importance", 5), Some(7));
        assert_eq!(int_field_or("no tag", "importance", 5), None);
    }

    #[test]
    fn test_blocks() {
        let text = "<query>one</query> junk <query>two</query>";
        assert_eq!(blocks(text, "query"), vec!["one", "two"]);
    }

    #[test]
    fn test_blocks_skips_unterminated() {
        let text = "<query>complete</query><query>dangling";
        assert_eq!(blocks(text, "query"), vec!["complete"]);
    }

    #[test]
    fn test_blocks_none() {
        assert!(blocks("no queries", "query").is_empty());
    }
}
