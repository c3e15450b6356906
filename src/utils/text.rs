use serde_json::Value;

/// Count whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Pull `field` out of the first element of a pipeline output list.
///
/// Pipelines answer with `[{"<field>": "..."}, ...]`; anything else yields
/// `None`.
pub fn first_text_field(output: &Value, field: &str) -> Option<String> {
    output
        .as_array()?
        .first()?
        .get(field)?
        .as_str()
        .map(|s| s.to_string())
}
