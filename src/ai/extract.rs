//! JSON Extraction from LLM Output
//!
//! LLMs asked for JSON still wrap it in markdown fences or explanatory
//! prose. This module finds and parses the first top-level JSON object in a
//! response. If no object can be recovered, the call is treated as failed
//! and the caller classifies it as a malformed response.

use serde_json::Value;
use tracing::debug;

use crate::types::{Result, VentureError};

/// Parse the first top-level JSON object found in `content`.
///
/// Tries, in order: direct parse of the fence-stripped text, a trailing-comma
/// fix, then a balanced scan for an embedded object.
pub fn first_json_object(content: &str) -> Result<Value> {
    let cleaned = strip_code_fences(content.trim());

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned)
        && value.is_object()
    {
        return Ok(value);
    }

    let repaired = fix_trailing_commas(&cleaned);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired)
        && value.is_object()
    {
        debug!("parsed JSON after trailing-comma fix");
        return Ok(value);
    }

    if let Some(embedded) = extract_embedded_object(&cleaned)
        && let Ok(value) = serde_json::from_str::<Value>(&embedded)
    {
        debug!("extracted JSON object from surrounding prose");
        return Ok(value);
    }

    Err(VentureError::LlmApi(format!(
        "no JSON object found in response. Content preview: {}...",
        cleaned.chars().take(200).collect::<String>()
    )))
}

/// Strip markdown code fences (```json ... ``` or ``` ... ```).
fn strip_code_fences(s: &str) -> String {
    let mut result = s.to_string();

    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = result[first_newline + 1..].to_string();
    }

    if result.ends_with("```") {
        result = result[..result.len() - 3].trim_end().to_string();
    }

    result
}

/// Drop commas that directly precede a closing bracket or brace.
fn fix_trailing_commas(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];

        if ch == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }

            if j < chars.len() && (chars[j] == ']' || chars[j] == '}') {
                i += 1;
                continue;
            }
        }

        result.push(ch);
        i += 1;
    }

    result
}

/// Find the first balanced `{...}` span, respecting strings and escapes.
fn extract_embedded_object(s: &str) -> Option<String> {
    let start = s.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(s[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let value = first_json_object(r#"{"score": 7.5, "reasoning": "solid"}"#).unwrap();
        assert_eq!(value["score"], 7.5);
    }

    #[test]
    fn test_strip_fences() {
        let value = first_json_object("```json\n{\"score\": 6}\n```").unwrap();
        assert_eq!(value["score"], 6);
    }

    #[test]
    fn test_extract_from_prose() {
        let input = "Here is my assessment:\n{\"score\": 8, \"reasoning\": \"strong moat\"}\nLet me know if you need more.";
        let value = first_json_object(input).unwrap();
        assert_eq!(value["score"], 8);
    }

    #[test]
    fn test_trailing_comma_repaired() {
        let value = first_json_object(r#"{"score": 5, "tags": ["a", "b",],}"#).unwrap();
        assert_eq!(value["tags"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let input =
            r#"The assessment follows. {"score": 4, "reasoning": "mind the { and } here"} Done."#;
        let value = first_json_object(input).unwrap();
        assert_eq!(value["score"], 4);
    }

    #[test]
    fn test_no_object_is_an_error() {
        assert!(first_json_object("I cannot help with that.").is_err());
        assert!(first_json_object("[1, 2, 3]").is_err());
    }
}
