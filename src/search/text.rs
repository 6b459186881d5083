//! Plain-text extraction from note content payloads.

use serde_json::Value;

/// Keys whose values hold child nodes in the supported document formats.
///
/// `content` covers ProseMirror/TipTap trees, `blocks`/`data`/`items` cover
/// Editor.js documents and `children` covers generic node trees. Everything
/// else (`marks`, `attrs`, `type`, ...) only describes formatting.
const CHILD_KEYS: [&str; 5] = ["content", "blocks", "data", "items", "children"];

/// Returns the searchable text of a content payload.
///
/// Structured documents (JSON objects or arrays) contribute the text of
/// their text-bearing nodes, joined by single spaces. Anything else,
/// including markdown and malformed JSON, is used as-is.
///
/// # Examples
///
/// ```
/// use blocknotes::search::extract_text;
///
/// let doc = r#"{"type":"doc","content":[{"type":"paragraph","content":[
///     {"type":"text","text":"Buy"},
///     {"type":"text","marks":[{"type":"bold"}],"text":"milk"}]}]}"#;
/// assert_eq!(extract_text(doc), "Buy milk");
/// assert_eq!(extract_text("# Heading\nplain *markdown*"), "# Heading\nplain *markdown*");
/// ```
pub fn extract_text(content: &str) -> String {
    match serde_json::from_str::<Value>(content) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => {
            let mut parts = Vec::new();
            collect(&value, &mut parts);
            parts.join(" ")
        }
        _ => content.to_string(),
    }
}

fn collect<'v>(node: &'v Value, parts: &mut Vec<&'v str>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                push_text(text, parts);
            }
            for key in CHILD_KEYS {
                if let Some(child) = map.get(key) {
                    collect(child, parts);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(text) => push_text(text, parts),
                    other => collect(other, parts),
                }
            }
        }
        _ => {}
    }
}

fn push_text<'v>(text: &'v str, parts: &mut Vec<&'v str>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiptap_document_text_nodes_are_joined() {
        let doc = r#"{
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Weekly review"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Ship the "},
                    {"type": "text", "marks": [{"type": "italic"}], "text": "release"}
                ]},
                {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [{"type": "text", "text": "fn main() {}"}]}
            ]
        }"#;

        assert_eq!(extract_text(doc), "Weekly review Ship the release fn main() {}");
    }

    #[test]
    fn formatting_only_values_are_ignored() {
        let doc = r#"{"type":"doc","attrs":{"text":"hidden"},"content":[{"type":"text","marks":[{"type":"link","attrs":{"href":"https://x"}}],"text":"visible"}]}"#;
        assert_eq!(extract_text(doc), "visible");
    }

    #[test]
    fn editorjs_blocks_and_list_items_are_extracted() {
        let doc = r#"{"time":1,"blocks":[
            {"type":"header","data":{"text":"Groceries","level":2}},
            {"type":"list","data":{"style":"unordered","items":["eggs","flour"]}}
        ]}"#;

        assert_eq!(extract_text(doc), "Groceries eggs flour");
    }

    #[test]
    fn empty_document_has_no_text() {
        assert_eq!(extract_text(crate::models::DEFAULT_CONTENT), "");
    }

    #[test]
    fn malformed_json_is_used_verbatim() {
        let broken = r#"{"type":"doc","content":[{"#;
        assert_eq!(extract_text(broken), broken);
    }

    #[test]
    fn json_scalars_are_used_verbatim() {
        assert_eq!(extract_text("42"), "42");
        assert_eq!(extract_text(r#""quoted""#), r#""quoted""#);
    }

    #[test]
    fn markdown_and_empty_content_pass_through() {
        assert_eq!(extract_text("- [ ] task"), "- [ ] task");
        assert_eq!(extract_text(""), "");
    }
}
