use super::*;

pub(crate) fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
}

pub(crate) fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(crate) fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea" | "title")
}

pub(crate) fn escape_html_text_for_serialization(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_html_attr_for_serialization(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Splits `input` at every top-level `delimiter`, ignoring delimiters inside
/// quotes or parentheses.
fn split_top_level(input: &str, delimiter: u8, limit: Option<usize>) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0usize;

    while i < bytes.len() {
        let ch = bytes[i];
        match quote {
            Some(_) if ch == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                b'\'' | b'"' => quote = Some(ch),
                b'(' => paren_depth += 1,
                b')' => paren_depth = paren_depth.saturating_sub(1),
                _ if ch == delimiter && paren_depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + 1;
                    if limit.is_some_and(|limit| parts.len() + 1 >= limit) {
                        break;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    parts.push(&input[start.min(input.len())..]);
    parts
}

pub(crate) fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    for raw_decl in split_top_level(style_attr, b';', None) {
        let decl = raw_decl.trim();
        if decl.is_empty() {
            continue;
        }
        let pieces = split_top_level(decl, b':', Some(2));
        let [name, value] = pieces.as_slice() else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();

        if let Some(pos) = out.iter().position(|(existing, _)| *existing == name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }

    out
}

pub(crate) fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_declarations_ignore_separators_inside_quotes_and_parens() {
        let decls = parse_style_declarations(Some(
            "background: url('a;b.png'); content: \"x:y\"; DISPLAY : none ;",
        ));
        assert_eq!(
            decls,
            vec![
                ("background".to_string(), "url('a;b.png')".to_string()),
                ("content".to_string(), "\"x:y\"".to_string()),
                ("display".to_string(), "none".to_string()),
            ]
        );
    }

    #[test]
    fn later_declarations_override_earlier_ones() {
        let decls = parse_style_declarations(Some("display: none; display: block"));
        assert_eq!(decls, vec![("display".to_string(), "block".to_string())]);
    }

    #[test]
    fn declarations_without_colon_or_name_are_dropped() {
        assert!(parse_style_declarations(Some("display; : none;;")).is_empty());
        assert!(parse_style_declarations(None).is_empty());
    }

    #[test]
    fn serialize_joins_declarations_with_trailing_semicolons() {
        let decls = vec![
            ("display".to_string(), "block".to_string()),
            ("color".to_string(), "red".to_string()),
        ];
        assert_eq!(
            serialize_style_declarations(&decls),
            "display: block; color: red;"
        );
        assert_eq!(serialize_style_declarations(&[]), "");
    }

    #[test]
    fn class_tokens_split_on_any_whitespace() {
        assert_eq!(
            class_tokens(Some(" reply\tbtn  small ")),
            vec!["reply", "btn", "small"]
        );
        assert!(class_tokens(None).is_empty());
    }
}
