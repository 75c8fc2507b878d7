//! Identifier and formatting helpers shared by the SQL compiler and the Go renderer.

/// Initialisms Go style keeps fully upper-cased inside identifiers.
const GO_INITIALISMS: &[&str] = &["id", "sql", "url", "uuid", "api", "http", "json", "ip"];

/// Go's reserved words; none may name a declaration.
const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Whether `s` can name a Go declaration: a letter or underscore followed by
/// letters, digits or underscores, and neither a keyword nor the blank `_`.
pub fn is_go_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let valid_start = chars.next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false);
    valid_start
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && s != "_"
        && !GO_KEYWORDS.contains(&s)
}

/// Converts a snake_case name to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == '.' || c == ' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Converts a PascalCase or camelCase name to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '-' || c == ' ' || c == '.' {
            result.push('_');
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    result
}

/// Converts a name to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Converts a snake_case name to an exported Go identifier.
///
/// Words that are common initialisms are fully upper-cased, so `user_id`
/// becomes `UserID` rather than `UserId`.
pub fn to_go_exported(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            if GO_INITIALISMS.contains(&word) {
                word.to_uppercase()
            } else {
                to_pascal_case(word)
            }
        })
        .collect()
}

/// Indents every non-empty line of `text` by `depth` tabs.
pub fn indent(text: &str, depth: usize) -> String {
    let prefix = "\t".repeat(depth);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quotes `s` as a Go interpreted string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_pascal_case("todo_item"), "TodoItem");
        assert_eq!(to_snake_case("TodoItem"), "todo_item");
        assert_eq!(to_snake_case("orderLine2Item"), "order_line2_item");
        assert_eq!(to_camel_case("todo_item"), "todoItem");
    }

    #[test]
    fn test_go_identifiers() {
        assert!(is_go_identifier("FindBySku"));
        assert!(is_go_identifier("_internal2"));
        assert!(!is_go_identifier("find by sku"));
        assert!(!is_go_identifier("2ndPage"));
        assert!(!is_go_identifier("Find-All"));
        assert!(!is_go_identifier("range"));
        assert!(!is_go_identifier("_"));
        assert!(!is_go_identifier(""));
    }

    #[test]
    fn test_go_exported_initialisms() {
        assert_eq!(to_go_exported("user_id"), "UserID");
        assert_eq!(to_go_exported("salary_range"), "SalaryRange");
        assert_eq!(to_go_exported("ProductSku"), "ProductSku");
        assert_eq!(to_go_exported("id"), "ID");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 1), "\ta\n\n\tb");
        assert_eq!(indent("x", 2), "\t\tx");
    }

    #[test]
    fn test_go_quote_escapes() {
        assert_eq!(go_quote(r#"SELECT "user""#), r#""SELECT \"user\"""#);
        assert_eq!(go_quote("a\\b"), r#""a\\b""#);
        assert_eq!(go_quote("line\nbreak"), r#""line\nbreak""#);
    }
}
