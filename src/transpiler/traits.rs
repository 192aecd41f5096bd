//! Quoting and text helpers shared by the renderers.

/// Quote an identifier with backticks. Embedded backticks are doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-quoted string literal with backslash escapes.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Float text that always carries a decimal point or exponent.
pub fn format_float(value: f64) -> String {
    let text = format!("{}", value);
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Prefix every non-empty line with `indent`.
pub fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fold a multi-line statement onto one line.
pub fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Characters with a meaning in regular expressions are backslash-escaped.
pub fn escape_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("id"), "`id`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("abc"), "'abc'");
        assert_eq!(quote_string("it's"), "'it\\'s'");
        assert_eq!(quote_string("a\\b\n"), "'a\\\\b\\n'");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(-2.0), "-2.0");
    }

    #[test]
    fn test_indent_and_collapse() {
        assert_eq!(indent_lines("SELECT *\nFROM t", "  "), "  SELECT *\n  FROM t");
        assert_eq!(collapse_lines("SELECT *\n  FROM t\n"), "SELECT * FROM t");
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b*"), "a\\.b\\*");
    }
}
