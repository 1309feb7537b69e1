/// Make a string safe to embed inside a JSON string literal.
///
/// Line breaks and tabs become a single space, form feeds and other control
/// characters are dropped, and backslashes and quotes are escaped. A
/// backslash that already starts an escaped pair (`\\` or `\"`) is left
/// alone, so sanitizing an already sanitized string changes nothing.
///
/// ```
/// use iiifman_extract::sanitize;
///
/// assert_eq!(sanitize("a \"quoted\"\ttitle\n"), r#"a \"quoted\" title "#);
/// assert_eq!(sanitize(&sanitize(r"C:\dir")), sanitize(r"C:\dir"));
/// ```
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next @ ('\\' | '"')) => {
                    chars.next();
                    out.push('\\');
                    out.push(next);
                },
                _ => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {},
            c => out.push(c),
        }
    }
    out
}
