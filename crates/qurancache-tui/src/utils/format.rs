use unicode_width::UnicodeWidthStr;

/// Truncate or pad `s` so it occupies exactly `width` terminal columns.
/// Truncated text ends in "...".
pub fn fit_to_width(s: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(s);
    if current <= width {
        return format!("{}{}", s, " ".repeat(width - current));
    }
    if width <= 3 {
        return ".".repeat(width);
    }

    let budget = width - 3;
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let mut buf = [0u8; 4];
        let w = UnicodeWidthStr::width(&*ch.encode_utf8(&mut buf));
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str("...");
    out.push_str(&" ".repeat(budget - used));
    out
}

/// Word-wrap `text` to `width` columns, indenting every line by `indent` spaces.
pub fn wrap_indented(text: &str, width: usize, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    // textwrap needs room for at least one character after the indent
    let width = width.max(indent + 1);
    let options = textwrap::Options::new(width)
        .initial_indent(&pad)
        .subsequent_indent(&pad);

    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}
