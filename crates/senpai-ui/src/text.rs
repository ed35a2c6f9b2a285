use std::borrow::Cow;
use unicode_width::UnicodeWidthChar;

/// Terminal columns taken by `text`, ignoring ANSI CSI escape sequences.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if ('@'..='~').contains(&next) {
                        break;
                    }
                }
            }
            continue;
        }
        width += c.width().unwrap_or(0);
    }
    width
}

/// Shortens a menu row so it never wraps.
///
/// Rows wider than `width - 5` columns keep their first `width - 8` columns
/// and gain a `...` suffix.
pub fn truncate_row(command: &str, width: usize) -> Cow<'_, str> {
    if visible_width(command) <= width.saturating_sub(5) {
        return Cow::Borrowed(command);
    }
    let budget = width.saturating_sub(8);
    let mut used = 0;
    let mut out = String::new();
    for c in command.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    Cow::Owned(out)
}

/// Extra rows, beyond the first, that a line of `text_width` columns wraps into.
///
/// A line that exactly fills the width counts as one row, not two: terminals
/// defer the wrap until the next character, and the menu follows each prompt
/// with its own newline. Plain `text_width / width` would over-clear by a row.
pub fn overflow_rows(text_width: usize, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text_width.saturating_sub(1) / width
}

pub fn separator(width: usize) -> String {
    "—".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ignores_color_codes() {
        assert_eq!(visible_width("\x1b[;1m\x1b[94mls -la\x1b[0m"), 6);
        assert_eq!(visible_width("👉 ls"), 5);
    }

    #[test]
    fn short_rows_are_untouched() {
        assert_eq!(truncate_row("ls -la", 20), "ls -la");
        assert_eq!(truncate_row("123456789012345", 20), "123456789012345");
    }

    #[test]
    fn long_rows_are_cut_to_fit() {
        let command = "find . -name '*.rs' -exec wc -l {} +";
        let row = truncate_row(command, 20);
        assert_eq!(row, "find . -name...");
        assert_eq!(visible_width(&row), 15);
    }

    #[test]
    fn overflow_counts_wrapped_rows() {
        assert_eq!(overflow_rows(0, 20), 0);
        assert_eq!(overflow_rows(20, 20), 0);
        assert_eq!(overflow_rows(21, 20), 1);
        assert_eq!(overflow_rows(40, 20), 1);
        assert_eq!(overflow_rows(45, 20), 2);
        assert_eq!(overflow_rows(45, 0), 0);
    }

    #[test]
    fn separator_spans_width() {
        assert_eq!(separator(3), "———");
        assert_eq!(visible_width(&separator(7)), 7);
    }
}
