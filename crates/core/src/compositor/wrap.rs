/// Greedy word wrap to at most `width` characters per line.
///
/// Runs of whitespace collapse to a single space. Words longer than
/// `width` are split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        // break oversize words
        while chars.len() > width {
            let room = if current_len == 0 {
                width
            } else {
                width.saturating_sub(current_len + 1)
            };
            if room == 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let head: String = chars.drain(..room).collect();
            if current_len > 0 {
                current.push(' ');
            }
            current.push_str(&head);
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let len = chars.len();
        if len == 0 {
            continue;
        }
        if current_len > 0 && current_len + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(wrap_text("Know thyself", 30), vec!["Know thyself"]);
    }

    #[test]
    fn test_wraps_at_budget() {
        let quote = "The happiness of your life depends upon the quality of your thoughts.";
        let lines = wrap_text(quote, 30);
        assert_eq!(
            lines,
            vec![
                "The happiness of your life",
                "depends upon the quality of",
                "your thoughts.",
            ]
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(wrap_text("  a \n\t b  ", 30), vec!["a b"]);
    }

    #[test]
    fn test_exact_fit() {
        assert_eq!(wrap_text("abc def", 7), vec!["abc def"]);
        assert_eq!(wrap_text("abc defg", 7), vec!["abc", "defg"]);
    }

    #[test]
    fn test_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("xy abcdefghij", 5), vec!["xy ab", "cdefg", "hij"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let lines = wrap_text("ééééé ééééé", 5);
        assert_eq!(lines, vec!["ééééé", "ééééé"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(wrap_text("   ", 30).is_empty());
    }
}
