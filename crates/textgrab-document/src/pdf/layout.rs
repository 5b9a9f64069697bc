// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line wrapping shared by the PDF generators.

/// Wrap text so no line exceeds `max_width` characters.
///
/// Existing newlines are kept; words are packed greedily and words longer
/// than a line are broken on character boundaries.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut pieces = chars.chunks(max_width).peekable();
                while let Some(piece) = pieces.next() {
                    if pieces.peek().is_some() {
                        result.push(piece.iter().collect());
                    } else {
                        current = piece.iter().collect();
                        current_len = piece.len();
                    }
                }
            } else if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::replace(&mut current, word.to_string()));
                current_len = word_len;
            }
        }
        result.push(current);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn keeps_blank_lines() {
        let lines = wrap_text("one\n\ntwo", 20);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn breaks_long_words_on_char_boundaries() {
        let lines = wrap_text("ééééééé", 3);
        assert_eq!(lines, vec!["ééé", "ééé", "é"]);
    }

    #[test]
    fn long_word_tail_joins_next_word() {
        let lines = wrap_text("abcdefg hi", 5);
        assert_eq!(lines, vec!["abcde", "fg hi"]);
    }
}
