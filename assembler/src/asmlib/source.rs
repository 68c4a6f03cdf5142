//! Normalization of assembly source.
use tracing::{event, Level};

use super::lexer::rx::WHITESPACE;

pub(crate) const COMMENT_CHAR: char = ';';

fn strip_comment(line: &str) -> &str {
    match line.split_once(COMMENT_CHAR) {
        Some((code, _comment)) => code,
        None => line,
    }
}

/// Remove comments, then join all the lines into one, with each run
/// of whitespace replaced by a single space.
pub(crate) fn normalize(raw: &str) -> String {
    let joined: Vec<&str> = raw
        .lines()
        .map(|line| strip_comment(line).trim())
        .filter(|line| !line.is_empty())
        .collect();
    let result = WHITESPACE.replace_all(&joined.join(" "), " ").into_owned();
    event!(
        Level::DEBUG,
        "normalized {} lines of source into {} characters",
        raw.lines().count(),
        result.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn comments_are_removed() {
        assert_eq!(
            normalize("; heading\nHALT ; stop here\n;\n"),
            "HALT".to_string()
        );
    }

    #[test]
    fn lines_are_joined_and_whitespace_collapsed() {
        assert_eq!(
            normalize("  section text:\n\tADD   r1,\t r2, r3  \n\n HALT"),
            "section text: ADD r1, r2, r3 HALT".to_string()
        );
    }

    #[test]
    fn empty_source() {
        assert_eq!(normalize(""), String::new());
        assert_eq!(normalize("; nothing but a comment"), String::new());
    }
}
