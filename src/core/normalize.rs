//! Light text normalization for model and tool output.

use std::sync::LazyLock;

use regex::Regex;

/// `<br>`, `<br/>`, `<BR />` and friends.
static BR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap_or_else(|_| unreachable!("static pattern"))
});

/// Three or more consecutive newlines.
static MULTIBLANK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap_or_else(|_| unreachable!("static pattern")));

/// Canonicalizes raw text.
///
/// Line-break markup becomes `\n`, every line-ending style becomes `\n`,
/// each line is right-trimmed, runs of three or more newlines collapse to
/// exactly two, and the result is trimmed. Total on all inputs; the empty
/// string maps to itself.
///
/// The pass is repeated until it reaches a fixed point, so
/// `normalize(&normalize(s)) == normalize(s)` holds even for inputs where
/// one rewrite exposes another (e.g. `<<br>br>`).
pub fn normalize(text: &str) -> String {
    let mut current = pass(text);
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn pass(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let s = BR_RE.replace_all(text, "\n");
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s = s.split('\n').map(str::trim_end).collect::<Vec<_>>().join("\n");
    let s = MULTIBLANK_RE.replace_all(&s, "\n\n");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", ""; "empty")]
    #[test_case("   \n\t ", ""; "whitespace only")]
    #[test_case("Paris is the capital of France.", "Paris is the capital of France."; "plain")]
    #[test_case("a<br>b<BR/>c< br / >d", "a\nb\nc\nd"; "br markup")]
    #[test_case("a\r\nb\rc", "a\nb\nc"; "line endings")]
    #[test_case("a\n\n\n\n\nb", "a\n\nb"; "collapse blank lines")]
    #[test_case("a   \nb\t\n", "a\nb"; "right trim lines")]
    #[test_case("  lead\n  indented", "lead\n  indented"; "keeps inner indentation")]
    fn test_normalize(input: &str, expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_whitespace_lines_do_not_reopen_blank_runs() {
        // Whitespace-only lines between blank lines must not leave 3+ newlines behind.
        let out = normalize("a\n\n  \n\nb");
        assert_eq!(out, "a\n\nb");
        assert_eq!(normalize(&out), out);
    }

    #[test]
    fn test_nested_br_reaches_fixed_point() {
        let out = normalize("x<<br>br>y");
        assert_eq!(out, "x\ny");
        assert_eq!(normalize(&out), out);
    }
}
