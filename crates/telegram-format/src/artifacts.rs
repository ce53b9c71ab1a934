//! Cleanup of formatting placeholders that the backend model sometimes leaks into its output.
//!
//! Markers come in a delimited form (`@@BOPEN@@ … @@BCLOSE@@`) and a bare form
//! (`BOPEN … BCLOSE`), for bold (`B`) and italic (`I`).

use regex::Regex;
use std::sync::LazyLock;

/// Matched open…close pairs, most specific first. Non-greedy, `.` spans newlines.
static PAIR_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?s)@@BOPEN@@\s*(.*?)\s*@@BCLOSE@@", "**${1}**"),
        (r"(?s)BOPEN\s*(.*?)\s*BCLOSE", "**${1}**"),
        (r"(?s)@@IOPEN@@\s*(.*?)\s*@@ICLOSE@@", "*${1}*"),
        (r"(?s)IOPEN\s*(.*?)\s*ICLOSE", "*${1}*"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("static pattern"), replacement))
    .collect()
});

/// Unpaired markers, delimited form before bare form.
const SINGLE_REPLACEMENTS: [(&str, &str); 8] = [
    ("@@BOPEN@@", "**"),
    ("@@BCLOSE@@", "**"),
    ("BOPEN", "**"),
    ("BCLOSE", "**"),
    ("@@IOPEN@@", "*"),
    ("@@ICLOSE@@", "*"),
    ("IOPEN", "*"),
    ("ICLOSE", "*"),
];

static RESIDUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@{0,2}(?:BOPEN|BCLOSE|IOPEN|ICLOSE)@{0,2}").expect("static pattern")
});

/// True if any marker token (either form) is present.
pub fn contains_artifact(text: &str) -> bool {
    RESIDUE.is_match(text)
}

/// Replaces paired markers with `**…**` / `*…*`, then unpaired markers with the bare wrapper,
/// then strips anything left. Idempotent; never leaves a marker token behind.
pub fn sanitize_llm_artifacts(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if !contains_artifact(text) {
        return text.to_string();
    }

    let mut sanitized = text.to_string();
    for (pattern, replacement) in PAIR_PATTERNS.iter() {
        sanitized = pattern.replace_all(&sanitized, *replacement).into_owned();
    }
    for (token, replacement) in SINGLE_REPLACEMENTS {
        sanitized = sanitized.replace(token, replacement);
    }
    RESIDUE.replace_all(&sanitized, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_pair_becomes_bold() {
        assert_eq!(
            sanitize_llm_artifacts("4. @@BOPEN@@текст@@BCLOSE@@:"),
            "4. **текст**:"
        );
    }

    #[test]
    fn test_bare_pair_trims_inner_whitespace() {
        assert_eq!(
            sanitize_llm_artifacts("BOPEN Институты НГУ: BCLOSE"),
            "**Институты НГУ:**"
        );
    }

    #[test]
    fn test_italic_pair_spans_newlines() {
        assert_eq!(sanitize_llm_artifacts("IOPEN a\nb ICLOSE"), "*a\nb*");
    }

    #[test]
    fn test_unpaired_markers_become_wrappers() {
        assert_eq!(sanitize_llm_artifacts("x @@BOPEN@@ y"), "x ** y");
        assert_eq!(sanitize_llm_artifacts("ICLOSE tail"), "* tail");
    }

    #[test]
    fn test_clean_text_untouched() {
        assert_eq!(sanitize_llm_artifacts("plain **md**"), "plain **md**");
        assert_eq!(sanitize_llm_artifacts(""), "");
    }
}
