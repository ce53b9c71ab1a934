//! Rendering tests for streaming chunks and final messages.

use telegram_format::{
    contains_artifact, escape_markdown_v2, is_reserved, render_final_message, render_stream_chunk,
    sanitize_llm_artifacts,
};

/// True if some reserved character is not preceded by an escaping backslash.
fn has_unescaped_reserved(text: &str) -> bool {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.next().is_none() {
                return true;
            }
            continue;
        }
        if is_reserved(c) {
            return true;
        }
    }
    false
}

/// **Test: Heading converts to bold**
///
/// **Setup:** A single-level Markdown heading.
/// **Action:** render_final_message.
/// **Expected:** The heading text is wrapped in single asterisks.
#[test]
fn test_final_heading_becomes_bold() {
    let result = render_final_message("# Заголовок");
    assert!(result.contains("*Заголовок*"), "got: {result}");
}

/// **Test: Double-asterisk bold converts to MarkdownV2 bold**
#[test]
fn test_final_double_asterisk_bold() {
    let result = render_final_message("**bold**");
    assert!(result.contains("*bold*"));
    assert!(!result.contains("**"));
}

/// **Test: Both italic spellings end up as underscores**
#[test]
fn test_final_italic_variants() {
    assert_eq!(render_final_message("*italic*"), "_italic_");
    assert_eq!(render_final_message("_italic_"), "_italic_");
}

/// **Test: Leaked placeholders inside a numbered item become bold**
///
/// **Setup:** "4. @@BOPEN@@текст@@BCLOSE@@:" as the model sometimes emits.
/// **Expected:** Bold "текст", no placeholder token left.
#[test]
fn test_final_sanitizes_artifacts() {
    let result = render_final_message("4. @@BOPEN@@текст@@BCLOSE@@:");
    assert!(result.contains("*текст*"), "got: {result}");
    assert!(!contains_artifact(&result));
}

/// **Test: Streaming chunk escapes converted artifacts instead of formatting them**
#[test]
fn test_stream_chunk_escapes_bold_markers() {
    let result = render_stream_chunk("BOPEN Институты НГУ: BCLOSE");
    assert!(result.contains("\\*\\*Институты НГУ:\\*\\*"), "got: {result}");
    assert!(!contains_artifact(&result));
}

/// **Test: Punctuation in a streaming chunk is escaped**
#[test]
fn test_stream_chunk_escapes_punctuation() {
    let result = render_stream_chunk(". ! ( ) [ ]");
    assert_eq!(result, "\\. \\! \\( \\) \\[ \\]");
}

/// **Test: Unfinished Markdown mid-stream is still safe to send**
#[test]
fn test_stream_chunk_never_leaves_reserved_chars_unescaped() {
    let partials = [
        "**half bold",
        "list:\n1. one\n2. tw",
        "see [link](http://x.org/a_b",
        "`code",
        "a > b = c | d {e} #f +g -h ~i !j \\k",
        "",
    ];
    for partial in partials {
        let rendered = render_stream_chunk(partial);
        assert!(!has_unescaped_reserved(&rendered), "unescaped in {rendered:?}");
    }
}

/// **Test: Plain answer passes through the final renderer unchanged**
#[test]
fn test_final_plain_text() {
    assert_eq!(render_final_message("Hello  world"), "Hello  world");
}

/// **Test: Final renderer escapes literal punctuation**
#[test]
fn test_final_escapes_literal_punctuation() {
    assert_eq!(render_final_message("Done. Really!"), "Done\\. Really\\!");
}

/// **Test: Sanitization is idempotent**
#[test]
fn test_sanitize_idempotent() {
    let inputs = [
        "BOPEN a BCLOSE and IOPEN b ICLOSE",
        "@@BOPEN@@x",
        "@BOPEN@ stray @@ICLOSE",
        "nothing here",
    ];
    for input in inputs {
        let once = sanitize_llm_artifacts(input);
        assert_eq!(sanitize_llm_artifacts(&once), once);
        assert!(!contains_artifact(&once), "token left in {once:?}");
    }
}

#[test]
fn test_escape_markdown_v2_empty() {
    assert_eq!(escape_markdown_v2(""), "");
    assert_eq!(render_stream_chunk(""), "");
    assert_eq!(render_final_message(""), "");
}

/// **Test: Bold and italic sharing a delimiter character are told apart**
///
/// **Setup:** `__b__`, `*i*` and `**c**` in one answer.
/// **Expected:** Both bold spellings become `*…*`, the italic becomes `_…_`.
#[test]
fn test_final_mixed_bold_and_italic_delimiters() {
    assert_eq!(
        render_final_message("__b__ and *i* and **c**"),
        "*b* and _i_ and *c*"
    );
    assert_eq!(render_final_message("_i_ then __b__"), "_i_ then *b*");
}

/// **Test: Adjacent italic spans never form an underline marker**
#[test]
fn test_final_adjacent_italics_not_underline() {
    let out = render_final_message("*a*_b_");
    assert_eq!(out, "_a_\r_b_");
    assert!(!out.contains("__"));
}

/// **Test: Parenthesis-style numbered list keeps its delimiter**
#[test]
fn test_final_ordered_list_paren_delimiter() {
    assert_eq!(
        render_final_message("1) Приём документов\n2) Экзамены"),
        "1\\) Приём документов\n2\\) Экзамены"
    );
}
