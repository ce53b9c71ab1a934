//! MarkdownV2 escaping rules (<https://core.telegram.org/bots/api#markdownv2-style>).

/// Characters that must be backslash-escaped anywhere outside code entities.
pub const RESERVED_CHARS: &str = "_*[]()~`>#+-=|{}.!\\";

pub fn is_reserved(c: char) -> bool {
    RESERVED_CHARS.contains(c)
}

fn escape_with(text: &str, needs_escape: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes every reserved character with a preceding backslash. Empty input yields empty output.
pub fn escape_markdown_v2(text: &str) -> String {
    escape_with(text, is_reserved)
}

/// Escaping inside `code` and ```pre``` entities: only backtick and backslash.
pub fn escape_code(text: &str) -> String {
    escape_with(text, |c| c == '`' || c == '\\')
}

/// Escaping inside the `(...)` part of an inline link: only `)` and backslash.
pub fn escape_link_url(url: &str) -> String {
    escape_with(url, |c| c == ')' || c == '\\')
}
