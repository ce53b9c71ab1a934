//! # Telegram format
//!
//! Pure text transforms from model output to Telegram MarkdownV2. No I/O.
//!
//! ## Entry points
//!
//! - [`sanitize_llm_artifacts`]: replaces leaked `BOPEN`/`BCLOSE`/`IOPEN`/`ICLOSE` placeholders.
//! - [`escape_markdown_v2`]: backslash-escapes every MarkdownV2 reserved character.
//! - [`render_stream_chunk`]: sanitize + escape; used while a reply is still growing, so a half
//!   written `**bold` can never break the edit.
//! - [`render_final_message`]: sanitize + full Markdown conversion (headings, bold, italic, code,
//!   links, lists, quotes); falls back to [`render_stream_chunk`] output on conversion failure.

mod artifacts;
mod convert;
mod escape;

pub use artifacts::{contains_artifact, sanitize_llm_artifacts};
pub use convert::{markdown_to_markdown_v2, FormatError};
pub use escape::{escape_code, escape_link_url, escape_markdown_v2, is_reserved, RESERVED_CHARS};

use tracing::warn;

/// Safe formatter for streaming chunks: no Markdown conversion, only artifact cleanup and escaping.
pub fn render_stream_chunk(text: &str) -> String {
    escape_markdown_v2(&sanitize_llm_artifacts(text))
}

/// Converts a complete answer to MarkdownV2.
///
/// Falls back to escaped plain text when conversion fails or yields nothing for non-blank input.
pub fn render_final_message(text: &str) -> String {
    let sanitized = sanitize_llm_artifacts(text);
    match markdown_to_markdown_v2(&sanitized) {
        Ok(converted) if !converted.trim().is_empty() || sanitized.trim().is_empty() => converted,
        Ok(_) => escape_markdown_v2(&sanitized),
        Err(e) => {
            warn!(error = %e, len = sanitized.len(), "Markdown conversion failed; using escaped text");
            escape_markdown_v2(&sanitized)
        }
    }
}
