//! CommonMark → Telegram MarkdownV2 conversion.
//!
//! Walks `pulldown-cmark` events and re-emits them with Telegram's entity syntax:
//! headings and strong text become `*bold*`, emphasis `_italic_`, strikethrough `~…~`,
//! lists become `•` / `N\.` lines and block quotes `>`-prefixed lines. All literal text is
//! escaped, so the output is always accepted by the MarkdownV2 parser.

use crate::escape::{escape_code, escape_link_url, escape_markdown_v2};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("markdown conversion failed: {0}")]
    Conversion(String),
}

#[derive(Debug)]
enum Frame {
    Paragraph,
    Heading,
    BlockQuote,
    CodeBlock,
    List,
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Other,
}

struct Renderer {
    /// One buffer per open block quote; index 0 is the document.
    buffers: Vec<String>,
    frames: Vec<Frame>,
    /// Next number and delimiter (`.` or `)`) for ordered lists, `None` for bullet lists.
    lists: Vec<Option<(u64, char)>>,
    /// Delimiter of the ordered list about to start, read from the source text.
    pending_delimiter: char,
    bold_depth: usize,
    italic_depth: usize,
    strike_depth: usize,
    in_code_block: bool,
    /// Set right after a list marker so the item's first block stays on the marker line.
    item_fresh: bool,
    /// The last thing written closed an italic span.
    italic_closed: bool,
}

impl Renderer {
    fn new() -> Self {
        Self {
            buffers: vec![String::new()],
            frames: Vec::new(),
            lists: Vec::new(),
            pending_delimiter: '.',
            bold_depth: 0,
            italic_depth: 0,
            strike_depth: 0,
            in_code_block: false,
            item_fresh: false,
            italic_closed: false,
        }
    }

    fn out(&mut self) -> &mut String {
        // buffers is never empty: index 0 is only popped in finish().
        let last = self.buffers.len() - 1;
        &mut self.buffers[last]
    }

    fn push(&mut self, s: &str) {
        self.item_fresh = false;
        self.italic_closed = false;
        self.out().push_str(s);
    }

    fn in_item(&self) -> bool {
        self.frames.iter().any(|f| matches!(f, Frame::Item))
    }

    /// Ends the current line and pads to `n` trailing newlines, unless nothing was written yet.
    fn ensure_newlines(&mut self, n: usize) {
        if self.item_fresh {
            return;
        }
        let out = self.out();
        if out.is_empty() {
            return;
        }
        let trailing = out.chars().rev().take_while(|c| *c == '\n').count();
        for _ in trailing..n {
            out.push('\n');
        }
    }

    fn block_gap(&self) -> usize {
        if self.in_item() {
            1
        } else {
            2
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => {
                let gap = self.block_gap();
                self.ensure_newlines(gap);
                Frame::Paragraph
            }
            Tag::Heading { .. } => {
                self.ensure_newlines(2);
                self.open_bold();
                Frame::Heading
            }
            Tag::BlockQuote(_) => {
                let gap = self.block_gap();
                self.ensure_newlines(gap);
                self.buffers.push(String::new());
                Frame::BlockQuote
            }
            Tag::CodeBlock(kind) => {
                let gap = self.block_gap();
                self.ensure_newlines(gap);
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(escape_code)
                        .unwrap_or_default(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.push("```");
                self.push(&lang);
                self.push("\n");
                self.in_code_block = true;
                Frame::CodeBlock
            }
            Tag::List(start) => {
                let gap = self.block_gap();
                self.ensure_newlines(gap);
                let delimiter = std::mem::replace(&mut self.pending_delimiter, '.');
                self.lists.push(start.map(|n| (n, delimiter)));
                Frame::List
            }
            Tag::Item => {
                self.ensure_newlines(1);
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some((n, delimiter))) => {
                        let marker = format!("{n}\\{delimiter} ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.push(&indent);
                self.push(&marker);
                self.item_fresh = true;
                Frame::Item
            }
            Tag::Emphasis => {
                if self.italic_depth == 0 {
                    // `__` would open an underline; `\r` separates adjacent italic spans.
                    if self.italic_closed && self.out().ends_with('_') {
                        self.push("\r");
                    }
                    self.push("_");
                }
                self.italic_depth += 1;
                Frame::Emphasis
            }
            Tag::Strong => {
                self.open_bold();
                Frame::Strong
            }
            Tag::Strikethrough => {
                if self.strike_depth == 0 {
                    self.push("~");
                }
                self.strike_depth += 1;
                Frame::Strikethrough
            }
            Tag::Link { dest_url, .. } => {
                self.push("[");
                Frame::Link(dest_url.to_string())
            }
            _ => Frame::Other,
        };
        self.frames.push(frame);
    }

    fn end(&mut self) -> Result<(), FormatError> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| FormatError::Conversion("end tag without a matching start".into()))?;
        match frame {
            Frame::List => {
                self.lists.pop();
            }
            Frame::Paragraph | Frame::Item | Frame::Other => {}
            Frame::Heading | Frame::Strong => self.close_bold(),
            Frame::Emphasis => {
                self.italic_depth = self.italic_depth.saturating_sub(1);
                if self.italic_depth == 0 {
                    self.push("_");
                    self.italic_closed = true;
                }
            }
            Frame::Strikethrough => {
                self.strike_depth = self.strike_depth.saturating_sub(1);
                if self.strike_depth == 0 {
                    self.push("~");
                }
            }
            Frame::CodeBlock => {
                self.ensure_newlines(1);
                self.push("```");
                self.in_code_block = false;
            }
            Frame::Link(dest) => {
                self.push("](");
                self.push(&escape_link_url(&dest));
                self.push(")");
            }
            Frame::BlockQuote => {
                if self.buffers.len() < 2 {
                    return Err(FormatError::Conversion("block quote buffer missing".into()));
                }
                let inner = self.buffers.pop().unwrap_or_default();
                let quoted = inner
                    .trim_end()
                    .lines()
                    .map(|line| format!(">{line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.push(&quoted);
            }
        }
        Ok(())
    }

    fn open_bold(&mut self) {
        if self.bold_depth == 0 {
            self.push("*");
        }
        self.bold_depth += 1;
    }

    fn close_bold(&mut self) {
        self.bold_depth = self.bold_depth.saturating_sub(1);
        if self.bold_depth == 0 {
            self.push("*");
        }
    }

    fn text(&mut self, text: &str) {
        let escaped = if self.in_code_block {
            escape_code(text)
        } else {
            escape_markdown_v2(text)
        };
        self.push(&escaped);
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), FormatError> {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end()?,
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.text(&text),
            Event::Code(code) => {
                self.push("`");
                self.push(&escape_code(&code));
                self.push("`");
            }
            Event::SoftBreak | Event::HardBreak => self.push("\n"),
            Event::Rule => {
                self.ensure_newlines(2);
                self.push("———");
            }
            Event::TaskListMarker(checked) => self.push(if checked { "☑ " } else { "☐ " }),
            Event::FootnoteReference(label) => self.text(&format!("[{label}]")),
            _ => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<String, FormatError> {
        if !self.frames.is_empty() || self.buffers.len() != 1 {
            return Err(FormatError::Conversion(format!(
                "{} unclosed block(s) at end of input",
                self.frames.len()
            )));
        }
        let out = self.buffers.pop().unwrap_or_default();
        Ok(out.trim().to_string())
    }
}

/// `)` for `1)`-style markers, otherwise `.`.
fn ordered_delimiter(source: &str) -> char {
    let after_number = source
        .trim_start()
        .trim_start_matches(|c: char| c.is_ascii_digit());
    if after_number.starts_with(')') {
        ')'
    } else {
        '.'
    }
}

/// Converts CommonMark text (strikethrough and task lists enabled) into MarkdownV2.
pub fn markdown_to_markdown_v2(text: &str) -> Result<String, FormatError> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::new();
    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        if let Event::Start(Tag::List(Some(_))) = &event {
            renderer.pending_delimiter = ordered_delimiter(&text[range.start..]);
        }
        renderer.event(event)?;
    }
    renderer.finish()
}
