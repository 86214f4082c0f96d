use std::mem;
use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};
use serde::Deserialize;

use crate::block::{BlockToken, InlineToken, ListItem};
use crate::error::ParseError;

/// Markdown dialect settings, fixed when the lexer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LexerOptions {
    /// Tables, strikethrough, task lists and footnotes
    pub gfm: bool,
    /// Soft line breaks become hard breaks
    pub breaks: bool,
    /// Drop a leading YAML frontmatter block
    pub strip_frontmatter: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            strip_frontmatter: false,
        }
    }
}

/// Turns markdown text into block tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexer {
    options: LexerOptions,
}

impl Lexer {
    pub fn new(options: LexerOptions) -> Self {
        Self { options }
    }

    pub fn lex(&self, markdown: &str) -> Result<Vec<BlockToken>, ParseError> {
        if markdown.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let source = if self.options.strip_frontmatter {
            strip_frontmatter(markdown)
        } else {
            markdown
        };

        let mut parser_options = Options::empty();
        if self.options.gfm {
            parser_options.insert(Options::ENABLE_TABLES);
            parser_options.insert(Options::ENABLE_STRIKETHROUGH);
            parser_options.insert(Options::ENABLE_TASKLISTS);
            parser_options.insert(Options::ENABLE_FOOTNOTES);
        }

        let mut state = LexState::new(source, self.options);
        for (event, range) in Parser::new_ext(source, parser_options).into_offset_iter() {
            state.process(event, range);
        }
        Ok(state.blocks)
    }
}

/// Strip YAML frontmatter from the beginning of markdown content
fn strip_frontmatter(markdown: &str) -> &str {
    let Some(rest) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return markdown;
    };
    // The closing fence must sit on its own line
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == "---" {
            return rest[offset..].trim_start_matches(['\r', '\n']);
        }
    }
    markdown
}

/// Block or inline element whose start event has been seen but not its end.
enum Open {
    Paragraph,
    Heading(u8),
    CodeBlock,
    List,
    Item,
    Quote,
    /// Block kinds passed through as raw source text
    Opaque { start: usize },
    Inline {
        kind: InlineKind,
        parent: Vec<InlineToken>,
    },
}

enum InlineKind {
    Strong,
    Emphasis,
    Strikethrough,
    Link(String),
    Image,
    Other,
}

/// Containers fold nested block content into inline sequences.
enum Container {
    List {
        ordered: bool,
        items: Vec<ListItem>,
        current: Vec<InlineToken>,
    },
    Quote(Vec<InlineToken>),
}

struct LexState<'a> {
    source: &'a str,
    options: LexerOptions,
    blocks: Vec<BlockToken>,
    open: Vec<Open>,
    containers: Vec<Container>,
    // Inline content of the innermost open element
    inline: Vec<InlineToken>,
    code: String,
    // Nesting depth inside an opaque block, whose events are skipped
    opaque_depth: usize,
    // End offset of the previous top-level block
    last_end: Option<usize>,
}

impl<'a> LexState<'a> {
    fn new(source: &'a str, options: LexerOptions) -> Self {
        Self {
            source,
            options,
            blocks: Vec::new(),
            open: Vec::new(),
            containers: Vec::new(),
            inline: Vec::new(),
            code: String::new(),
            opaque_depth: 0,
            last_end: None,
        }
    }

    fn process(&mut self, event: Event<'_>, range: Range<usize>) {
        if self.opaque_depth > 0 {
            match event {
                Event::Start(_) => self.opaque_depth += 1,
                Event::End(_) => self.end(range),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => self.end(range),

            Event::Text(text) => {
                if matches!(self.open.last(), Some(Open::CodeBlock)) {
                    self.code.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => self.inline.push(InlineToken::CodeSpan {
                text: code.into_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.inline.push(InlineToken::Unrecognized {
                    text: Some(html.into_string()),
                    children: None,
                })
            }
            Event::FootnoteReference(label) => self.inline.push(InlineToken::Unrecognized {
                text: Some(format!("[^{label}]")),
                children: None,
            }),

            Event::SoftBreak => {
                if self.options.breaks {
                    self.inline.push(InlineToken::LineBreak);
                } else {
                    self.push_text(" ");
                }
            }
            Event::HardBreak => self.inline.push(InlineToken::LineBreak),

            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }

            // Horizontal rules nested in lists or quotes have no inline form
            Event::Rule => {
                if self.open.is_empty() {
                    self.note_block_start(range.start);
                    self.blocks.push(BlockToken::ThematicBreak);
                    self.last_end = Some(range.end);
                }
            }

            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        if self.open.is_empty() {
            self.note_block_start(range.start);
        }

        let frame = match tag {
            Tag::Paragraph => {
                self.flush_into_container();
                Open::Paragraph
            }
            Tag::Heading { level, .. } => {
                self.flush_into_container();
                Open::Heading(heading_depth(level))
            }
            Tag::CodeBlock(_) => {
                self.flush_into_container();
                self.code.clear();
                Open::CodeBlock
            }
            Tag::List(first_number) => {
                self.flush_into_container();
                self.containers.push(Container::List {
                    ordered: first_number.is_some(),
                    items: Vec::new(),
                    current: Vec::new(),
                });
                Open::List
            }
            Tag::Item => Open::Item,
            Tag::BlockQuote(_) => {
                self.flush_into_container();
                self.containers.push(Container::Quote(Vec::new()));
                Open::Quote
            }
            Tag::HtmlBlock | Tag::Table(_) | Tag::FootnoteDefinition(_) => {
                self.flush_into_container();
                self.opaque_depth = 1;
                Open::Opaque { start: range.start }
            }

            Tag::Strong => self.open_inline(InlineKind::Strong),
            Tag::Emphasis => self.open_inline(InlineKind::Emphasis),
            Tag::Strikethrough => self.open_inline(InlineKind::Strikethrough),
            Tag::Link { dest_url, .. } => self.open_inline(InlineKind::Link(dest_url.into_string())),
            Tag::Image { .. } => self.open_inline(InlineKind::Image),
            _ => self.open_inline(InlineKind::Other),
        };
        self.open.push(frame);
    }

    fn end(&mut self, range: Range<usize>) {
        if self.opaque_depth > 1 {
            self.opaque_depth -= 1;
            return;
        }
        self.opaque_depth = 0;

        let Some(frame) = self.open.pop() else {
            return;
        };

        match frame {
            Open::Paragraph => {
                let content = mem::take(&mut self.inline);
                if !self.containers.is_empty() {
                    self.append_nested(content);
                } else if !content.is_empty() {
                    self.blocks.push(BlockToken::Paragraph { inline: content });
                }
            }
            Open::Heading(depth) => {
                let content = mem::take(&mut self.inline);
                if self.containers.is_empty() {
                    self.blocks.push(BlockToken::Heading {
                        depth,
                        inline: content,
                    });
                } else {
                    self.append_nested(vec![InlineToken::Strong { children: content }]);
                }
            }
            Open::CodeBlock => {
                let mut literal_text = mem::take(&mut self.code);
                if literal_text.ends_with('\n') {
                    literal_text.pop();
                }
                if self.containers.is_empty() {
                    self.blocks.push(BlockToken::CodeBlock { literal_text });
                } else {
                    self.append_nested(vec![InlineToken::CodeSpan { text: literal_text }]);
                }
            }
            Open::Item => {
                let remaining = mem::take(&mut self.inline);
                if let Some(Container::List { items, current, .. }) = self.containers.last_mut() {
                    extend_with_break(current, remaining);
                    items.push(ListItem {
                        inline: mem::take(current),
                    });
                }
            }
            Open::List => {
                if let Some(Container::List { ordered, items, .. }) = self.containers.pop() {
                    if self.containers.is_empty() {
                        self.blocks.push(BlockToken::List { ordered, items });
                    } else {
                        for item in items {
                            self.append_nested(item.inline);
                        }
                    }
                }
            }
            Open::Quote => {
                if let Some(Container::Quote(content)) = self.containers.pop() {
                    if !self.containers.is_empty() {
                        self.append_nested(content);
                    } else if !content.is_empty() {
                        self.blocks.push(BlockToken::Blockquote { inline: content });
                    }
                }
            }
            Open::Opaque { start } => {
                let raw = &self.source[start..range.end.max(start)];
                if self.containers.is_empty() {
                    self.blocks.push(BlockToken::Unrecognized {
                        raw_text: raw.to_string(),
                    });
                } else {
                    self.append_nested(vec![InlineToken::Unrecognized {
                        text: Some(raw.trim().to_string()),
                        children: None,
                    }]);
                }
            }
            Open::Inline { kind, parent } => {
                let children = mem::replace(&mut self.inline, parent);
                self.inline.push(close_inline(kind, children));
            }
        }

        if self.open.is_empty() {
            self.last_end = Some(range.end);
        }
    }

    fn open_inline(&mut self, kind: InlineKind) -> Open {
        Open::Inline {
            kind,
            parent: mem::take(&mut self.inline),
        }
    }

    /// Emit a `Blank` token when a blank line separates this block from the previous one.
    fn note_block_start(&mut self, start: usize) {
        let Some(end) = self.last_end else {
            return;
        };
        let gap_start = self.source[..end.min(start)].trim_end().len();
        let newlines = self.source[gap_start..start].matches('\n').count();
        if newlines >= 2 {
            self.blocks.push(BlockToken::Blank);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(InlineToken::PlainText { text: last }) = self.inline.last_mut() {
            last.push_str(text);
        } else {
            self.inline.push(InlineToken::text(text));
        }
    }

    /// Tight list items carry text without a paragraph; move it into the item
    /// before a nested block starts.
    fn flush_into_container(&mut self) {
        if !self.inline.is_empty() && !self.containers.is_empty() {
            let pending = mem::take(&mut self.inline);
            self.append_nested(pending);
        }
    }

    fn append_nested(&mut self, content: Vec<InlineToken>) {
        match self.containers.last_mut() {
            Some(Container::List { current, .. }) => extend_with_break(current, content),
            Some(Container::Quote(buffer)) => extend_with_break(buffer, content),
            None => {}
        }
    }
}

fn extend_with_break(target: &mut Vec<InlineToken>, content: Vec<InlineToken>) {
    if content.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(InlineToken::LineBreak);
    }
    target.extend(content);
}

fn close_inline(kind: InlineKind, children: Vec<InlineToken>) -> InlineToken {
    match kind {
        InlineKind::Strong => InlineToken::Strong { children },
        InlineKind::Emphasis => InlineToken::Emphasis { children },
        InlineKind::Strikethrough => InlineToken::Strikethrough { children },
        InlineKind::Link(href) => InlineToken::Link {
            display_text: children.iter().map(InlineToken::plain_text).collect(),
            href,
        },
        InlineKind::Image => {
            let alt: String = children.iter().map(InlineToken::plain_text).collect();
            InlineToken::Unrecognized {
                text: (!alt.is_empty()).then_some(alt),
                children: None,
            }
        }
        InlineKind::Other => InlineToken::Unrecognized {
            text: None,
            children: Some(children),
        },
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
