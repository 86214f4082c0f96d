/// Inline tokens nested inside a block's text content
#[derive(Debug, Clone, PartialEq)]
pub enum InlineToken {
    PlainText {
        text: String,
    },
    Strong {
        children: Vec<InlineToken>,
    },
    Emphasis {
        children: Vec<InlineToken>,
    },
    Strikethrough {
        children: Vec<InlineToken>,
    },
    CodeSpan {
        text: String,
    },
    Link {
        display_text: String,
        href: String,
    },
    LineBreak,
    /// Anything the lexer produced that has no dedicated variant.
    /// Carries either literal text, child tokens, or nothing at all.
    Unrecognized {
        text: Option<String>,
        children: Option<Vec<InlineToken>>,
    },
}

impl InlineToken {
    pub fn text(text: impl Into<String>) -> Self {
        InlineToken::PlainText { text: text.into() }
    }

    /// Concatenated literal text of this token and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            InlineToken::PlainText { text } | InlineToken::CodeSpan { text } => out.push_str(text),
            InlineToken::Link { display_text, .. } => out.push_str(display_text),
            InlineToken::LineBreak => out.push('\n'),
            InlineToken::Strong { children }
            | InlineToken::Emphasis { children }
            | InlineToken::Strikethrough { children } => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
            InlineToken::Unrecognized { text, children } => match (text, children) {
                (Some(text), _) if !text.is_empty() => out.push_str(text),
                (_, Some(children)) => {
                    for child in children {
                        child.push_plain_text(out);
                    }
                }
                _ => {}
            },
        }
    }
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub inline: Vec<InlineToken>,
}

/// Block-level tokens lexed from markdown
#[derive(Debug, Clone, PartialEq)]
pub enum BlockToken {
    Heading {
        depth: u8,
        inline: Vec<InlineToken>,
    },
    Paragraph {
        inline: Vec<InlineToken>,
    },
    CodeBlock {
        literal_text: String,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Blockquote {
        inline: Vec<InlineToken>,
    },
    ThematicBreak,
    /// One or more blank lines between blocks
    Blank,
    Unrecognized {
        raw_text: String,
    },
}
