use log::{debug, warn};
use serde::Deserialize;

use crate::block::{BlockToken, ListItem};
use crate::inline::resolve_inline;
use crate::model::{DocumentDefinition, DocumentNode, Line, Margin, Run};
use crate::style::StyleName;

pub const PARAGRAPH_MARGIN: Margin = Margin::new(0.0, 0.0, 0.0, 10.0);
pub const CODE_BLOCK_MARGIN: Margin = Margin::new(0.0, 5.0, 0.0, 10.0);
pub const BLOCKQUOTE_MARGIN: Margin = Margin::new(10.0, 5.0, 0.0, 5.0);
pub const RULE_MARGIN: Margin = Margin::new(0.0, 10.0, 0.0, 10.0);
/// Applied by the renderer around every list item.
pub const LIST_ITEM_MARGIN: Margin = Margin::new(0.0, 2.0, 0.0, 2.0);

pub const RULE_LINE: Line = Line {
    x1: 0.0,
    y1: 5.0,
    x2: 515.0,
    y2: 5.0,
};
pub const RULE_LINE_WIDTH: f64 = 0.5;
pub const RULE_COLOR: &str = "#cccccc";

/// What to do with block tokens the engine has no layout for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedPolicy {
    /// Emit nothing; non-blank content is reported through `warn!`.
    #[default]
    Drop,
    /// Emit the raw source text as a body paragraph.
    Passthrough,
}

/// Turns lexed block tokens into document nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer {
    unrecognized: UnrecognizedPolicy,
}

impl Transformer {
    pub fn new(unrecognized: UnrecognizedPolicy) -> Self {
        Self { unrecognized }
    }

    pub fn transform(&self, blocks: &[BlockToken]) -> Vec<DocumentNode> {
        let mut nodes = Vec::with_capacity(blocks.len());
        for block in blocks {
            if let Some(node) = self.transform_block(block) {
                nodes.push(node);
            }
        }
        debug!("transformed {} blocks into {} nodes", blocks.len(), nodes.len());
        nodes
    }

    /// Transform and package with the shared style table and default font.
    pub fn document(&self, blocks: &[BlockToken]) -> DocumentDefinition {
        DocumentDefinition::new(self.transform(blocks))
    }

    fn transform_block(&self, block: &BlockToken) -> Option<DocumentNode> {
        match block {
            BlockToken::Heading { depth, inline } => Some(DocumentNode::TextBlock {
                runs: resolve_inline(inline),
                style: StyleName::for_heading(*depth),
                margin: heading_margin(*depth),
            }),
            BlockToken::Paragraph { inline } => Some(DocumentNode::TextBlock {
                runs: resolve_inline(inline),
                style: StyleName::Body,
                margin: PARAGRAPH_MARGIN,
            }),
            BlockToken::CodeBlock { literal_text } => Some(DocumentNode::TextBlock {
                runs: vec![Run::styled(literal_text.as_str(), StyleName::Code)],
                style: StyleName::Code,
                margin: CODE_BLOCK_MARGIN,
            }),
            BlockToken::List { ordered, items } => Some(DocumentNode::ListBlock {
                ordered: *ordered,
                items: items
                    .iter()
                    .map(|ListItem { inline }| resolve_inline(inline))
                    .collect(),
                margin: list_margin(*ordered),
            }),
            BlockToken::Blockquote { inline } => Some(DocumentNode::TextBlock {
                runs: resolve_inline(inline),
                style: StyleName::Blockquote,
                margin: BLOCKQUOTE_MARGIN,
            }),
            BlockToken::ThematicBreak => Some(DocumentNode::RuleBlock {
                line: RULE_LINE,
                line_width: RULE_LINE_WIDTH,
                color: RULE_COLOR,
                margin: RULE_MARGIN,
            }),
            BlockToken::Blank => None,
            BlockToken::Unrecognized { raw_text } => self.unrecognized_block(raw_text),
        }
    }

    fn unrecognized_block(&self, raw_text: &str) -> Option<DocumentNode> {
        let content = raw_text.trim();
        if content.is_empty() {
            return None;
        }
        match self.unrecognized {
            UnrecognizedPolicy::Drop => {
                warn!(
                    "dropping unrecognized block ({} bytes): {:?}",
                    content.len(),
                    preview(content)
                );
                None
            }
            UnrecognizedPolicy::Passthrough => Some(DocumentNode::TextBlock {
                runs: vec![Run::plain(content)],
                style: StyleName::Body,
                margin: PARAGRAPH_MARGIN,
            }),
        }
    }
}

/// Transform with the default policy.
pub fn transform_document(blocks: &[BlockToken]) -> Vec<DocumentNode> {
    Transformer::default().transform(blocks)
}

fn heading_margin(depth: u8) -> Margin {
    let bottom = match depth {
        0 | 1 => 10.0,
        2 => 8.0,
        _ => 5.0,
    };
    Margin::new(0.0, 5.0, 0.0, bottom)
}

fn list_margin(ordered: bool) -> Margin {
    Margin::new(if ordered { 10.0 } else { 5.0 }, 5.0, 0.0, 10.0)
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
