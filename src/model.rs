//! The document model handed to a renderer.

use serde::Serialize;

use crate::style::{DEFAULT_FONT, STYLE_TABLE, StyleName, StyleTable};

/// Spacing around a node in points, `(left, top, right, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl Serialize for Margin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.left, self.top, self.right, self.bottom].serialize(serializer)
    }
}

/// A leaf piece of styled text.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Run {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleName>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(text: impl Into<String>, style: StyleName) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }
}

/// A straight line between two points, relative to the node's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Top-level unit of the document, ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocumentNode {
    TextBlock {
        runs: Vec<Run>,
        style: StyleName,
        margin: Margin,
    },
    ListBlock {
        ordered: bool,
        items: Vec<Vec<Run>>,
        margin: Margin,
    },
    #[serde(rename_all = "camelCase")]
    RuleBlock {
        line: Line,
        line_width: f64,
        color: &'static str,
        margin: Margin,
    },
}

/// Everything a renderer needs: content plus the shared style table and font.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDefinition {
    pub content: Vec<DocumentNode>,
    pub styles: &'static StyleTable,
    pub default_font: &'static str,
}

impl DocumentDefinition {
    pub fn new(content: Vec<DocumentNode>) -> Self {
        Self {
            content,
            styles: &STYLE_TABLE,
            default_font: DEFAULT_FONT,
        }
    }
}
