mod block;
mod config;
mod error;
mod inline;
mod lexer;
mod model;
mod render;
mod style;
mod transform;
mod typst;

pub use block::{BlockToken, InlineToken, ListItem};
pub use config::{Config, RenderConfig, TransformConfig};
pub use error::{ConfigError, Error, ParseError, RenderError, Result};
pub use inline::resolve_inline;
pub use lexer::{Lexer, LexerOptions};
pub use model::{DocumentDefinition, DocumentNode, Line, Margin, Run};
pub use render::{CHUNK_SIZE, Renderer, SvgDocument, TypstRenderer};
pub use style::{DEFAULT_FONT, Decoration, STYLE_TABLE, Style, StyleName, StyleTable};
pub use transform::{LIST_ITEM_MARGIN, Transformer, UnrecognizedPolicy, transform_document};

use std::io::Write;

/// Lexer, transformer and renderer built once from a [`Config`] and shared
/// by every conversion.
#[derive(Debug, Clone)]
pub struct Converter {
    lexer: Lexer,
    transformer: Transformer,
    renderer: TypstRenderer,
}

impl Default for Converter {
    fn default() -> Self {
        let config = Config::compiled_default();
        Self {
            lexer: Lexer::new(config.lexer),
            transformer: Transformer::new(config.transform.unrecognized),
            renderer: TypstRenderer::new(config.render.system_fonts),
        }
    }
}

impl Converter {
    pub fn new(config: &Config) -> Result<Self, RenderError> {
        Ok(Self {
            lexer: Lexer::new(config.lexer),
            transformer: Transformer::new(config.transform.unrecognized),
            renderer: TypstRenderer::from_config(&config.render)?,
        })
    }

    /// Lex markdown into block tokens.
    pub fn parse(&self, markdown: &str) -> Result<Vec<BlockToken>> {
        Ok(self.lexer.lex(markdown)?)
    }

    /// Build the document definition handed to the renderer.
    pub fn document(&self, markdown: &str) -> Result<DocumentDefinition> {
        let blocks = self.parse(markdown)?;
        Ok(self.transformer.document(&blocks))
    }

    pub fn to_typst(&self, markdown: &str) -> Result<String> {
        Ok(typst::to_markup(&self.document(markdown)?))
    }

    pub fn to_pdf(&self, markdown: &str) -> Result<Vec<u8>> {
        let document = self.document(markdown)?;
        Ok(self.renderer.render(&document)?)
    }

    /// Stream the PDF into `sink`, returning the byte count once it is flushed.
    pub fn write_pdf(&self, markdown: &str, sink: &mut dyn Write) -> Result<usize> {
        let document = self.document(markdown)?;
        Ok(self.renderer.render_to(&document, sink)?)
    }

    pub fn to_svg(&self, markdown: &str) -> Result<SvgDocument> {
        let document = self.document(markdown)?;
        Ok(self.renderer.render_svg(&document)?)
    }
}

/// Parse markdown text into block tokens.
pub fn parse(markdown: &str) -> Result<Vec<BlockToken>> {
    Converter::default().parse(markdown)
}

/// Convert markdown to a document definition using the default config.
pub fn markdown_to_document(markdown: &str) -> Result<DocumentDefinition> {
    Converter::default().document(markdown)
}

/// Convert markdown to Typst markup using the default config.
pub fn markdown_to_typst(markdown: &str) -> Result<String> {
    Converter::default().to_typst(markdown)
}

/// Convert markdown to PDF bytes using the default config.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>> {
    Converter::default().to_pdf(markdown)
}

/// Stream markdown as PDF into a sink using the default config.
pub fn write_pdf(markdown: &str, sink: &mut dyn Write) -> Result<usize> {
    Converter::default().write_pdf(markdown, sink)
}

/// Convert markdown to SVG pages using the default config.
pub fn markdown_to_svg(markdown: &str) -> Result<SvgDocument> {
    Converter::default().to_svg(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn heading_scenario() {
        let document = markdown_to_document("# Title").unwrap();
        assert_eq!(
            document.content,
            vec![DocumentNode::TextBlock {
                runs: vec![Run::plain("Title")],
                style: StyleName::Header,
                margin: Margin::new(0.0, 5.0, 0.0, 10.0),
            }]
        );
        assert_eq!(document.default_font, "Roboto");
    }

    #[test]
    fn list_scenario() {
        let document = markdown_to_document("- a\n- b").unwrap();
        assert_eq!(
            document.content,
            vec![DocumentNode::ListBlock {
                ordered: false,
                items: vec![vec![Run::plain("a")], vec![Run::plain("b")]],
                margin: Margin::new(5.0, 5.0, 0.0, 10.0),
            }]
        );
    }

    #[test]
    fn mixed_document() {
        let md = "# Report\n\nSome **bold** text.\n\n> a quote\n\n```\n  code\n```\n\n---\n\n1. first\n2. second\n";
        let document = markdown_to_document(md).unwrap();
        let kinds: Vec<&str> = document
            .content
            .iter()
            .map(|node| match node {
                DocumentNode::TextBlock { style, .. } => style.as_str(),
                DocumentNode::ListBlock { .. } => "list",
                DocumentNode::RuleBlock { .. } => "rule",
            })
            .collect();
        assert_eq!(kinds, ["header", "body", "blockquote", "code", "rule", "list"]);

        let DocumentNode::TextBlock { runs, .. } = &document.content[3] else {
            unreachable!()
        };
        assert_eq!(runs, &vec![Run::styled("  code", StyleName::Code)]);
    }

    #[test]
    fn table_is_dropped_by_default_and_kept_on_request() {
        let md = "| A | B |\n|---|---|\n| 1 | 2 |";
        assert!(markdown_to_document(md).unwrap().content.is_empty());

        let mut config = Config::compiled_default();
        config.transform.unrecognized = UnrecognizedPolicy::Passthrough;
        let converter = Converter::new(&config).unwrap();
        let document = converter.document(md).unwrap();
        assert_eq!(
            document.content,
            vec![DocumentNode::TextBlock {
                runs: vec![Run::plain(md)],
                style: StyleName::Body,
                margin: Margin::new(0.0, 0.0, 0.0, 10.0),
            }]
        );
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(
            markdown_to_pdf(""),
            Err(Error::Parse(ParseError::EmptyInput))
        ));
    }

    #[test]
    fn typst_markup_for_markdown() {
        let markup = markdown_to_typst("Hello *world*").unwrap();
        assert!(markup.contains("  text(\"Hello \")\n  text(style: \"italic\", \"world\")\n"));
    }

    #[test]
    fn link_without_target_still_renders() {
        let pdf = markdown_to_pdf("see [here]() now").unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_pdf_bytes() {
        let mut sink = Vec::new();
        let written = write_pdf("# Title\n\nBody with `code` and a [link](https://example.com).\n\n---\n\n- one\n- two", &mut sink)
            .unwrap();
        assert_eq!(written, sink.len());
        assert!(sink.starts_with(b"%PDF"));
    }
}
