use crate::model::{DocumentDefinition, DocumentNode, Margin, Run};
use crate::style::{Decoration, Style, StyleName, StyleTable};
use crate::transform::LIST_ITEM_MARGIN;

/// Used when the definition's default font isn't installed.
const FALLBACK_FONTS: [&str; 2] = ["Libertinus Serif", "New Computer Modern"];
const PAGE_MARGIN: f64 = 40.0;
const BASE_FONT_SIZE: f64 = 12.0;
/// Typst's own paragraph leading, scaled by a style's line height.
const BASE_LEADING_EM: f64 = 0.65;

/// Convert a document definition to Typst markup
pub fn to_markup(document: &DocumentDefinition) -> String {
    let mut out = String::new();
    push_preamble(document, &mut out);

    for node in &document.content {
        emit_node(node, document.styles, &mut out);
    }

    out
}

fn push_preamble(document: &DocumentDefinition, out: &mut String) {
    let fonts: Vec<String> = std::iter::once(document.default_font)
        .chain(FALLBACK_FONTS)
        .map(string_literal)
        .collect();

    out.push_str(&format!(
        "#set page(paper: \"a4\", margin: {})\n",
        pt(PAGE_MARGIN)
    ));
    out.push_str(&format!(
        "#set text(font: ({}), size: {})\n",
        fonts.join(", "),
        pt(BASE_FONT_SIZE)
    ));
    out.push_str("#set par(spacing: 0pt)\n");
    out.push_str("#set block(spacing: 0pt)\n\n");
}

fn emit_node(node: &DocumentNode, styles: &StyleTable, out: &mut String) {
    match node {
        DocumentNode::TextBlock {
            runs,
            style,
            margin,
        } => {
            out.push_str(&format!("#pad({})[\n", pad_args(margin)));
            push_block_style(styles.get(*style), out);
            push_runs(runs, styles, out);
            out.push_str("]\n\n");
        }
        DocumentNode::ListBlock {
            ordered,
            items,
            margin,
        } => {
            out.push_str(&format!("#pad({})[\n", pad_args(margin)));
            push_block_style(styles.get(StyleName::List), out);
            let function = if *ordered { "enum" } else { "list" };
            out.push_str(&format!("#{}(\n", function));
            for item in items {
                out.push_str(&format!("  pad({})[", pad_args(&LIST_ITEM_MARGIN)));
                push_runs(item, styles, out);
                out.push_str("],\n");
            }
            out.push_str(")\n]\n\n");
        }
        DocumentNode::RuleBlock {
            line,
            line_width,
            color,
            margin,
        } => {
            out.push_str(&format!(
                "#pad({})[#line(start: ({}, {}), end: ({}, {}), stroke: {} + {})]\n\n",
                pad_args(margin),
                pt(line.x1),
                pt(line.y1),
                pt(line.x2),
                pt(line.y2),
                pt(*line_width),
                color_expr(color)
            ));
        }
    }
}

/// Set rules scoped to the enclosing block.
fn push_block_style(style: &Style, out: &mut String) {
    let args = TextArgs::from_style(style).to_args();
    if !args.is_empty() {
        out.push_str(&format!("#set text({})\n", args.join(", ")));
    }
    if let Some(line_height) = style.line_height {
        out.push_str(&format!(
            "#set par(leading: {:.2}em)\n",
            BASE_LEADING_EM * line_height
        ));
    }
}

fn push_runs(runs: &[Run], styles: &StyleTable, out: &mut String) {
    out.push_str("#{\n");
    for run in runs {
        out.push_str("  ");
        out.push_str(&run_expr(run, styles));
        out.push('\n');
    }
    out.push('}');
}

/// Arguments to Typst's `text` function. Run flags override the run's style.
#[derive(Debug, Default)]
struct TextArgs {
    font: Option<&'static str>,
    size: Option<f64>,
    bold: bool,
    italic: bool,
    fill: Option<&'static str>,
}

impl TextArgs {
    fn from_style(style: &Style) -> Self {
        Self {
            font: style.font,
            size: style.font_size,
            bold: style.bold,
            italic: style.italics,
            fill: style.color,
        }
    }

    fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(font) = self.font {
            args.push(format!("font: {}", string_literal(font)));
        }
        if let Some(size) = self.size {
            args.push(format!("size: {}", pt(size)));
        }
        if self.bold {
            args.push("weight: \"bold\"".to_string());
        }
        if self.italic {
            args.push("style: \"italic\"".to_string());
        }
        if let Some(fill) = self.fill {
            args.push(format!("fill: {}", color_expr(fill)));
        }
        args
    }
}

fn run_expr(run: &Run, styles: &StyleTable) -> String {
    let style = run.style.map(|name| styles.get(name));

    let mut text_args = style.map(TextArgs::from_style).unwrap_or_default();
    text_args.bold |= run.bold;
    text_args.italic |= run.italic;

    let mut args = text_args.to_args();
    args.push(string_literal(&run.text));
    let mut expr = format!("text({})", args.join(", "));

    let decoration = style.and_then(|style| style.decoration);
    if run.strikethrough || decoration == Some(Decoration::LineThrough) {
        expr = format!("strike({expr})");
    }
    if decoration == Some(Decoration::Underline) {
        expr = format!("underline({expr})");
    }
    if let Some(background) = style.and_then(|style| style.background) {
        expr = format!("highlight(fill: {}, {expr})", color_expr(background));
    }
    // Typst rejects empty URLs
    if let Some(href) = run.link.as_deref().filter(|href| !href.is_empty()) {
        expr = format!("link({}, {expr})", string_literal(href));
    }
    expr
}

fn pad_args(margin: &Margin) -> String {
    format!(
        "left: {}, top: {}, right: {}, bottom: {}",
        pt(margin.left),
        pt(margin.top),
        pt(margin.right),
        pt(margin.bottom)
    )
}

fn pt(value: f64) -> String {
    format!("{value}pt")
}

fn color_expr(color: &str) -> String {
    match color {
        "grey" | "gray" => "gray".to_string(),
        "black" | "white" | "blue" | "red" | "green" | "yellow" | "orange" | "purple" => {
            color.to_string()
        }
        _ => format!("rgb({})", string_literal(color)),
    }
}

/// Quote text as a Typst string. Strings keep their whitespace verbatim,
/// unlike markup.
fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockToken, InlineToken, ListItem};
    use crate::transform::transform_document;

    fn markup(blocks: &[BlockToken]) -> String {
        to_markup(&DocumentDefinition::new(transform_document(blocks)))
    }

    fn text(s: &str) -> InlineToken {
        InlineToken::text(s)
    }

    #[test]
    fn preamble() {
        let out = markup(&[]);
        assert_eq!(
            out,
            "#set page(paper: \"a4\", margin: 40pt)\n\
             #set text(font: (\"Roboto\", \"Libertinus Serif\", \"New Computer Modern\"), size: 12pt)\n\
             #set par(spacing: 0pt)\n\
             #set block(spacing: 0pt)\n\n"
        );
    }

    #[test]
    fn heading() {
        let out = markup(&[BlockToken::Heading {
            depth: 1,
            inline: vec![text("Hello")],
        }]);
        assert!(out.ends_with(
            "#pad(left: 0pt, top: 5pt, right: 0pt, bottom: 10pt)[\n\
             #set text(size: 20pt, weight: \"bold\")\n\
             #{\n  text(\"Hello\")\n}]\n\n"
        ));
    }

    #[test]
    fn body_line_height() {
        let out = markup(&[BlockToken::Paragraph {
            inline: vec![text("x")],
        }]);
        assert!(out.contains("#set text(size: 10pt)\n#set par(leading: 0.91em)\n"));
    }

    #[test]
    fn formatted_runs() {
        let out = markup(&[BlockToken::Paragraph {
            inline: vec![
                InlineToken::Strong {
                    children: vec![InlineToken::Emphasis {
                        children: vec![text("both")],
                    }],
                },
                InlineToken::Strikethrough {
                    children: vec![text("gone")],
                },
            ],
        }]);
        assert!(out.contains("  text(weight: \"bold\", style: \"italic\", \"both\")\n"));
        assert!(out.contains("  strike(text(\"gone\"))\n"));
    }

    #[test]
    fn inline_code_and_link() {
        let out = markup(&[BlockToken::Paragraph {
            inline: vec![
                InlineToken::CodeSpan { text: "x".into() },
                InlineToken::Link {
                    display_text: "docs".into(),
                    href: "https://docs.rs".into(),
                },
            ],
        }]);
        assert!(out.contains(
            "  highlight(fill: rgb(\"#f0f0f0\"), text(font: \"Roboto\", size: 9pt, \"x\"))\n"
        ));
        assert!(out.contains("  link(\"https://docs.rs\", underline(text(fill: blue, \"docs\")))\n"));
    }

    #[test]
    fn empty_link_target_is_plain_text() {
        let out = markup(&[BlockToken::Paragraph {
            inline: vec![InlineToken::Link {
                display_text: "here".into(),
                href: String::new(),
            }],
        }]);
        assert!(out.contains("  underline(text(fill: blue, \"here\"))\n"));
        assert!(!out.contains("link("));
    }

    #[test]
    fn bold_style_is_not_duplicated() {
        let out = markup(&[BlockToken::Heading {
            depth: 2,
            inline: vec![InlineToken::Strong {
                children: vec![text("x")],
            }],
        }]);
        // The run itself has no style, so only the block's set rule carries the size
        assert!(out.contains("  text(weight: \"bold\", \"x\")\n"));
        assert!(!out.contains("weight: \"bold\", weight: \"bold\""));
    }

    #[test]
    fn code_block_keeps_whitespace() {
        let out = markup(&[BlockToken::CodeBlock {
            literal_text: "  if x {\n\treturn \"y\";\n  }".into(),
        }]);
        assert!(out.contains("\"  if x {\\n\\treturn \\\"y\\\";\\n  }\""));
        assert!(out.contains("#pad(left: 0pt, top: 5pt, right: 0pt, bottom: 10pt)[\n#set text(font: \"Roboto\", size: 9pt)\n"));
    }

    #[test]
    fn blockquote_is_grey_italic() {
        let out = markup(&[BlockToken::Blockquote {
            inline: vec![text("q")],
        }]);
        assert!(out.contains(
            "#pad(left: 10pt, top: 5pt, right: 0pt, bottom: 5pt)[\n#set text(style: \"italic\", fill: gray)\n"
        ));
    }

    #[test]
    fn lists() {
        let items = vec![
            ListItem {
                inline: vec![text("one")],
            },
            ListItem {
                inline: vec![text("two")],
            },
        ];
        let out = markup(&[BlockToken::List {
            ordered: false,
            items: items.clone(),
        }]);
        assert!(out.ends_with(
            "#pad(left: 5pt, top: 5pt, right: 0pt, bottom: 10pt)[\n\
             #list(\n  \
             pad(left: 0pt, top: 2pt, right: 0pt, bottom: 2pt)[#{\n  text(\"one\")\n}],\n  \
             pad(left: 0pt, top: 2pt, right: 0pt, bottom: 2pt)[#{\n  text(\"two\")\n}],\n\
             )\n]\n\n"
        ));

        let out = markup(&[BlockToken::List {
            ordered: true,
            items,
        }]);
        assert!(out.contains("#pad(left: 10pt, top: 5pt, right: 0pt, bottom: 10pt)[\n#enum(\n"));
    }

    #[test]
    fn horizontal_rule() {
        let out = markup(&[BlockToken::ThematicBreak]);
        assert!(out.ends_with(
            "#pad(left: 0pt, top: 10pt, right: 0pt, bottom: 10pt)[#line(start: (0pt, 5pt), end: (515pt, 5pt), stroke: 0.5pt + rgb(\"#cccccc\"))]\n\n"
        ));
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(string_literal("a \"b\" \\ c"), "\"a \\\"b\\\" \\\\ c\"");
        assert_eq!(string_literal("#*_$"), "\"#*_$\"");
        assert_eq!(string_literal("\u{7}"), "\"\\u{7}\"");
    }

    #[test]
    fn colors() {
        assert_eq!(color_expr("grey"), "gray");
        assert_eq!(color_expr("blue"), "blue");
        assert_eq!(color_expr("#cccccc"), "rgb(\"#cccccc\")");
    }
}
