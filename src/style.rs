use serde::Serialize;

use crate::model::Margin;

/// Font family every style inherits unless it names its own.
pub const DEFAULT_FONT: &str = "Roboto";

/// Names of the entries in [`STYLE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleName {
    Header,
    Subheader,
    H3,
    Body,
    Code,
    InlineCode,
    Link,
    Blockquote,
    List,
}

impl StyleName {
    pub const ALL: [StyleName; 9] = [
        StyleName::Header,
        StyleName::Subheader,
        StyleName::H3,
        StyleName::Body,
        StyleName::Code,
        StyleName::InlineCode,
        StyleName::Link,
        StyleName::Blockquote,
        StyleName::List,
    ];

    /// Heading style for a markdown heading depth. There is no style past `h3`.
    pub fn for_heading(depth: u8) -> Self {
        match depth {
            0 | 1 => StyleName::Header,
            2 => StyleName::Subheader,
            _ => StyleName::H3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StyleName::Header => "header",
            StyleName::Subheader => "subheader",
            StyleName::H3 => "h3",
            StyleName::Body => "body",
            StyleName::Code => "code",
            StyleName::InlineCode => "inlineCode",
            StyleName::Link => "link",
            StyleName::Blockquote => "blockquote",
            StyleName::List => "list",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Decoration {
    Underline,
    LineThrough,
}

/// Visual attributes of one style entry. `None` means "inherit".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    pub bold: bool,
    pub italics: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration: Option<Decoration>,
    pub preserve_leading_spaces: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

impl Style {
    const EMPTY: Style = Style {
        font: None,
        font_size: None,
        line_height: None,
        bold: false,
        italics: false,
        color: None,
        background: None,
        decoration: None,
        preserve_leading_spaces: false,
        margin: None,
    };
}

/// The fixed style table shared by every transformation.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTable {
    pub header: Style,
    pub subheader: Style,
    pub h3: Style,
    pub body: Style,
    pub code: Style,
    pub inline_code: Style,
    pub link: Style,
    pub blockquote: Style,
    pub list: Style,
}

impl StyleTable {
    pub fn get(&self, name: StyleName) -> &Style {
        match name {
            StyleName::Header => &self.header,
            StyleName::Subheader => &self.subheader,
            StyleName::H3 => &self.h3,
            StyleName::Body => &self.body,
            StyleName::Code => &self.code,
            StyleName::InlineCode => &self.inline_code,
            StyleName::Link => &self.link,
            StyleName::Blockquote => &self.blockquote,
            StyleName::List => &self.list,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleName, &Style)> {
        StyleName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

const CODE_BACKGROUND: &str = "#f0f0f0";

pub static STYLE_TABLE: StyleTable = StyleTable {
    header: Style {
        font_size: Some(20.0),
        bold: true,
        ..Style::EMPTY
    },
    subheader: Style {
        font_size: Some(16.0),
        bold: true,
        ..Style::EMPTY
    },
    h3: Style {
        font_size: Some(14.0),
        bold: true,
        ..Style::EMPTY
    },
    body: Style {
        font_size: Some(10.0),
        line_height: Some(1.4),
        ..Style::EMPTY
    },
    code: Style {
        font: Some(DEFAULT_FONT),
        font_size: Some(9.0),
        background: Some(CODE_BACKGROUND),
        preserve_leading_spaces: true,
        margin: Some(Margin::new(0.0, 5.0, 0.0, 5.0)),
        ..Style::EMPTY
    },
    inline_code: Style {
        font: Some(DEFAULT_FONT),
        font_size: Some(9.0),
        background: Some(CODE_BACKGROUND),
        ..Style::EMPTY
    },
    link: Style {
        color: Some("blue"),
        decoration: Some(Decoration::Underline),
        ..Style::EMPTY
    },
    blockquote: Style {
        italics: true,
        color: Some("grey"),
        margin: Some(Margin::new(20.0, 5.0, 0.0, 5.0)),
        ..Style::EMPTY
    },
    list: Style {
        margin: Some(Margin::new(0.0, 0.0, 0.0, 5.0)),
        ..Style::EMPTY
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_sizes() {
        assert_eq!(STYLE_TABLE.header.font_size, Some(20.0));
        assert_eq!(STYLE_TABLE.subheader.font_size, Some(16.0));
        assert_eq!(STYLE_TABLE.h3.font_size, Some(14.0));
        assert!(STYLE_TABLE.header.bold && STYLE_TABLE.subheader.bold && STYLE_TABLE.h3.bold);
    }

    #[test]
    fn body_and_code_values() {
        assert_eq!(STYLE_TABLE.body.font_size, Some(10.0));
        assert_eq!(STYLE_TABLE.body.line_height, Some(1.4));
        for style in [&STYLE_TABLE.code, &STYLE_TABLE.inline_code] {
            assert_eq!(style.font_size, Some(9.0));
            assert_eq!(style.background, Some("#f0f0f0"));
        }
        assert!(STYLE_TABLE.code.preserve_leading_spaces);
    }

    #[test]
    fn link_and_blockquote_colors() {
        assert_eq!(STYLE_TABLE.link.color, Some("blue"));
        assert_eq!(STYLE_TABLE.link.decoration, Some(Decoration::Underline));
        assert_eq!(STYLE_TABLE.blockquote.color, Some("grey"));
        assert!(STYLE_TABLE.blockquote.italics);
    }

    #[test]
    fn every_name_has_an_entry() {
        let names: Vec<&str> = STYLE_TABLE.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            [
                "header",
                "subheader",
                "h3",
                "body",
                "code",
                "inlineCode",
                "link",
                "blockquote",
                "list"
            ]
        );
    }

    #[test]
    fn heading_depth_clamps_at_h3() {
        assert_eq!(StyleName::for_heading(1), StyleName::Header);
        assert_eq!(StyleName::for_heading(2), StyleName::Subheader);
        for depth in 3..=9 {
            assert_eq!(StyleName::for_heading(depth), StyleName::H3);
        }
    }

    #[test]
    fn serializes_with_table_names() {
        let json = serde_json::to_value(&STYLE_TABLE).unwrap();
        assert_eq!(json["inlineCode"]["fontSize"], 9.0);
        assert_eq!(json["link"]["decoration"], "underline");
        assert!(json["header"].get("color").is_none());
    }
}
