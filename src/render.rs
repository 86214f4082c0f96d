use std::fs;
use std::io::Write;

use log::debug;
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::foundations::Bytes;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::model::DocumentDefinition;
use crate::typst;

/// Size of the slices pushed into a sink by [`Renderer::render_to`].
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Lays out a document definition and serializes it.
pub trait Renderer {
    /// Render to a materialized byte buffer.
    fn render(&self, document: &DocumentDefinition) -> Result<Vec<u8>, RenderError>;

    /// Push the rendered bytes into `sink` in chunks. Returns the number of
    /// bytes written once the sink has been flushed.
    fn render_to(
        &self,
        document: &DocumentDefinition,
        sink: &mut dyn Write,
    ) -> Result<usize, RenderError> {
        let bytes = self.render(document)?;
        for chunk in bytes.chunks(CHUNK_SIZE) {
            sink.write_all(chunk)?;
        }
        sink.flush()?;
        Ok(bytes.len())
    }
}

/// Result of rendering a document to SVG pages.
pub struct SvgDocument {
    pub pages: Vec<String>,
    pub width_pt: f64,
    pub height_pt: f64,
}

/// Renders through Typst. Embedded fonts are always available.
#[derive(Debug, Clone, Default)]
pub struct TypstRenderer {
    fonts: Vec<Bytes>,
    system_fonts: bool,
}

impl TypstRenderer {
    pub fn new(system_fonts: bool) -> Self {
        Self {
            fonts: Vec::new(),
            system_fonts,
        }
    }

    /// Build a renderer, reading every configured font file up front.
    pub fn from_config(config: &RenderConfig) -> Result<Self, RenderError> {
        let mut fonts = Vec::with_capacity(config.font_files.len());
        for path in &config.font_files {
            let bytes = fs::read(path).map_err(|source| RenderError::Font {
                path: path.clone(),
                source,
            })?;
            debug!("loaded font {} ({} bytes)", path.display(), bytes.len());
            fonts.push(Bytes::new(bytes));
        }
        Ok(Self {
            fonts,
            system_fonts: config.system_fonts,
        })
    }

    fn compile(&self, document: &DocumentDefinition) -> Result<PagedDocument, RenderError> {
        let markup = typst::to_markup(document);
        debug!(
            "compiling {} nodes ({} bytes of markup)",
            document.content.len(),
            markup.len()
        );

        let font_options = TypstKitFontOptions::new()
            .include_embedded_fonts(true)
            .include_system_fonts(self.system_fonts);

        let engine = TypstEngine::builder()
            .main_file(markup)
            .fonts(self.fonts.clone())
            .search_fonts_with(font_options)
            .build();

        engine
            .compile()
            .output
            .map_err(|e| RenderError::Compile(format!("{:?}", e)))
    }

    /// Render each page as an SVG string.
    pub fn render_svg(&self, document: &DocumentDefinition) -> Result<SvgDocument, RenderError> {
        let doc = self.compile(document)?;

        let pages: Vec<String> = doc.pages.iter().map(typst_svg::svg).collect();

        // Get dimensions from first page (assuming all pages same size)
        let (width_pt, height_pt) = if let Some(first_page) = doc.pages.first() {
            let size = first_page.frame.size();
            (size.x.to_pt(), size.y.to_pt())
        } else {
            (595.0, 842.0) // A4 default
        };

        Ok(SvgDocument {
            pages,
            width_pt,
            height_pt,
        })
    }
}

impl Renderer for TypstRenderer {
    fn render(&self, document: &DocumentDefinition) -> Result<Vec<u8>, RenderError> {
        let doc = self.compile(document)?;

        typst_pdf::pdf(&doc, &PdfOptions::default())
            .map_err(|e| RenderError::Pdf(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FixedRenderer(Vec<u8>);

    impl Renderer for FixedRenderer {
        fn render(&self, _: &DocumentDefinition) -> Result<Vec<u8>, RenderError> {
            Ok(self.0.clone())
        }
    }

    /// Counts writes and flushes, failing after `fail_after` writes.
    #[derive(Default)]
    struct RecordingSink {
        bytes: Vec<u8>,
        writes: usize,
        flushed: bool,
        fail_after: Option<usize>,
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_after == Some(self.writes) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.writes += 1;
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    #[test]
    fn render_to_writes_everything_and_flushes() {
        let payload: Vec<u8> = (0..CHUNK_SIZE * 2 + 10).map(|i| i as u8).collect();
        let renderer = FixedRenderer(payload.clone());
        let mut sink = RecordingSink::default();

        let written = renderer
            .render_to(&DocumentDefinition::new(Vec::new()), &mut sink)
            .unwrap();

        assert_eq!(written, payload.len());
        assert_eq!(sink.bytes, payload);
        assert_eq!(sink.writes, 3);
        assert!(sink.flushed);
    }

    #[test]
    fn render_to_reports_sink_errors() {
        let renderer = FixedRenderer(vec![0; CHUNK_SIZE * 2]);
        let mut sink = RecordingSink {
            fail_after: Some(1),
            ..RecordingSink::default()
        };

        let err = renderer
            .render_to(&DocumentDefinition::new(Vec::new()), &mut sink)
            .unwrap_err();

        assert!(matches!(err, RenderError::Sink(_)));
        assert!(!sink.flushed);
    }

    #[test]
    fn missing_font_file_is_reported() {
        let config = RenderConfig {
            system_fonts: false,
            font_files: vec!["/no/such/font.ttf".into()],
        };
        let err = TypstRenderer::from_config(&config).unwrap_err();
        assert!(matches!(err, RenderError::Font { .. }));
    }

    #[test]
    fn font_files_are_owned_by_the_renderer() {
        let path = std::env::temp_dir().join(format!("mdpdf-font-{}.bin", std::process::id()));
        fs::write(&path, b"not really a font").unwrap();
        let config = RenderConfig {
            system_fonts: false,
            font_files: vec![path.clone()],
        };

        let renderer = TypstRenderer::from_config(&config).unwrap();
        let copy = renderer.clone();
        drop(renderer);
        fs::remove_file(&path).unwrap();

        assert_eq!(copy.fonts.len(), 1);
        assert_eq!(copy.fonts[0].as_slice(), b"not really a font");
    }
}
