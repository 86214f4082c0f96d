use std::path::PathBuf;

/// Failures reported by the lexer.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Text content is required")]
    EmptyInput,
}

/// Failures reported by the renderer, including the output sink.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Failed to read font file {path}: {source}")]
    Font {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write rendered output: {0}")]
    Sink(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Errors surfaced by the conversion pipeline. The transformation itself
/// cannot fail, so these come from the lexer or the renderer unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
