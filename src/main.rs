use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use mdpdf::{Config, Converter};

#[derive(Parser)]
#[command(name = "mdpdf")]
#[command(about = "Convert Markdown text to PDF")]
struct Cli {
    /// Input Markdown file, or `-` for stdin
    input: PathBuf,

    /// Output file, or `-` for stdout (defaults to the input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Svg,
    Typst,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Svg => "svg",
            Format::Typst => "typ",
            Format::Json => "json",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };
    let converter = Converter::new(&config)?;

    let markdown = read_input(&cli.input)?;
    let output = cli.output.clone().unwrap_or_else(|| {
        if is_stdio(&cli.input) {
            PathBuf::from("-")
        } else {
            cli.input.with_extension(cli.format.extension())
        }
    });

    match cli.format {
        Format::Pdf => {
            let mut sink = open_output(&output)?;
            let written = converter.write_pdf(&markdown, &mut sink)?;
            info!("wrote {} bytes of PDF", written);
        }
        Format::Svg => {
            let svg = converter.to_svg(&markdown)?;
            write_svg_pages(&output, &svg.pages)?;
            info!(
                "wrote {} pages ({}x{}pt)",
                svg.pages.len(),
                svg.width_pt,
                svg.height_pt
            );
        }
        Format::Typst => {
            let markup = converter.to_typst(&markdown)?;
            write_all(&output, markup.as_bytes())?;
        }
        Format::Json => {
            let document = converter.document(&markdown)?;
            let json = serde_json::to_string_pretty(&document)?;
            write_all(&output, json.as_bytes())?;
        }
    }

    if !is_stdio(&output) {
        eprintln!("Created {}", output.display());
    }
    Ok(())
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdio(path) {
        let mut markdown = String::new();
        io::stdin()
            .read_to_string(&mut markdown)
            .context("Error reading stdin")?;
        Ok(markdown)
    } else {
        fs::read_to_string(path).with_context(|| format!("Error reading {}", path.display()))
    }
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdout().lock()))
    } else {
        let file =
            File::create(path).with_context(|| format!("Error writing {}", path.display()))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut sink = open_output(path)?;
    sink.write_all(bytes)?;
    sink.flush()?;
    Ok(())
}

/// One page goes to `path`; more pages go to `name-1.svg`, `name-2.svg`, ...
fn write_svg_pages(path: &Path, pages: &[String]) -> Result<()> {
    if pages.len() <= 1 || is_stdio(path) {
        return write_all(path, pages.concat().as_bytes());
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    for (i, page) in pages.iter().enumerate() {
        let page_path = path.with_file_name(format!("{}-{}.svg", stem, i + 1));
        write_all(&page_path, page.as_bytes())?;
    }
    Ok(())
}
