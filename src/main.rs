//! mdlatex - Markdown to LaTeX converter

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mdlatex::latex::declare_common_symbol;
use mdlatex::{LatexRenderer, RenderConfig, markdown_to_html, parse};

#[derive(Parser)]
#[command(name = "mdlatex")]
#[command(version, about = "Markdown to LaTeX converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    mdlatex notes.md                   Write notes.tex
    mdlatex notes.md -o out/notes.tex  Write to a chosen file
    mdlatex -p --unhead notes.md       Print unnumbered LaTeX to stdout
    mdlatex --html notes.md            Write notes.html")]
struct Cli {
    /// Markdown input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: INPUT with a .tex or .html extension)
    #[arg(short, long, value_name = "FILE", conflicts_with = "print")]
    output: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(short, long)]
    print: bool,

    /// Render HTML instead of LaTeX
    #[arg(long)]
    html: bool,

    /// Use the contents of FILE as the LaTeX preamble
    #[arg(long, value_name = "FILE")]
    preamble: Option<PathBuf>,

    /// Render possibly unsafe content (raw \end lines, javascript: links)
    #[arg(long = "unsafe")]
    unsafe_mode: bool,

    /// Use unnumbered headings
    #[arg(long)]
    unhead: bool,

    /// Shift heading levels by N (1 turns # into \subsection)
    #[arg(long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    heading_offset: i32,

    /// Declare non-ASCII characters with \DeclareUnicodeCharacter
    #[arg(long)]
    declare_unicode: bool,

    /// Log rendering details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let input = fs::read_to_string(&cli.input)
        .map_err(|e| format!("reading {}: {e}", cli.input.display()))?;

    let started = Instant::now();
    // A custom preamble is arbitrary bytes, so LaTeX output stays as bytes.
    let rendered = if cli.html {
        markdown_to_html(&input).into_bytes()
    } else {
        let config = build_config(cli)?;
        let tree = parse(&input).map_err(|e| e.to_string())?;
        LatexRenderer::with_config(config)
            .render_to_vec(&tree, input.as_bytes())
            .map_err(|e| e.to_string())?
    };
    info!(
        input = %cli.input.display(),
        bytes = rendered.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered document"
    );

    if cli.print {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(&rendered)
            .and_then(|()| stdout.flush())
            .map_err(|e| format!("writing stdout: {e}"))?;
        return Ok(());
    }

    let output = match &cli.output {
        Some(path) => path.clone(),
        None => default_output(&cli.input, cli.html),
    };
    fs::write(&output, rendered).map_err(|e| format!("writing {}: {e}", output.display()))?;
    Ok(())
}

fn build_config(cli: &Cli) -> Result<RenderConfig, String> {
    let mut config = RenderConfig::new()
        .with_heading_offset(cli.heading_offset)
        .with_numbering(!cli.unhead)
        .with_unsafe(cli.unsafe_mode);
    if let Some(path) = &cli.preamble {
        let preamble =
            fs::read(path).map_err(|e| format!("reading preamble {}: {e}", path.display()))?;
        config = config.with_preamble(preamble);
    }
    if cli.declare_unicode {
        config = config.with_declare_unicode(declare_common_symbol);
    }
    Ok(config)
}

/// `notes.md` becomes `notes.tex`; `README` becomes `README.tex`.
fn default_output(input: &Path, html: bool) -> PathBuf {
    let ext = if html { "html" } else { "tex" };
    match input.extension() {
        Some(_) => input.with_extension(ext),
        None => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        }
    }
}
