//! wenyan - Markdown to platform-ready HTML

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use wenyan::export::{FileImageSource, table_to_text};
use wenyan::{FontChoice, FootnoteLayout, Loader, Platform, Result, Session, WenyanConfig};

#[derive(Parser)]
#[command(name = "wenyan")]
#[command(version, about = "Theme Markdown and export it for publishing platforms", long_about = None)]
#[command(after_help = "EXAMPLES:
    wenyan export post.md -p wechat -t theme.css      WeChat HTML on stdout
    wenyan export post.md -p medium -o post.html      Medium HTML to a file
    wenyan resolve theme.css                          Flatten CSS variables
    wenyan table page.html                            Print tables as text")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export Markdown or preview HTML for a platform
    Export(ExportArgs),
    /// Embed images and math for rasterizing a long image
    LongImage(LongImageArgs),
    /// Resolve CSS custom properties and print the result
    Resolve {
        #[arg(value_name = "CSS")]
        input: PathBuf,
    },
    /// Print every table of an HTML file as a text grid
    Table {
        #[arg(value_name = "HTML")]
        input: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Markdown file, or HTML for an already rendered preview
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Theme stylesheet
    #[arg(short, long, value_name = "CSS")]
    theme: Option<PathBuf>,

    /// Code highlight stylesheet
    #[arg(long, value_name = "CSS")]
    highlight: Option<PathBuf>,

    /// Add link footnotes (paragraph or list layout)
    #[arg(long, value_name = "LAYOUT", num_args = 0..=1, default_missing_value = "paragraph")]
    footnotes: Option<FootnoteLayout>,

    /// Caption images with their alt text
    #[arg(long)]
    captions: bool,

    /// Configuration file layered over the defaults
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Target platform: wechat, zhihu, juejin, medium or generic
    #[arg(short, long, default_value = "wechat")]
    platform: Platform,

    /// Font override: theme, serif or sans
    #[arg(long, default_value = "theme")]
    font: FontChoice,

    /// Print a JSON report instead of the bare output
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LongImageArgs {
    #[command(flatten)]
    source: SourceArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Export(args) => run_export(&args),
        Command::LongImage(args) => run_long_image(&args),
        Command::Resolve { input } => read(&input)
            .map(|css| print!("{}", wenyan::css::resolve_variables(&css))),
        Command::Table { input } => run_table(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "wenyan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .inspect_err(|_| error!(path = %path.display(), "cannot read file"))?;
    Ok(text)
}

fn load_config(args: &SourceArgs) -> Result<WenyanConfig> {
    let mut loader = Loader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    if args.captions {
        loader = loader.set_override("render.captions", true)?;
    }
    Ok(loader.build()?)
}

fn build_session(args: &SourceArgs) -> Result<Session> {
    let config = load_config(args)?;
    let mut session = Session::new(config);

    if let Some(path) = &args.theme {
        session.set_theme(&read(path)?);
    }
    if let Some(path) = &args.highlight {
        session.set_highlight(&read(path)?);
    }
    if let Some(layout) = args.footnotes {
        session.enable_footnotes(layout);
    }

    let source = read(&args.input)?;
    let is_html = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    if is_html {
        session.set_preview_html(&source);
    } else {
        session.set_content(&source);
    }
    Ok(session)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .inspect_err(|_| error!(path = %path.display(), "cannot write output"))?;
            Ok(())
        }
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

fn run_export(args: &ExportArgs) -> Result<()> {
    let mut session = build_session(&args.source)?;
    session.set_font(args.font);
    let out = session.export(args.platform)?;

    if args.json {
        let report = serde_json::json!({
            "platform": args.platform.name(),
            "font": args.font.to_string(),
            "footnotes": session.footnotes_enabled(),
            "bytes": out.len(),
            "content": out,
        });
        let text = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        write_output(args.source.output.as_deref(), &format!("{text}\n"))
    } else {
        write_output(args.source.output.as_deref(), &out)
    }
}

fn run_long_image(args: &LongImageArgs) -> Result<()> {
    let session = build_session(&args.source)?;
    let base = args
        .source
        .input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let image = session.long_image(&FileImageSource::new(base))?;

    for failure in &image.report.failures {
        eprintln!("warning: could not embed {}: {}", failure.src, failure.reason);
    }
    write_output(args.source.output.as_deref(), &image.html)
}

fn run_table(input: &Path) -> Result<()> {
    let tree = wenyan::ContentTree::parse(&read(input)?);
    for table in tree.elements_by_tag(tree.root(), "table") {
        println!("{}", table_to_text(&tree, table));
    }
    Ok(())
}
