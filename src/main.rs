// bracelang: lexical checker and parser for a bracket-delimited expression language

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{ArgAction, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bracelang::parser::print::{render_tokens, render_tree, TokenStyle, TreeStyle};
use bracelang::parser::{analyze, Classifier, Dialect};
use bracelang::session::Session;
use bracelang::ui::App;

#[derive(Debug, Parser)]
#[command(
    name = "bracelang",
    version,
    about = "Check and parse programs in a small bracket-delimited expression language"
)]
struct Cli {
    /// Program to load; with --print, read from stdin when omitted
    file: Option<PathBuf>,

    /// Keyword set to classify with
    #[arg(long, value_enum, default_value_t = Dialect::Scheme)]
    dialect: Dialect,

    /// Print tokens and syntax tree to stdout instead of starting the TUI
    #[arg(long)]
    print: bool,

    #[arg(long, value_enum, default_value_t = TreeStyle::KindValue)]
    tree_style: TreeStyle,

    #[arg(long, value_enum, default_value_t = TokenStyle::Inline)]
    token_style: TokenStyle,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Write logs here while the TUI owns the terminal
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "bracelang=warn",
        1 => "bracelang=info",
        2 => "bracelang=debug",
        _ => "bracelang=trace",
    }
}

/// Logs go to stderr in print mode. The TUI owns the terminal, so there they
/// go to `--log-file` or nowhere.
fn init_logging(cli: &Cli) -> io::Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose)))
    };

    match (&cli.log_file, cli.print) {
        (Some(path), _) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (None, true) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(io::stderr)
                .init();
        }
        (None, false) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}

fn read_source(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Non-interactive mode: returns false when the program was rejected
fn run_print(cli: &Cli, source: &str) -> io::Result<bool> {
    let classifier = Classifier::new(cli.dialect);
    let analysis = match analyze(source, &classifier) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("{} error: {}", e.category(), e);
            return Ok(false);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Tokens:")?;
    for line in render_tokens(&analysis.tokens, cli.token_style) {
        writeln!(out, "  {}", line)?;
    }
    writeln!(out)?;
    writeln!(out, "Syntax tree:")?;
    for line in render_tree(&analysis.ast, cli.tree_style) {
        writeln!(out, "  {}", line)?;
    }
    Ok(true)
}

fn run_tui(cli: &Cli, source: String) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new(cli.dialect);
    let mut app = App::new(session, source).with_styles(cli.token_style, cli.tree_style);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    info!(programs = app.session.len(), "session ended");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    if let Some(path) = &cli.file {
        if !path.exists() {
            eprintln!("Error: File '{}' not found", path.display());
            eprintln!("Usage: bracelang [FILE] [--print] [--dialect scheme|c]");
            std::process::exit(1);
        }
    }

    if cli.print {
        let source = read_source(cli.file.as_deref())?;
        if !run_print(&cli, &source)? {
            std::process::exit(1);
        }
        return Ok(());
    }

    let source = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    run_tui(&cli, source)
}
