// ll1c: LL(1) syntax analyzer for a C subset

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use serde_json::{json, Map, Value};

use ll1c::analyzer::{CAnalyzer, CParse};
use ll1c::config::{
    ParserConfig, DEFAULT_MAX_NESTING_DEPTH, DEFAULT_MAX_STACK_DEPTH, DEFAULT_TRACE_LIMIT,
};
use ll1c::errors::Error;
use ll1c::logging;
use ll1c::report::{SetsReport, TableReport};
use ll1c::ui::App;

/// Exit status for usage, I/O and lexical errors.
const EXIT_FAILURE: i32 = 2;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Which derivation structure to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    None,
    Tree,
    Ast,
}

/// LL(1) syntax analyzer for a C subset.
#[derive(Parser)]
#[command(name = "ll1c", version, about = "LL(1) syntax analyzer for a C subset")]
struct Cli {
    /// Path to the C source file
    source: PathBuf,

    /// Print FIRST, FOLLOW and SELECT sets and table statistics
    #[arg(long)]
    show_sets: bool,

    /// Print every engine step
    #[arg(long)]
    trace: bool,

    /// Export the predictive table as CSV (to stdout when no path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "-")]
    export_table: Option<PathBuf>,

    /// Only export the table cells the parse used
    #[arg(long, requires = "export_table")]
    used_only: bool,

    /// Print the parse tree or the AST
    #[arg(long, default_value = "none", value_enum)]
    emit: Emit,

    /// Output format (text or json)
    #[arg(long, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Step through the parse in a terminal UI
    #[arg(long)]
    view: bool,

    /// Maximum parse stack depth
    #[arg(long, default_value_t = DEFAULT_MAX_STACK_DEPTH)]
    max_stack_depth: usize,

    /// Maximum expression and statement nesting reduced into the AST
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    max_nesting_depth: usize,

    /// Maximum number of recorded trace steps
    #[arg(long, default_value_t = DEFAULT_TRACE_LIMIT)]
    trace_limit: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(logging::level_from_verbosity(cli.verbose, cli.quiet)) {
        eprintln!("error: {}", e);
        process::exit(EXIT_FAILURE);
    }

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

/// Runs the analyzer; `Ok(true)` when the input was accepted.
fn run(cli: &Cli) -> Result<bool, Error> {
    let source = fs::read_to_string(&cli.source).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("cannot read '{}': {}", cli.source.display(), e),
        )
    })?;

    let config = ParserConfig::default()
        .with_trace(cli.trace || cli.view)
        .with_trace_limit(cli.trace_limit)
        .with_max_stack_depth(cli.max_stack_depth)
        .with_max_nesting_depth(cli.max_nesting_depth);
    let analyzer = CAnalyzer::new(config)?;

    info!("parsing {}", cli.source.display());
    let parse = analyzer.parse_source(&source)?;
    let accepted = parse.outcome.accepted;

    match cli.format {
        OutputFormat::Text => print_text(cli, &analyzer, &parse)?,
        OutputFormat::Json => print_json(cli, &analyzer, &parse)?,
    }

    if let Some(path) = &cli.export_table {
        export_table(path, cli.used_only, &analyzer, &parse)?;
    }

    if cli.view {
        view(source, parse, &analyzer)?;
    }

    Ok(accepted)
}

fn print_text(cli: &Cli, analyzer: &CAnalyzer, parse: &CParse) -> Result<(), Error> {
    let core = analyzer.analyzer();
    let mut out = io::stdout().lock();

    if cli.show_sets {
        let report = SetsReport::new(core.grammar(), core.sets(), core.table());
        writeln!(out, "{}", report)?;
    }

    if cli.trace {
        for step in parse.outcome.trace.steps() {
            writeln!(
                out,
                "{:>6}  {:<7} {:<24} {}  [{}]",
                step.index,
                step.location.to_string(),
                step.lookahead,
                step.action,
                step.stack.join(" ")
            )?;
        }
        if parse.outcome.trace.is_truncated() {
            writeln!(
                out,
                "... trace truncated after {} steps",
                parse.outcome.trace.limit()
            )?;
        }
    }

    match cli.emit {
        Emit::None => {}
        Emit::Tree => write!(out, "{}", parse.outcome.tree.render(core.grammar()))?,
        Emit::Ast => writeln!(out, "{:#?}", parse.ast)?,
    }

    for diagnostic in &parse.outcome.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if parse.outcome.accepted {
        eprintln!("{}: accepted", cli.source.display());
    } else {
        eprintln!(
            "{}: {} ({} syntax error(s))",
            cli.source.display(),
            parse.outcome.status,
            parse.outcome.diagnostics.len()
        );
    }
    Ok(())
}

fn print_json(cli: &Cli, analyzer: &CAnalyzer, parse: &CParse) -> Result<(), Error> {
    let core = analyzer.analyzer();
    let mut doc = Map::new();
    doc.insert("file".into(), json!(cli.source.display().to_string()));
    doc.insert("status".into(), serde_json::to_value(parse.outcome.status)?);
    doc.insert("accepted".into(), json!(parse.outcome.accepted));
    doc.insert(
        "diagnostics".into(),
        serde_json::to_value(&parse.outcome.diagnostics)?,
    );

    if cli.show_sets {
        let report = SetsReport::new(core.grammar(), core.sets(), core.table());
        doc.insert("sets".into(), serde_json::to_value(&report)?);
    }
    if cli.trace {
        doc.insert("trace".into(), serde_json::to_value(&parse.outcome.trace)?);
    }
    match cli.emit {
        Emit::None => {}
        Emit::Tree => {
            doc.insert("tree".into(), parse.outcome.tree.to_json(core.grammar()));
        }
        Emit::Ast => {
            doc.insert("ast".into(), serde_json::to_value(&parse.ast)?);
        }
    }

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &Value::Object(doc))?;
    writeln!(out)?;
    Ok(())
}

fn export_table(
    path: &Path,
    used_only: bool,
    analyzer: &CAnalyzer,
    parse: &CParse,
) -> Result<(), Error> {
    let core = analyzer.analyzer();
    let report = if used_only {
        TableReport::used_only(core.grammar(), core.table(), &parse.outcome.usage)
    } else {
        TableReport::new(core.grammar(), core.table())
    };

    if path == Path::new("-") {
        report.write_csv(&mut io::stdout().lock())?;
    } else {
        let mut file = io::BufWriter::new(fs::File::create(path)?);
        report.write_csv(&mut file)?;
        file.flush()?;
        info!("table written to {}", path.display());
    }
    Ok(())
}

fn view(source: String, parse: CParse, analyzer: &CAnalyzer) -> Result<(), Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, parse, analyzer.analyzer().grammar());
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Error::from)
}
