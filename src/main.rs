//! landmarks - print the heading and landmark outline of an HTML page

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use landmarks::style::Stylesheet;
use landmarks::{Document, ExtractOptions, LandmarkPolicy, Session, SlotFallback};

#[derive(Parser)]
#[command(name = "landmarks")]
#[command(version, about = "Heading and landmark outline of an HTML page", long_about = None)]
#[command(after_help = "EXAMPLES:
    landmarks page.html                 Print the outline
    landmarks page.html --json          Print the outline as JSON
    landmarks page.html --locate 2      Show the element behind heading #2")]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Print the outline as JSON
    #[arg(long)]
    json: bool,

    /// Include hidden landmarks
    #[arg(long)]
    all_landmarks: bool,

    /// Do not flatten nested slots
    #[arg(long)]
    opaque_slots: bool,

    /// Enter closed shadow roots
    #[arg(long)]
    pierce_closed: bool,

    /// Extra author stylesheet (repeatable)
    #[arg(long = "stylesheet", value_name = "PATH")]
    stylesheets: Vec<PathBuf>,

    /// Describe the element behind heading N (0-based) instead of printing the outline
    #[arg(long, value_name = "N")]
    locate: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG applies unless -v/-vv asks for a level explicitly.
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = verbosity_level(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Level forced by `-v` flags; `None` leaves RUST_LOG in charge.
fn verbosity_level(count: u8) -> Option<LevelFilter> {
    match count {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn run(cli: &Cli) -> landmarks::Result<()> {
    let mut options = ExtractOptions::new().with_closed_shadow_roots(cli.pierce_closed);
    if cli.all_landmarks {
        options = options.with_landmarks(LandmarkPolicy::All);
    }
    if cli.opaque_slots {
        options = options.with_slot_fallback(SlotFallback::Opaque);
    }
    for path in &cli.stylesheets {
        let css = std::fs::read_to_string(path)?;
        options = options.with_stylesheet(Stylesheet::parse(&css));
    }

    let document = Document::open(&cli.input)?;
    let mut session = Session::with_options(document, options);
    session.refresh();

    if let Some(index) = cli.locate {
        match session.describe(index) {
            Some(found) => {
                let id = found.id.map(|id| format!("#{id}")).unwrap_or_default();
                println!("{} <{}{}> {}", found.level, found.tag, id, found.label);
            }
            None => println!("No heading at index {index}"),
        }
        return Ok(());
    }

    let outline = session.outline();
    if cli.json {
        println!("{}", outline.to_json_pretty()?);
        return Ok(());
    }

    if !outline.title.is_empty() {
        println!("Title: {}", outline.title);
    }
    println!("Headings: {}", outline.headings.len());
    for (i, heading) in outline.headings.iter().enumerate() {
        let indent = "  ".repeat(usize::from(heading.level.number() - 1));
        println!("  {i:>3}  {indent}{} {}", heading.level, heading.label);
    }
    println!("Landmarks: {}", outline.landmarks.len());
    for landmark in &outline.landmarks {
        let hidden = if landmark.visible { "" } else { " (hidden)" };
        if landmark.name.is_empty() {
            println!("  {}{hidden}", landmark.role);
        } else {
            println!("  {} \"{}\"{hidden}", landmark.role, landmark.name);
        }
    }

    Ok(())
}
