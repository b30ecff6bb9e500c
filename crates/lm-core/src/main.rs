use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use lm_core::config::Config;
use lm_core::render::{render_history, render_result, render_signs, terminal_width};
use lm_core::repl::{run_interactive, ReplOptions};
use lm_core::scoring::RandomDraws;
use lm_core::session::Session;
use lm_core::share::{target_for, PrintShare, ShareTarget};
use lm_core::style::Style;
use lm_protocol::{Party, PersonDraft, ValidationError};
use lm_storage::{FileStore, HistoryStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for missing or invalid input.
const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "lovematch")]
#[command(about = "AI 恋爱契合度测试: a zodiac compatibility score for two people")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "LOVEMATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the saved history (overrides config)
    #[arg(long, global = true, env = "LOVEMATCH_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Show results immediately instead of pausing for analysis
    #[arg(long, global = true)]
    no_delay: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default)
    Play,
    /// Score two people once and save the result
    Score(ScoreArgs),
    /// Show or clear saved results
    History {
        /// Delete all saved results
        #[arg(long)]
        clear: bool,
        /// Skip the confirmation prompt when clearing
        #[arg(long, short)]
        yes: bool,
        /// Print the stored records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the zodiac signs
    Signs,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    #[arg(long, default_value = "")]
    name1: String,
    #[arg(long, default_value = "")]
    age1: String,
    /// Chinese name, English name, or 1-12
    #[arg(long, default_value = "")]
    zodiac1: String,
    #[arg(long, default_value = "")]
    name2: String,
    #[arg(long, default_value = "")]
    age2: String,
    /// Chinese name, English name, or 1-12
    #[arg(long, default_value = "")]
    zodiac2: String,
    /// Share the result after scoring
    #[arg(long)]
    share: bool,
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn share_target(config: &Config) -> Box<dyn ShareTarget> {
    match target_for(&config.share, io::stdout().is_terminal()) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("warning: {e}, printing instead");
            Box::new(PrintShare::new(io::stdout()))
        }
    }
}

fn confirm_clear() -> io::Result<bool> {
    eprint!("确定要清除所有历史记录吗？(y/N) ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn report_validation_error(e: &ValidationError) {
    eprintln!("error: {e}");
    if let ValidationError::Incomplete { missing } = e {
        for (party, field) in missing {
            eprintln!("  missing: {party} {field}");
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref());
    init_logging(&config.logging.filter);

    let store_dir = cli
        .store_dir
        .clone()
        .unwrap_or_else(|| config.storage.resolve_dir());
    debug!(dir = %store_dir.display(), "using store");

    let history = HistoryStore::load(FileStore::new(&store_dir));
    let delay = if cli.no_delay {
        Duration::ZERO
    } else {
        config.analysis.delay()
    };
    let mut session =
        Session::new(history, RandomDraws(StdRng::from_entropy())).with_delay(delay);
    let style = Style::new();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create async runtime: {e}");
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            let mut share = share_target(&config);
            let options = ReplOptions {
                style,
                term_width: terminal_width(),
            };
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            let result = runtime.block_on(run_interactive(
                &mut session,
                &mut input,
                &mut out,
                share.as_mut(),
                options,
            ));
            if let Err(e) = result {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Command::Score(args) => {
            session.set_draft(
                Party::First,
                PersonDraft::new(args.name1, args.age1, args.zodiac1),
            );
            session.set_draft(
                Party::Second,
                PersonDraft::new(args.name2, args.age2, args.zodiac2),
            );
            let outcome = match runtime.block_on(session.submit()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    report_validation_error(&e);
                    std::process::exit(EXIT_INVALID_INPUT);
                }
            };
            println!("{}", render_result(&outcome.result, terminal_width(), &style));
            if let Some(e) = outcome.persist_error {
                eprintln!("warning: result not saved: {e}");
            }
            if args.share {
                let mut share = share_target(&config);
                match session.share(share.as_mut()) {
                    Ok(Some(shared)) => {
                        let message = shared.message();
                        if !message.is_empty() {
                            eprintln!("{message}");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        eprintln!("error: {e}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Command::History { clear, yes, json } => {
            if clear {
                let confirmed = yes
                    || match confirm_clear() {
                        Ok(answer) => answer,
                        Err(e) => {
                            eprintln!("error: failed to read confirmation: {e}");
                            std::process::exit(1);
                        }
                    };
                match session.clear_history(confirmed) {
                    Ok(true) => eprintln!("历史记录已清除"),
                    Ok(false) => eprintln!("已取消"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        std::process::exit(1);
                    }
                }
            } else if json {
                match serde_json::to_string_pretty(session.history()) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                print!("{}", render_history(session.history(), &style));
            }
        }
        Command::Signs => println!("{}", render_signs()),
    }
}
