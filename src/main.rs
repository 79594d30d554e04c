//! CLI entry point for `mailboard`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailboard::config::{self, Config};
use mailboard::handler::{InboundHandler, Notifier, Outcome};
use mailboard::ingest::classify::classify;
use mailboard::model::body::DecodedBody;
use mailboard::model::envelope::EmailAddress;
use mailboard::model::part::PartSource;
use mailboard::notify::{FileNotifier, LogNotifier};
use mailboard::parser::{header, mime};
use mailboard::reply::OutboxReplySender;
use mailboard::store::JsonlBoardStore;

#[derive(Parser)]
#[command(
    name = "mailboard",
    version,
    about = "Inbound email ingestion: extract, classify, store and notify"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and decode the plain-text body of a raw message
    Extract {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Classify a subject line
    Classify {
        subject: String,
        #[arg(long)]
        json: bool,
    },
    /// Handle one raw message: store, notify and reply
    Ingest {
        path: PathBuf,
        /// Sender address (defaults to the message's From header)
        #[arg(long)]
        from: Option<String>,
        /// Recipient address (defaults to the message's To header)
        #[arg(long)]
        to: Option<String>,
        /// Subject line (defaults to the message's Subject header)
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Handle every .eml file in a directory
    Batch { dir: PathBuf },
    /// List message-board records
    Board {
        /// Show only the most recent N records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file location
        #[arg(long)]
        write: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

type Handler = InboundHandler<JsonlBoardStore, Box<dyn Notifier>, OutboxReplySender>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Extract { path, json } => cmd_extract(&path, json),
        Commands::Classify { subject, json } => cmd_classify(&subject, json, &config),
        Commands::Ingest {
            path,
            from,
            to,
            subject,
            json,
        } => cmd_ingest(&path, from, to, subject, json, &config),
        Commands::Batch { dir } => cmd_batch(&dir, &config),
        Commands::Board { limit, json } => cmd_board(limit, json, &config),
        Commands::Config { write } => cmd_config(write, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailboard.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Build the inbound handler with the collaborators named in the config.
fn build_handler(config: &Config) -> Handler {
    let notifier: Box<dyn Notifier> = match &config.notify.log_path {
        Some(path) => Box::new(FileNotifier::new(path)),
        None => Box::new(LogNotifier),
    };
    InboundHandler::new(
        config,
        JsonlBoardStore::new(config::board_path(config)),
        notifier,
        OutboxReplySender::new(config::outbox_dir(config)),
    )
}

/// Extract the body of a raw message and print it.
fn cmd_extract(path: &Path, json: bool) -> anyhow::Result<()> {
    let raw = header::read_raw(path)?;
    let extraction = mime::extract(&raw);

    if json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    let source = match extraction.part.source {
        PartSource::Part(index) => format!("part {index}"),
        PartSource::Fallback => "fallback (after first blank line)".to_string(),
    };
    let status = match &extraction.body {
        DecodedBody::Decoded(_) => "decoded",
        DecodedBody::Degraded(_) => "degraded",
    };

    println!();
    println!("  {:<12} {}", "Source", source);
    println!("  {:<12} {}", "Encoding", extraction.part.transfer_encoding);
    println!("  {:<12} {}", "Charset", extraction.part.charset);
    println!("  {:<12} {}", "Status", status);
    println!("  {}", "-".repeat(72));
    println!("{}", extraction.text());
    Ok(())
}

/// Classify a subject line and print the result.
fn cmd_classify(subject: &str, json: bool, config: &Config) -> anyhow::Result<()> {
    let classification = classify(subject, &config.ingest.board_marker);
    let nickname = classification.display_nickname(&config.ingest.default_nickname);

    if json {
        let output = serde_json::json!({
            "subject": subject,
            "category": classification.category,
            "nickname": classification.nickname,
            "display_nickname": nickname,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("  {:<12} {}", "Category", classification.category);
        println!("  {:<12} {}", "Nickname", nickname);
    }
    Ok(())
}

/// Handle a single raw message end to end.
fn cmd_ingest(
    path: &Path,
    from: Option<String>,
    to: Option<String>,
    subject: Option<String>,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut mail = header::inbound_from_raw(header::read_raw(path)?);
    if let Some(from) = from {
        mail.sender = EmailAddress::parse(&from);
    }
    if let Some(to) = to {
        mail.recipient = EmailAddress::parse(&to);
    }
    if let Some(subject) = subject {
        mail.subject = subject;
    }

    let handler = build_handler(config);
    let report = handler.handle(&mail);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let classification = &report.ingested.classification;
    println!();
    println!("  {:<12} {}", "From", mail.sender);
    println!("  {:<12} {}", "Subject", mail.subject);
    println!("  {:<12} {}", "Category", classification.category);
    println!(
        "  {:<12} {}",
        "Nickname",
        classification.display_nickname(&config.ingest.default_nickname)
    );
    println!("  {:<12} {}", "Stored", outcome_label(&report.stored));
    println!("  {:<12} {}", "Notified", outcome_label(&report.notified));
    println!("  {:<12} {}", "Replied", outcome_label(&report.replied));
    println!("  {}", "-".repeat(72));
    println!("{}", report.ingested.clean_content);
    println!();
    Ok(())
}

/// Handle every `.eml` file in a directory, in name order.
fn cmd_batch(dir: &Path, config: &Config) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("eml"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        println!("  No .eml files found in {}", dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Ingesting [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let handler = build_handler(config);
    let start = Instant::now();
    let mut board = 0usize;
    let mut degraded = 0usize;
    let mut failures = 0usize;
    let mut unreadable = 0usize;

    for (i, path) in files.iter().enumerate() {
        pb.set_position(i as u64);
        let raw = match header::read_raw(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                unreadable += 1;
                continue;
            }
        };

        let report = handler.handle(&header::inbound_from_raw(raw));
        if report.ingested.classification.category.is_board() {
            board += 1;
        }
        if report.ingested.body().is_degraded() {
            degraded += 1;
        }
        failures += [&report.stored, &report.notified, &report.replied]
            .iter()
            .filter(|o| matches!(o, Outcome::Failed(_)))
            .count();
    }
    pb.finish_and_clear();

    println!();
    println!("  {:<25} {}", "Messages", files.len());
    println!("  {:<25} {}", "Board submissions", board);
    println!("  {:<25} {}", "Degraded bodies", degraded);
    println!("  {:<25} {}", "Collaborator failures", failures);
    println!("  {:<25} {}", "Unreadable files", unreadable);
    println!("  {:<25} {:.2?}", "Elapsed", start.elapsed());
    println!();
    Ok(())
}

/// List stored board records, oldest first.
fn cmd_board(limit: Option<usize>, json: bool, config: &Config) -> anyhow::Result<()> {
    let store = JsonlBoardStore::new(config::board_path(config));
    let mut records = store.list()?;
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!();
    println!("  {} record(s) in {}", records.len(), store.path().display());
    println!();
    if records.is_empty() {
        return Ok(());
    }

    println!("  {:<17} {:<16} {:<40}", "Date", "Nickname", "Content");
    println!("  {}", "-".repeat(75));
    for record in &records {
        let date = record.received_at.format("%Y-%m-%d %H:%M").to_string();
        let nick: String = record.nickname.chars().take(15).collect();
        let content: String = record
            .content
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .take(40)
            .collect();
        println!("  {:<17} {:<16} {:<40}", date, nick, content);
    }
    println!();
    Ok(())
}

/// Print (and optionally save) the effective configuration.
fn cmd_config(write: bool, config: &Config) -> anyhow::Result<()> {
    if write {
        config::save_config(config)?;
        if let Some(path) = config::config_file_path() {
            println!("  Wrote {}", path.display());
        }
        return Ok(());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailboard", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Delivered => "yes".to_string(),
        Outcome::Skipped => "skipped".to_string(),
        Outcome::Failed(e) => format!("failed ({e})"),
    }
}
