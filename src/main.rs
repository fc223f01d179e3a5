use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commit_diffstat::{
    Changeset, CommitDiffstatError, DiffStat, FilePatchSource, STDIN, diffstat,
    diffstat_unless_merge, payload_for_changeset, read_input,
};
use log::LevelFilter;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "commit-diffstat")]
#[command(about = "Diff statistics for hg export and git extended-diff patches")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count changed files, insertions and deletions in patches
    Stat {
        /// Patch files to read ("-" or nothing reads stdin)
        inputs: Vec<String>,
        /// Print each result as JSON
        #[arg(long)]
        json: bool,
        /// Report export patches with two parents as merges instead of counting them
        #[arg(long)]
        skip_merges: bool,
    },
    /// Build the push telemetry payload for a changeset
    Payload {
        /// Changeset metadata in hgweb json-rev format
        #[arg(long)]
        changeset: String,
        /// Export patch of the changeset
        #[arg(long)]
        patch: PathBuf,
        /// URL of the repository the changeset was pushed to
        #[arg(long)]
        repo_url: String,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the man page
    Man,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(cli.command)?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(command: Commands) -> Result<(), CommitDiffstatError> {
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Stat {
            inputs,
            json,
            skip_merges,
        } => {
            let inputs = if inputs.is_empty() {
                vec![STDIN.to_string()]
            } else {
                inputs
            };
            let labelled = inputs.len() > 1;
            // stdin can only be drained once; later "-" inputs reuse it
            let mut stdin_text: Option<String> = None;

            for input in &inputs {
                let text = if input == STDIN {
                    if stdin_text.is_none() {
                        stdin_text = Some(read_input(input)?);
                    }
                    stdin_text.clone().unwrap_or_default()
                } else {
                    read_input(input)?
                };
                let label = labelled.then_some(input.as_str());
                let line = stat_line(label, &text, json, skip_merges)?;
                writeln!(stdout, "{line}").map_err(output_error)?;
            }
        }
        Commands::Payload {
            changeset,
            patch,
            repo_url,
        } => {
            let changeset = Changeset::from_json(&read_input(&changeset)?)?;
            let source = FilePatchSource::new(patch);
            log::info!(
                "building payload for {} from {}",
                changeset.node,
                source.path().display()
            );
            let payload = payload_for_changeset(&changeset, &repo_url, &source)?;
            let json = serde_json::to_string_pretty(&payload).map_err(output_error)?;
            writeln!(stdout, "{json}").map_err(output_error)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "commit-diffstat", &mut stdout);
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command())
                .render(&mut stdout)
                .map_err(output_error)?;
        }
    }

    Ok(())
}

/// One output line of `stat`: the summary (or JSON), prefixed with the input
/// name when several inputs are reported
fn stat_line(
    label: Option<&str>,
    text: &str,
    json: bool,
    skip_merges: bool,
) -> Result<String, CommitDiffstatError> {
    let stat = if skip_merges {
        diffstat_unless_merge(text)
    } else {
        Some(diffstat(text))
    };
    log::info!("{}: {stat:?}", label.unwrap_or(STDIN));

    let line = if json {
        serde_json::to_string(&stat).map_err(output_error)?
    } else {
        render(stat)
    };
    Ok(match label {
        Some(label) => format!("{label}: {line}"),
        None => line,
    })
}

fn render(stat: Option<DiffStat>) -> String {
    match stat {
        Some(stat) => stat.to_string(),
        None => "merge".to_string(),
    }
}

fn output_error(e: impl std::fmt::Display) -> CommitDiffstatError {
    CommitDiffstatError::OutputError {
        message: e.to_string(),
    }
}
