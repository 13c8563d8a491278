use clap::Subcommand;

use resttimer_core::{Config, HistoryLog};

use crate::common::{runtime, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded rest intervals, newest last
    List {
        /// Only intervals for this exercise
        #[arg(long)]
        exercise: Option<String>,
        /// Show at most this many
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print the history file location
    Path,
}

pub fn run(action: HistoryAction) -> CliResult {
    let config = Config::load_or_default();
    let log = HistoryLog::new(config.history_path()?);

    match action {
        HistoryAction::List { exercise, limit } => {
            let records = runtime()?.block_on(log.read_all())?;
            let matching: Vec<_> = records
                .into_iter()
                .filter(|r| match (&exercise, &r.context) {
                    (Some(name), Some(ctx)) => ctx.exercise_name.eq_ignore_ascii_case(name),
                    (Some(_), None) => false,
                    (None, _) => true,
                })
                .collect();
            let skip = matching.len().saturating_sub(limit);
            let shown = &matching[skip..];
            println!("{}", serde_json::to_string_pretty(shown)?);
        }
        HistoryAction::Path => println!("{}", log.path().display()),
    }
    Ok(())
}
