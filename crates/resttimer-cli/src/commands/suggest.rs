use clap::Args;
use std::sync::Arc;

use resttimer_core::{
    Config, FixedBaseline, HistoryBaselineSource, HistoryLog, PreferenceGateway, SuggestionEngine,
};

use crate::common::{preference_store, runtime, CliResult, ContextArgs};

#[derive(Args)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub context: ContextArgs,
    /// Use this historical baseline (seconds) instead of the recorded history
    #[arg(long)]
    pub baseline: Option<u32>,
    /// User id (defaults to config user.id)
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(args: SuggestArgs) -> CliResult {
    let config = Config::load_or_default();
    let user_id = args.user.unwrap_or_else(|| config.user.id.clone());
    let context = args.context.to_context();
    context.validate()?;

    let rt = runtime()?;
    let set = rt.block_on(async {
        let gateway = PreferenceGateway::new(preference_store()?);
        let prefs = gateway.load(&user_id).await;
        let engine = match args.baseline {
            Some(secs) => SuggestionEngine::new(Arc::new(FixedBaseline(Some(secs)))),
            None => SuggestionEngine::new(Arc::new(HistoryBaselineSource::new(
                HistoryLog::new(config.history_path()?),
                config.analytics.history_window,
            ))),
        };
        let set = engine.suggest(&user_id, &context, &prefs).await;
        Ok::<_, Box<dyn std::error::Error>>(set)
    })?;

    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}
