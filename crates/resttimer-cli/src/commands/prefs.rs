use clap::Subcommand;

use resttimer_core::{Config, PreferenceGateway, PreferencePatch};

use crate::common::{preference_store, runtime, CliResult};

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print the current preferences as JSON
    Show {
        #[arg(long)]
        user: Option<String>,
    },
    /// Set one preference (e.g. "default_rest_time 120", "auto_start false")
    Set {
        key: String,
        value: String,
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(action: PrefsAction) -> CliResult {
    let config = Config::load_or_default();
    let rt = runtime()?;
    let gateway = PreferenceGateway::new(preference_store()?);

    match action {
        PrefsAction::Show { user } => {
            let user_id = user.unwrap_or(config.user.id);
            let prefs = rt.block_on(gateway.load(&user_id));
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        PrefsAction::Set { key, value, user } => {
            let user_id = user.unwrap_or(config.user.id);
            let patch = PreferencePatch::from_assignment(&key, &value)?;
            rt.block_on(async {
                gateway.load(&user_id).await;
                if let Some(pending) = gateway.save(&user_id, &patch) {
                    // the CLI exits right after, so wait for the write here
                    if let Err(e) = pending.await {
                        tracing::warn!(
                            user_id = %user_id,
                            error = %e,
                            "preference write did not finish"
                        );
                    }
                }
            });
            println!("{}", serde_json::to_string_pretty(&gateway.current())?);
        }
    }
    Ok(())
}
