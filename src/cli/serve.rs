use crate::api::{self, AppState};
use crate::assistant::Assistant;
use crate::cli::open_store;
use crate::error::{CaixaError, Result};
use crate::settings::load_settings;

pub fn run(bind: Option<String>) -> Result<()> {
    let settings = load_settings();
    let addr = bind.unwrap_or_else(|| settings.bind_addr.clone());

    // Migrate once up front so a bad data dir fails before we listen.
    drop(open_store(&settings)?);
    if settings.api_key().is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; the agent endpoint will answer with a fallback");
    }

    let state = AppState::new(settings.db_path(), Assistant::from_settings(&settings));
    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(api::serve(state, &addr))
        .map_err(|e| CaixaError::Other(format!("{e:#}")))
}
