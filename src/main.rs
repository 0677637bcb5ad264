use dotenvy::dotenv;
use slicewise::{
    config::{database, env::ExplanationSettings, scenario},
    core::{
        drafts,
        explain::{ExplanationOutcome, Explainer},
        report::{RoundSummary, format_currency, format_percent, render_cap_table},
        session::CapTableSession,
    },
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();

    // 3. Build the session from the scenario; sample data only when no
    //    scenario file exists at all
    let loaded = scenario::load_default_config()
        .inspect_err(|e| error!("Failed to load scenario: {}", e))?;
    let (session, default_style) = match loaded {
        Some(config) => {
            let session = config
                .build_session()
                .inspect_err(|e| error!("Scenario is invalid: {}", e))?;
            (session, config.explanation_style.unwrap_or_default())
        }
        None => {
            info!("No scenario file found; using sample data");
            let mut session = CapTableSession::new();
            session.load_sample_data()?;
            (session, Default::default())
        }
    };
    let settings = ExplanationSettings::from_env(default_style)?;
    info!(
        total_shares = session.total_shares(),
        style = %settings.style,
        "Cap table ready"
    );

    println!("{}", render_cap_table(session.ownership()));

    // 4. Explain the most recent round
    if let Some(round) = session.funding_rounds().last() {
        let explainer = Explainer::default().with_fallback_message(&settings.fallback_message);
        println!("{}\n", RoundSummary::new(round, &session));
        match explainer.explain_round(round, &session, settings.style).await {
            ExplanationOutcome::Applied { text, .. } => println!("{text}\n"),
            ExplanationOutcome::Stale { sequence } => {
                warn!(sequence, "Explanation superseded before it arrived");
            }
        }
    }

    // 5. Show saved drafts
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to open draft store: {}", e))?;
    database::create_tables(&db).await?;

    let saved = drafts::list_drafts(&db).await?;
    info!(count = saved.len(), "Loaded saved round drafts");
    for draft in saved {
        println!(
            "Draft #{}: {} raising {} at {} pre-money ({} equity)",
            draft.id,
            draft.name,
            format_currency(draft.amount),
            format_currency(draft.valuation),
            format_percent(draft.ownership_percentage)
        );
    }

    Ok(())
}
