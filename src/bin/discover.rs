//! Thin CLI exerciser: wires the engine with in-memory/stub collaborators,
//! runs one entity through N passes, prints the resulting report as JSON.

use clap::Parser;
use discovery_engine::collaborators::{FetchResult, InMemoryScraper, SearchHit, StaticLanguageModel};
use discovery_engine::config::{EngineConfig, Tier};
use discovery_engine::entity::Entity;
use discovery_engine::episode::InMemoryEpisodeStore;
use discovery_engine::orchestrator::MultiPassOrchestrator;
use discovery_engine::seeder::TemplateHypothesisSeeder;
use discovery_engine::signal_log::InMemorySignalLog;
use discovery_engine::temporal::TemporalPriorService;
use discovery_engine::Result;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "discover", about = "Run the procurement discovery engine against one entity")]
struct Args {
    /// Opaque entity id, e.g. "arsenal-fc".
    #[arg(long)]
    entity_id: String,

    /// Human-readable entity name used in hypothesis statements.
    #[arg(long)]
    display_name: String,

    /// Subscription tier, controls pass count and seed template depth.
    #[arg(long, value_enum, default_value = "standard")]
    tier: CliTier,

    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliTier {
    Basic,
    Standard,
    Premium,
}

impl From<CliTier> for Tier {
    fn from(t: CliTier) -> Self {
        match t {
            CliTier::Basic => Tier::Basic,
            CliTier::Standard => Tier::Standard,
            CliTier::Premium => Tier::Premium,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    discovery_engine::telemetry::init();

    let args = Args::parse();
    let tier: Tier = args.tier.into();
    let config = EngineConfig::builder()
        .tier(tier)
        .max_passes(tier.default_max_passes())
        .build()?;

    info!(entity_id = %args.entity_id, tier = ?tier, "starting discovery run");

    let orchestrator = MultiPassOrchestrator::builder()
        .config(config)
        .scraper(Arc::new(stub_scraper()))
        .llm(Arc::new(stub_llm()))
        .episode_store(Arc::new(InMemoryEpisodeStore::new()))
        .signal_log(Arc::new(InMemorySignalLog::new()))
        .temporal(Arc::new(TemporalPriorService::from_map(HashMap::new())))
        .seeder(Arc::new(TemplateHypothesisSeeder))
        .build()?;

    let entity = Entity::new(args.entity_id, args.display_name);
    let cancel = AtomicBool::new(false);
    let report = orchestrator.run(&entity, &cancel).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(discovery_engine::Error::Serialization)?;
    println!("{json}");

    Ok(())
}

/// No real scraping transport ships with this crate (Non-goal); this
/// fixture gives the binary something to chew on out of the box.
fn stub_scraper() -> InMemoryScraper {
    InMemoryScraper::new()
        .with_search(
            "modernize platform",
            vec![SearchHit {
                title: "Press release".to_string(),
                url: "https://example.com/press".to_string(),
                snippet: "announcement".to_string(),
            }],
        )
        .with_fetch(
            "https://example.com/press",
            FetchResult {
                markdown: "The club announced a new partnership to modernize its technology stack."
                    .to_string(),
                fetched_at: chrono::Utc::now(),
                content_hash: None,
            },
        )
}

/// No real LLM transport ships with this crate (Non-goal); a canned
/// ACCEPT keeps the exerciser useful without network access.
fn stub_llm() -> StaticLanguageModel {
    StaticLanguageModel::new(
        serde_json::json!({
            "is_new": true,
            "entity_specific": true,
            "implies_future_procurement": true,
            "credible_source": true,
            "reasoning": "stub response for local exercising"
        })
        .to_string(),
    )
    .with_response(
        "Confirm or refute",
        serde_json::json!({"confirmed": true, "reasoning": "stub confirmation"}).to_string(),
    )
}
