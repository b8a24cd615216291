use anyhow::{Context, Result};
use chrono::{Local, Timelike, Utc};
use clap::Parser;
use tracing::{error, info};

mod cache;
mod config;
mod db;
mod error;
mod identity;
mod ids;
mod league;
mod processors;
mod providers;
mod schedule;
mod sports;

#[cfg(test)]
mod fixtures;

use cache::FileCache;
use config::Config;
use db::Database;
use league::{LeagueOrchestrator, OrchestratorOptions};
use providers::{HttpFetcher, ProviderRegistry};
use schedule::LeagueConfigStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let hour = Local::now().hour();
    if !config.in_window(hour) {
        info!(
            "Outside the {:02}:00-{:02}:00 run window (now {:02}h); nothing to do",
            config.window_start_hour, config.window_end_hour, hour
        );
        return Ok(());
    }

    let db_path = config.database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database opened: {}", db_path.display());

    let cache = FileCache::new(config.cache_root());
    let store = LeagueConfigStore::new(&config.base_path);

    let fetcher = HttpFetcher::new(config.http_timeout(), config.retry_policy())?;
    let registry =
        ProviderRegistry::standard(fetcher, &config.yahoo_base_url, &config.espn_base_url);
    // Without an explicit league only the ones with a schedule file run.
    let leagues = match config.league {
        Some(league) => vec![league],
        None => store.configured(&config.leagues()),
    };
    if leagues.is_empty() {
        info!(
            "No league schedules under {}; nothing to do",
            config.base_path.display()
        );
        return Ok(());
    }
    registry.validate(&leagues, &config.providers)?;
    info!(
        "Providers (in priority order): {}",
        config
            .providers
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let options = OrchestratorOptions {
        lookahead_days: config.lookahead_days,
        fetch_players: config.fetch_players,
        name_match_cutoff: config.name_match_cutoff,
    };

    let mut failed = 0;
    for league in leagues {
        let orchestrator = LeagueOrchestrator::new(
            league,
            &registry,
            &config.providers,
            cache.clone(),
            db.clone(),
            store.clone(),
            options,
        )?;
        match orchestrator.run(Local::now().date_naive(), Utc::now()).await {
            Ok(report) => info!(
                "{} done: {} date(s) caught up, {} boxscore(s), {} matchup(s), {} failure(s)",
                league,
                report.caught_up.len(),
                report.totals.boxscores,
                report.totals.matchups,
                report.totals.failed
            ),
            Err(e) => {
                error!("{} run failed: {:#}", league, e);
                failed += 1;
            }
        }
    }

    info!("{} game(s) stored in total", db.count_rows("games")?);

    if failed > 0 {
        anyhow::bail!("{} league run(s) failed", failed);
    }
    Ok(())
}
