use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use iptv_guide_lib::cache::CachedSchedule;
use iptv_guide_lib::channel::{load_channels, Channel};
use iptv_guide_lib::config::AppConfig;
use iptv_guide_lib::epg::{HttpSource, ProgressCallback, ScheduleStore, ScheduleTable};
use iptv_guide_lib::matching::{find_stream, pick_best, Fixture, MatchOutcome, MatchTarget};
use iptv_guide_lib::scores::ScoreService;
use iptv_guide_lib::xmltv_time::format_xmltv_datetime;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest guides and print what is on now and next per channel.
    /// With no URL, the configured guides are used.
    Epg {
        urls: Vec<String>,
        /// Drop the local guide cache and fetch fresh
        #[arg(long)]
        no_cache: bool,
        /// Only print these channel keys
        #[arg(short, long)]
        channel: Vec<String>,
    },
    /// Rank channel names for a sport and network
    Rank {
        #[arg(long, default_value = "")]
        sport: String,
        #[arg(long)]
        network: Option<String>,
        candidates: Vec<String>,
    },
    /// Find the best stream for a single fixture
    Match {
        /// JSON channel list (defaults to channels_path from config)
        #[arg(long)]
        channels: Option<PathBuf>,
        #[arg(long, default_value = "")]
        sport: String,
        #[arg(long, default_value = "")]
        league: String,
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
        #[arg(long)]
        network: Option<String>,
    },
    /// Fetch today's scoreboards and suggest a stream for each game
    Scores {
        #[arg(long)]
        channels: Option<PathBuf>,
        /// Only games in progress
        #[arg(long)]
        live: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = AppConfig::load()?;

    match args.command {
        Command::Epg { urls, no_cache, channel } => run_epg(&config, urls, no_cache, &channel).await,
        Command::Rank { sport, network, candidates } => {
            let target = MatchTarget {
                sport: &sport,
                network: network.as_deref(),
            };
            let outcome = pick_best(&candidates, &target, &config.scoring);
            print_outcome(&outcome, |name: &String| name.clone());
            Ok(())
        }
        Command::Match { channels, sport, league, home, away, network } => {
            let channels = channel_list(&config, channels)?;
            let fixture = Fixture {
                sport,
                league,
                home,
                away,
                network,
                start_time: None,
            };
            let outcome = find_stream(&fixture, &channels, &config.scoring);
            println!("{}", fixture.title());
            print_outcome(&outcome, describe_channel);
            Ok(())
        }
        Command::Scores { channels, live } => {
            let channels = channel_list(&config, channels)?;
            let games = ScoreService::new().fetch_fixtures().await?;
            for game in games.iter().filter(|g| !live || g.is_live()) {
                let outcome = find_stream(&game.fixture, &channels, &config.scoring);
                println!(
                    "[{}] {} {} ({})",
                    game.fixture.league,
                    game.fixture.title(),
                    game.state,
                    game.fixture.network.as_deref().unwrap_or("-")
                );
                print_outcome(&outcome, describe_channel);
            }
            Ok(())
        }
    }
}

fn channel_list(config: &AppConfig, path: Option<PathBuf>) -> Result<Vec<Channel>, anyhow::Error> {
    let path = path
        .or_else(|| config.channels_path.clone())
        .context("No channel list: pass --channels or set channels_path in config")?;
    load_channels(&path).with_context(|| format!("Failed to load channels from {}", path.display()))
}

fn describe_channel(channel: &Channel) -> String {
    format!("{} <{}>", channel.name, channel.url)
}

fn print_outcome<C>(outcome: &MatchOutcome<'_, C>, describe: impl Fn(&C) -> String) {
    match &outcome.best {
        Some(best) => println!("  best: {} (score {})", describe(best.candidate), best.score),
        None => {
            println!("  no match");
            return;
        }
    }
    for other in &outcome.fallback {
        println!("  also: {} (score {})", describe(other.candidate), other.score);
    }
}

async fn run_epg(
    config: &AppConfig,
    urls: Vec<String>,
    no_cache: bool,
    only: &[String],
) -> Result<(), anyhow::Error> {
    let urls = if urls.is_empty() { config.guide_urls() } else { urls };
    if urls.is_empty() {
        anyhow::bail!("No guide URL given and none configured");
    }

    let cached = if no_cache {
        CachedSchedule::invalidate();
        None
    } else {
        CachedSchedule::load()
            .filter(|c| !c.sources_changed(&urls) && !c.is_stale(config.auto_refresh_hours))
    };

    let table = match cached {
        Some(cached) => {
            info!(programs = cached.table.program_count(), "Using cached guide");
            Arc::new(cached.table)
        }
        None => {
            let store = ScheduleStore::new();
            let source = HttpSource::from_config(config);
            let progress: ProgressCallback = Arc::new(|fraction| {
                eprint!("\rLoading guide... {:>3.0}%", fraction * 100.0);
            });
            let outcome = store.refresh(&source, &urls, progress).await;
            eprintln!();
            for (url, error) in &outcome.failures {
                eprintln!("{url}\n{}", error.diagnostics());
            }

            let table = store.snapshot();
            if outcome.committed {
                if let Err(e) = CachedSchedule::new(urls.clone(), (*table).clone()).save() {
                    warn!(error = %e, "Could not write guide cache");
                }
            }
            table
        }
    };

    print_now_next(&table, only);
    Ok(())
}

fn print_now_next(table: &ScheduleTable, only: &[String]) {
    let now = Utc::now();
    let mut keys: Vec<&str> = table
        .channel_keys()
        .filter(|k| only.is_empty() || only.iter().any(|o| o == k))
        .collect();
    keys.sort_unstable();

    for key in keys {
        let now_title = table
            .current_program(key, now)
            .map(|p| format!("{} ({:.0}%)", p.title, p.progress_at(now) * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let next_title = table
            .next_program(key, now)
            .map(|p| format!("{} @ {}", p.title, format_xmltv_datetime(&p.start)))
            .unwrap_or_else(|| "-".to_string());
        println!("{key}\n  now:  {now_title}\n  next: {next_title}");
    }
    println!(
        "{} channels, {} programs",
        table.channel_count(),
        table.program_count()
    );
}
