use crate::matching::Fixture;
use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Scoreboards polled for fixtures: (endpoint, league tag, sport family)
pub const LEAGUES: &[(&str, &str, &str)] = &[
    ("football/nfl", "NFL", "football"),
    ("basketball/nba", "NBA", "basketball"),
    ("hockey/nhl", "NHL", "hockey"),
    ("baseball/mlb", "MLB", "baseball"),
    ("football/college-football", "NCAAF", "football"),
    ("basketball/mens-college-basketball", "NCAAB", "basketball"),
    ("soccer/usa.1", "MLS", "soccer"),
    ("soccer/eng.1", "EPL", "soccer"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct EspnResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnEvent {
    pub id: String,
    pub date: String, // ISO 8601 UTC, often without seconds ("2025-01-15T18:00Z")
    pub status: Option<EspnStatus>,
    #[serde(default)]
    pub competitions: Vec<EspnCompetition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: EspnStatusType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnStatusType {
    pub state: String, // "pre", "in", "post"
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnCompetition {
    #[serde(default)]
    pub competitors: Vec<EspnCompetitor>,
    pub broadcasts: Option<Vec<EspnBroadcast>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnBroadcast {
    pub market: Option<String>,
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnCompetitor {
    pub home_away: String, // "home" or "away"
    pub team: EspnTeam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeam {
    pub display_name: Option<String>, // "Chicago Bears"
    pub name: Option<String>,         // "Bears"
}

/// A scoreboard entry ready for stream matching
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFixture {
    pub id: String,
    /// "pre", "in" or "post"
    pub state: String,
    pub fixture: Fixture,
}

impl ScoredFixture {
    pub fn is_live(&self) -> bool {
        self.state == "in"
    }

    pub fn is_finished(&self) -> bool {
        self.state == "post"
    }
}

fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Scoreboards drop the seconds: "2025-01-15T18:00Z"
    chrono::NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// National broadcast first, any listed network otherwise
fn primary_network(broadcasts: Option<&Vec<EspnBroadcast>>) -> Option<String> {
    let broadcasts = broadcasts?;
    let national = broadcasts
        .iter()
        .filter(|b| b.market.as_deref() == Some("national"))
        .chain(broadcasts.iter())
        .flat_map(|b| b.names.iter().flatten())
        .find(|name| !name.trim().is_empty());
    national.cloned()
}

/// Convert one scoreboard response into fixtures. Events without both a home
/// and an away side are skipped.
pub fn fixtures_from_response(response: EspnResponse, league: &str, sport: &str) -> Vec<ScoredFixture> {
    let mut fixtures = Vec::new();

    for event in response.events.unwrap_or_default() {
        let Some(comp) = event.competitions.first() else {
            continue;
        };
        let home = comp.competitors.iter().find(|c| c.home_away == "home");
        let away = comp.competitors.iter().find(|c| c.home_away == "away");

        if let (Some(h), Some(a)) = (home, away) {
            let team_name = |c: &EspnCompetitor| {
                c.team
                    .display_name
                    .clone()
                    .or_else(|| c.team.name.clone())
                    .unwrap_or_default()
            };

            fixtures.push(ScoredFixture {
                id: event.id.clone(),
                state: event
                    .status
                    .as_ref()
                    .map(|s| s.status_type.state.clone())
                    .unwrap_or_else(|| "pre".to_string()),
                fixture: Fixture {
                    sport: sport.to_string(),
                    league: league.to_string(),
                    home: team_name(h),
                    away: team_name(a),
                    network: primary_network(comp.broadcasts.as_ref()),
                    start_time: parse_event_time(&event.date),
                },
            });
        }
    }

    fixtures
}

pub struct ScoreService {
    client: Client,
}

impl ScoreService {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Today's fixtures across every league in [`LEAGUES`]. A league that
    /// fails to load is logged and skipped.
    pub async fn fetch_fixtures(&self) -> Result<Vec<ScoredFixture>> {
        let mut all = Vec::new();

        for (endpoint, league, sport) in LEAGUES {
            let url = format!(
                "http://site.api.espn.com/apis/site/v2/sports/{}/scoreboard",
                endpoint
            );

            let response = match self.client.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(league, error = %e, "Scoreboard request failed");
                    continue;
                }
            };

            match response.json::<EspnResponse>().await {
                Ok(json) => {
                    let fixtures = fixtures_from_response(json, league, sport);
                    debug!(league, count = fixtures.len(), "Loaded scoreboard");
                    all.extend(fixtures);
                }
                Err(e) => warn!(league, error = %e, "Scoreboard JSON invalid"),
            }
        }

        Ok(all)
    }
}

impl Default for ScoreService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SCOREBOARD: &str = r#"{
        "events": [
            {
                "id": "401",
                "date": "2025-01-15T18:00Z",
                "status": {"type": {"state": "in"}},
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "team": {"displayName": "Boston Celtics", "name": "Celtics"}},
                        {"homeAway": "away", "team": {"displayName": "New York Knicks"}}
                    ],
                    "broadcasts": [
                        {"market": "home", "names": ["NBCS-BOS"]},
                        {"market": "national", "names": ["ESPN"]}
                    ]
                }]
            },
            {
                "id": "402",
                "date": "2025-01-15T20:30:00Z",
                "competitions": [{
                    "competitors": [{"homeAway": "home", "team": {"name": "Suns"}}]
                }]
            },
            {
                "id": "403",
                "date": "not a date",
                "status": {"type": {"state": "post"}},
                "competitions": [{
                    "competitors": [
                        {"homeAway": "away", "team": {"name": "Lakers"}},
                        {"homeAway": "home", "team": {"name": "Jazz"}}
                    ]
                }]
            }
        ]
    }"#;

    #[test]
    fn test_fixtures_from_scoreboard() {
        let response: EspnResponse = serde_json::from_str(SCOREBOARD).unwrap();
        let fixtures = fixtures_from_response(response, "NBA", "basketball");
        assert_eq!(fixtures.len(), 2);

        let live = &fixtures[0];
        assert!(live.is_live());
        assert_eq!(live.fixture.home, "Boston Celtics");
        assert_eq!(live.fixture.away, "New York Knicks");
        assert_eq!(live.fixture.network.as_deref(), Some("ESPN"));
        assert_eq!(
            live.fixture.start_time,
            Some(Utc.with_ymd_and_hms(2025, 1, 15, 18, 0, 0).unwrap())
        );

        let done = &fixtures[1];
        assert!(done.is_finished());
        assert_eq!(done.fixture.home, "Jazz");
        assert_eq!(done.fixture.network, None);
        assert_eq!(done.fixture.start_time, None);
    }

    #[test]
    fn test_event_time_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 15, 20, 30, 0).unwrap();
        assert_eq!(parse_event_time("2025-01-15T20:30:00Z"), Some(expected));
        assert_eq!(parse_event_time("2025-01-15T20:30Z"), Some(expected));
    }

    #[test]
    fn test_empty_scoreboard() {
        let response: EspnResponse = serde_json::from_str("{}").unwrap();
        assert!(fixtures_from_response(response, "NFL", "football").is_empty());
    }
}
