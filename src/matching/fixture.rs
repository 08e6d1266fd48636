use super::banner::is_banner;
use super::score::{rank_candidates, MatchOutcome, MatchTarget, Ranked, ScoringConfig};
use super::tokenize::{marker_words, tokenize};
use crate::channel::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A scheduled game to find a stream for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Sport family, e.g. "basketball"
    pub sport: String,
    /// League tag as providers write it in channel names, e.g. "NBA"
    pub league: String,
    pub home: String,
    pub away: String,
    /// National broadcaster, if known
    pub network: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
}

impl Fixture {
    pub fn title(&self) -> String {
        format!("{} @ {}", self.away, self.home)
    }

    pub fn team_tokens(&self) -> HashSet<String> {
        tokenize(&self.home)
            .into_iter()
            .chain(tokenize(&self.away))
            .collect()
    }

    /// Tag used for the sport bonus: the league when present, the sport otherwise
    pub fn sport_tag(&self) -> &str {
        if self.league.trim().is_empty() {
            &self.sport
        } else {
            &self.league
        }
    }
}

/// How strongly a channel name points at a fixture: distinct teams named,
/// then team tokens shared. Compared before the quality score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
struct TeamRelevance {
    teams: usize,
    tokens: usize,
}

fn team_relevance(name: &str, home: &HashSet<String>, away: &HashSet<String>) -> TeamRelevance {
    let tokens: HashSet<String> = tokenize(name).into_iter().collect();
    let shared = |team: &HashSet<String>| tokens.intersection(team).count();
    let (home_hits, away_hits) = (shared(home), shared(away));
    TeamRelevance {
        teams: usize::from(home_hits > 0) + usize::from(away_hits > 0),
        tokens: tokens.iter().filter(|t| home.contains(*t) || away.contains(*t)).count(),
    }
}

/// Find streams for a fixture.
///
/// Candidates are non-banner channels sharing a meaningful token with either
/// team. If none do, channels naming the fixture's network are used instead.
/// Channels naming both teams rank above those naming one (a shared city
/// alone is weak evidence); within equal relevance [`rank_candidates`]
/// decides. Indices refer to `channels`.
pub fn find_stream<'c>(
    fixture: &Fixture,
    channels: &'c [Channel],
    config: &ScoringConfig,
) -> MatchOutcome<'c, Channel> {
    let home: HashSet<String> = tokenize(&fixture.home).into_iter().collect();
    let away: HashSet<String> = tokenize(&fixture.away).into_iter().collect();

    let mut pool: Vec<(usize, &'c Channel, TeamRelevance)> = channels
        .iter()
        .enumerate()
        .filter(|(_, c)| !is_banner(&c.name))
        .map(|(i, c)| (i, c, team_relevance(&c.name, &home, &away)))
        .filter(|(_, _, relevance)| relevance.teams > 0)
        .collect();

    if pool.is_empty() {
        if let Some(network) = fixture.network.as_deref() {
            let wanted = format!(" {} ", marker_words(network).join(" "));
            pool = channels
                .iter()
                .enumerate()
                .filter(|(_, c)| !is_banner(&c.name))
                .filter(|(_, c)| {
                    format!(" {} ", marker_words(&c.name).join(" ")).contains(&wanted)
                })
                .map(|(i, c)| (i, c, TeamRelevance::default()))
                .collect();
        }
    }

    debug!(fixture = %fixture.title(), candidates = pool.len(), "Smart search pool");

    let target = MatchTarget {
        sport: fixture.sport_tag(),
        network: fixture.network.as_deref(),
    };
    let names: Vec<&'c Channel> = pool.iter().map(|(_, c, _)| *c).collect();
    let mut ranked = rank_candidates(&names, &target, config);
    // Stable, so equal relevance keeps the score order
    ranked.sort_by(|a, b| pool[b.index].2.cmp(&pool[a.index].2));

    let mut ranked = ranked.into_iter().map(|r| Ranked {
        candidate: *r.candidate,
        index: pool[r.index].0,
        score: r.score,
        banner: r.banner,
    });

    let best = ranked.next();
    MatchOutcome {
        best,
        fallback: ranked.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str) -> Channel {
        Channel {
            name: name.to_string(),
            url: format!("http://example.com/{}", name.len()),
            epg_channel_id: None,
        }
    }

    fn fixture(home: &str, away: &str, network: Option<&str>) -> Fixture {
        Fixture {
            sport: "basketball".to_string(),
            league: "NBA".to_string(),
            home: home.to_string(),
            away: away.to_string(),
            network: network.map(str::to_string),
            start_time: None,
        }
    }

    #[test]
    fn test_team_tokens() {
        let f = fixture("Duke Blue Devils", "North Carolina Tar Heels", None);
        let tokens = f.team_tokens();
        assert!(tokens.contains("duke"));
        assert!(tokens.contains("carolina"));
        assert!(!tokens.contains("north carolina"));
    }

    #[test]
    fn test_team_match_ranked_by_quality() {
        let channels = vec![
            channel("NBA 01: Celtics x Knicks SD"),
            channel("★★★ NBA GAMES ★★★"),
            channel("NBA 02: Celtics x Knicks FHD"),
            channel("Lakers x Suns"),
        ];
        let f = fixture("Boston Celtics", "New York Knicks", None);
        let outcome = find_stream(&f, &channels, &ScoringConfig::default());

        let best = outcome.best.unwrap();
        assert_eq!(best.index, 2);
        assert_eq!(outcome.fallback.len(), 1);
        assert_eq!(outcome.fallback[0].index, 0);
    }

    #[test]
    fn test_both_teams_beat_shared_city() {
        let channels = vec![
            channel("NHL: Boston Bruins FHD"),
            channel("NBA: Celtics x Knicks"),
        ];
        let f = fixture("Boston Celtics", "New York Knicks", None);
        let outcome = find_stream(&f, &channels, &ScoringConfig::default());

        let best = outcome.best.unwrap();
        assert_eq!(best.candidate.name, "NBA: Celtics x Knicks");
        assert_eq!(outcome.fallback.len(), 1);
        assert_eq!(outcome.fallback[0].index, 0);
    }

    #[test]
    fn test_more_team_tokens_win_over_quality() {
        let channels = vec![
            channel("US| Boston Sports FHD"),
            channel("Boston Celtics Live"),
        ];
        let f = fixture("Boston Celtics", "New York Knicks", None);
        let outcome = find_stream(&f, &channels, &ScoringConfig::default());
        assert_eq!(outcome.best.unwrap().index, 1);
        assert_eq!(outcome.fallback[0].index, 0);
    }

    #[test]
    fn test_network_fallback_when_no_team_channel() {
        let channels = vec![
            channel("ESPN Deportes (ES)"),
            channel("US| ESPN FHD"),
            channel("Cartoon Network"),
        ];
        let f = fixture("Duke", "Virginia", Some("ESPN"));
        let outcome = find_stream(&f, &channels, &ScoringConfig::default());
        assert_eq!(outcome.best.unwrap().index, 1);
        assert_eq!(outcome.fallback.len(), 1);
        assert_eq!(outcome.fallback[0].index, 0);
    }

    #[test]
    fn test_no_match() {
        let channels = vec![channel("Cartoon Network"), channel("HGTV")];
        let f = fixture("Duke", "Virginia", None);
        assert!(find_stream(&f, &channels, &ScoringConfig::default()).is_empty());
    }
}
