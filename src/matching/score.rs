use super::banner::is_banner;
use super::tokenize::{marker_words, tokenize};
use crate::channel::Channel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score given to banners. Always below anything a real name can reach.
pub const BANNER_SCORE: i32 = -1_000_000;

/// Tunable point values and marker lists for ranking channel names.
///
/// Only the ordering matters: premium network > region > 4K > FHD > sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub premium_bonus: i32,
    pub foreign_penalty: i32,
    pub region_bonus: i32,
    pub uhd_bonus: i32,
    pub fhd_bonus: i32,
    pub sport_bonus: i32,
    /// Language code whose region tags are not penalised, e.g. "EN"
    pub preferred_language: String,
    pub premium_networks: Vec<String>,
    pub region_markers: Vec<String>,
    pub uhd_markers: Vec<String>,
    pub fhd_markers: Vec<String>,
    /// Language code -> region tags that mark a channel as that language
    pub language_tags: BTreeMap<String, Vec<String>>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut language_tags = BTreeMap::new();
        language_tags.insert("EN".to_string(), strings(&["US", "USA", "UK", "GB", "CA", "AU", "EN", "ENG"]));
        language_tags.insert("FR".to_string(), strings(&["FR", "FRA", "FRANCE"]));
        language_tags.insert("DE".to_string(), strings(&["DE", "GER", "GERMANY"]));
        language_tags.insert("ES".to_string(), strings(&["ES", "ESP", "SPAIN", "LATINO", "MX"]));
        language_tags.insert("IT".to_string(), strings(&["IT", "ITA", "ITALY"]));
        language_tags.insert("PT".to_string(), strings(&["PT", "POR", "BR", "BRAZIL"]));
        language_tags.insert("AR".to_string(), strings(&["AR", "ARAB", "ARABIC"]));
        language_tags.insert("NL".to_string(), strings(&["NL", "NED"]));
        language_tags.insert("TR".to_string(), strings(&["TR", "TUR"]));
        language_tags.insert("PL".to_string(), strings(&["PL", "POL"]));

        Self {
            premium_bonus: 1000,
            foreign_penalty: 500,
            region_bonus: 300,
            uhd_bonus: 200,
            fhd_bonus: 100,
            sport_bonus: 25,
            preferred_language: "EN".to_string(),
            premium_networks: strings(&[
                "ESPN+", "ESPN", "ESPN2", "ESPNU", "ABC", "CBS", "NBC", "FOX", "FS1", "FS2",
                "TNT", "TBS", "TRUTV", "NBA TV", "NFL NETWORK", "NFL REDZONE", "MLB NETWORK",
                "NHL NETWORK", "PEACOCK", "PRIME VIDEO", "APPLE TV", "PARAMOUNT+", "DAZN",
                "SKY SPORTS", "TSN", "SPORTSNET", "BIG TEN NETWORK", "SEC NETWORK",
                "ACC NETWORK",
            ]),
            region_markers: strings(&["USA", "US"]),
            uhd_markers: strings(&["4K", "UHD", "ᵁᴴᴰ"]),
            fhd_markers: strings(&["FHD", "1080P", "1080"]),
            language_tags,
        }
    }
}

/// What a fixture is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTarget<'a> {
    /// Sport or league tag, e.g. "nba" or "basketball"
    pub sport: &'a str,
    /// Broadcasting network, e.g. "ESPN+"
    pub network: Option<&'a str>,
}

/// Anything with a display name that can be ranked
pub trait Candidate {
    fn candidate_name(&self) -> &str;
}

impl Candidate for str {
    fn candidate_name(&self) -> &str {
        self
    }
}

impl<T: Candidate + ?Sized> Candidate for &T {
    fn candidate_name(&self) -> &str {
        (**self).candidate_name()
    }
}

impl Candidate for String {
    fn candidate_name(&self) -> &str {
        self
    }
}

impl Candidate for Channel {
    fn candidate_name(&self) -> &str {
        &self.name
    }
}

/// Space-framed uppercase phrase so multi-word markers match on word borders
fn phrase(words: &[String]) -> String {
    format!(" {} ", words.join(" "))
}

fn has_marker(name_phrase: &str, marker: &str) -> bool {
    let marker = phrase(&marker_words(marker));
    !marker.trim().is_empty() && name_phrase.contains(&marker)
}

/// The longest known premium marker named by the target network
fn premium_marker<'c>(network: &str, config: &'c ScoringConfig) -> Option<&'c str> {
    let network_phrase = phrase(&marker_words(network));
    config
        .premium_networks
        .iter()
        .filter(|m| has_marker(&network_phrase, m))
        .max_by_key(|m| m.len())
        .map(|m| m.as_str())
}

fn carries_foreign_tag(words: &[String], config: &ScoringConfig) -> bool {
    let preferred = config.preferred_language.to_uppercase();
    config
        .language_tags
        .iter()
        .filter(|(language, _)| language.to_uppercase() != preferred)
        .flat_map(|(_, tags)| tags.iter())
        .any(|tag| words.iter().any(|w| w.eq_ignore_ascii_case(tag)))
}

/// Desirability of a channel name for a target. Higher is better; only
/// meaningful for ranking.
pub fn score_channel(name: &str, target: &MatchTarget<'_>, config: &ScoringConfig) -> i32 {
    if is_banner(name) {
        return BANNER_SCORE;
    }

    let words = marker_words(name);
    let name_phrase = phrase(&words);
    let mut score = 0;

    if let Some(marker) = target.network.and_then(|n| premium_marker(n, config)) {
        if has_marker(&name_phrase, marker) {
            score += config.premium_bonus;
        }
    }

    if carries_foreign_tag(&words, config) {
        score -= config.foreign_penalty;
    }

    let any_marker = |markers: &[String]| markers.iter().any(|m| has_marker(&name_phrase, m));
    if any_marker(&config.region_markers) {
        score += config.region_bonus;
    }
    if any_marker(&config.uhd_markers) {
        score += config.uhd_bonus;
    }
    if any_marker(&config.fhd_markers) {
        score += config.fhd_bonus;
    }

    let sport_tokens = tokenize(target.sport);
    if !sport_tokens.is_empty() {
        let name_tokens = tokenize(name);
        if sport_tokens.iter().any(|t| name_tokens.contains(t)) {
            score += config.sport_bonus;
        }
    }

    score
}

/// One scored candidate
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'c, C: ?Sized> {
    pub candidate: &'c C,
    /// Position in the input list
    pub index: usize,
    pub score: i32,
    pub banner: bool,
}

/// Score every candidate and sort best first. Banners always sort last;
/// equal scores keep their input order.
pub fn rank_candidates<'c, C>(
    candidates: &'c [C],
    target: &MatchTarget<'_>,
    config: &ScoringConfig,
) -> Vec<Ranked<'c, C>>
where
    C: Candidate + Sync,
{
    let mut ranked: Vec<Ranked<'c, C>> = candidates
        .par_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let score = score_channel(candidate.candidate_name(), target, config);
            Ranked {
                candidate,
                index,
                score,
                banner: score == BANNER_SCORE,
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.banner.cmp(&b.banner).then(b.score.cmp(&a.score)));
    ranked
}

/// Automatic pick plus the manual fallback list
#[derive(Debug, Clone)]
pub struct MatchOutcome<'c, C: ?Sized> {
    pub best: Option<Ranked<'c, C>>,
    /// Remaining non-banner candidates, best first
    pub fallback: Vec<Ranked<'c, C>>,
}

impl<'c, C: ?Sized> MatchOutcome<'c, C> {
    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }
}

pub fn pick_best<'c, C>(
    candidates: &'c [C],
    target: &MatchTarget<'_>,
    config: &ScoringConfig,
) -> MatchOutcome<'c, C>
where
    C: Candidate + Sync,
{
    let mut playable = rank_candidates(candidates, target, config)
        .into_iter()
        .filter(|r| !r.banner);
    let best = playable.next();
    MatchOutcome {
        best,
        fallback: playable.collect(),
    }
}
