//! football-data.org v4 client
//!
//! Fetches the day's fixtures for the tracked competitions and the recent
//! finished matches of a team.

use super::FixtureSource;
use crate::config::{CompetitionConfig, ProviderConfig};
use crate::error::{PredictError, Result};
use crate::types::{parse_date, Fixture, RecentMatch, Team, UNKNOWN_LEAGUE};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const AUTH_HEADER: &str = "X-Auth-Token";

/// Statuses requested for the daily listing; finished games stay listed so a
/// day's predictions do not shrink as kick-offs pass.
const LISTED_STATUSES: &str = "SCHEDULED,TIMED,IN_PLAY,PAUSED,FINISHED";

/// How far back a team-history request reaches from the fixture date
const HISTORY_LOOKBACK_DAYS: u64 = 180;

#[derive(Clone)]
pub struct FootballDataClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    competitions: Vec<CompetitionConfig>,
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    #[serde(rename = "utcDate")]
    utc_date: Option<String>,
    competition: Option<ApiCompetition>,
    #[serde(rename = "homeTeam")]
    home_team: ApiTeam,
    #[serde(rename = "awayTeam")]
    away_team: ApiTeam,
    score: Option<ApiScore>,
}

#[derive(Debug, Deserialize)]
struct ApiCompetition {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    id: Option<u64>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiScore {
    #[serde(rename = "fullTime")]
    full_time: Option<ApiGoals>,
}

#[derive(Debug, Deserialize)]
struct ApiGoals {
    home: Option<u32>,
    away: Option<u32>,
}

impl FootballDataClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            competitions: config.competitions.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        api_key: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .header(AUTH_HEADER, api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictError::Upstream(format!("{url}: http {status}: {body}")));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl FixtureSource for FootballDataClient {
    async fn list_fixtures(&self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No football-data API key configured, skipping fixtures for {}", date);
            return Ok(Vec::new());
        };

        let day = date.format("%Y-%m-%d").to_string();
        let codes = self
            .competitions
            .iter()
            .map(|c| c.code.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}/matches", self.base_url);
        let resp: MatchesResponse = self
            .get_json(
                &url,
                api_key,
                &[
                    ("dateFrom", day.clone()),
                    ("dateTo", day),
                    ("competitions", codes),
                    ("status", LISTED_STATUSES.to_string()),
                ],
            )
            .await?;

        let fixtures = fixtures_from_matches(resp.matches, date, &self.competitions);
        debug!("football-data listed {} fixtures for {}", fixtures.len(), date);
        Ok(fixtures)
    }

    async fn recent_matches(
        &self,
        team: &Team,
        count: usize,
        before: NaiveDate,
    ) -> Result<Vec<RecentMatch>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };
        let team_id: u64 = team
            .id
            .parse()
            .map_err(|_| PredictError::MissingTeamData(format!("no provider id for {}", team.name)))?;

        // The provider's date bounds are inclusive and its `limit` keeps the
        // oldest matches of the window, so the newest `count` are picked here.
        let (date_from, date_to) = history_window(before);
        let url = format!("{}/teams/{}/matches", self.base_url, team_id);
        let resp: MatchesResponse = self
            .get_json(
                &url,
                api_key,
                &[
                    ("status", "FINISHED".to_string()),
                    ("dateFrom", date_from.format("%Y-%m-%d").to_string()),
                    ("dateTo", date_to.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        Ok(recent_from_matches(resp.matches, team_id, count, before))
    }
}

fn league_name(code: Option<&str>, competitions: &[CompetitionConfig]) -> String {
    code.and_then(|code| competitions.iter().find(|c| c.code == code))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNKNOWN_LEAGUE.to_string())
}

fn team_from_api(team: ApiTeam, fallback: &str) -> Team {
    Team {
        id: team.id.map(|id| id.to_string()).unwrap_or_default(),
        name: team.name.unwrap_or_else(|| fallback.to_string()),
    }
}

fn fixtures_from_matches(
    matches: Vec<ApiMatch>,
    requested: NaiveDate,
    competitions: &[CompetitionConfig],
) -> Vec<Fixture> {
    matches
        .into_iter()
        .map(|m| {
            let date = m
                .utc_date
                .as_deref()
                .and_then(|d| d.get(..10))
                .and_then(|d| parse_date(d).ok())
                .unwrap_or(requested);
            let league = league_name(
                m.competition.as_ref().and_then(|c| c.code.as_deref()),
                competitions,
            );
            Fixture {
                date,
                home_team: team_from_api(m.home_team, "Home"),
                away_team: team_from_api(m.away_team, "Away"),
                league: Some(league),
            }
        })
        .collect()
}

/// Inclusive `(dateFrom, dateTo)` covering the days before `before`
fn history_window(before: NaiveDate) -> (NaiveDate, NaiveDate) {
    let date_to = before.pred_opt().unwrap_or(before);
    let date_from = before
        .checked_sub_days(Days::new(HISTORY_LOOKBACK_DAYS))
        .unwrap_or(date_to);
    (date_from, date_to)
}

fn recent_from_matches(
    matches: Vec<ApiMatch>,
    team_id: u64,
    count: usize,
    before: NaiveDate,
) -> Vec<RecentMatch> {
    let mut out: Vec<RecentMatch> = matches
        .into_iter()
        .filter_map(|m| {
            let completed_at = m
                .utc_date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())?
                .with_timezone(&Utc);
            if completed_at.date_naive() >= before {
                return None;
            }
            let full_time = m.score?.full_time?;
            let goals_scored = if m.home_team.id == Some(team_id) {
                full_time.home?
            } else if m.away_team.id == Some(team_id) {
                full_time.away?
            } else {
                return None;
            };
            Some(RecentMatch {
                goals_scored,
                completed_at,
            })
        })
        .collect();

    out.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    out.truncate(count);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    const LISTING: &str = r#"{
        "matches": [
            {
                "utcDate": "2025-03-01T19:00:00Z",
                "competition": {"code": "PL", "name": "Premier League"},
                "homeTeam": {"id": 57, "name": "Arsenal FC"},
                "awayTeam": {"id": 61, "name": "Chelsea FC"},
                "score": {"fullTime": {"home": null, "away": null}}
            },
            {
                "utcDate": "2025-03-01T14:30:00Z",
                "competition": {"code": "CL"},
                "homeTeam": {"id": 5, "name": "FC Bayern München"},
                "awayTeam": {"name": null}
            }
        ]
    }"#;

    const HISTORY: &str = r#"{
        "matches": [
            {
                "utcDate": "2025-02-15T15:00:00Z",
                "homeTeam": {"id": 57, "name": "Arsenal FC"},
                "awayTeam": {"id": 1, "name": "Other"},
                "score": {"fullTime": {"home": 3, "away": 0}}
            },
            {
                "utcDate": "2025-02-22T15:00:00Z",
                "homeTeam": {"id": 2, "name": "Other"},
                "awayTeam": {"id": 57, "name": "Arsenal FC"},
                "score": {"fullTime": {"home": 1, "away": 2}}
            },
            {
                "utcDate": "2025-02-08T15:00:00Z",
                "homeTeam": {"id": 57, "name": "Arsenal FC"},
                "awayTeam": {"id": 3, "name": "Other"},
                "score": {"fullTime": {"home": null, "away": null}}
            },
            {
                "utcDate": "2025-02-01T15:00:00Z",
                "homeTeam": {"id": 57, "name": "Arsenal FC"},
                "awayTeam": {"id": 4, "name": "Other"},
                "score": {"fullTime": {"home": 1, "away": 1}}
            }
        ]
    }"#;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn competitions() -> Vec<CompetitionConfig> {
        ProviderConfig::default().competitions
    }

    #[test]
    fn test_listing_maps_leagues_and_teams() {
        let resp: MatchesResponse = serde_json::from_str(LISTING).unwrap();
        let requested = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let fixtures = fixtures_from_matches(resp.matches, requested, &competitions());

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].league.as_deref(), Some("Premier League"));
        assert_eq!(fixtures[0].home_team, Team::new("57", "Arsenal FC"));
        assert_eq!(fixtures[0].away_team.name, "Chelsea FC");
        assert_eq!(fixtures[0].date, requested);

        // Untracked code and missing team fields fall back.
        assert_eq!(fixtures[1].league.as_deref(), Some("Unknown"));
        assert_eq!(fixtures[1].away_team, Team::new("", "Away"));
    }

    #[test]
    fn test_history_picks_team_side_and_orders_recent_first() {
        let resp: MatchesResponse = serde_json::from_str(HISTORY).unwrap();
        let recent = recent_from_matches(resp.matches, 57, 3, day(2025, 3, 1));

        // The match without a full-time score is skipped.
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].goals_scored, 2);
        assert_eq!(recent[1].goals_scored, 3);
        assert_eq!(recent[2].goals_scored, 1);
        assert!(recent[0].completed_at > recent[1].completed_at);
    }

    #[test]
    fn test_history_truncates_to_count() {
        let resp: MatchesResponse = serde_json::from_str(HISTORY).unwrap();
        assert_eq!(recent_from_matches(resp.matches, 57, 1, day(2025, 3, 1)).len(), 1);
    }

    #[test]
    fn test_history_excludes_matches_on_or_after_bound() {
        let resp: MatchesResponse = serde_json::from_str(HISTORY).unwrap();
        let recent = recent_from_matches(resp.matches, 57, 3, day(2025, 2, 22));

        let goals: Vec<u32> = recent.iter().map(|m| m.goals_scored).collect();
        assert_eq!(goals, vec![3, 1]);
        assert!(recent.iter().all(|m| m.completed_at.date_naive() < day(2025, 2, 22)));
    }

    #[test]
    fn test_history_window_ends_the_day_before() {
        let (from, to) = history_window(day(2025, 3, 1));
        assert_eq!(to, day(2025, 2, 28));
        assert_eq!(from, day(2024, 9, 2));
        assert!(from < to);
    }

    #[tokio::test]
    async fn test_no_api_key_lists_nothing() {
        let client = FootballDataClient::new(&ProviderConfig::default()).unwrap();
        assert!(!client.has_api_key());
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(client.list_fixtures(date).await.unwrap().is_empty());
        let team = Team::new("57", "Arsenal FC");
        assert!(client.recent_matches(&team, 3, date).await.unwrap().is_empty());
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = ProviderConfig {
            api_key: Some("   ".to_string()),
            ..ProviderConfig::default()
        };
        let client = FootballDataClient::new(&config).unwrap();
        assert!(!client.has_api_key());
    }
}
