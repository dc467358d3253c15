//! Fixture and team-history sources

pub mod football_data;

pub use football_data::FootballDataClient;

use crate::error::Result;
use crate::types::{Fixture, RecentMatch, Team};
use async_trait::async_trait;
use chrono::NaiveDate;

#[cfg(test)]
use mockall::automock;

/// Upstream provider of fixtures and team histories
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Fixtures in the tracked competitions on `date`; empty is valid
    async fn list_fixtures(&self, date: NaiveDate) -> Result<Vec<Fixture>>;

    /// Up to `count` matches of `team` completed before `before`, most
    /// recent first. May return fewer.
    async fn recent_matches(
        &self,
        team: &Team,
        count: usize,
        before: NaiveDate,
    ) -> Result<Vec<RecentMatch>>;
}
