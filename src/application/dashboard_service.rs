use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::domain::clock::Clock;
use crate::domain::dashboard::{DashboardSettings, DashboardSummary};
use crate::domain::errors::DomainError;
use crate::domain::ports::DashboardRepository;

pub struct DashboardService<D> {
    repo: D,
    settings: DashboardSettings,
}

impl<D: DashboardRepository> DashboardService<D> {
    pub fn new(repo: D, settings: DashboardSettings) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn summary(&self, clock: &dyn Clock) -> Result<DashboardSummary, DomainError> {
        let days = self.settings.revenue_window_days;
        let since = revenue_window_start(clock.now(), days).ok_or_else(|| {
            DomainError::InvalidInput(format!("revenue window of {days} days is out of range"))
        })?;
        log::debug!("Refreshing dashboard, revenue window starts at {}", since);
        self.repo.summary(&self.settings, since)
    }
}

/// Midnight `days` days before `now`, or `None` when that falls outside the
/// representable calendar.
pub fn revenue_window_start(now: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    now.date()
        .and_time(NaiveTime::MIN)
        .checked_sub_signed(TimeDelta::try_days(days)?)
}
