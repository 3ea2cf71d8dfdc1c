use crate::error::WeekError;
use crate::models::{DraftStatus, League, Matchup};
use crate::utils::dates::{days_between, local_date};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

const DAYS_PER_WEEK: i64 = 7;

/// Where a week window came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    /// Dates of a stored matchup record
    Persisted,
    /// Derived from the league's draft completion
    LeagueDraft,
    /// ISO calendar week containing today
    CalendarFallback,
}

/// An inclusive 7-day scoring window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub week_number: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: WindowSource,
}

impl WeekWindow {
    /// Persisted matchup dates win over anything we could recompute.
    pub fn from_matchup(matchup: &Matchup) -> Self {
        let span = (matchup.week_end_date - matchup.week_start_date).num_days();
        if span != DAYS_PER_WEEK - 1 {
            warn!(
                matchup_id = %matchup.id,
                week = matchup.week_number,
                span_days = span,
                "Persisted matchup window is not 7 days; using it as stored"
            );
        }
        Self {
            week_number: matchup.week_number,
            start: matchup.week_start_date,
            end: matchup.week_end_date,
            source: WindowSource::Persisted,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        days_between(self.start, self.end)
    }
}

/// Anchor date of week 1: the draft completion day in the canonical timezone.
pub fn first_week_start(draft_completed_at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    local_date(draft_completed_at, tz)
}

/// Maps a league's draft completion onto numbered 7-day weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalculator {
    first_week_start: NaiveDate,
}

impl WeekCalculator {
    pub fn new(first_week_start: NaiveDate) -> Self {
        Self { first_week_start }
    }

    pub fn from_league(league: &League, tz: Tz) -> Result<Self, WeekError> {
        if league.draft_status != DraftStatus::Completed {
            return Err(WeekError::DraftNotCompleted {
                league_id: league.id.clone(),
                status: league.draft_status,
            });
        }
        let completed_at = league
            .draft_completed_at
            .ok_or_else(|| WeekError::MissingDraftTimestamp(league.id.clone()))?;
        Ok(Self::new(first_week_start(completed_at, tz)))
    }

    pub fn first_week_start(&self) -> NaiveDate {
        self.first_week_start
    }

    pub fn week_start(&self, week_number: u32) -> Result<NaiveDate, WeekError> {
        if week_number == 0 {
            return Err(WeekError::InvalidWeek(week_number));
        }
        self.first_week_start
            .checked_add_signed(Duration::days((week_number as i64 - 1) * DAYS_PER_WEEK))
            .ok_or(WeekError::InvalidWeek(week_number))
    }

    pub fn week_end(&self, week_number: u32) -> Result<NaiveDate, WeekError> {
        self.week_start(week_number)?
            .checked_add_signed(Duration::days(DAYS_PER_WEEK - 1))
            .ok_or(WeekError::InvalidWeek(week_number))
    }

    pub fn window(&self, week_number: u32) -> Result<WeekWindow, WeekError> {
        Ok(WeekWindow {
            week_number,
            start: self.week_start(week_number)?,
            end: self.week_end(week_number)?,
            source: WindowSource::LeagueDraft,
        })
    }

    /// Week containing `today`; days before the first week count as week 1.
    pub fn current_week_number(&self, today: NaiveDate) -> u32 {
        let elapsed = (today - self.first_week_start).num_days();
        let week = elapsed.div_euclid(DAYS_PER_WEEK) + 1;
        week.max(1) as u32
    }

    /// Weeks whose start falls on or before `season_end`.
    pub fn available_weeks(&self, season_end: NaiveDate) -> AvailableWeeks {
        AvailableWeeks {
            calculator: *self,
            season_end,
            next: 1,
        }
    }

    /// Last day of the year the first week starts in
    pub fn default_season_end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.first_week_start.year(), 12, 31)
            .unwrap_or(self.first_week_start)
    }
}

/// Ascending week numbers; clone it to iterate again.
#[derive(Debug, Clone)]
pub struct AvailableWeeks {
    calculator: WeekCalculator,
    season_end: NaiveDate,
    next: u32,
}

impl Iterator for AvailableWeeks {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let start = self.calculator.week_start(self.next).ok()?;
        if start > self.season_end {
            return None;
        }
        let week = self.next;
        self.next = self.next.checked_add(1)?;
        Some(week)
    }
}

/// ISO week (Monday to Sunday) containing `today`
pub fn calendar_week(today: NaiveDate) -> WeekWindow {
    let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    WeekWindow {
        week_number: today.iso_week().week(),
        start,
        end: start + Duration::days(DAYS_PER_WEEK - 1),
        source: WindowSource::CalendarFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeagueId, MatchupStatus, TeamId};
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn league(status: DraftStatus, completed_at: Option<DateTime<Utc>>) -> League {
        League {
            id: LeagueId("league-1".to_string()),
            name: "Test League".to_string(),
            draft_status: status,
            draft_completed_at: completed_at,
        }
    }

    #[test]
    fn test_week_tiling() {
        let calc = WeekCalculator::new(date(2025, 12, 1));
        assert_eq!(calc.week_start(1).unwrap(), date(2025, 12, 1));
        assert_eq!(calc.week_end(1).unwrap(), date(2025, 12, 7));
        assert_eq!(calc.week_start(2).unwrap(), date(2025, 12, 8));
        assert_eq!(calc.week_end(2).unwrap(), date(2025, 12, 14));

        for week in 1..=30 {
            let start = calc.week_start(week).unwrap();
            let end = calc.week_end(week).unwrap();
            assert_eq!((end - start).num_days(), 6);
            assert_eq!(calc.week_start(week + 1).unwrap(), end + Duration::days(1));
        }
    }

    #[test]
    fn test_week_zero_rejected() {
        let calc = WeekCalculator::new(date(2025, 12, 1));
        assert!(matches!(calc.week_start(0), Err(WeekError::InvalidWeek(0))));
        assert!(calc.window(0).is_err());
    }

    #[test]
    fn test_week_past_date_range_rejected() {
        let calc = WeekCalculator::new(date(2025, 12, 1));
        assert!(matches!(
            calc.window(20_000_000),
            Err(WeekError::InvalidWeek(20_000_000))
        ));
        assert!(matches!(
            calc.week_end(u32::MAX),
            Err(WeekError::InvalidWeek(u32::MAX))
        ));

        // the last representable week still resolves
        let near_max = WeekCalculator::new(NaiveDate::MAX - Duration::days(3));
        assert!(near_max.week_start(1).is_ok());
        assert!(near_max.week_end(1).is_err());
        assert!(near_max.week_start(2).is_err());
        assert_eq!(near_max.available_weeks(NaiveDate::MAX).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_midweek_draft_anchors_week_one() {
        // Wednesday evening in New York
        let completed = Utc.with_ymd_and_hms(2025, 12, 4, 0, 30, 0).unwrap();
        let calc =
            WeekCalculator::from_league(&league(DraftStatus::Completed, Some(completed)), New_York)
                .unwrap();
        let week_one = calc.window(1).unwrap();
        assert_eq!(week_one.start, date(2025, 12, 3));
        assert_eq!(week_one.end, date(2025, 12, 9));
        assert_eq!(week_one.start.weekday(), chrono::Weekday::Wed);
        assert_eq!(week_one.end.weekday(), chrono::Weekday::Tue);
        assert_eq!(calc.current_week_number(date(2025, 12, 10)), 2);
    }

    #[test]
    fn test_current_week_number() {
        let first = date(2025, 12, 1);
        let calc = WeekCalculator::new(first);
        assert_eq!(calc.current_week_number(first), 1);
        assert_eq!(calc.current_week_number(first + Duration::days(6)), 1);
        assert_eq!(calc.current_week_number(first + Duration::days(7)), 2);
        assert_eq!(calc.current_week_number(first + Duration::days(8)), 2);
        // before the draft is clamped
        assert_eq!(calc.current_week_number(first - Duration::days(10)), 1);
    }

    #[test]
    fn test_first_week_start_uses_canonical_timezone() {
        // 02:00 UTC on Dec 2nd is the evening of Dec 1st in New York
        let completed = Utc.with_ymd_and_hms(2025, 12, 2, 2, 0, 0).unwrap();
        assert_eq!(first_week_start(completed, New_York), date(2025, 12, 1));
    }

    #[test]
    fn test_available_weeks_restartable() {
        let calc = WeekCalculator::new(date(2025, 12, 1));
        let weeks = calc.available_weeks(date(2025, 12, 31));
        let first_pass: Vec<u32> = weeks.clone().collect();
        let second_pass: Vec<u32> = weeks.collect();
        // week 5 starts Dec 29th, week 6 would start Jan 5th
        assert_eq!(first_pass, vec![1, 2, 3, 4, 5]);
        assert_eq!(first_pass, second_pass);

        assert_eq!(calc.default_season_end(), date(2025, 12, 31));
        assert_eq!(calc.available_weeks(date(2025, 11, 30)).count(), 0);
    }

    #[test]
    fn test_from_league_requires_completed_draft() {
        let err = WeekCalculator::from_league(&league(DraftStatus::InProgress, None), New_York)
            .unwrap_err();
        assert!(matches!(err, WeekError::DraftNotCompleted { .. }));

        let err = WeekCalculator::from_league(&league(DraftStatus::Completed, None), New_York)
            .unwrap_err();
        assert!(matches!(err, WeekError::MissingDraftTimestamp(_)));

        let completed = Utc.with_ymd_and_hms(2025, 12, 1, 23, 0, 0).unwrap();
        let calc =
            WeekCalculator::from_league(&league(DraftStatus::Completed, Some(completed)), New_York)
                .unwrap();
        assert_eq!(calc.first_week_start(), date(2025, 12, 1));
    }

    #[test]
    fn test_calendar_week_fallback() {
        // Wednesday
        let window = calendar_week(date(2025, 12, 10));
        assert_eq!(window.start, date(2025, 12, 8));
        assert_eq!(window.end, date(2025, 12, 14));
        assert_eq!(window.week_number, 50);
        assert_eq!(window.source, WindowSource::CalendarFallback);

        // Sunday belongs to the week that started the previous Monday
        let sunday = calendar_week(date(2025, 12, 14));
        assert_eq!(sunday.start, date(2025, 12, 8));
    }

    #[test]
    fn test_window_from_matchup_is_authoritative() {
        let matchup = Matchup {
            id: "m-1".to_string(),
            league_id: LeagueId("league-1".to_string()),
            week_number: 3,
            team1_id: TeamId("a".to_string()),
            team2_id: None,
            week_start_date: date(2025, 12, 16),
            week_end_date: date(2025, 12, 22),
            status: MatchupStatus::InProgress,
        };
        let window = WeekWindow::from_matchup(&matchup);
        assert_eq!(window.start, date(2025, 12, 16));
        assert_eq!(window.source, WindowSource::Persisted);
        assert!(window.contains(date(2025, 12, 22)));
        assert!(!window.contains(date(2025, 12, 23)));
        assert_eq!(window.days().count(), 7);
    }
}
