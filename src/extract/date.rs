//! Turns the free text around a radiation figure into a calendar date.
//!
//! The page repeats boilerplate across its day blocks, so a single pattern is
//! not enough: resolution walks an ordered list of strategies, from relative
//! words down to an index-based fallback, and keeps a claim set so that
//! repeated phrases never hand the same date to distinct forecast entries.

use std::{collections::BTreeSet, sync::LazyLock};

use chrono::{Datelike, Days, NaiveDate};
use regex::{Captures, Regex};

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b\.?\s+(\d{1,2})\b",
    )
    .unwrap()
});

static YMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

static DMY_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

static DMY_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b").unwrap());

pub struct DateResolver {
    reference: NaiveDate,
    claimed: BTreeSet<NaiveDate>,
    last_resolved: Option<NaiveDate>,
}

impl DateResolver {
    #[must_use]
    pub const fn new(reference: NaiveDate) -> Self {
        Self { reference, claimed: BTreeSet::new(), last_resolved: None }
    }

    #[must_use]
    pub const fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Resolves the date of the `index`-th radiation figure from the text
    /// preceding it, preferring the structured `heading` when one is present.
    ///
    /// An explicit month-and-day spelling is taken at face value even when the
    /// date was seen before (the source may print a day's total twice, and the
    /// caller collapses such duplicates); every other strategy only yields
    /// dates not claimed earlier in the run.
    pub fn resolve(&mut self, heading: Option<&str>, context: &str, index: usize) -> NaiveDate {
        let date = heading
            .and_then(|text| self.resolve_text(text))
            .or_else(|| self.resolve_text(context))
            .unwrap_or_else(|| self.fallback(index));
        self.claimed.insert(date);
        self.last_resolved = Some(date);
        date
    }

    fn resolve_text(&self, text: &str) -> Option<NaiveDate> {
        let lowered = text.to_lowercase();
        if lowered.contains("today") && !self.is_claimed(self.reference) {
            return Some(self.reference);
        }
        let tomorrow = self.reference + Days::new(1);
        if lowered.contains("tomorrow") && !self.is_claimed(tomorrow) {
            return Some(tomorrow);
        }
        self.month_day(&lowered).or_else(|| self.numeric(text))
    }

    /// Month name plus day number, the match closest to the figure winning.
    /// The year is the reference year, rolled forward when the combination
    /// already lies behind the reference date.
    fn month_day(&self, text: &str) -> Option<NaiveDate> {
        let captures = MONTH_DAY_RE.captures_iter(text).last()?;
        let month = month_number(captures.get(1)?.as_str());
        let day = captures.get(2)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(self.reference.year(), month, day)?;
        if date < self.reference {
            NaiveDate::from_ymd_opt(self.reference.year() + 1, month, day)
        } else {
            Some(date)
        }
    }

    /// Explicit numeric dates. The source publishes forecasts, not history,
    /// so anything behind the reference date is rejected.
    fn numeric(&self, text: &str) -> Option<NaiveDate> {
        let mut candidates = Vec::new();
        candidates.extend(YMD_RE.captures_iter(text).filter_map(|captures| parse_ymd(&captures)));
        candidates
            .extend(DMY_SLASH_RE.captures_iter(text).filter_map(|captures| parse_dmy(&captures)));
        candidates
            .extend(DMY_DASH_RE.captures_iter(text).filter_map(|captures| parse_dmy(&captures)));
        let (_, date) = candidates.into_iter().max_by_key(|(position, _)| *position)?;
        (date >= self.reference && !self.is_claimed(date)).then_some(date)
    }

    /// Last resort: the reference date advanced by the figure's position,
    /// seeded past the most recently resolved date so a page with sparse
    /// headings keeps progressing forward, then walked past any claims.
    fn fallback(&self, index: usize) -> NaiveDate {
        let indexed = self.reference + Days::new(index as u64);
        let mut candidate = match self.last_resolved {
            Some(last) if last + Days::new(1) > indexed => last + Days::new(1),
            _ => indexed,
        };
        while self.is_claimed(candidate) {
            candidate = candidate + Days::new(1);
        }
        candidate
    }

    fn is_claimed(&self, date: NaiveDate) -> bool {
        self.claimed.contains(&date)
    }
}

fn parse_ymd(captures: &Captures<'_>) -> Option<(usize, NaiveDate)> {
    let position = captures.get(0)?.start();
    let year = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    let day = captures.get(3)?.as_str().parse().ok()?;
    Some((position, NaiveDate::from_ymd_opt(year, month, day)?))
}

fn parse_dmy(captures: &Captures<'_>) -> Option<(usize, NaiveDate)> {
    let position = captures.get(0)?.start();
    let day = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    let year = captures.get(3)?.as_str().parse().ok()?;
    Some((position, NaiveDate::from_ymd_opt(year, month, day)?))
}

/// Zero for anything unrecognised, which no calendar date accepts.
fn month_number(name: &str) -> u32 {
    match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn resolves_relative_words() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "Forecast for today", 0), date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "and tomorrow looks sunny", 1), date(2026, 1, 16));
    }

    #[test]
    fn repeated_boilerplate_never_reuses_a_date() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        let resolved: BTreeSet<NaiveDate> =
            (0..5).map(|index| resolver.resolve(None, "today's forecast", index)).collect();
        assert_eq!(resolved.len(), 5);
        assert!(resolved.contains(&date(2026, 1, 15)));
        assert!(resolved.contains(&date(2026, 1, 19)));
    }

    #[test]
    fn month_rolls_over_the_year_end() {
        let mut resolver = DateResolver::new(date(2026, 12, 20));
        assert_eq!(resolver.resolve(None, "Monday, January 5", 0), date(2027, 1, 5));
        assert_eq!(resolver.resolve(None, "Friday, December 25", 1), date(2026, 12, 25));
    }

    #[test]
    fn abbreviated_month_names_resolve() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "Sun, Jan 18", 0), date(2026, 1, 18));
    }

    #[test]
    fn closest_month_day_match_wins() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "January 18 ... January 20", 0), date(2026, 1, 20));
    }

    #[test]
    fn explicit_month_day_may_repeat_for_duplicate_figures() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "January 20", 0), date(2026, 1, 20));
        assert_eq!(resolver.resolve(None, "January 20", 1), date(2026, 1, 20));
    }

    #[test]
    fn invalid_calendar_dates_fall_through() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "February 30", 3), date(2026, 1, 18));
    }

    #[test]
    fn numeric_date_forms_resolve() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "updated 2026-01-22", 0), date(2026, 1, 22));
        assert_eq!(resolver.resolve(None, "valid for 20/01/2026", 1), date(2026, 1, 20));
        assert_eq!(resolver.resolve(None, "valid for 21-01-2026", 2), date(2026, 1, 21));
    }

    #[test]
    fn numeric_dates_behind_the_reference_are_rejected() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "archived on 2025-12-31", 2), date(2026, 1, 17));
    }

    #[test]
    fn heading_takes_priority_over_free_text() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        let resolved =
            resolver.resolve(Some("Wednesday, January 21"), "boilerplate mentioning today", 0);
        assert_eq!(resolved, date(2026, 1, 21));
    }

    #[test]
    fn fallback_seeds_past_the_last_resolved_date() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(Some("January 25"), "", 0), date(2026, 1, 25));
        assert_eq!(resolver.resolve(None, "no date in sight", 1), date(2026, 1, 26));
    }

    #[test]
    fn fallback_does_not_lag_behind_the_index() {
        let mut resolver = DateResolver::new(date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "today", 0), date(2026, 1, 15));
        assert_eq!(resolver.resolve(None, "", 3), date(2026, 1, 18));
    }
}
