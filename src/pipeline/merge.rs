//! Incremental merging against a previous snapshot.
//!
//! An airline is re-scraped only when its identity tuple
//! `(last date, url, country, name)` is absent from the previous snapshot.
//! Fresh records then replace previous ones sharing `(URL, Top/Base)`.

use std::collections::{HashMap, HashSet};

use crate::models::{AirlineIdentity, AirlineLink, FetchOutcome, PayTier, SalaryRecord};

/// Whether a run starts from an existing snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No usable snapshot, or a full rebuild was requested
    NoPriorData,
    /// Scrape only airlines the snapshot does not know
    Incremental,
}

impl RunState {
    pub fn detect(previous: &[SalaryRecord], force_full: bool) -> Self {
        if force_full || previous.is_empty() {
            RunState::NoPriorData
        } else {
            RunState::Incremental
        }
    }
}

/// Records after a merge, with what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub records: Vec<SalaryRecord>,
    /// Previous records overwritten in place
    pub replaced: usize,
    /// Records with no previous counterpart
    pub appended: usize,
}

/// Identity tuples of every airline present in a dataset.
pub fn identities(records: &[SalaryRecord]) -> HashSet<AirlineIdentity> {
    records.iter().map(SalaryRecord::identity).collect()
}

/// Discovered airlines whose identity the previous dataset lacks.
///
/// Discovery order is preserved.
pub fn airlines_to_scrape(
    discovered: &[AirlineLink],
    previous: &[SalaryRecord],
) -> Vec<AirlineLink> {
    let known = identities(previous);
    let mut queued = HashSet::new();

    discovered
        .iter()
        .filter(|airline| {
            let identity = airline.identity();
            !known.contains(&identity) && queued.insert(identity)
        })
        .cloned()
        .collect()
}

/// Union two datasets keyed by `(URL, Top/Base)`; `new` wins on conflict.
///
/// Replaced records keep their position; new keys are appended in order.
/// Merging the same `new` twice gives the same result as merging it once.
pub fn union(previous: Vec<SalaryRecord>, new: &[SalaryRecord]) -> MergeResult {
    let mut records = previous;
    let mut positions: HashMap<(String, PayTier), usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| ((r.url.clone(), r.tier), i))
        .collect();

    let mut replaced = 0;
    let mut appended = 0;

    for record in new {
        let key = (record.url.clone(), record.tier);
        match positions.get(&key) {
            Some(&i) => {
                records[i] = record.clone();
                replaced += 1;
            }
            None => {
                positions.insert(key, records.len());
                records.push(record.clone());
                appended += 1;
            }
        }
    }

    MergeResult {
        records,
        replaced,
        appended,
    }
}

/// Fold fresh fetch outcomes into the stored raw dump, keyed by airline URL.
///
/// A fresh outcome replaces the stored one in place, except that a failure
/// never overwrites a stored success. Unknown URLs are appended in order.
pub fn merge_outcomes(previous: Vec<FetchOutcome>, new: &[FetchOutcome]) -> Vec<FetchOutcome> {
    let mut outcomes = previous;
    let mut positions: HashMap<String, usize> = outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| (o.link().url.clone(), i))
        .collect();

    for outcome in new {
        let url = outcome.link().url.clone();
        match positions.get(&url) {
            Some(&i) if outcome.is_success() || !outcomes[i].is_success() => {
                outcomes[i] = outcome.clone();
            }
            Some(_) => {
                log::debug!("Keeping stored table for {} after failed fetch", url);
            }
            None => {
                positions.insert(url, outcomes.len());
                outcomes.push(outcome.clone());
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FetchFailure, SalaryRow};

    fn record(url: &str, tier: PayTier, salary: &str) -> SalaryRecord {
        SalaryRecord {
            url: url.into(),
            last_date: "2024-01-01".into(),
            country: "France".into(),
            name: "Air Acme".into(),
            year: Some(2024),
            tier,
            salary: Some(salary.into()),
        }
    }

    fn airline(url: &str, last_date: &str) -> AirlineLink {
        AirlineLink {
            label: format!("{last_date} - France - Air Acme"),
            url: url.into(),
            last_date: last_date.into(),
            country: "France".into(),
            name: "Air Acme".into(),
        }
    }

    #[test]
    fn test_new_value_replaces_old() {
        let old = vec![record("a", PayTier::CaptMax, "100")];
        let new = vec![record("a", PayTier::CaptMax, "150")];

        let result = union(old, &new);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].salary.as_deref(), Some("150"));
        assert_eq!(result.replaced, 1);
        assert_eq!(result.appended, 0);
    }

    #[test]
    fn test_new_keys_are_appended() {
        let old = vec![record("a", PayTier::CaptMax, "100")];
        let new = vec![
            record("a", PayTier::CaptMin, "80"),
            record("b", PayTier::CaptMax, "90"),
        ];

        let result = union(old, &new);
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.appended, 2);
        assert_eq!(result.records[0].salary.as_deref(), Some("100"));
    }

    #[test]
    fn test_union_is_idempotent() {
        let old = vec![
            record("a", PayTier::CaptMax, "100"),
            record("a", PayTier::CaptMin, "50"),
            record("c", PayTier::CaptMax, "70"),
        ];
        let new = vec![
            record("a", PayTier::CaptMax, "150"),
            record("b", PayTier::CaptMax, "90"),
            record("b", PayTier::CaptMin, "60"),
        ];

        let once = union(old, &new).records;
        let twice = union(once.clone(), &new).records;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_union_into_empty() {
        let new = vec![record("a", PayTier::CaptMax, "1")];
        assert_eq!(union(Vec::new(), &new).records, new);
    }

    #[test]
    fn test_airlines_to_scrape_skips_known_identities() {
        let previous = vec![
            record("a", PayTier::CaptMax, "100"),
            record("a", PayTier::CaptMin, "50"),
        ];
        let discovered = vec![airline("a", "2024-01-01"), airline("b", "2024-01-01")];

        let targets = airlines_to_scrape(&discovered, &previous);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "b");
    }

    #[test]
    fn test_changed_last_date_forces_rescrape() {
        let previous = vec![record("a", PayTier::CaptMax, "100")];
        let discovered = vec![airline("a", "2024-06-01")];

        assert_eq!(airlines_to_scrape(&discovered, &previous).len(), 1);
    }

    #[test]
    fn test_duplicate_discoveries_scraped_once() {
        let discovered = vec![airline("b", "2024-01-01"), airline("b", "2024-01-01")];
        assert_eq!(airlines_to_scrape(&discovered, &[]).len(), 1);
    }

    fn fetched(url: &str, salary: Option<&str>) -> FetchOutcome {
        let link = airline(url, "2024-01-01");
        match salary {
            Some(salary) => FetchOutcome::Success(SalaryRow {
                link,
                capt_max: Some(salary.into()),
                capt_min: None,
                date_capt_max: None,
                date_capt_min: None,
            }),
            None => FetchOutcome::Failure(FetchFailure {
                link,
                error: "timed out".into(),
                partial_table: None,
            }),
        }
    }

    #[test]
    fn test_merge_outcomes_keeps_unchanged_airlines() {
        let stored = vec![fetched("a", Some("100")), fetched("b", Some("90"))];
        let fresh = vec![fetched("b", Some("95")), fetched("c", Some("70"))];

        let merged = merge_outcomes(stored, &fresh);
        let urls: Vec<&str> = merged.iter().map(|o| o.link().url.as_str()).collect();
        assert_eq!(urls, ["a", "b", "c"]);
        assert_eq!(merged[1], fetched("b", Some("95")));
    }

    #[test]
    fn test_merge_outcomes_failure_keeps_stored_success() {
        let stored = vec![fetched("a", Some("100")), fetched("b", None)];
        let fresh = vec![fetched("a", None), fetched("b", Some("90"))];

        let merged = merge_outcomes(stored, &fresh);
        assert_eq!(merged, vec![fetched("a", Some("100")), fetched("b", Some("90"))]);
    }

    #[test]
    fn test_merge_outcomes_with_nothing_fresh() {
        let stored = vec![fetched("a", Some("100"))];
        assert_eq!(merge_outcomes(stored.clone(), &[]), stored);
    }

    #[test]
    fn test_run_state_detection() {
        let previous = vec![record("a", PayTier::CaptMax, "100")];
        assert_eq!(RunState::detect(&[], false), RunState::NoPriorData);
        assert_eq!(RunState::detect(&previous, false), RunState::Incremental);
        assert_eq!(RunState::detect(&previous, true), RunState::NoPriorData);
    }
}
