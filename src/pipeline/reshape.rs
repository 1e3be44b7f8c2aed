// src/pipeline/reshape.rs

//! Wide-to-long reshaping of fetch outcomes into salary records.
//!
//! Each successful airline becomes one record per pay tier. The tier picks
//! both the salary cell and the date the year is derived from.

use crate::models::{FetchOutcome, PayTier, SalaryRecord, SalaryRow};
use crate::utils::date::parse_year;

/// Turn fetch outcomes into records, two per successful airline.
///
/// Failures are logged and dropped. Empty salary cells still produce a
/// record; their salary is missing.
pub fn reshape(outcomes: &[FetchOutcome]) -> Vec<SalaryRecord> {
    let mut records = Vec::with_capacity(outcomes.len() * PayTier::ALL.len());

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Success(row) => {
                records.extend(PayTier::ALL.iter().map(|&tier| to_record(row, tier)));
            }
            FetchOutcome::Failure(failure) => {
                log::debug!(
                    "Dropping {} from reshape: {}",
                    failure.link.url,
                    failure.error
                );
            }
        }
    }

    records
}

fn to_record(row: &SalaryRow, tier: PayTier) -> SalaryRecord {
    let link = &row.link;
    SalaryRecord {
        url: link.url.clone(),
        last_date: link.last_date.clone(),
        country: link.country.clone(),
        name: link.name.clone(),
        year: row.date(tier).and_then(parse_year),
        tier,
        salary: row.salary(tier).map(String::from),
    }
}
