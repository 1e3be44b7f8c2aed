//! Salary fetch results and published records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::airline::{AirlineIdentity, AirlineLink};

/// Literal written in place of a missing value in published records.
pub const NAN: &str = "NAN";

/// Captain pay tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PayTier {
    /// Captain maximum (top) pay
    CaptMax,
    /// Captain minimum (base) pay
    CaptMin,
}

impl PayTier {
    /// Tiers in the order records are emitted per airline.
    pub const ALL: [PayTier; 2] = [PayTier::CaptMax, PayTier::CaptMin];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayTier::CaptMax => "CaptMax",
            PayTier::CaptMin => "CaptMin",
        }
    }
}

impl fmt::Display for PayTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four salary cells read from an airline page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRow {
    pub link: AirlineLink,
    pub capt_max: Option<String>,
    pub capt_min: Option<String>,
    pub date_capt_max: Option<String>,
    pub date_capt_min: Option<String>,
}

impl SalaryRow {
    pub fn salary(&self, tier: PayTier) -> Option<&str> {
        match tier {
            PayTier::CaptMax => self.capt_max.as_deref(),
            PayTier::CaptMin => self.capt_min.as_deref(),
        }
    }

    /// "Last updated" date belonging to the tier's salary.
    pub fn date(&self, tier: PayTier) -> Option<&str> {
        match tier {
            PayTier::CaptMax => self.date_capt_max.as_deref(),
            PayTier::CaptMin => self.date_capt_min.as_deref(),
        }
    }
}

/// Why an airline page produced no salary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub link: AirlineLink,
    pub error: String,
    /// Rows of the targeted table when it was found but had the wrong shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_table: Option<Vec<Vec<Option<String>>>>,
}

/// Outcome of fetching one airline page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchOutcome {
    Success(SalaryRow),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn link(&self) -> &AirlineLink {
        match self {
            FetchOutcome::Success(row) => &row.link,
            FetchOutcome::Failure(failure) => &failure.link,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// One published salary record, unique by `(URL, Top/Base)` in a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "Last_Date", default = "nan_string")]
    pub last_date: String,

    #[serde(rename = "Country", default = "nan_string")]
    pub country: String,

    #[serde(rename = "Name", default = "nan_string")]
    pub name: String,

    #[serde(rename = "Year", with = "sentinel_year", default)]
    pub year: Option<i32>,

    #[serde(rename = "Top/Base")]
    pub tier: PayTier,

    #[serde(rename = "Salary", with = "sentinel_salary", default)]
    pub salary: Option<String>,
}

impl SalaryRecord {
    /// Merge key within a dataset.
    pub fn key(&self) -> (&str, PayTier) {
        (&self.url, self.tier)
    }

    /// Fingerprint of the airline this record was scraped from.
    pub fn identity(&self) -> AirlineIdentity {
        AirlineIdentity {
            last_date: self.last_date.clone(),
            url: self.url.clone(),
            country: self.country.clone(),
            name: self.name.clone(),
        }
    }
}

fn nan_string() -> String {
    NAN.to_string()
}

/// `Option<i32>` as an integer or `"NAN"`.
///
/// Also reads floats such as `2020.0`, which older snapshots contain.
mod sentinel_year {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NAN;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(year) => s.serialize_i32(*year),
            None => s.serialize_str(NAN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        Ok(match Option::<Repr>::deserialize(d)? {
            Some(Repr::Int(v)) => i32::try_from(v).ok(),
            Some(Repr::Float(v)) if v.is_finite() && v.fract() == 0.0 => Some(v as i32),
            Some(Repr::Text(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// `Option<String>` as a string or `"NAN"`; numbers are read as text.
mod sentinel_salary {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NAN;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Int(i64),
        Float(f64),
    }

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(NAN))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Repr>::deserialize(d)? {
            Some(Repr::Text(s)) if s == NAN || s.trim().is_empty() => None,
            Some(Repr::Text(s)) => Some(s),
            Some(Repr::Int(v)) => Some(v.to_string()),
            Some(Repr::Float(v)) if v.is_finite() && v.fract() == 0.0 => {
                Some((v as i64).to_string())
            }
            Some(Repr::Float(v)) if v.is_finite() => Some(v.to_string()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(year: Option<i32>, salary: Option<&str>) -> SalaryRecord {
        SalaryRecord {
            url: "https://www.pilotjobsnetwork.com/jobs/acme".into(),
            last_date: "2024-01-01".into(),
            country: "France".into(),
            name: "Air Acme".into(),
            year,
            tier: PayTier::CaptMax,
            salary: salary.map(String::from),
        }
    }

    #[test]
    fn test_record_serializes_with_published_keys() {
        let value = serde_json::to_value(record(Some(2020), Some("150000"))).unwrap();
        assert_eq!(
            value,
            json!({
                "URL": "https://www.pilotjobsnetwork.com/jobs/acme",
                "Last_Date": "2024-01-01",
                "Country": "France",
                "Name": "Air Acme",
                "Year": 2020,
                "Top/Base": "CaptMax",
                "Salary": "150000",
            })
        );
    }

    #[test]
    fn test_missing_values_serialize_as_sentinel() {
        let value = serde_json::to_value(record(None, None)).unwrap();
        assert_eq!(value["Year"], json!("NAN"));
        assert_eq!(value["Salary"], json!("NAN"));
        assert!(value.as_object().unwrap().values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_lenient_deserialization() {
        let parsed: SalaryRecord = serde_json::from_value(json!({
            "URL": "a",
            "Country": "Chile",
            "Name": "LATAM",
            "Year": 2019.0,
            "Top/Base": "CaptMin",
            "Salary": 100,
        }))
        .unwrap();

        assert_eq!(parsed.year, Some(2019));
        assert_eq!(parsed.salary.as_deref(), Some("100"));
        assert_eq!(parsed.last_date, NAN);
        assert_eq!(parsed.tier, PayTier::CaptMin);
    }

    #[test]
    fn test_sentinel_round_trips_to_none() {
        let parsed: SalaryRecord = serde_json::from_value(json!({
            "URL": "a",
            "Last_Date": "x",
            "Country": "c",
            "Name": "n",
            "Year": "NAN",
            "Top/Base": "CaptMax",
            "Salary": "NAN",
        }))
        .unwrap();

        assert_eq!(parsed.year, None);
        assert_eq!(parsed.salary, None);
    }

    #[test]
    fn test_fetch_outcome_tagging() {
        let link = AirlineLink {
            label: "2024 - France - Air Acme".into(),
            url: "u".into(),
            last_date: "2024".into(),
            country: "France".into(),
            name: "Air Acme".into(),
        };
        let failure = FetchOutcome::Failure(FetchFailure {
            link,
            error: "boom".into(),
            partial_table: None,
        });

        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["status"], json!("failure"));
        assert!(value.get("partial_table").is_none());
        assert!(!failure.is_success());
    }
}
