//! Airline scrape targets.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Separator between the fields of a directory link label.
pub const LABEL_SEPARATOR: &str = " - ";

/// An anchor found on the directory page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryLink {
    /// Absolute URL of the airline page
    pub url: String,
    /// Trimmed anchor text
    pub label: String,
}

/// An airline page whose label was split into `date - country - name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AirlineLink {
    pub label: String,
    pub url: String,
    /// Date the directory lists as the airline's last update
    pub last_date: String,
    pub country: String,
    pub name: String,
}

/// Fingerprint used to detect airlines already scraped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirlineIdentity {
    pub last_date: String,
    pub url: String,
    pub country: String,
    pub name: String,
}

impl AirlineLink {
    /// Split a directory link label into its three fields.
    ///
    /// Labels must contain exactly two separators; anything else is a
    /// [`AppError::Parse`] for this link only.
    pub fn parse(link: DirectoryLink) -> Result<Self> {
        let parts: Vec<&str> = link.label.split(LABEL_SEPARATOR).collect();
        let [last_date, country, name] = parts.as_slice() else {
            return Err(AppError::parse(format!(
                "label '{}' has {} segments, expected 3",
                link.label,
                parts.len()
            )));
        };

        Ok(Self {
            last_date: last_date.to_string(),
            country: country.to_string(),
            name: name.to_string(),
            label: link.label,
            url: link.url,
        })
    }

    pub fn identity(&self) -> AirlineIdentity {
        AirlineIdentity {
            last_date: self.last_date.clone(),
            url: self.url.clone(),
            country: self.country.clone(),
            name: self.name.clone(),
        }
    }
}
