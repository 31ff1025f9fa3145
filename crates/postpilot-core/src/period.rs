//! Billing period identifiers ("YYYY-MM").

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Calendar month a usage document belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodId(String);

impl PeriodId {
    /// Period of the current server-local date.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        PeriodId(format!("{:04}-{:02}", date.year(), date.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PeriodId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for PeriodId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidInput(format!("Invalid period id: {}", s));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self::from_date(date))
    }
}

impl TryFrom<String> for PeriodId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodId> for String {
    fn from(value: PeriodId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_date_zero_pads_month() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(PeriodId::from_date(date).as_str(), "2026-03");
    }

    #[test]
    fn test_parse_valid_and_invalid() {
        assert_eq!("2025-12".parse::<PeriodId>().unwrap().as_str(), "2025-12");
        assert!("2025-13".parse::<PeriodId>().is_err());
        assert!("2025-1".parse::<PeriodId>().is_err());
        assert!("202512".parse::<PeriodId>().is_err());
        assert!("abcd-01".parse::<PeriodId>().is_err());
    }

    #[test]
    fn test_current_matches_local_date() {
        let expected = PeriodId::from_date(Local::now().date_naive());
        assert_eq!(PeriodId::current(), expected);
    }

    #[test]
    fn test_serde_as_plain_string() {
        let period: PeriodId = serde_json::from_str("\"2026-10\"").unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2026-10\"");
        assert!(serde_json::from_str::<PeriodId>("\"october\"").is_err());
    }
}
