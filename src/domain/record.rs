use chrono::{DateTime, TimeDelta, Utc};

/// Addresses and send date harvested from one message's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRecord {
    /// (display name, lower-cased address), To then Cc then Bcc
    pub pairs: Vec<(Option<String>, String)>,
    /// Unix seconds; `None` when the Date header is missing or unparsable
    pub date: Option<i64>,
}

/// Which messages take part in a harvest. Fixed for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub min_date: Option<i64>,
    /// Applied by the retrieval side only (IMAP SEARCH FROM).
    pub from_address: Option<String>,
}

impl DateFilter {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// `max_age_days == 0` means no date limit, and so does an age reaching
    /// back past the earliest representable date.
    pub fn from_max_age(max_age_days: u32, now: DateTime<Utc>) -> Self {
        let min_date = (max_age_days > 0)
            .then(|| TimeDelta::try_days(i64::from(max_age_days)))
            .flatten()
            .and_then(|age| now.checked_sub_signed(age))
            .map(|min| min.timestamp());
        Self {
            min_date,
            from_address: None,
        }
    }

    pub fn with_from(mut self, from_address: Option<String>) -> Self {
        self.from_address = from_address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self
    }

    /// Inclusive lower bound; an unknown date always passes.
    pub fn admits(&self, record: &HeaderRecord) -> bool {
        match (self.min_date, record.date) {
            (Some(min), Some(date)) => date >= min,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dated(date: Option<i64>) -> HeaderRecord {
        HeaderRecord {
            pairs: vec![],
            date,
        }
    }

    #[test]
    fn boundary_is_inclusive() {
        let f = DateFilter {
            min_date: Some(1_000),
            from_address: None,
        };
        assert!(f.admits(&dated(Some(1_000))));
        assert!(!f.admits(&dated(Some(999))));
        assert!(f.admits(&dated(Some(5_000))));
    }

    #[test]
    fn unknown_date_always_admitted() {
        let f = DateFilter {
            min_date: Some(i64::MAX),
            from_address: None,
        };
        assert!(f.admits(&dated(None)));
        assert!(DateFilter::unlimited().admits(&dated(Some(0))));
    }

    #[test]
    fn max_age_to_min_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let f = DateFilter::from_max_age(2, now);
        let expected = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap().timestamp();
        assert_eq!(f.min_date, Some(expected));
        assert_eq!(DateFilter::from_max_age(0, now).min_date, None);
    }

    #[test]
    fn huge_max_age_is_unlimited() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(DateFilter::from_max_age(100_000_000, now).min_date, None);
        assert_eq!(DateFilter::from_max_age(u32::MAX, now).min_date, None);
    }

    #[test]
    fn blank_from_is_unconstrained() {
        let f = DateFilter::unlimited().with_from(Some("  ".into()));
        assert_eq!(f.from_address, None);
        let f = DateFilter::unlimited().with_from(Some(" me@x ".into()));
        assert_eq!(f.from_address.as_deref(), Some("me@x"));
    }
}
