use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{DomainError, DomainResult};

/// Filters for `GET /api/v1/reviews`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// Only reviews written on this UTC day (`YYYY-MM-DD`)
    #[param(example = "2024-05-01")]
    pub created_at: Option<String>,
}

impl ReviewListQuery {
    pub fn created_on(&self) -> DomainResult<Option<NaiveDate>> {
        self.created_at
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    DomainError::invalid_parameter("created_at", raw, "date (YYYY-MM-DD)")
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(created_at: Option<&str>) -> ReviewListQuery {
        ReviewListQuery {
            created_at: created_at.map(str::to_string),
        }
    }

    #[test]
    fn parses_calendar_dates() {
        assert_eq!(query(None).created_on().unwrap(), None);
        assert_eq!(
            query(Some("2024-05-01")).created_on().unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn rejects_anything_else_as_invalid_parameter() {
        let err = query(Some("yesterday")).created_on().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidParameter { ref name, ref value, .. }
                if name == "created_at" && value == "yesterday"
        ));
    }
}
