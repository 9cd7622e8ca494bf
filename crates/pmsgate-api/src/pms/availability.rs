// Availability lookup: GET /par/v1/hotels/{hotelId}/availability

use serde_json::Value;

use super::client::PmsClient;
use crate::auth::TokenSource;
use crate::error::Error;

/// Query for one availability search. Dates are `YYYY-MM-DD` and are sent
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub start_date: String,
    pub end_date: String,
    pub adults: u32,
    pub children: u32,
    /// Page size (`limit`).
    pub limit: u32,
    pub rate_plan_code: Option<String>,
    pub promotion_code: Option<String>,
}

impl AvailabilityQuery {
    /// Query parameters in the order the gateway documents them.
    /// `roomStayQuantity` is always 1.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("roomStayStartDate", self.start_date.clone()),
            ("roomStayEndDate", self.end_date.clone()),
            ("adults", self.adults.to_string()),
            ("children", self.children.to_string()),
            ("roomStayQuantity", "1".to_owned()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(code) = self.rate_plan_code.as_deref().filter(|c| !c.is_empty()) {
            params.push(("ratePlanCode", code.to_owned()));
        }
        if let Some(code) = self.promotion_code.as_deref().filter(|c| !c.is_empty()) {
            params.push(("promotionCode", code.to_owned()));
        }
        params
    }
}

impl<S: TokenSource> PmsClient<S> {
    /// Fetch availability and return the upstream document unmodified.
    ///
    /// Shape reconciliation happens downstream; this call only classifies
    /// the HTTP outcome.
    pub async fn check_availability(&self, query: &AvailabilityQuery) -> Result<Value, Error> {
        let path = format!("par/v1/hotels/{}/availability", self.hotel_segment());
        self.get(&path, &query.params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> AvailabilityQuery {
        AvailabilityQuery {
            start_date: "2025-06-01".into(),
            end_date: "2025-06-05".into(),
            adults: 2,
            children: 1,
            limit: 50,
            rate_plan_code: None,
            promotion_code: None,
        }
    }

    #[test]
    fn params_fix_room_stay_quantity() {
        let params = query().params();
        assert_eq!(
            params,
            vec![
                ("roomStayStartDate", "2025-06-01".to_owned()),
                ("roomStayEndDate", "2025-06-05".to_owned()),
                ("adults", "2".to_owned()),
                ("children", "1".to_owned()),
                ("roomStayQuantity", "1".to_owned()),
                ("limit", "50".to_owned()),
            ]
        );
    }

    #[test]
    fn optional_codes_are_appended_when_present() {
        let mut q = query();
        q.rate_plan_code = Some("AIF-2025".into());
        q.promotion_code = Some(String::new());
        let params = q.params();
        assert_eq!(params.last(), Some(&("ratePlanCode", "AIF-2025".to_owned())));
        assert!(params.iter().all(|(k, _)| *k != "promotionCode"));
    }
}
