//! Resolution of the financial figures of an entity.
//!
//! The latest financials of the financial block are used when they carry a
//! non-blank currency. Otherwise the modelled or estimated figures of the company
//! information block are used: most recent statement year first, modelled
//! before estimated before anything else.

use crate::cell::Cell;
use crate::employees::Reliability;
use crate::header::Label;
use crate::models::{CompanyFinancials, LatestFinancials, Organization, YearlyRevenue};

/// Labels of the eight financial cells, in column order.
pub const FINANCIAL_LABELS: [&str; 8] = [
    "sales rev",
    "total assets",
    "currency",
    "units",
    "reliability (financials)",
    "info scope (financials)",
    "stmt from date",
    "stmt to date",
];

/// Sales revenue, total assets, currency, units, reliability, information
/// scope, statement from date and statement to date.
pub fn financial_values(org: &Organization) -> [Cell; 8] {
    let mut latest_cells = None;

    if let Some(latest) = org.latest_financials.as_ref() {
        let cells = latest_financial_cells(latest);
        if latest.currency.as_deref().is_some_and(|c| !c.trim().is_empty()) {
            return cells;
        }
        latest_cells = Some(cells);
    }

    match best_company_financials(&org.financials) {
        Some(fin) => company_financial_cells(fin),
        None => latest_cells.unwrap_or_default(),
    }
}

pub fn financial_labels(base: &Label) -> Vec<String> {
    FINANCIAL_LABELS
        .iter()
        .map(|desc| base.render(desc, None))
        .collect()
}

fn latest_financial_cells(latest: &LatestFinancials) -> [Cell; 8] {
    let overview = latest.overview.as_ref();

    [
        overview.and_then(|o| o.sales_revenue.as_ref()).into(),
        overview.and_then(|o| o.total_assets.as_ref()).into(),
        latest.currency.as_ref().into(),
        latest.units.as_ref().into(),
        latest
            .reliability
            .as_ref()
            .and_then(|r| r.description.as_ref())
            .into(),
        latest
            .information_scope
            .as_ref()
            .and_then(|s| s.description.as_ref())
            .into(),
        latest.financial_statement_from_date.as_ref().into(),
        latest.financial_statement_to_date.as_ref().into(),
    ]
}

/// Year of the statement end date; 0 when absent or unparsable.
fn statement_year(fin: &CompanyFinancials) -> u32 {
    fin.financial_statement_to_date
        .as_deref()
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
        .unwrap_or(0)
}

fn reliability_rank(fin: &CompanyFinancials) -> u8 {
    match fin.reliability_dnb_code.and_then(Reliability::from_dnb_code) {
        Some(Reliability::Modelled) => 1,
        Some(Reliability::Estimated) => 2,
        _ => u8::MAX,
    }
}

fn best_company_financials(financials: &[CompanyFinancials]) -> Option<&CompanyFinancials> {
    let mut ranked: Vec<&CompanyFinancials> = financials.iter().collect();
    ranked.sort_by_key(|fin| (std::cmp::Reverse(statement_year(fin)), reliability_rank(fin)));

    ranked.into_iter().next()
}

/// One yearly revenue of a statement. With several, the first one not in
/// USD. When all of them are in USD there is no pick.
fn pick_yearly_revenue(revenues: &[YearlyRevenue]) -> Option<&YearlyRevenue> {
    match revenues {
        [single] => Some(single),
        _ => revenues
            .iter()
            .find(|rev| rev.currency.as_deref() != Some("USD")),
    }
}

fn company_financial_cells(fin: &CompanyFinancials) -> [Cell; 8] {
    let revenue = pick_yearly_revenue(&fin.yearly_revenue);

    [
        revenue.and_then(|rev| rev.value.as_ref()).into(),
        Cell::Null,
        revenue.and_then(|rev| rev.currency.as_ref()).into(),
        fin.unit_code.as_ref().into(),
        fin.reliability_description.as_ref().into(),
        fin.information_scope_description.as_ref().into(),
        Cell::Null,
        fin.financial_statement_to_date.as_ref().into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org(value: serde_json::Value) -> Organization {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_latest_financials_with_currency() {
        let org = org(json!({
            "latestFinancials": {
                "overview": {"salesRevenue": 1500000, "totalAssets": 900000},
                "currency": "EUR",
                "units": "Single Units",
                "reliability": {"description": "Actual"},
                "financialStatementToDate": "2022-12-31"
            },
            "financials": [{"yearlyRevenue": [{"value": 1, "currency": "EUR"}]}]
        }));
        let cells = financial_values(&org);
        assert_eq!(cells[0], Cell::Number(1500000.into()));
        assert_eq!(cells[1], Cell::Number(900000.into()));
        assert_eq!(cells[2], Cell::from("EUR"));
        assert_eq!(cells[7], Cell::from("2022-12-31"));
    }

    #[test]
    fn test_fallback_prefers_recent_year_then_modelled() {
        let org = org(json!({
            "latestFinancials": {"overview": {"salesRevenue": 10}},
            "financials": [
                {"financialStatementToDate": "2021-12-31", "reliabilityDnBCode": 9094,
                 "yearlyRevenue": [{"value": 1, "currency": "EUR"}]},
                {"financialStatementToDate": "2022-12-31", "reliabilityDnBCode": 9093,
                 "yearlyRevenue": [{"value": 2, "currency": "EUR"}]},
                {"financialStatementToDate": "2022-06-30", "reliabilityDnBCode": 9094,
                 "reliabilityDescription": "Modelled",
                 "yearlyRevenue": [{"value": 3, "currency": "EUR"}]}
            ]
        }));
        let cells = financial_values(&org);
        assert_eq!(cells[0], Cell::Number(3.into()));
        assert_eq!(cells[1], Cell::Null);
        assert_eq!(cells[4], Cell::from("Modelled"));
        assert_eq!(cells[6], Cell::Null);
    }

    #[test]
    fn test_blank_latest_currency_falls_back() {
        let org = org(json!({
            "latestFinancials": {"overview": {"salesRevenue": 10}, "currency": ""},
            "financials": [{"financialStatementToDate": "2022-12-31",
                            "yearlyRevenue": [{"value": 7, "currency": "EUR"}]}]
        }));
        let cells = financial_values(&org);
        assert_eq!(cells[0], Cell::Number(7.into()));
        assert_eq!(cells[2], Cell::from("EUR"));
    }

    #[test]
    fn test_dated_statement_beats_missing_or_garbled_date() {
        let org = org(json!({
            "financials": [
                {"reliabilityDnBCode": 9094,
                 "yearlyRevenue": [{"value": 1, "currency": "EUR"}]},
                {"financialStatementToDate": "garbage", "reliabilityDnBCode": 9094,
                 "yearlyRevenue": [{"value": 2, "currency": "EUR"}]},
                {"financialStatementToDate": "2019-12-31",
                 "yearlyRevenue": [{"value": 2019, "currency": "EUR"}]}
            ]
        }));
        let cells = financial_values(&org);
        assert_eq!(cells[0], Cell::Number(2019.into()));
        assert_eq!(cells[7], Cell::from("2019-12-31"));
    }

    #[test]
    fn test_ranked_reliability_beats_unranked() {
        let org = org(json!({
            "financials": [
                {"financialStatementToDate": "2022", "yearlyRevenue": [{"value": 1}]},
                {"financialStatementToDate": "2022", "reliabilityDnBCode": 9093,
                 "yearlyRevenue": [{"value": 2}]}
            ]
        }));
        assert_eq!(financial_values(&org)[0], Cell::Number(2.into()));
    }

    #[test]
    fn test_local_currency_preferred() {
        let org = org(json!({
            "financials": [{"yearlyRevenue": [
                {"value": 110, "currency": "USD"},
                {"value": 100, "currency": "EUR"}
            ]}]
        }));
        let cells = financial_values(&org);
        assert_eq!(cells[0], Cell::Number(100.into()));
        assert_eq!(cells[2], Cell::from("EUR"));
    }

    #[test]
    fn test_all_usd_leaves_revenue_empty() {
        let org = org(json!({
            "financials": [{"unitCode": "Single Units", "yearlyRevenue": [
                {"value": 110, "currency": "USD"},
                {"value": 120, "currency": "USD"}
            ]}]
        }));
        let cells = financial_values(&org);
        assert_eq!(cells[0], Cell::Null);
        assert_eq!(cells[2], Cell::Null);
        assert_eq!(cells[3], Cell::from("Single Units"));
    }

    #[test]
    fn test_no_figures() {
        let cells = financial_values(&Organization::default());
        assert!(cells.iter().all(Cell::is_null));
        assert_eq!(financial_labels(&Label::group()).len(), cells.len());
    }
}
