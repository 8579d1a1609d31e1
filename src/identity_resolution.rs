//! Flattening of identity resolution (cleanseMatch) responses.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::address::{simple_address_labels, simple_address_values};
use crate::cell::Cell;
use crate::errors::AppError;
use crate::header::Label;
use crate::layout::ERROR_MARKER;
use crate::models::{DnbError, Organization};
use crate::navigate::{list, non_empty};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdrResponse {
    #[serde(default, deserialize_with = "non_empty")]
    pub inquiry_detail: Option<IdrInquiryDetail>,
    #[serde(default, deserialize_with = "list")]
    pub match_candidates: Vec<MatchCandidate>,
    #[serde(default, deserialize_with = "non_empty")]
    pub error: Option<DnbError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdrInquiryDetail {
    /// Echoed customer references; D&B sends one string or a list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub customer_reference: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    #[serde(default, deserialize_with = "non_empty")]
    pub organization: Option<Organization>,
    #[serde(default, deserialize_with = "non_empty")]
    pub match_quality_information: Option<MatchQuality>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuality {
    pub match_grade: Option<String>,
    pub confidence_code: Option<Number>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(reference)) => vec![reference],
        Some(OneOrMany::Many(references)) => references,
        None => Vec::new(),
    })
}

impl IdrResponse {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    fn customer_reference(&self, idx: usize) -> Cell {
        self.inquiry_detail
            .as_ref()
            .and_then(|detail| detail.customer_reference.get(idx))
            .into()
    }
}

pub fn idr_header() -> Vec<String> {
    let mut labels: Vec<String> = ["customer reference 1", "customer reference 2", "DUNS", "name", "operating status"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    labels.extend(simple_address_labels(&Label::group()));
    labels.extend(
        ["registration number", "match grade", "confidence code"]
            .iter()
            .map(|s| s.to_string()),
    );

    labels
}

/// Flattens the top match candidate. An error response yields the customer
/// references, the error message and [`ERROR_MARKER`] instead.
pub fn idr_row(resp: &IdrResponse) -> Vec<Cell> {
    let mut cells = vec![resp.customer_reference(0), resp.customer_reference(1)];

    let top = resp.match_candidates.first();
    if top.is_none() {
        if let Some(err) = resp.error.as_ref() {
            cells.push(err.error_message.as_ref().into());
            cells.push(Cell::from(ERROR_MARKER));
            return cells;
        }
    }

    let org = top.and_then(|candidate| candidate.organization.as_ref());
    let quality = top.and_then(|candidate| candidate.match_quality_information.as_ref());

    cells.push(org.and_then(|o| o.duns.as_ref()).into());
    cells.push(org.and_then(|o| o.primary_name.as_ref()).into());
    cells.push(
        org.and_then(|o| o.operating_status())
            .and_then(|s| s.description.as_ref())
            .into(),
    );
    cells.extend(simple_address_values(org.and_then(|o| o.primary_address.as_ref())));
    cells.push(
        org.and_then(|o| o.registration_numbers.first())
            .and_then(|r| r.registration_number.as_ref())
            .into(),
    );
    cells.push(quality.and_then(|q| q.match_grade.as_ref()).into());
    cells.push(quality.and_then(|q| q.confidence_code.as_ref()).into());

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_candidate_row() {
        let resp = IdrResponse::from_json(
            r#"{
                "inquiryDetail": {"customerReference": ["ref-1", "ref-2"]},
                "matchCandidates": [
                    {
                        "organization": {
                            "duns": "123456789",
                            "primaryName": "Acme BV",
                            "primaryAddress": {"addressCountry": {"isoAlpha2Code": "NL"}},
                            "registrationNumbers": [{"registrationNumber": "12345678"}]
                        },
                        "matchQualityInformation": {"matchGrade": "AAAAAAAAAAA", "confidenceCode": 10}
                    },
                    {"organization": {"duns": "987654321"}}
                ]
            }"#,
        )
        .unwrap();

        let row = idr_row(&resp);
        assert_eq!(row.len(), idr_header().len());
        assert_eq!(row[0], Cell::from("ref-1"));
        assert_eq!(row[2], Cell::from("123456789"));
        assert_eq!(row[10], Cell::from("NL"));
        assert_eq!(row[11], Cell::from("12345678"));
        assert_eq!(row[13], Cell::Number(10.into()));
    }

    #[test]
    fn test_error_response_row() {
        let resp = IdrResponse::from_json(
            r#"{
                "inquiryDetail": {"customerReference": "ref-1"},
                "error": {"errorCode": "20502", "errorMessage": "No match"}
            }"#,
        )
        .unwrap();

        assert_eq!(
            idr_row(&resp),
            vec![
                Cell::from("ref-1"),
                Cell::Null,
                Cell::from("No match"),
                Cell::from(ERROR_MARKER)
            ]
        );
    }
}
