use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::navigate::{lenient_i64, list, non_empty};

// ============ Data Blocks Response ============

/// One D&B Direct+ data blocks response, i.e. one legal entity.
///
/// Either `organization` or `error` is populated. The value is read-only
/// once decoded; every selector borrows from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBlocks {
    /// Transaction metadata (timestamp, transaction ID).
    #[serde(default, deserialize_with = "non_empty")]
    pub transaction_detail: Option<TransactionDetail>,
    /// Echo of the request parameters.
    #[serde(default, deserialize_with = "non_empty")]
    pub inquiry_detail: Option<InquiryDetail>,
    /// The entity data; absent when the request failed.
    #[serde(default)]
    pub organization: Option<Organization>,
    /// Error report returned instead of entity data.
    #[serde(default, deserialize_with = "non_empty")]
    pub error: Option<DnbError>,
}

/// What a decoded response carries.
#[derive(Debug, Clone, Copy)]
pub enum DocumentBody<'a> {
    Organization(&'a Organization),
    Error(&'a DnbError),
    /// Neither organization data nor an error report.
    Empty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(rename = "transactionID")]
    pub transaction_id: Option<String>,
    pub transaction_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDetail {
    pub duns: Option<String>,
    #[serde(default, rename = "blockIDs", deserialize_with = "list")]
    pub block_ids: Vec<String>,
    pub trade_up: Option<String>,
    pub customer_reference: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnbError {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Level and version of one requested data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLevel {
    pub level: u32,
    pub version: u32,
}

impl DataBlocks {
    /// Decodes one response body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ParseError` when the body is not valid JSON or does
    /// not have the data blocks shape. The caller skips such documents.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Same as [`DataBlocks::from_json`] for an already decoded value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AppError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn body(&self) -> DocumentBody<'_> {
        match (&self.organization, &self.error) {
            (Some(org), _) => DocumentBody::Organization(org),
            (None, Some(err)) => DocumentBody::Error(err),
            (None, None) => DocumentBody::Empty,
        }
    }

    pub fn inquiry_duns(&self) -> Option<&str> {
        self.inquiry_detail.as_ref()?.duns.as_deref()
    }

    /// Converts `inquiryDetail.blockIDs` (e.g. `companyinfo_L2_v1`) into a
    /// map keyed on the block name. Malformed IDs are skipped.
    pub fn block_ids(&self) -> BTreeMap<String, BlockLevel> {
        self.inquiry_detail
            .iter()
            .flat_map(|detail| detail.block_ids.iter())
            .filter_map(|block_id| parse_block_id(block_id))
            .collect()
    }

    /// The transaction timestamp as `YYYYMMDD`, or an empty string when
    /// absent or unparsable.
    pub fn transaction_date(&self) -> String {
        self.transaction_detail
            .as_ref()
            .and_then(|detail| detail.transaction_timestamp.as_deref())
            .and_then(parse_timestamp_date)
            .map(|date| date.format("%Y%m%d").to_string())
            .unwrap_or_default()
    }
}

fn parse_timestamp_date(tts: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(tts) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    NaiveDate::parse_from_str(tts.get(..10)?, "%Y-%m-%d").ok()
}

/// Splits a block ID such as `companyinfo_L2_v1` into name, level and version.
pub fn parse_block_id(block_id: &str) -> Option<(String, BlockLevel)> {
    let mut parts = block_id.split('_');
    let name = parts.next()?;
    let level = parts.next()?.strip_prefix('L')?.parse().ok()?;
    let version = parts.next()?.strip_prefix('v')?.parse().ok()?;

    Some((name.to_string(), BlockLevel { level, version }))
}

// ============ Organization ============

/// A coded value as D&B returns it: a description plus its reference code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Described {
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub dnb_code: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub duns: Option<String>,
    pub primary_name: Option<String>,
    #[serde(rename = "countryISOAlpha2Code")]
    pub country_iso_alpha2_code: Option<String>,
    pub registered_name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub duns_control_status: Option<DunsControlStatus>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub business_entity_type: Option<Described>,
    /// Legal form from D&B reference table 750.
    #[serde(default, deserialize_with = "non_empty")]
    pub legal_form: Option<Described>,
    #[serde(default, deserialize_with = "non_empty")]
    pub registered_details: Option<RegisteredDetails>,
    #[serde(default, deserialize_with = "non_empty")]
    pub organization_size_category: Option<Described>,
    pub default_currency: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub primary_address: Option<Address>,

    #[serde(default, deserialize_with = "list")]
    pub registration_numbers: Vec<RegistrationNumber>,
    #[serde(default, deserialize_with = "list")]
    pub industry_codes: Vec<IndustryCode>,
    #[serde(default, deserialize_with = "list")]
    pub number_of_employees: Vec<EmployeeCount>,

    #[serde(default, deserialize_with = "non_empty")]
    pub latest_financials: Option<LatestFinancials>,
    /// Modelled/estimated figures from the company information block.
    #[serde(default, deserialize_with = "list")]
    pub financials: Vec<CompanyFinancials>,

    #[serde(default, deserialize_with = "non_empty")]
    pub corporate_linkage: Option<CorporateLinkage>,
    #[serde(default, deserialize_with = "non_empty")]
    pub legal_events: Option<LegalEvents>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DunsControlStatus {
    #[serde(default, deserialize_with = "non_empty")]
    pub operating_status: Option<OperatingStatus>,
    #[serde(default, deserialize_with = "non_empty")]
    pub operating_sub_status: Option<OperatingStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingStatus {
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub dnb_code: Option<i64>,
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDetails {
    /// Legal form from D&B reference table 4.
    #[serde(default, deserialize_with = "non_empty")]
    pub legal_form: Option<Described>,
}

impl Organization {
    pub fn operating_status(&self) -> Option<&OperatingStatus> {
        self.duns_control_status.as_ref()?.operating_status.as_ref()
    }

    pub fn operating_sub_status(&self) -> Option<&OperatingStatus> {
        self.duns_control_status.as_ref()?.operating_sub_status.as_ref()
    }

    /// Legal form code of the registered details (table 4).
    pub fn registered_legal_form_code(&self) -> Option<i64> {
        self.registered_details.as_ref()?.legal_form.as_ref()?.dnb_code
    }

    pub fn registered_legal_form_description(&self) -> Option<&str> {
        self.registered_details
            .as_ref()?
            .legal_form
            .as_ref()?
            .description
            .as_deref()
    }
}

// ============ Address ============

/// A postal address sub-document (primary, registered or mailing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "non_empty")]
    pub street_address: Option<StreetAddress>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub address_locality: Option<Locality>,
    #[serde(default, deserialize_with = "non_empty")]
    pub address_region: Option<Region>,
    #[serde(default, deserialize_with = "non_empty")]
    pub address_country: Option<Country>,
    pub is_registered_address: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub name: Option<String>,
    pub abbreviated_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: Option<String>,
    pub iso_alpha2_code: Option<String>,
}

// ============ Registration Numbers, Industry Codes, Employees ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationNumber {
    pub registration_number: Option<String>,
    #[serde(default, rename = "typeDnBCode", deserialize_with = "lenient_i64")]
    pub type_dnb_code: Option<i64>,
    pub type_description: Option<String>,
    pub is_preferred_registration_number: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryCode {
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(default, rename = "typeDnBCode", deserialize_with = "lenient_i64")]
    pub type_dnb_code: Option<i64>,
    pub type_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCount {
    pub value: Option<Number>,
    pub information_scope_description: Option<String>,
    #[serde(default, rename = "informationScopeDnBCode", deserialize_with = "lenient_i64")]
    pub information_scope_dnb_code: Option<i64>,
    pub reliability_description: Option<String>,
    #[serde(default, rename = "reliabilityDnBCode", deserialize_with = "lenient_i64")]
    pub reliability_dnb_code: Option<i64>,
}

// ============ Financials ============

/// The "latest financials" object of the company financials block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestFinancials {
    #[serde(default, deserialize_with = "non_empty")]
    pub overview: Option<FinancialOverview>,
    pub currency: Option<String>,
    pub units: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub reliability: Option<Described>,
    #[serde(default, deserialize_with = "non_empty")]
    pub information_scope: Option<Described>,
    pub financial_statement_from_date: Option<String>,
    pub financial_statement_to_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialOverview {
    pub sales_revenue: Option<Number>,
    pub total_assets: Option<Number>,
}

/// One historical entry of `organization.financials[]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFinancials {
    #[serde(default, deserialize_with = "list")]
    pub yearly_revenue: Vec<YearlyRevenue>,
    #[serde(default, rename = "reliabilityDnBCode", deserialize_with = "lenient_i64")]
    pub reliability_dnb_code: Option<i64>,
    pub reliability_description: Option<String>,
    pub information_scope_description: Option<String>,
    pub unit_code: Option<String>,
    pub financial_statement_to_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRevenue {
    pub value: Option<Number>,
    pub currency: Option<String>,
}

// ============ Corporate Linkage ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateLinkage {
    #[serde(default, deserialize_with = "list")]
    pub familytree_roles_played: Vec<Described>,
    pub hierarchy_level: Option<Number>,
    pub global_ultimate_family_tree_members_count: Option<Number>,
    pub branches_count: Option<Number>,
    #[serde(default, deserialize_with = "non_empty")]
    pub head_quarter: Option<LinkageMember>,
    #[serde(default, deserialize_with = "non_empty")]
    pub parent: Option<LinkageMember>,
    #[serde(default, deserialize_with = "non_empty")]
    pub domestic_ultimate: Option<LinkageMember>,
    #[serde(default, deserialize_with = "non_empty")]
    pub global_ultimate: Option<LinkageMember>,
}

/// A miniature organization reference inside the corporate linkage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkageMember {
    pub duns: Option<String>,
    pub primary_name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub primary_address: Option<Address>,
}

// ============ Legal Events ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalEvents {
    pub has_bankruptcy: Option<bool>,
    #[serde(default, deserialize_with = "non_empty")]
    pub bankruptcy: Option<FilingSummary>,
    pub has_open_bankruptcy: Option<bool>,
    pub has_insolvency: Option<bool>,
    #[serde(default, deserialize_with = "non_empty")]
    pub insolvency: Option<FilingSummary>,
    pub has_liquidation: Option<bool>,
    pub has_suspension_of_payments: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingSummary {
    pub most_recent_filing_date: Option<String>,
}
