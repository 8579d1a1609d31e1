//! Row assembly: column plans and the rows and headers they produce.
//!
//! A [`ColumnPlan`] is an ordered list of [`Column`]s. Each column knows
//! both its labels and its values, and both always have the same width, so
//! a plan's header lines up with every row it assembles.

use crate::address::{
    address_labels, address_values, simple_address_labels, simple_address_values,
    AddrComponent, ANACREDIT_ADDRESS,
};
use crate::cell::Cell;
use crate::employees::{employee_labels, employee_values, EmplComponent, EmployeeScope};
use crate::financials::{financial_labels, financial_values};
use crate::header::Label;
use crate::industry_codes::{
    industry_code_labels, industry_code_values, IndCodeComponent, IndustryScheme,
};
use crate::linkage::{
    family_tree_roles, is_global_ultimate, linkage_level_labels, linkage_level_values,
    resolve_levels, simple_linkage_level_labels, simple_linkage_level_values, LinkageComponent,
    LinkageLevel,
};
use crate::models::{DataBlocks, DnbError, DocumentBody, Organization};
use crate::reference_tables::tables;
use crate::registration_numbers::{
    registration_number_labels, registration_number_values, RegNumComponent,
};

/// Last cell of an error row.
pub const ERROR_MARKER: &str = "😞";

/// Scalar fields copied one to one from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    InquiryDuns,
    TradeUp,
    CustomerReference,
    TransactionDate,
    Duns,
    PrimaryName,
    CountryIso,
    RegisteredName,
    OperatingStatus,
    OperatingStatusDate,
    OperatingSubStatus,
    StartDate,
    BusinessEntityType,
    LegalFormCode,
    LegalFormDescription,
    EntitySize,
    DefaultCurrency,
    HasBankruptcy,
    BankruptcyDate,
    HasOpenBankruptcy,
    HasInsolvency,
    InsolvencyDate,
    HasLiquidation,
    HasSuspensionOfPayments,
}

impl Field {
    pub fn desc(self) -> &'static str {
        match self {
            Field::InquiryDuns => "inquiry DUNS",
            Field::TradeUp => "trade up",
            Field::CustomerReference => "customer reference",
            Field::TransactionDate => "date requested",
            Field::Duns => "DUNS",
            Field::PrimaryName => "name",
            Field::CountryIso => "country ISO",
            Field::RegisteredName => "registered name",
            Field::OperatingStatus => "operating status",
            Field::OperatingStatusDate => "operating status date",
            Field::OperatingSubStatus => "operating substatus",
            Field::StartDate => "start date",
            Field::BusinessEntityType => "entity type",
            Field::LegalFormCode => "code legal form detailed",
            Field::LegalFormDescription => "legal form detailed",
            Field::EntitySize => "entity size",
            Field::DefaultCurrency => "default currency",
            Field::HasBankruptcy => "has bankruptcy",
            Field::BankruptcyDate => "has bankruptcy date",
            Field::HasOpenBankruptcy => "has open bankruptcy",
            Field::HasInsolvency => "has insolvency",
            Field::InsolvencyDate => "has insolvency date",
            Field::HasLiquidation => "has liquidation",
            Field::HasSuspensionOfPayments => "has susp of paym",
        }
    }

    pub fn value(self, dbs: &DataBlocks, org: &Organization) -> Cell {
        let inquiry = dbs.inquiry_detail.as_ref();
        let events = org.legal_events.as_ref();

        match self {
            Field::InquiryDuns => dbs.inquiry_duns().into(),
            Field::TradeUp => inquiry.and_then(|i| i.trade_up.as_ref()).into(),
            Field::CustomerReference => inquiry.and_then(|i| i.customer_reference.as_ref()).into(),
            Field::TransactionDate => Some(dbs.transaction_date())
                .filter(|date| !date.is_empty())
                .into(),
            Field::Duns => org.duns.as_ref().into(),
            Field::PrimaryName => org.primary_name.as_ref().into(),
            Field::CountryIso => org.country_iso_alpha2_code.as_ref().into(),
            Field::RegisteredName => org.registered_name.as_ref().into(),
            Field::OperatingStatus => org
                .operating_status()
                .and_then(|s| s.description.as_ref())
                .into(),
            Field::OperatingStatusDate => org
                .operating_status()
                .and_then(|s| s.start_date.as_ref())
                .into(),
            Field::OperatingSubStatus => org
                .operating_sub_status()
                .and_then(|s| s.description.as_ref())
                .into(),
            Field::StartDate => org.start_date.as_ref().into(),
            Field::BusinessEntityType => org
                .business_entity_type
                .as_ref()
                .and_then(|t| t.description.as_ref())
                .into(),
            Field::LegalFormCode => org.registered_legal_form_code().into(),
            Field::LegalFormDescription => org.registered_legal_form_description().into(),
            Field::EntitySize => org
                .organization_size_category
                .as_ref()
                .and_then(|s| s.description.as_ref())
                .into(),
            Field::DefaultCurrency => org.default_currency.as_ref().into(),
            Field::HasBankruptcy => events.and_then(|e| e.has_bankruptcy).into(),
            Field::BankruptcyDate => events
                .and_then(|e| e.bankruptcy.as_ref())
                .and_then(|f| f.most_recent_filing_date.as_ref())
                .into(),
            Field::HasOpenBankruptcy => events.and_then(|e| e.has_open_bankruptcy).into(),
            Field::HasInsolvency => events.and_then(|e| e.has_insolvency).into(),
            Field::InsolvencyDate => events
                .and_then(|e| e.insolvency.as_ref())
                .and_then(|f| f.most_recent_filing_date.as_ref())
                .into(),
            Field::HasLiquidation => events.and_then(|e| e.has_liquidation).into(),
            Field::HasSuspensionOfPayments => {
                events.and_then(|e| e.has_suspension_of_payments).into()
            }
        }
    }
}

/// ECB legal form code of `org`.
///
/// Entities in an ECB EU country map the legal form of their registered
/// details (D&B table 4), all others their legal form (D&B table 750).
pub fn ecb_legal_form(org: &Organization) -> Option<&'static str> {
    let in_eu = org
        .country_iso_alpha2_code
        .as_deref()
        .is_some_and(|country| tables().is_ecb_eu_country(country));

    let (code, form) = if in_eu {
        let code = org.registered_legal_form_code();
        (code, code.and_then(|c| tables().legal_form_eu(c)))
    } else {
        let code = org.legal_form.as_ref().and_then(|f| f.dnb_code);
        (code, code.and_then(|c| tables().legal_form_rw(c)))
    };

    if form.is_none() {
        tracing::debug!("➡️ Legal form code {:?} not mapped", code);
    }

    form.map(|f| f.ecb_code)
}

/// One column group of a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Field(Field),
    /// A fixed value under a fixed label.
    Constant {
        label: &'static str,
        value: &'static str,
    },
    PrimaryAddress(Vec<AddrComponent>),
    SimplePrimaryAddress,
    RegistrationNumbers {
        components: Vec<RegNumComponent>,
        count: usize,
    },
    IndustryCodes {
        scheme: IndustryScheme,
        components: Vec<IndCodeComponent>,
        count: usize,
    },
    Employees {
        scopes: Vec<EmployeeScope>,
        components: Vec<EmplComponent>,
        count: usize,
        /// First label index of the group.
        first_index: Option<usize>,
    },
    Financials,
    EcbLegalForm,
    /// `HQ` or `Parent`, whichever fills the one-level-up slot.
    OneLevelUpKind,
    LinkageLevel {
        level: LinkageLevel,
        components: Vec<LinkageComponent>,
        addr_components: Vec<AddrComponent>,
    },
    SimpleLinkageLevel(LinkageLevel),
    HierarchyLevel,
    FamilyTreeMembersCount,
    BranchesCount,
    IsGlobalUltimate,
    FamilyTreeRoles,
}

impl Column {
    fn labels(&self) -> Vec<String> {
        match self {
            Column::Field(field) => vec![field.desc().to_string()],
            Column::Constant { label, .. } => vec![label.to_string()],
            Column::PrimaryAddress(components) => address_labels(components, &Label::group()),
            Column::SimplePrimaryAddress => simple_address_labels(&Label::group()),
            Column::RegistrationNumbers { components, count } => {
                registration_number_labels(components, *count, &Label::group())
            }
            Column::IndustryCodes {
                scheme,
                components,
                count,
            } => industry_code_labels(
                components,
                *count,
                &Label::group().with_suffix(scheme.label_suffix()),
            ),
            Column::Employees {
                components,
                count,
                first_index,
                ..
            } => {
                let base = match first_index {
                    Some(index) => Label::group().with_index(*index),
                    None => Label::group(),
                };
                employee_labels(components, *count, &base)
            }
            Column::Financials => financial_labels(&Label::group()),
            Column::EcbLegalForm => vec!["ECB legal form".to_string()],
            Column::OneLevelUpKind => vec!["HQ or parent".to_string()],
            Column::LinkageLevel {
                level,
                components,
                addr_components,
            } => linkage_level_labels(components, addr_components, &level.label()),
            Column::SimpleLinkageLevel(level) => simple_linkage_level_labels(&level.label()),
            Column::HierarchyLevel => vec!["hierarchy level".to_string()],
            Column::FamilyTreeMembersCount => vec!["global ult family tree members".to_string()],
            Column::BranchesCount => vec!["branches count".to_string()],
            Column::IsGlobalUltimate => vec!["is global ult".to_string()],
            Column::FamilyTreeRoles => vec!["family tree roles".to_string()],
        }
    }

    fn values(&self, dbs: &DataBlocks, org: &Organization) -> Vec<Cell> {
        let linkage = org.corporate_linkage.as_ref();

        match self {
            Column::Field(field) => vec![field.value(dbs, org)],
            Column::Constant { value, .. } => vec![Cell::from(*value)],
            Column::PrimaryAddress(components) => {
                address_values(org.primary_address.as_ref(), components)
            }
            Column::SimplePrimaryAddress => simple_address_values(org.primary_address.as_ref()),
            Column::RegistrationNumbers { components, count } => {
                registration_number_values(&org.registration_numbers, components, *count)
            }
            Column::IndustryCodes {
                scheme,
                components,
                count,
            } => industry_code_values(&org.industry_codes, *scheme, components, *count),
            Column::Employees {
                scopes,
                components,
                count,
                ..
            } => employee_values(&org.number_of_employees, scopes, components, *count),
            Column::Financials => financial_values(org).to_vec(),
            Column::EcbLegalForm => vec![ecb_legal_form(org).into()],
            Column::OneLevelUpKind => {
                vec![resolve_levels(org).one_level_up_kind().map(|k| k.as_str()).into()]
            }
            Column::LinkageLevel {
                level,
                components,
                addr_components,
            } => linkage_level_values(resolve_levels(org).get(*level), components, addr_components),
            Column::SimpleLinkageLevel(level) => {
                simple_linkage_level_values(resolve_levels(org).get(*level))
            }
            Column::HierarchyLevel => vec![linkage.and_then(|l| l.hierarchy_level.as_ref()).into()],
            Column::FamilyTreeMembersCount => vec![linkage
                .and_then(|l| l.global_ultimate_family_tree_members_count.as_ref())
                .into()],
            Column::BranchesCount => vec![linkage.and_then(|l| l.branches_count.as_ref()).into()],
            Column::IsGlobalUltimate => vec![is_global_ultimate(org).into()],
            Column::FamilyTreeRoles => vec![family_tree_roles(org).into()],
        }
    }
}

/// Output layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    /// Columns for AnaCredit counterparty reference data.
    #[value(name = "anacredit")]
    AnaCredit,
    /// Identification, primary address and hierarchy.
    General,
}

impl Layout {
    pub fn plan(self) -> ColumnPlan {
        match self {
            Layout::AnaCredit => ColumnPlan::anacredit(),
            Layout::General => ColumnPlan::general(),
        }
    }
}

/// What a document assembles into.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembledRow {
    Data(Vec<Cell>),
    /// Abbreviated row of an entity-level error document.
    Error(Vec<Cell>),
}

impl AssembledRow {
    pub fn cells(&self) -> &[Cell] {
        match self {
            AssembledRow::Data(cells) | AssembledRow::Error(cells) => cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub columns: Vec<Column>,
}

impl ColumnPlan {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn anacredit() -> Self {
        let linkage_level = |level| Column::LinkageLevel {
            level,
            components: vec![LinkageComponent::Duns, LinkageComponent::Name],
            addr_components: ANACREDIT_ADDRESS.to_vec(),
        };
        let employee_components = vec![
            EmplComponent::Value,
            EmplComponent::Reliability,
            EmplComponent::Scope,
        ];

        Self::new(vec![
            Column::Field(Field::Duns),
            Column::Constant {
                label: "LEI",
                value: "LEI placeholder",
            },
            Column::RegistrationNumbers {
                components: vec![RegNumComponent::EcbFormatted, RegNumComponent::EcbType],
                count: 2,
            },
            Column::Field(Field::PrimaryName),
            Column::PrimaryAddress(ANACREDIT_ADDRESS.to_vec()),
            Column::Field(Field::LegalFormCode),
            Column::EcbLegalForm,
            Column::Constant {
                label: "Inst sector",
                value: "institutional sector",
            },
            Column::IndustryCodes {
                scheme: IndustryScheme::NaceRev2,
                components: vec![IndCodeComponent::Code],
                count: 1,
            },
            Column::Field(Field::OperatingStatus),
            Column::Field(Field::OperatingStatusDate),
            Column::Field(Field::OperatingSubStatus),
            Column::Field(Field::HasBankruptcy),
            Column::Field(Field::BankruptcyDate),
            Column::Field(Field::HasOpenBankruptcy),
            Column::Field(Field::HasInsolvency),
            Column::Field(Field::InsolvencyDate),
            Column::Field(Field::HasLiquidation),
            Column::Field(Field::HasSuspensionOfPayments),
            Column::Field(Field::EntitySize),
            Column::Employees {
                scopes: vec![EmployeeScope::Individual, EmployeeScope::HeadQuarters],
                components: employee_components.clone(),
                count: 2,
                first_index: None,
            },
            Column::Employees {
                scopes: vec![EmployeeScope::Consolidated],
                components: employee_components,
                count: 1,
                first_index: Some(3),
            },
            Column::Financials,
            Column::OneLevelUpKind,
            linkage_level(LinkageLevel::OneLevelUp),
            linkage_level(LinkageLevel::GlobalUltimate),
        ])
    }

    pub fn general() -> Self {
        Self::new(vec![
            Column::Field(Field::Duns),
            Column::Field(Field::PrimaryName),
            Column::Field(Field::OperatingStatus),
            Column::SimplePrimaryAddress,
            Column::HierarchyLevel,
            Column::FamilyTreeMembersCount,
            Column::BranchesCount,
            Column::IsGlobalUltimate,
            Column::SimpleLinkageLevel(LinkageLevel::OneLevelUp),
            Column::SimpleLinkageLevel(LinkageLevel::DomesticUltimate),
            Column::SimpleLinkageLevel(LinkageLevel::GlobalUltimate),
            Column::FamilyTreeRoles,
        ])
    }

    /// Column labels. Depends on the plan only, never on a document.
    pub fn header(&self) -> Vec<String> {
        self.columns.iter().flat_map(Column::labels).collect()
    }

    /// Data row of an organization document.
    pub fn row(&self, dbs: &DataBlocks, org: &Organization) -> Vec<Cell> {
        self.columns
            .iter()
            .flat_map(|column| column.values(dbs, org))
            .collect()
    }

    /// Assembles the row for one document: a data row for organization
    /// data, an error row for an error report, nothing for an empty body.
    pub fn assemble(&self, dbs: &DataBlocks) -> Option<AssembledRow> {
        match dbs.body() {
            DocumentBody::Organization(org) => Some(AssembledRow::Data(self.row(dbs, org))),
            DocumentBody::Error(err) => {
                tracing::info!(
                    "✗ Error document for DUNS {}: {}",
                    dbs.inquiry_duns().unwrap_or("unknown"),
                    err.error_message.as_deref().unwrap_or_default()
                );
                Some(AssembledRow::Error(error_row(dbs, err)))
            }
            DocumentBody::Empty => None,
        }
    }
}

pub fn error_header() -> Vec<String> {
    vec![
        Field::InquiryDuns.desc().to_string(),
        "error message".to_string(),
        "error marker".to_string(),
    ]
}

/// Requested DUNS, error message and [`ERROR_MARKER`].
pub fn error_row(dbs: &DataBlocks, err: &DnbError) -> Vec<Cell> {
    vec![
        dbs.inquiry_duns().into(),
        err.error_message.as_ref().into(),
        Cell::from(ERROR_MARKER),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> DataBlocks {
        DataBlocks::from_value(value).unwrap()
    }

    #[test]
    fn test_anacredit_header_starts_with_identification() {
        let header = ColumnPlan::anacredit().header();
        assert_eq!(
            &header[..6],
            &[
                "DUNS",
                "LEI",
                "registration number 1",
                "ECB registration number type 1",
                "registration number 2",
                "ECB registration number type 2"
            ]
        );
        assert!(header.contains(&"activity code (NACE)".to_string()));
        assert!(header.contains(&"number of employees 3".to_string()));
        assert_eq!(header.last().map(String::as_str), Some("global ult country ISO"));
    }

    #[test]
    fn test_row_width_matches_header() {
        let dbs = document(json!({"organization": {"duns": "123456789"}}));
        for plan in [ColumnPlan::anacredit(), ColumnPlan::general()] {
            let row = plan.assemble(&dbs).unwrap();
            assert_eq!(row.cells().len(), plan.header().len());
        }
    }

    #[test]
    fn test_error_document_row() {
        let dbs = document(json!({
            "inquiryDetail": {"duns": "123456789"},
            "error": {"errorCode": "10001", "errorMessage": "No match found"}
        }));
        let row = ColumnPlan::general().assemble(&dbs).unwrap();
        assert_eq!(
            row,
            AssembledRow::Error(vec![
                Cell::from("123456789"),
                Cell::from("No match found"),
                Cell::from(ERROR_MARKER)
            ])
        );
        assert_eq!(row.cells().len(), error_header().len());
    }

    #[test]
    fn test_empty_document_has_no_row() {
        assert!(ColumnPlan::general().assemble(&DataBlocks::default()).is_none());
    }

    #[test]
    fn test_ecb_legal_form_by_region() {
        let nl: Organization = serde_json::from_value(json!({
            "countryISOAlpha2Code": "NL",
            "registeredDetails": {"legalForm": {"dnbCode": 2012}},
            "legalForm": {"dnbCode": 469}
        }))
        .unwrap();
        assert_eq!(ecb_legal_form(&nl), Some("NL_BV"));

        let us: Organization = serde_json::from_value(json!({
            "countryISOAlpha2Code": "US",
            "registeredDetails": {"legalForm": {"dnbCode": 2012}},
            "legalForm": {"dnbCode": 469}
        }))
        .unwrap();
        assert_eq!(ecb_legal_form(&us), Some("RW_LLC"));

        let unmapped: Organization =
            serde_json::from_value(json!({"countryISOAlpha2Code": "NL"})).unwrap();
        assert_eq!(ecb_legal_form(&unmapped), None);
    }

    #[test]
    fn test_one_to_one_fields() {
        let dbs = document(json!({
            "transactionDetail": {"transactionTimestamp": "2023-03-01T10:13:36Z"},
            "inquiryDetail": {"duns": "123456789", "tradeUp": "hq"},
            "organization": {
                "duns": "123456789",
                "dunsControlStatus": {"operatingStatus": {"description": "Active", "startDate": "2010-01-01"}},
                "legalEvents": {"hasBankruptcy": false, "insolvency": {"mostRecentFilingDate": "2019-05-01"}}
            }
        }));
        let org = dbs.organization.as_ref().unwrap();
        assert_eq!(Field::TransactionDate.value(&dbs, org), Cell::from("20230301"));
        assert_eq!(Field::TradeUp.value(&dbs, org), Cell::from("hq"));
        assert_eq!(Field::OperatingStatus.value(&dbs, org), Cell::from("Active"));
        assert_eq!(Field::HasBankruptcy.value(&dbs, org), Cell::Bool(false));
        assert_eq!(Field::InsolvencyDate.value(&dbs, org), Cell::from("2019-05-01"));
        assert_eq!(Field::HasLiquidation.value(&dbs, org), Cell::Null);
    }
}
