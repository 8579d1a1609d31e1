//! Selection of industry codes of one classification scheme.

use crate::cell::Cell;
use crate::header::Label;
use crate::models::IndustryCode;

/// Classification schemes D&B reports industry codes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndustryScheme {
    DnbIndustryCode,
    Naics,
    UsSic1987,
    NaceRev2,
    HooversIndustryCode,
    MajorIndustryCategory,
}

impl IndustryScheme {
    /// D&B type code identifying the scheme.
    pub fn type_code(self) -> i64 {
        match self {
            IndustryScheme::DnbIndustryCode => 3599,
            IndustryScheme::Naics => 30832,
            IndustryScheme::UsSic1987 => 399,
            IndustryScheme::NaceRev2 => 29104,
            IndustryScheme::HooversIndustryCode => 25838,
            IndustryScheme::MajorIndustryCategory => 24657,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            IndustryScheme::DnbIndustryCode => "D&B Industry Code",
            IndustryScheme::Naics => "NAICS Code",
            IndustryScheme::UsSic1987 => "US 1987 SIC Code",
            IndustryScheme::NaceRev2 => "NACE Revision 2",
            IndustryScheme::HooversIndustryCode => "D&B Hoovers Industry Code",
            IndustryScheme::MajorIndustryCategory => "Major Industry Category",
        }
    }

    /// Short name used as the column label suffix, e.g. `(NACE)`.
    pub fn short_name(self) -> &'static str {
        match self {
            IndustryScheme::DnbIndustryCode => "D&B",
            IndustryScheme::Naics => "NAICS",
            IndustryScheme::UsSic1987 => "SIC",
            IndustryScheme::NaceRev2 => "NACE",
            IndustryScheme::HooversIndustryCode => "Hoovers",
            IndustryScheme::MajorIndustryCategory => "major",
        }
    }

    pub fn label_suffix(self) -> String {
        format!("({})", self.short_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndCodeComponent {
    Code,
    Description,
}

impl IndCodeComponent {
    pub fn desc(self) -> &'static str {
        match self {
            IndCodeComponent::Code => "activity code",
            IndCodeComponent::Description => "act code description",
        }
    }

    fn value(self, code: &IndustryCode) -> Cell {
        match self {
            IndCodeComponent::Code => code.code.as_ref().into(),
            IndCodeComponent::Description => code.description.as_ref().into(),
        }
    }
}

/// The `count` highest priority codes of `scheme`, padded with nulls.
///
/// Codes without a priority sort after those with one. Equal priorities
/// keep their input order.
pub fn industry_code_values(
    codes: &[IndustryCode],
    scheme: IndustryScheme,
    components: &[IndCodeComponent],
    count: usize,
) -> Vec<Cell> {
    let mut matching: Vec<&IndustryCode> = codes
        .iter()
        .filter(|code| code.type_dnb_code == Some(scheme.type_code()))
        .collect();
    matching.sort_by_key(|code| (code.priority.is_none(), code.priority));

    let mut cells: Vec<Cell> = matching
        .into_iter()
        .take(count)
        .flat_map(|code| components.iter().map(move |c| c.value(code)))
        .collect();
    cells.resize(count * components.len(), Cell::Null);

    cells
}

pub fn industry_code_labels(
    components: &[IndCodeComponent],
    count: usize,
    base: &Label,
) -> Vec<String> {
    base.repeat(components.iter().map(|c| c.desc()), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(type_code: i64, code: &str, priority: Option<i64>) -> IndustryCode {
        IndustryCode {
            code: Some(code.to_string()),
            description: Some(format!("desc {}", code)),
            type_dnb_code: Some(type_code),
            type_description: None,
            priority,
        }
    }

    #[test]
    fn test_filters_scheme_and_sorts_by_priority() {
        let codes = vec![
            code(29104, "6420", Some(2)),
            code(30832, "551111", Some(1)),
            code(29104, "7010", Some(1)),
            code(29104, "6499", None),
        ];
        let cells = industry_code_values(
            &codes,
            IndustryScheme::NaceRev2,
            &[IndCodeComponent::Code],
            3,
        );
        assert_eq!(
            cells,
            vec![Cell::from("7010"), Cell::from("6420"), Cell::from("6499")]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let codes = vec![code(399, "6719", Some(1)), code(399, "6722", Some(1))];
        let cells = industry_code_values(&codes, IndustryScheme::UsSic1987, &[IndCodeComponent::Code], 1);
        assert_eq!(cells, vec![Cell::from("6719")]);
    }

    #[test]
    fn test_pads_missing_slots() {
        let cells = industry_code_values(
            &[],
            IndustryScheme::Naics,
            &[IndCodeComponent::Code, IndCodeComponent::Description],
            2,
        );
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(Cell::is_null));
    }

    #[test]
    fn test_labels_carry_scheme_suffix() {
        let base = Label::group().with_suffix(IndustryScheme::NaceRev2.label_suffix());
        assert_eq!(
            industry_code_labels(&[IndCodeComponent::Code], 1, &base),
            vec!["activity code (NACE)"]
        );
    }
}
