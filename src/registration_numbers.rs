//! Selection of registration numbers.
//!
//! Numbers that map onto an ECB national identifier take the first slots,
//! best rank first, when any ECB component is requested. Remaining slots go
//! to the other numbers, VAT numbers first, then preferred numbers, input
//! order otherwise.

use crate::cell::Cell;
use crate::header::Label;
use crate::models::RegistrationNumber;
use crate::reference_tables::{tables, EcbNationalId};
use crate::reformat::reformat_for_ecb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegNumComponent {
    /// The number as D&B delivers it.
    Number,
    TypeDescription,
    /// The number rewritten into its ECB format where a rule exists.
    EcbFormatted,
    EcbType,
    EcbName,
    EcbCountry,
}

impl RegNumComponent {
    pub fn desc(self) -> &'static str {
        match self {
            RegNumComponent::Number => "registration number",
            RegNumComponent::TypeDescription => "registration number type",
            RegNumComponent::EcbFormatted => "registration number",
            RegNumComponent::EcbType => "ECB registration number type",
            RegNumComponent::EcbName => "ECB registration number name",
            RegNumComponent::EcbCountry => "ECB ISO country code",
        }
    }

    /// True for components read from the ECB national identifier.
    pub fn is_ecb(self) -> bool {
        matches!(
            self,
            RegNumComponent::EcbType | RegNumComponent::EcbName | RegNumComponent::EcbCountry
        )
    }

    fn value(self, reg_num: &RegistrationNumber, ecb_id: Option<&EcbNationalId>) -> Cell {
        match self {
            RegNumComponent::Number => reg_num.registration_number.as_ref().into(),
            RegNumComponent::TypeDescription => reg_num.type_description.as_ref().into(),
            RegNumComponent::EcbFormatted => ecb_formatted(reg_num).into(),
            RegNumComponent::EcbType => ecb_id.map(|id| id.type_code).into(),
            RegNumComponent::EcbName => ecb_id.map(|id| id.name).into(),
            RegNumComponent::EcbCountry => ecb_id.map(|id| id.iso_country).into(),
        }
    }
}

/// The number in ECB format, or the canonical number when no rule applies.
pub fn ecb_formatted(reg_num: &RegistrationNumber) -> Option<String> {
    let number = reg_num.registration_number.as_ref()?;

    Some(
        reg_num
            .type_dnb_code
            .and_then(|code| reformat_for_ecb(code, number))
            .unwrap_or_else(|| number.clone()),
    )
}

fn is_vat(reg_num: &RegistrationNumber) -> bool {
    reg_num
        .type_dnb_code
        .is_some_and(|code| tables().is_vat_type(code))
}

fn is_preferred(reg_num: &RegistrationNumber) -> bool {
    reg_num.is_preferred_registration_number.unwrap_or(false)
}

/// Up to `count` numbers, `components.len()` cells each, padded with nulls.
pub fn registration_number_values(
    reg_nums: &[RegistrationNumber],
    components: &[RegNumComponent],
    count: usize,
) -> Vec<Cell> {
    let mut cells = Cell::nulls(count * components.len());
    if reg_nums.is_empty() || count == 0 {
        return cells;
    }

    let with_ecb = components.iter().any(|c| c.is_ecb());

    let annotated: Vec<(&RegistrationNumber, Option<&EcbNationalId>)> = reg_nums
        .iter()
        .map(|reg_num| {
            if !with_ecb {
                return (reg_num, None);
            }
            let ecb_id = reg_num
                .type_dnb_code
                .and_then(|code| tables().ecb_national_id(code));
            if ecb_id.is_none() {
                tracing::warn!(
                    "⚠ no ECB national identifier for registration number type {:?}",
                    reg_num.type_dnb_code
                );
            }
            (reg_num, ecb_id)
        })
        .collect();

    let mut selected: Vec<(&RegistrationNumber, Option<&EcbNationalId>)> = Vec::new();

    if with_ecb {
        let mut mapped: Vec<_> = annotated
            .iter()
            .filter_map(|&(reg_num, ecb_id)| ecb_id.map(|id| (reg_num, id)))
            .collect();
        mapped.sort_by_key(|(_, id)| id.rank);

        for (reg_num, id) in mapped.into_iter().take(count) {
            if let Some(formatted) = ecb_formatted(reg_num) {
                if !id.matches(&formatted) {
                    tracing::warn!(
                        "➡️  registration number {}, type {} does not match the {} format ❌",
                        formatted,
                        reg_num.type_dnb_code.unwrap_or_default(),
                        id.type_code
                    );
                }
            }
            selected.push((reg_num, Some(id)));
        }
    }

    let mut remaining: Vec<&RegistrationNumber> = annotated
        .iter()
        .filter(|(_, ecb_id)| ecb_id.is_none())
        .map(|&(reg_num, _)| reg_num)
        .collect();
    remaining.sort_by_key(|reg_num| (!is_vat(reg_num), !is_preferred(reg_num)));

    let free = count - selected.len();
    selected.extend(remaining.into_iter().take(free).map(|reg_num| (reg_num, None)));

    for (slot, (reg_num, ecb_id)) in selected.into_iter().enumerate() {
        for (offset, component) in components.iter().enumerate() {
            cells[slot * components.len() + offset] = component.value(reg_num, ecb_id);
        }
    }

    cells
}

/// Labels for [`registration_number_values`].
pub fn registration_number_labels(
    components: &[RegNumComponent],
    count: usize,
    base: &Label,
) -> Vec<String> {
    base.repeat(components.iter().map(|c| c.desc()), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_tables::reg_num_type;

    fn reg_num(number: &str, type_code: i64, preferred: bool) -> RegistrationNumber {
        RegistrationNumber {
            registration_number: Some(number.to_string()),
            type_dnb_code: Some(type_code),
            type_description: Some(format!("type {}", type_code)),
            is_preferred_registration_number: Some(preferred),
        }
    }

    #[test]
    fn test_empty_list_pads_with_nulls() {
        let cells = registration_number_values(
            &[],
            &[RegNumComponent::Number, RegNumComponent::TypeDescription],
            2,
        );
        assert_eq!(cells, Cell::nulls(4));
    }

    #[test]
    fn test_ecb_mapped_numbers_come_first() {
        let nums = vec![
            reg_num("NL001234567B01", 6273, true),
            reg_num("12345678", reg_num_type::NL_KVK, false),
        ];
        let cells = registration_number_values(
            &nums,
            &[RegNumComponent::EcbFormatted, RegNumComponent::EcbType],
            2,
        );
        assert_eq!(
            cells,
            vec![
                Cell::from("12345678"),
                Cell::from("NL_KVK_CD"),
                Cell::from("NL001234567B01"),
                Cell::Null,
            ]
        );
    }

    #[test]
    fn test_without_ecb_components_mapping_is_ignored() {
        let nums = vec![
            reg_num("12345678", reg_num_type::NL_KVK, false),
            reg_num("NL001234567B01", 6273, false),
        ];
        let cells = registration_number_values(&nums, &[RegNumComponent::Number], 1);
        assert_eq!(cells, vec![Cell::from("NL001234567B01")]);
    }

    #[test]
    fn test_ecb_formatted_number() {
        let num = reg_num("123456789", reg_num_type::NO_ORGANISASJONSNUMMER, false);
        assert_eq!(ecb_formatted(&num).as_deref(), Some("123 456 789"));
        assert_eq!(num.registration_number.as_deref(), Some("123456789"));
    }

    #[test]
    fn test_labels_repeat_per_slot() {
        let labels = registration_number_labels(
            &[RegNumComponent::EcbFormatted, RegNumComponent::EcbType],
            2,
            &Label::group(),
        );
        assert_eq!(
            labels,
            vec![
                "registration number 1",
                "ECB registration number type 1",
                "registration number 2",
                "ECB registration number type 2",
            ]
        );
    }
}
