/// Property-based tests using proptest
/// Invariants that hold for every column plan and every input
use dnb_dpl_utils::address::{address_values, AddrComponent};
use dnb_dpl_utils::cell::Cell;
use dnb_dpl_utils::input::clean_duns;
use dnb_dpl_utils::layout::{AssembledRow, Layout};
use dnb_dpl_utils::models::{Address, DataBlocks, RegistrationNumber};
use dnb_dpl_utils::reformat::reformat_for_ecb;
use dnb_dpl_utils::registration_numbers::{registration_number_values, RegNumComponent};
use proptest::prelude::*;
use serde_json::json;

fn addr_components() -> impl Strategy<Value = Vec<AddrComponent>> {
    proptest::sample::subsequence(AddrComponent::ALL.to_vec(), 0..=AddrComponent::ALL.len())
}

fn reg_num_components() -> impl Strategy<Value = Vec<RegNumComponent>> {
    proptest::sample::subsequence(
        vec![
            RegNumComponent::Number,
            RegNumComponent::TypeDescription,
            RegNumComponent::EcbFormatted,
            RegNumComponent::EcbType,
            RegNumComponent::EcbName,
            RegNumComponent::EcbCountry,
        ],
        0..=6,
    )
}

fn reg_num() -> impl Strategy<Value = RegistrationNumber> {
    (
        "[A-Z0-9]{1,12}",
        prop_oneof![Just(1335_i64), Just(1358), Just(6862), Just(6273), Just(6256), 0_i64..50_000],
        any::<bool>(),
    )
        .prop_map(|(number, type_code, preferred)| RegistrationNumber {
            registration_number: Some(number),
            type_dnb_code: Some(type_code),
            type_description: None,
            is_preferred_registration_number: Some(preferred),
        })
}

// Property: header and data rows have the same width
proptest! {
    #[test]
    fn header_and_row_widths_match(
        duns in "[0-9]{9}",
        name in "[A-Za-z ]{0,20}",
        line1 in proptest::option::of("[A-Za-z0-9 ]{1,20}"),
        reg_nums in proptest::collection::vec(reg_num(), 0..5),
        employees in 0_i64..100_000,
    ) {
        let reg_nums: Vec<_> = reg_nums
            .into_iter()
            .map(|r| json!({
                "registrationNumber": r.registration_number,
                "typeDnBCode": r.type_dnb_code,
                "isPreferredRegistrationNumber": r.is_preferred_registration_number,
            }))
            .collect();
        let dbs = DataBlocks::from_value(json!({
            "organization": {
                "duns": duns,
                "primaryName": name,
                "primaryAddress": {"streetAddress": {"line1": line1}},
                "registrationNumbers": reg_nums,
                "numberOfEmployees": [{"value": employees, "informationScopeDnBCode": 9066}],
            }
        }))
        .unwrap();

        for layout in [Layout::AnaCredit, Layout::General] {
            let plan = layout.plan();
            match plan.assemble(&dbs) {
                Some(AssembledRow::Data(cells)) => prop_assert_eq!(cells.len(), plan.header().len()),
                other => prop_assert!(false, "expected data row, got {:?}", other),
            }
        }
    }
}

// Property: an absent or empty address flattens to nulls
proptest! {
    #[test]
    fn empty_address_is_all_null(components in addr_components()) {
        let expected = Cell::nulls(components.len());
        prop_assert_eq!(address_values(None, &components), expected.clone());
        prop_assert_eq!(address_values(Some(&Address::default()), &components), expected);
    }
}

// Property: registration number slots are always filled up to count
proptest! {
    #[test]
    fn no_registration_numbers_pads_with_nulls(
        components in reg_num_components(),
        count in 0_usize..5,
    ) {
        prop_assert_eq!(
            registration_number_values(&[], &components, count),
            Cell::nulls(count * components.len())
        );
    }

    #[test]
    fn registration_numbers_fill_fixed_width(
        reg_nums in proptest::collection::vec(reg_num(), 0..6),
        components in reg_num_components(),
        count in 0_usize..5,
    ) {
        let cells = registration_number_values(&reg_nums, &components, count);
        prop_assert_eq!(cells.len(), count * components.len());
    }
}

// Property: reformatting never panics and never yields an empty string
proptest! {
    #[test]
    fn reformat_never_panics(type_code in 0_i64..40_000, number in "\\PC{0,20}") {
        if let Some(formatted) = reformat_for_ecb(type_code, &number) {
            prop_assert!(!formatted.is_empty());
        }
    }

    #[test]
    fn cleaned_duns_are_nine_digits(duns in "[0-9]{1,9}") {
        let cleaned = clean_duns(&duns).unwrap();
        prop_assert_eq!(cleaned.len(), 9);
        prop_assert!(cleaned.ends_with(&duns));
    }
}
