//! Country-specific rewriting of registration numbers into the format the
//! ECB expects for national identifiers.

use crate::reference_tables::{reg_num_type::*, tables};

/// Rewrites `number` of D&B type `type_code` into its ECB format.
///
/// Returns `None` when no rule applies to the type or the number does not
/// have the shape the rule expects; callers then use the number as is.
pub fn reformat_for_ecb(type_code: i64, number: &str) -> Option<String> {
    let chars: Vec<char> = number.chars().collect();

    let formatted = match type_code {
        NO_ORGANISASJONSNUMMER if chars.len() == 9 => Some(split(&chars, &[3, 3, 3], " ")),
        AT_FIRMENBUCHNUMMER => austrian(&chars),
        HU_CEGJEGYZEKSZAM if chars.len() == 10 => Some(split(&chars, &[2, 2, 6], "-")),
        FI_Y_TUNNUS if !chars.is_empty() => Some(split(&chars, &[chars.len() - 1, 1], "-")),
        SK_ICO if chars.len() == 12 => Some(split(&chars, &[3, 6, 3], "-")),
        PL_KRS => Some(format!("PL{}", number)),
        CY_HE => cypriot(&chars),
        DE_HANDELSREGISTER => german(number),
        RO_ONRC if chars.len() == 13 => Some(split(&chars, &[2, 3, 7, 1], "-")),
        AU_ABN if chars.len() == 11 => Some(split(&chars, &[2, 3, 3, 3], " ")),
        GR_GEMI => zero_pad_digits(number, 9),
        CH_UID => Some(chars.iter().filter(|c| c.is_alphanumeric()).collect()),
        IT_CODICE_FISCALE => number.strip_prefix("IT").map(str::to_string),
        SE_ORGANISATIONSNUMMER if chars.len() == 10 => Some(split(&chars, &[6, 4], "-")),
        BE_KBO => zero_pad_digits(number, 10),
        SI_MATICNA if chars.len() == 10 => Some(split(&chars, &[7, 3], "-")),
        _ => None,
    };

    formatted.filter(|f| !f.is_empty())
}

/// Joins consecutive chunks of `widths` characters with `sep`.
fn split(chars: &[char], widths: &[usize], sep: &str) -> String {
    let mut parts = Vec::with_capacity(widths.len());
    let mut start = 0;

    for &width in widths {
        let end = (start + width).min(chars.len());
        parts.push(chars[start..end].iter().collect::<String>());
        start = end;
    }

    parts.join(sep)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Left-pads an all-digit number shorter than `width` with zeros.
fn zero_pad_digits(number: &str, width: usize) -> Option<String> {
    if is_digits(number) && number.len() < width {
        Some(format!("{:0>width$}", number, width = width))
    } else {
        None
    }
}

/// Optional leading letter, then the part from the first digit on padded to 7.
fn austrian(chars: &[char]) -> Option<String> {
    let first_digit = chars.iter().position(|c| c.is_ascii_digit())?;
    let prefix: String = chars
        .first()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_string())
        .unwrap_or_default();
    let rest: String = chars[first_digit..].iter().collect();

    Some(format!("{}{:0>7}", prefix, rest))
}

/// Two-character register prefix (e.g. `HE`) plus the number padded to 7.
fn cypriot(chars: &[char]) -> Option<String> {
    if chars.len() < 3 {
        return None;
    }
    let prefix: String = chars[..2].iter().collect();
    let numeric: String = chars[2..].iter().collect();

    if is_digits(&numeric) && numeric.len() < 7 {
        Some(format!("{}{:0>7}", prefix, numeric))
    } else {
        None
    }
}

/// `<court postal code><A|B><number>` to `HR<A|B><number>-<XJustiz id>`.
fn german(number: &str) -> Option<String> {
    let pos = number.find(|c: char| c.is_ascii_alphabetic())?;
    let (postal_code, rest) = number.split_at(pos);
    let mut rest = rest.chars();
    let register = rest.next()?.to_ascii_uppercase();

    let Some(xjustiz) = tables().de_court(postal_code) else {
        tracing::debug!("No XJustiz court for postal code {}", postal_code);
        return None;
    };

    if register != 'A' && register != 'B' {
        tracing::debug!("Unexpected register letter {} in {}", register, number);
        return None;
    }

    Some(format!("HR{}{}-{}", register, rest.as_str(), xjustiz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_rules() {
        assert_eq!(
            reformat_for_ecb(NO_ORGANISASJONSNUMMER, "123456789").as_deref(),
            Some("123 456 789")
        );
        assert_eq!(
            reformat_for_ecb(HU_CEGJEGYZEKSZAM, "0109123456").as_deref(),
            Some("01-09-123456")
        );
        assert_eq!(reformat_for_ecb(FI_Y_TUNNUS, "12345678").as_deref(), Some("1234567-8"));
        assert_eq!(
            reformat_for_ecb(RO_ONRC, "J401234567891").as_deref(),
            Some("J4-012-3456789-1")
        );
        assert_eq!(
            reformat_for_ecb(AU_ABN, "51824753556").as_deref(),
            Some("51 824 753 556")
        );
        assert_eq!(
            reformat_for_ecb(SE_ORGANISATIONSNUMMER, "5560360793").as_deref(),
            Some("556036-0793")
        );
        assert_eq!(
            reformat_for_ecb(SI_MATICNA, "5300231000").as_deref(),
            Some("5300231-000")
        );
    }

    #[test]
    fn test_wrong_length_keeps_canonical() {
        assert_eq!(reformat_for_ecb(NO_ORGANISASJONSNUMMER, "12345"), None);
        assert_eq!(reformat_for_ecb(SK_ICO, "123"), None);
        assert_eq!(reformat_for_ecb(12345, "123456789"), None);
    }

    #[test]
    fn test_padding_rules() {
        assert_eq!(reformat_for_ecb(AT_FIRMENBUCHNUMMER, "12345a").as_deref(), Some("012345a"));
        assert_eq!(reformat_for_ecb(AT_FIRMENBUCHNUMMER, "F12345a").as_deref(), Some("F012345a"));
        assert_eq!(reformat_for_ecb(CY_HE, "HE12345").as_deref(), Some("HE0012345"));
        assert_eq!(reformat_for_ecb(CY_HE, "HE1234567"), None);
        assert_eq!(reformat_for_ecb(GR_GEMI, "1234567").as_deref(), Some("001234567"));
        assert_eq!(reformat_for_ecb(BE_KBO, "403170701").as_deref(), Some("0403170701"));
    }

    #[test]
    fn test_prefix_rules() {
        assert_eq!(reformat_for_ecb(PL_KRS, "0000012345").as_deref(), Some("PL0000012345"));
        assert_eq!(
            reformat_for_ecb(IT_CODICE_FISCALE, "IT01234567890").as_deref(),
            Some("01234567890")
        );
        assert_eq!(reformat_for_ecb(IT_CODICE_FISCALE, "01234567890"), None);
        assert_eq!(
            reformat_for_ecb(CH_UID, "CHE-123.456.789").as_deref(),
            Some("CHE123456789")
        );
    }

    #[test]
    fn test_german_register() {
        assert_eq!(
            reformat_for_ecb(DE_HANDELSREGISTER, "80333B12345").as_deref(),
            Some("HRB12345-D2601")
        );
        assert_eq!(
            reformat_for_ecb(DE_HANDELSREGISTER, "80333a999").as_deref(),
            Some("HRA999-D2601")
        );
        assert_eq!(reformat_for_ecb(DE_HANDELSREGISTER, "80333C12345"), None);
        assert_eq!(reformat_for_ecb(DE_HANDELSREGISTER, "99999B12345"), None);
        assert_eq!(reformat_for_ecb(DE_HANDELSREGISTER, "12345"), None);
    }
}
