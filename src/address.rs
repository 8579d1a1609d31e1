//! Flattening of postal address sub-documents.

use crate::cell::Cell;
use crate::header::Label;
use crate::models::Address;

/// One column of a flattened address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrComponent {
    Line1,
    Line2,
    PostalCode,
    Locality,
    RegionAbbr,
    RegionName,
    CountryIso,
    CountryName,
}

impl AddrComponent {
    /// Every component, in canonical order.
    pub const ALL: [AddrComponent; 8] = [
        AddrComponent::Line1,
        AddrComponent::Line2,
        AddrComponent::PostalCode,
        AddrComponent::Locality,
        AddrComponent::RegionAbbr,
        AddrComponent::RegionName,
        AddrComponent::CountryIso,
        AddrComponent::CountryName,
    ];

    pub fn desc(self) -> &'static str {
        match self {
            AddrComponent::Line1 => "addr line 1",
            AddrComponent::Line2 => "addr line 2",
            AddrComponent::PostalCode => "postalcode",
            AddrComponent::Locality => "city",
            AddrComponent::RegionAbbr => "region abbr",
            AddrComponent::RegionName => "region",
            AddrComponent::CountryIso => "country ISO",
            AddrComponent::CountryName => "country",
        }
    }

    fn value(self, addr: &Address) -> Cell {
        match self {
            AddrComponent::Line1 => line1(addr).into(),
            AddrComponent::Line2 => addr
                .street_address
                .as_ref()
                .and_then(|street| street.line2.as_ref())
                .into(),
            AddrComponent::PostalCode => addr.postal_code.as_ref().into(),
            AddrComponent::Locality => addr
                .address_locality
                .as_ref()
                .and_then(|locality| locality.name.as_ref())
                .into(),
            AddrComponent::RegionAbbr => addr
                .address_region
                .as_ref()
                .and_then(|region| region.abbreviated_name.as_ref())
                .into(),
            AddrComponent::RegionName => addr
                .address_region
                .as_ref()
                .and_then(|region| region.name.as_ref())
                .into(),
            AddrComponent::CountryIso => addr
                .address_country
                .as_ref()
                .and_then(|country| country.iso_alpha2_code.as_ref())
                .into(),
            AddrComponent::CountryName => addr
                .address_country
                .as_ref()
                .and_then(|country| country.name.as_ref())
                .into(),
        }
    }
}

/// The six address columns of the AnaCredit layout.
pub const ANACREDIT_ADDRESS: [AddrComponent; 6] = [
    AddrComponent::Line1,
    AddrComponent::Line2,
    AddrComponent::PostalCode,
    AddrComponent::Locality,
    AddrComponent::RegionAbbr,
    AddrComponent::CountryIso,
];

/// Labels of the simplified address, in column order.
pub const SIMPLE_ADDRESS_LABELS: [&str; 6] = [
    "addr line 1",
    "addr line 2",
    "postalcode",
    "city",
    "region",
    "country ISO",
];

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// `streetAddress.line1`, falling back to `streetName[ streetNumber]`.
fn line1(addr: &Address) -> Option<String> {
    let from_street = addr
        .street_address
        .as_ref()
        .and_then(|street| non_blank(street.line1.as_ref()));
    if let Some(line) = from_street {
        return Some(line.to_string());
    }

    street_name_and_number(addr)
}

fn street_name_and_number(addr: &Address) -> Option<String> {
    match (
        non_blank(addr.street_name.as_ref()),
        non_blank(addr.street_number.as_ref()),
    ) {
        (Some(name), Some(number)) => Some(format!("{} {}", name, number)),
        (Some(name), None) => Some(name.to_string()),
        (None, Some(number)) => Some(number.to_string()),
        (None, None) => None,
    }
}

/// Flattens `addr` into one cell per requested component. An absent
/// address yields nulls.
pub fn address_values(addr: Option<&Address>, components: &[AddrComponent]) -> Vec<Cell> {
    match addr {
        Some(addr) => components.iter().map(|c| c.value(addr)).collect(),
        None => Cell::nulls(components.len()),
    }
}

/// Column labels matching [`address_values`].
pub fn address_labels(components: &[AddrComponent], base: &Label) -> Vec<String> {
    components.iter().map(|c| base.render(c.desc(), None)).collect()
}

/// The simplified six-cell address of the general layout.
///
/// Unlike [`AddrComponent::Line1`], the street name is used only when both
/// street lines are absent, and the region falls back to its full name.
pub fn simple_address_values(addr: Option<&Address>) -> Vec<Cell> {
    let Some(addr) = addr else {
        return Cell::nulls(SIMPLE_ADDRESS_LABELS.len());
    };

    let street = addr.street_address.as_ref();
    let mut line1 = street.and_then(|s| non_blank(s.line1.as_ref())).map(str::to_string);
    let line2 = street.and_then(|s| non_blank(s.line2.as_ref())).map(str::to_string);
    if line1.is_none() && line2.is_none() {
        line1 = addr
            .street_name
            .as_ref()
            .filter(|name| !name.is_empty())
            .map(|name| match non_blank(addr.street_number.as_ref()) {
                Some(number) => format!("{} {}", name, number),
                None => name.clone(),
            });
    }

    let region = addr.address_region.as_ref().and_then(|region| {
        non_blank(region.abbreviated_name.as_ref()).or(non_blank(region.name.as_ref()))
    });

    vec![
        line1.into(),
        line2.into(),
        addr.postal_code.as_ref().into(),
        AddrComponent::Locality.value(addr),
        region.into(),
        AddrComponent::CountryIso.value(addr),
    ]
}

pub fn simple_address_labels(base: &Label) -> Vec<String> {
    SIMPLE_ADDRESS_LABELS
        .iter()
        .map(|desc| base.render(desc, None))
        .collect()
}
