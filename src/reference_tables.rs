//! Static mapping tables between D&B reference codes and ECB (AnaCredit)
//! reference data.
//!
//! The tables are built once per process and never mutated. Add entries
//! here when a new registration-number type or legal form needs mapping.

use regex::Regex;
use reg_num_type::*;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// ECB national identifier type that a D&B registration-number type maps to.
#[derive(Debug)]
pub struct EcbNationalId {
    /// ECB identifier type code, e.g. `NL_KVK_CD`.
    pub type_code: &'static str,
    /// ECB identifier name.
    pub name: &'static str,
    pub iso_country: &'static str,
    /// Lower ranks win when several numbers of one entity are mapped.
    pub rank: u8,
    /// Format the ECB expects; `None` when no format is published.
    pub pattern: Option<Regex>,
}

impl EcbNationalId {
    /// Checks an ECB-formatted number against the published format.
    /// Types without a pattern always pass.
    pub fn matches(&self, number: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(number))
    }
}

/// D&B legal form mapped to an ECB legal form code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcbLegalForm {
    pub ecb_code: &'static str,
}

pub struct ReferenceTables {
    vat_types: HashSet<i64>,
    ecb_national_ids: HashMap<i64, EcbNationalId>,
    de_courts: HashMap<&'static str, &'static str>,
    legal_forms_eu: HashMap<i64, EcbLegalForm>,
    legal_forms_rw: HashMap<i64, EcbLegalForm>,
    ecb_countries_eu: HashSet<&'static str>,
}

static TABLES: LazyLock<ReferenceTables> = LazyLock::new(ReferenceTables::build);

/// The process-wide tables.
pub fn tables() -> &'static ReferenceTables {
    &TABLES
}

impl ReferenceTables {
    pub fn is_vat_type(&self, type_dnb_code: i64) -> bool {
        self.vat_types.contains(&type_dnb_code)
    }

    pub fn ecb_national_id(&self, type_dnb_code: i64) -> Option<&EcbNationalId> {
        self.ecb_national_ids.get(&type_dnb_code)
    }

    /// XJustiz ID of the German register court at `postal_code`.
    pub fn de_court(&self, postal_code: &str) -> Option<&'static str> {
        self.de_courts.get(postal_code).copied()
    }

    /// Legal form from D&B table 4 (EU countries).
    pub fn legal_form_eu(&self, dnb_code: i64) -> Option<&EcbLegalForm> {
        self.legal_forms_eu.get(&dnb_code)
    }

    /// Legal form from D&B table 750 (rest of the world).
    pub fn legal_form_rw(&self, dnb_code: i64) -> Option<&EcbLegalForm> {
        self.legal_forms_rw.get(&dnb_code)
    }

    pub fn is_ecb_eu_country(&self, iso_alpha2: &str) -> bool {
        self.ecb_countries_eu.contains(iso_alpha2)
    }

    fn build() -> Self {
        let vat_types = HashSet::from([
            99,    // generic VAT number
            1363,  // Belgium, BTW
            1439,  // Portugal, NIF
            2010,  // Italy, Partita IVA
            6273,  // Netherlands, BTW
            18519, // Germany, USt-IdNr
            28964, // France, TVA intracommunautaire
        ]);

        let ecb_national_ids = NATIONAL_IDS
            .iter()
            .map(|&(dnb_code, type_code, name, iso_country, rank, pattern)| {
                let pattern = pattern.and_then(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::error!("❌ Invalid ECB pattern for {}: {}", type_code, e);
                        None
                    }
                });

                (
                    dnb_code,
                    EcbNationalId {
                        type_code,
                        name,
                        iso_country,
                        rank,
                        pattern,
                    },
                )
            })
            .collect();

        let de_courts = HashMap::from([
            ("10179", "F1103"), // Berlin (Charlottenburg)
            ("20355", "K1101"), // Hamburg
            ("28195", "H1101"), // Bremen
            ("40213", "R1202"), // Düsseldorf
            ("50667", "R3101"), // Köln
            ("60313", "M1201"), // Frankfurt am Main
            ("70173", "B2609"), // Stuttgart
            ("80333", "D2601"), // München
            ("01067", "U1206"), // Dresden
            ("04105", "U1104"), // Leipzig
            ("30175", "P3102"), // Hannover
            ("90403", "D3201"), // Nürnberg
        ]);

        let legal_forms_eu = LEGAL_FORMS_EU
            .iter()
            .map(|&(dnb_code, ecb_code)| (dnb_code, EcbLegalForm { ecb_code }))
            .collect();

        let legal_forms_rw = LEGAL_FORMS_RW
            .iter()
            .map(|&(dnb_code, ecb_code)| (dnb_code, EcbLegalForm { ecb_code }))
            .collect();

        let ecb_countries_eu = HashSet::from([
            "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU",
            "IE", "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
        ]);

        Self {
            vat_types,
            ecb_national_ids,
            de_courts,
            legal_forms_eu,
            legal_forms_rw,
            ecb_countries_eu,
        }
    }
}

/// D&B registration-number type codes that have a country-specific ECB format.
pub mod reg_num_type {
    pub const NO_ORGANISASJONSNUMMER: i64 = 1335;
    pub const AT_FIRMENBUCHNUMMER: i64 = 1358;
    pub const HU_CEGJEGYZEKSZAM: i64 = 1359;
    pub const FI_Y_TUNNUS: i64 = 1372;
    pub const SK_ICO: i64 = 1374;
    pub const PL_KRS: i64 = 1435;
    pub const CY_HE: i64 = 2022;
    pub const DE_HANDELSREGISTER: i64 = 6862;
    pub const RO_ONRC: i64 = 13145;
    pub const AU_ABN: i64 = 17891;
    pub const GR_GEMI: i64 = 33905;
    pub const CH_UID: i64 = 28865;
    pub const IT_CODICE_FISCALE: i64 = 1373;
    pub const SE_ORGANISATIONSNUMMER: i64 = 1411;
    pub const BE_KBO: i64 = 800;
    pub const SI_MATICNA: i64 = 1407;
    pub const NL_KVK: i64 = 6256;
    pub const FR_SIREN: i64 = 2078;
    pub const ES_CIF: i64 = 1440;
}

type NationalIdRow = (
    i64,
    &'static str,
    &'static str,
    &'static str,
    u8,
    Option<&'static str>,
);

const NATIONAL_IDS: &[NationalIdRow] = &[
    (AT_FIRMENBUCHNUMMER, "AT_FB_CD", "Firmenbuchnummer", "AT", 1, Some(r"^[A-Za-z]?\d{6}[0-9a-zA-Z]$")),
    (BE_KBO, "BE_KBO_BCE_CD", "Numéro d'entreprise", "BE", 1, Some(r"^[01]\d{9}$")),
    (CH_UID, "CH_UID_CD", "Unternehmens-Identifikationsnummer", "CH", 1, Some(r"^CHE\d{9}$")),
    (CY_HE, "CY_DRCOR_CD", "Registrar of Companies number", "CY", 1, Some(r"^[A-Z]{2}\d{7}$")),
    (DE_HANDELSREGISTER, "DE_HRA_HRB_CD", "Handelsregisternummer", "DE", 1, Some(r"^HR[AB]\d{1,6}[A-Z]{0,2}-[A-Z]\d{4}[A-Z]?$")),
    (ES_CIF, "ES_CIF_CD", "Código de identificación fiscal", "ES", 2, Some(r"^[A-Z]\d{7}[A-Z0-9]$")),
    (FI_Y_TUNNUS, "FI_Y_CD", "Y-tunnus", "FI", 1, Some(r"^\d{7}-\d$")),
    (FR_SIREN, "FR_SIREN_CD", "SIREN", "FR", 1, Some(r"^\d{9}$")),
    (GR_GEMI, "GR_AFM_CD", "Arithmós Forologikoú Mitróou", "GR", 1, Some(r"^\d{9}$")),
    (HU_CEGJEGYZEKSZAM, "HU_CGJ_CD", "Cégjegyzékszám", "HU", 1, Some(r"^\d{2}-\d{2}-\d{6}$")),
    (IT_CODICE_FISCALE, "IT_CF_CD", "Codice fiscale", "IT", 1, Some(r"^\d{11}$|^[A-Z0-9]{16}$")),
    (NL_KVK, "NL_KVK_CD", "KvK-nummer", "NL", 1, Some(r"^\d{8}$")),
    (NO_ORGANISASJONSNUMMER, "NO_ORGNR_CD", "Organisasjonsnummer", "NO", 1, Some(r"^\d{3} \d{3} \d{3}$")),
    (PL_KRS, "PL_KRS_CD", "Numer KRS", "PL", 1, Some(r"^PL\d{10}$")),
    (RO_ONRC, "RO_ONRC_CD", "Număr de ordine în registrul comerțului", "RO", 1, Some(r"^[A-Z0-9]{2}-\d{3}-\d{7}-\d$")),
    (SE_ORGANISATIONSNUMMER, "SE_ORGNR_CD", "Organisationsnummer", "SE", 1, Some(r"^\d{6}-\d{4}$")),
    (SI_MATICNA, "SI_MAT_CD", "Matična številka", "SI", 1, Some(r"^\d{7}-\d{3}$")),
    (SK_ICO, "SK_ICO_CD", "Identifikačné číslo organizácie", "SK", 1, Some(r"^\d{3}-\d{6}-\d{3}$")),
    (AU_ABN, "AU_ABN_CD", "Australian Business Number", "AU", 1, Some(r"^\d{2} \d{3} \d{3} \d{3}$")),
];

const LEGAL_FORMS_EU: &[(i64, &str)] = &[
    (2012, "NL_BV"), // Besloten vennootschap
    (2013, "NL_NV"), // Naamloze vennootschap
    (2014, "NL_VOF"), // Vennootschap onder firma
    (2015, "NL_EZ"), // Eenmanszaak
    (2017, "NL_STI"), // Stichting
    (2018, "NL_VER"), // Vereniging
    (3085, "DE_GMBH"), // Gesellschaft mit beschränkter Haftung
    (3086, "DE_AG"), // Aktiengesellschaft
    (3087, "DE_KG"), // Kommanditgesellschaft
    (3088, "DE_OHG"), // Offene Handelsgesellschaft
    (3108, "BE_BV_SRL"), // Besloten vennootschap
    (3109, "BE_NV_SA"), // Naamloze vennootschap
    (3400, "FR_SAS"), // Société par actions simplifiée
    (3401, "FR_SARL"), // Société à responsabilité limitée
    (3402, "FR_SA"), // Société anonyme
];

const LEGAL_FORMS_RW: &[(i64, &str)] = &[
    (451, "RW_CORP"), // Corporation
    (469, "RW_LLC"), // Limited liability company
    (476, "RW_PART"), // Partnership
    (485, "RW_SOLE"), // Sole proprietorship
    (1064, "RW_PLC"), // Public limited company
    (1065, "RW_LTD"), // Private limited company
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        for &(dnb_code, type_code, ..) in NATIONAL_IDS {
            let id = tables().ecb_national_id(dnb_code).unwrap();
            assert!(id.pattern.is_some(), "pattern for {} did not compile", type_code);
        }
    }

    #[test]
    fn test_lookups() {
        let t = tables();
        assert!(t.is_vat_type(6273));
        assert!(!t.is_vat_type(reg_num_type::NL_KVK));
        assert_eq!(
            t.ecb_national_id(reg_num_type::NL_KVK).map(|id| id.type_code),
            Some("NL_KVK_CD")
        );
        assert!(t.ecb_national_id(1).is_none());
        assert_eq!(t.de_court("80333"), Some("D2601"));
        assert!(t.is_ecb_eu_country("NL"));
        assert!(!t.is_ecb_eu_country("US"));
    }
}
