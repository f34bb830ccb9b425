//! Street, postal code and city pieces of a delivery address.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Street-type keyword anywhere in the text.
    pub static ref STREET_TOKEN: Regex = Regex::new(
        r"(?i)(?:^|[\s,])(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZZA|P\.ZA|STRADA|LOC\.|LOCALITA'?|FRAZ\.|FRAZIONE)(?:\s|$)"
    ).unwrap();

    /// Line that starts with a street-type keyword.
    pub static ref STREET_LINE: Regex = Regex::new(
        r"(?i)^(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZZA|P\.ZA|STRADA|LOC\.|LOCALITA'?|FRAZ\.|FRAZIONE)\s+"
    ).unwrap();

    pub static ref POSTAL_CODE: Regex = Regex::new(r"\b\d{5}\b").unwrap();

    static ref CITY_LINE: Regex = Regex::new(
        r"^(\d{5})\s*-?\s*([\p{L}' .]+?)(?:\s+\(?([A-Z]{2})\)?)?$"
    ).unwrap();
}

/// Sub-fields collected by an address strategy before joining.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressParts {
    pub street: String,
    pub additional_info: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl AddressParts {
    /// Copy postal code, city and province from a parsed city line.
    pub fn set_city(&mut self, city: CityParts) {
        self.postal_code = city.postal_code;
        self.city = city.city;
        self.province = city.province;
    }

    /// Join the parts into one address string.
    ///
    /// Returns `None` when neither a street nor a postal code was found.
    pub fn combine(&self) -> Option<String> {
        if self.street.is_empty() && self.postal_code.is_empty() {
            return None;
        }

        let city_line = [&self.postal_code, &self.city, &self.province]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let combined = [self.street.as_str(), self.additional_info.as_str(), city_line.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(combined)
    }
}

/// Postal code, city and province read from one line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityParts {
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

/// Parse `12345 CITY PR`, `12345 - CITY` or `12345 CITY (PR)`.
///
/// Unparseable text yields empty parts.
pub fn parse_city(text: &str) -> CityParts {
    let upper = text.trim().to_uppercase();
    CITY_LINE
        .captures(&upper)
        .map(|caps| CityParts {
            postal_code: caps[1].to_string(),
            city: caps[2].trim().to_string(),
            province: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
        .unwrap_or_default()
}

pub fn is_street_address(text: &str) -> bool {
    STREET_LINE.is_match(text.trim())
}

pub fn is_city_line(text: &str) -> bool {
    POSTAL_CODE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_city_variants() {
        assert_eq!(
            parse_city("12038 SAVIGLIANO CN"),
            CityParts {
                postal_code: "12038".into(),
                city: "SAVIGLIANO".into(),
                province: "CN".into(),
            }
        );

        let parts = parse_city("10139 - Torino (TO)");
        assert_eq!(parts.postal_code, "10139");
        assert_eq!(parts.city, "TORINO");
        assert_eq!(parts.province, "TO");

        let parts = parse_city("12051 ALBA");
        assert_eq!(parts.city, "ALBA");
        assert_eq!(parts.province, "");

        assert_eq!(parse_city("TORINO"), CityParts::default());
    }

    #[test]
    fn test_combine_parts() {
        let mut parts = AddressParts {
            street: "VIA CESANA, 78".into(),
            additional_info: "INGR. SCARICO: VIA PEROSA, 75".into(),
            ..Default::default()
        };
        parts.set_city(parse_city("10139 TORINO TO"));

        assert_eq!(
            parts.combine().as_deref(),
            Some("VIA CESANA, 78 INGR. SCARICO: VIA PEROSA, 75 10139 TORINO TO")
        );
    }

    #[test]
    fn test_combine_requires_street_or_postal_code() {
        let parts = AddressParts {
            city: "TORINO".into(),
            ..Default::default()
        };
        assert_eq!(parts.combine(), None);
    }

    #[test]
    fn test_street_detection() {
        assert!(is_street_address("VIA SALUZZO, 65"));
        assert!(is_street_address("c.so Francia 12"));
        assert!(is_street_address("LOC. SAN ROCCO"));
        assert!(!is_street_address("VIANELLO SRL"));
        assert!(STREET_TOKEN.is_match("INGR. DA VIA PEROSA"));
        assert!(!STREET_TOKEN.is_match("VIANELLO SRL"));
    }
}
