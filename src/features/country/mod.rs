mod table;

use std::collections::HashMap;

/// Two-letter <-> three-letter ISO 3166 country code lookup.
/// Unknown or malformed input maps to `None`.
pub trait CountryCodeConverter: Send + Sync {
    fn to_alpha3(&self, alpha2: &str) -> Option<&str>;
    fn to_alpha2(&self, alpha3: &str) -> Option<&str>;
}

/// Converter backed by the built-in ISO 3166-1 table.
#[derive(Clone, Debug)]
pub struct IsoCountryTable {
    by_alpha2: HashMap<&'static str, &'static str>,
    by_alpha3: HashMap<&'static str, &'static str>,
}

impl IsoCountryTable {
    pub fn new() -> Self {
        let mut by_alpha2 = HashMap::with_capacity(table::COUNTRIES.len());
        let mut by_alpha3 = HashMap::with_capacity(table::COUNTRIES.len());
        for &(alpha2, alpha3) in table::COUNTRIES {
            by_alpha2.insert(alpha2, alpha3);
            by_alpha3.insert(alpha3, alpha2);
        }
        Self {
            by_alpha2,
            by_alpha3,
        }
    }

    pub fn len(&self) -> usize {
        self.by_alpha2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alpha2.is_empty()
    }
}

impl Default for IsoCountryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryCodeConverter for IsoCountryTable {
    fn to_alpha3(&self, alpha2: &str) -> Option<&str> {
        lookup(&self.by_alpha2, alpha2, 2)
    }

    fn to_alpha2(&self, alpha3: &str) -> Option<&str> {
        lookup(&self.by_alpha3, alpha3, 3)
    }
}

fn lookup<'a>(
    map: &'a HashMap<&'static str, &'static str>,
    code: &str,
    expected_len: usize,
) -> Option<&'a str> {
    let code = code.trim();
    if code.len() != expected_len || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    map.get(code.to_ascii_uppercase().as_str()).copied()
}
