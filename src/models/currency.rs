// ============================================================================
// Structure : CurrencyDescriptor
// ============================================================================
// Représente une devise du catalogue (code ISO 4217, nom, région)
//
// CONCEPTS RUST :
// 1. &'static str : chaînes incluses dans le binaire, aucune allocation
// 2. static : le catalogue est une donnée immuable connue à la compilation
// 3. Iterators : recherche dans le catalogue avec find()
// ============================================================================

/// Devise supportée par le convertisseur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyDescriptor {
    /// Code ISO 4217 (ex: "USD"), unique dans le catalogue
    pub code: &'static str,

    /// Nom affiché (ex: "US Dollar")
    pub display_name: &'static str,

    /// Région en minuscules (ex: "us"), utilisée pour le drapeau
    pub region_tag: &'static str,

    /// Préfixe monétaire en affichage en-US (ex: "$", "CA$", "CHF ")
    pub symbol: &'static str,
}

impl CurrencyDescriptor {
    const fn new(
        code: &'static str,
        display_name: &'static str,
        region_tag: &'static str,
        symbol: &'static str,
    ) -> Self {
        Self {
            code,
            display_name,
            region_tag,
            symbol,
        }
    }

    /// Drapeau emoji correspondant à la région
    ///
    /// CONCEPT : Regional indicator symbols
    /// - Chaque lettre a..z correspond à U+1F1E6..U+1F1FF
    /// - Deux indicateurs consécutifs forment un drapeau ("us" → 🇺🇸)
    pub fn flag(&self) -> String {
        self.region_tag
            .chars()
            .filter(|c| c.is_ascii_lowercase())
            .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'a' as u32)))
            .collect()
    }
}

/// Catalogue statique des devises supportées (ordre d'affichage des pickers)
pub static CATALOG: [CurrencyDescriptor; 20] = [
    CurrencyDescriptor::new("USD", "US Dollar", "us", "$"),
    CurrencyDescriptor::new("EUR", "Euro", "eu", "€"),
    CurrencyDescriptor::new("GBP", "British Pound", "gb", "£"),
    CurrencyDescriptor::new("JPY", "Japanese Yen", "jp", "¥"),
    CurrencyDescriptor::new("AUD", "Australian Dollar", "au", "A$"),
    CurrencyDescriptor::new("CAD", "Canadian Dollar", "ca", "CA$"),
    CurrencyDescriptor::new("CHF", "Swiss Franc", "ch", "CHF\u{a0}"),
    CurrencyDescriptor::new("CNY", "Chinese Yuan", "cn", "CN¥"),
    CurrencyDescriptor::new("SEK", "Swedish Krona", "se", "SEK\u{a0}"),
    CurrencyDescriptor::new("NZD", "New Zealand Dollar", "nz", "NZ$"),
    CurrencyDescriptor::new("MXN", "Mexican Peso", "mx", "MX$"),
    CurrencyDescriptor::new("SGD", "Singapore Dollar", "sg", "SGD\u{a0}"),
    CurrencyDescriptor::new("HKD", "Hong Kong Dollar", "hk", "HK$"),
    CurrencyDescriptor::new("NOK", "Norwegian Krone", "no", "NOK\u{a0}"),
    CurrencyDescriptor::new("KRW", "South Korean Won", "kr", "₩"),
    CurrencyDescriptor::new("TRY", "Turkish Lira", "tr", "TRY\u{a0}"),
    CurrencyDescriptor::new("RUB", "Russian Ruble", "ru", "RUB\u{a0}"),
    CurrencyDescriptor::new("INR", "Indian Rupee", "in", "₹"),
    CurrencyDescriptor::new("BRL", "Brazilian Real", "br", "R$"),
    CurrencyDescriptor::new("ZAR", "South African Rand", "za", "ZAR\u{a0}"),
];

/// Retourne le catalogue complet
pub fn catalog() -> &'static [CurrencyDescriptor] {
    &CATALOG
}

/// Cherche une devise par son code (insensible à la casse)
///
/// CONCEPT RUST : Option<&'static T>
/// - None si le code n'est pas dans le catalogue
/// - La référence vit aussi longtemps que le programme
pub fn find(code: &str) -> Option<&'static CurrencyDescriptor> {
    CATALOG.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Position d'une devise dans le catalogue
pub fn index_of(code: &str) -> Option<usize> {
    CATALOG.iter().position(|c| c.code.eq_ignore_ascii_case(code))
}

/// Vérifie qu'un code appartient au catalogue
pub fn is_supported(code: &str) -> bool {
    find(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_codes_are_unique() {
        let codes: HashSet<_> = CATALOG.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), CATALOG.len());
    }

    #[test]
    fn test_find() {
        let eur = find("eur").unwrap();
        assert_eq!(eur.code, "EUR");
        assert_eq!(eur.display_name, "Euro");
        assert!(find("XYZ").is_none());
    }

    #[test]
    fn test_index_of() {
        assert_eq!(index_of("USD"), Some(0));
        assert_eq!(index_of("ZAR"), Some(19));
        assert_eq!(index_of("BTC"), None);
    }

    #[test]
    fn test_flag() {
        assert_eq!(find("USD").unwrap().flag(), "🇺🇸");
        assert_eq!(find("EUR").unwrap().flag(), "🇪🇺");
    }
}
