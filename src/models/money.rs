// ============================================================================
// Formatage monétaire
// ============================================================================
// Affiche un montant selon la convention en-US de la devise cible :
// symbole en préfixe, séparateur de milliers ",", entre 2 et 6 décimales
//
// Exemples :
// - 85.0 EUR       → "€85.00"
// - 11000.0 JPY    → "¥11,000.00"
// - 0.1234567 USD  → "$0.123457"
// ============================================================================

use crate::models::currency;

/// Nombre minimal de décimales affichées
pub const MIN_FRACTION_DIGITS: usize = 2;

/// Nombre maximal de décimales affichées
pub const MAX_FRACTION_DIGITS: usize = 6;

/// Formate une valeur dans la devise donnée
///
/// Les codes hors catalogue utilisent le code lui-même comme préfixe.
pub fn format_money(value: f64, code: &str) -> String {
    let prefix = match currency::find(code) {
        Some(descriptor) => descriptor.symbol.to_string(),
        None => format!("{}\u{a0}", code),
    };

    if value.is_nan() {
        return format!("{}NaN", prefix);
    }

    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };

    if value.is_infinite() {
        return format!("{}{}∞", sign, prefix);
    }

    format!("{}{}{}", sign, prefix, format_amount(value.abs()))
}

/// Formate un nombre positif avec groupement et 2 à 6 décimales
///
/// CONCEPT : Arrondi puis troncature des zéros
/// - format!("{:.6}") arrondit à 6 décimales
/// - Les zéros finaux sont retirés jusqu'à n'en garder que 2
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = frac_part.trim_end_matches('0').to_string();
    while fraction.len() < MIN_FRACTION_DIGITS {
        fraction.push('0');
    }

    format!("{}.{}", group_thousands(int_part), fraction)
}

/// Insère une virgule toutes les trois positions ("1234567" → "1,234,567")
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
