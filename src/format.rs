//! Display formatting for the processing header.

/// Symbol for a currency code, `$` for unknown codes
pub fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "NGN" => "₦",
        "CAD" => "C$",
        _ => "$",
    }
}

/// Format an amount with its currency symbol and two decimals (e.g. "£12.50")
pub fn format_currency(amount: f64, currency: &str) -> String {
    format!("{}{:.2}", currency_symbol(currency), amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols() {
        assert_eq!(format_currency(12.5, "USD"), "$12.50");
        assert_eq!(format_currency(12.5, "eur"), "€12.50");
        assert_eq!(format_currency(1000.0, "GBP"), "£1000.00");
        assert_eq!(format_currency(0.1, "NGN"), "₦0.10");
        assert_eq!(format_currency(3.456, "CAD"), "C$3.46");
    }

    #[test]
    fn test_unknown_currency_defaults_to_dollar() {
        assert_eq!(format_currency(7.0, "JPY"), "$7.00");
    }
}
