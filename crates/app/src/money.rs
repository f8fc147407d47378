//! Amount parsing and display

/// Parse a positive decimal amount with at most two fractional digits into
/// cents
pub fn parse_cents(input: &str) -> Result<i64, String> {
    let input = input.trim();
    let (whole, frac) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(frac) {
        return Err(format!("'{}' is not an amount like 12.50", input));
    }
    if frac.len() > 2 {
        return Err("at most two decimal places".to_string());
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| format!("'{}' is too large", input))?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().unwrap_or(0) * 10,
        _ => frac.parse().unwrap_or(0),
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or_else(|| format!("'{}' is too large", input))?;
    if cents == 0 {
        return Err("amount must be greater than zero".to_string());
    }
    Ok(cents)
}

/// Render cents as `1234.50 USD`
pub fn format_cents(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("12"), Ok(1_200));
        assert_eq!(parse_cents("12.5"), Ok(1_250));
        assert_eq!(parse_cents("12.05"), Ok(1_205));
        assert_eq!(parse_cents(" 0.01 "), Ok(1));
    }

    #[test]
    fn test_parse_cents_rejects_garbage() {
        for bad in ["", "abc", "-3", "1.234", ".5", "1,50", "0", "0.00", "99999999999999999999"] {
            assert!(parse_cents(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(123_450, "USD"), "1234.50 USD");
        assert_eq!(format_cents(-5, "EUR"), "-0.05 EUR");
        assert_eq!(format_cents(0, "GBP"), "0.00 GBP");
    }
}
