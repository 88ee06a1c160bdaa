//! Price formatting

/// Whole units with thousands separators after `symbol`, e.g. `₹1,234,567`.
///
/// Halves round to even. A negative amount keeps its sign after the symbol.
pub fn format_price(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let rounded = value.round_ties_even();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    format!("{}{}{}", symbol, sign, group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() {
        assert_eq!(format_price(0.0, "₹"), "₹0");
        assert_eq!(format_price(999.0, "₹"), "₹999");
        assert_eq!(format_price(1000.0, "₹"), "₹1,000");
        assert_eq!(format_price(1234567.0, "₹"), "₹1,234,567");
        assert_eq!(format_price(123456789.4, "Rs "), "Rs 123,456,789");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(format_price(550000.5, "₹"), "₹550,000");
        assert_eq!(format_price(550001.5, "₹"), "₹550,002");
        assert_eq!(format_price(999.7, "₹"), "₹1,000");
    }

    #[test]
    fn test_negative_and_non_finite() {
        assert_eq!(format_price(-1234.0, "₹"), "₹-1,234");
        assert_eq!(format_price(-0.3, "₹"), "₹0");
        assert_eq!(format_price(f64::NAN, "₹"), "n/a");
        assert_eq!(format_price(f64::INFINITY, "₹"), "n/a");
    }
}
