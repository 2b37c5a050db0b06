// src/core/sanitize.rs
use rust_decimal::Decimal;

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&#36;", "$").replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Whole amount from a price cell: `$1,234.56` → 1234, `12,500 PTS` → 12500.
/// Drops `$` and `,`, takes the first whitespace token and its leading digits.
/// Cents are truncated. `None` when the token does not start with a digit.
pub fn parse_price(text: &str) -> Option<u32> {
    let cleaned: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    let token = cleaned.split_whitespace().next()?;
    let digits_end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    token[..digits_end].parse().ok()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234` → `1,234.00`, the way amounts are shown to the operator.
pub fn fmt_amount(n: u64) -> String {
    format!("{}.00", group_thousands(&n.to_string()))
}

/// Decimal version of [`fmt_amount`]: two places, thousands grouped.
pub fn fmt_decimal(d: Decimal) -> String {
    let fixed = format!("{:.2}", d.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{sign}{}.{frac}", group_thousands(int))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_text_variants() {
        assert_eq!(parse_price("$99"), Some(99));
        assert_eq!(parse_price("$1,234"), Some(1234));
        assert_eq!(parse_price("$99.99"), Some(99));
        assert_eq!(parse_price("12,500 PTS"), Some(12500));
        assert_eq!(parse_price(" $ 150 Wanna Get Away"), Some(150));
        assert_eq!(parse_price("Sold out"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$"), None);
    }

    #[test]
    fn price_overflow_is_none() {
        assert_eq!(parse_price("99999999999"), None);
    }

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(fmt_amount(0), "0.00");
        assert_eq!(fmt_amount(99), "99.00");
        assert_eq!(fmt_amount(1234), "1,234.00");
        assert_eq!(fmt_amount(1234567), "1,234,567.00");
    }

    #[test]
    fn decimals_are_grouped() {
        assert_eq!(fmt_decimal(Decimal::new(150000, 2)), "1,500.00");
        assert_eq!(fmt_decimal(Decimal::new(2495, 1)), "249.50");
        assert_eq!(fmt_decimal(Decimal::new(1234567891, 3)), "1,234,567.89");
        assert_eq!(fmt_decimal(Decimal::from(300)), "300.00");
    }

    #[test]
    fn whitespace_and_entities() {
        assert_eq!(normalize_ws("  8:00\n\tAM "), "8:00 AM");
        assert_eq!(normalize_entities("&#36;99&nbsp;R&amp;R"), "$99 R&R");
    }
}
