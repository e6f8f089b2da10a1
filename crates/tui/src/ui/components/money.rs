use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Cents are exact in an `f64` below 2^53; larger amounts drop the fraction.
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Formats an amount with thousands separators and the currency glyph.
///
/// At most two fraction digits are shown and trailing zeros are dropped, so
/// `1234.5` renders as `₹1,234.5` and `5000.0` as `₹5,000`. NaN and infinite
/// values render as `n/a` instead of a number.
#[must_use]
pub fn format_amount(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return format!("{symbol}n/a");
    }

    let scaled = (value.abs() * 100.0).round();
    let (whole, fraction) = if scaled < MAX_EXACT_CENTS {
        let cents = scaled as u64;
        ((cents / 100).to_string(), cents % 100)
    } else {
        (format!("{:.0}", value.abs()), 0)
    };
    let sign = if value < 0.0 && (whole != "0" || fraction > 0) {
        "-"
    } else {
        ""
    };

    let fraction = match fraction {
        0 => String::new(),
        f if f % 10 == 0 => format!(".{}", f / 10),
        f => format!(".{f:02}"),
    };
    format!("{sign}{symbol}{}{fraction}", group_thousands(&whole))
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

/// Amount with an explicit `+`/`-` and semantic color.
#[must_use]
pub fn styled_signed_amount(amount: f64, symbol: &str, theme: &Theme) -> Span<'static> {
    let formatted = format_amount(amount.abs(), symbol);
    let (color, prefix) = if amount > 0.0 {
        (theme.positive, "+")
    } else if amount < 0.0 {
        (theme.negative, "-")
    } else {
        (theme.text, "")
    };
    Span::styled(format!("{prefix}{formatted}"), Style::default().fg(color))
}

/// Bold amount colored by sign, used for balances and net totals.
#[must_use]
pub fn styled_balance(amount: f64, symbol: &str, theme: &Theme) -> Span<'static> {
    let color = if amount >= 0.0 {
        theme.accent
    } else {
        theme.warning
    };
    Span::styled(
        format_amount(amount, symbol),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_amount(0.0, "₹"), "₹0");
        assert_eq!(format_amount(999.0, "₹"), "₹999");
        assert_eq!(format_amount(5000.0, "₹"), "₹5,000");
        assert_eq!(format_amount(1_234_567.0, "$"), "$1,234,567");
    }

    #[test]
    fn trims_fraction_digits() {
        assert_eq!(format_amount(1234.5, "₹"), "₹1,234.5");
        assert_eq!(format_amount(12.05, "₹"), "₹12.05");
        assert_eq!(format_amount(0.999, "₹"), "₹1");
    }

    #[test]
    fn negative_sign_precedes_glyph() {
        assert_eq!(format_amount(-2500.75, "₹"), "-₹2,500.75");
        assert_eq!(format_amount(-0.001, "₹"), "₹0");
    }

    #[test]
    fn non_finite_and_huge_amounts() {
        assert_eq!(format_amount(f64::NAN, "₹"), "₹n/a");
        assert_eq!(format_amount(f64::INFINITY, "₹"), "₹n/a");
        assert_eq!(format_amount(f64::NEG_INFINITY, "₹"), "₹n/a");
        assert_eq!(
            format_amount(1e20, "₹"),
            "₹100,000,000,000,000,000,000"
        );
        assert_eq!(format_amount(-1e20, "$"), "-$100,000,000,000,000,000,000");
    }

    #[test]
    fn signed_span_uses_explicit_sign() {
        let theme = Theme::default();
        assert_eq!(styled_signed_amount(-40.0, "₹", &theme).content, "-₹40");
        assert_eq!(styled_signed_amount(40.0, "₹", &theme).content, "+₹40");
    }
}
