//! Locale-aware number display

use anyhow::anyhow;
use std::collections::HashMap;
use std::str::FromStr;

/// ISO 4217 currencies without minor units.
const ZERO_DECIMAL: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "UYI", "VND",
    "VUV", "XAF", "XOF", "XPF",
];

/// ISO 4217 currencies with three decimal places.
const THREE_DECIMAL: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// Fraction digits shown for the source amount at most.
const AMOUNT_MAX_FRACTION: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    /// 1,234,567
    Thousands,
    /// 12,34,567
    Indian,
}

/// Separators used to render numbers for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    group: &'static str,
    decimal: char,
    grouping: Grouping,
}

impl Locale {
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale {
            tag: "en-US".to_string(),
            group: ",",
            decimal: '.',
            grouping: Grouping::Thousands,
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().replace('_', "-");
        let mut parts = tag.split('-');
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts.next().map(|r| r.to_ascii_uppercase());

        let (group, decimal, grouping) = match (language.as_str(), region.as_deref()) {
            ("en", Some("IN")) | ("hi", _) => (",", '.', Grouping::Indian),
            ("de", Some("CH")) | ("it", Some("CH")) => ("\u{2019}", '.', Grouping::Thousands),
            ("en", _) | ("ja", _) | ("zh", _) | ("ko", _) | ("th", _) | ("he", _) => {
                (",", '.', Grouping::Thousands)
            }
            ("de", _) | ("nl", _) | ("it", _) | ("es", _) | ("pt", _) | ("id", _) | ("tr", _)
            | ("da", _) => (".", ',', Grouping::Thousands),
            ("fr", _) => ("\u{202f}", ',', Grouping::Thousands),
            ("ru", _) | ("pl", _) | ("cs", _) | ("sv", _) | ("fi", _) | ("nb", _) | ("uk", _) => {
                ("\u{a0}", ',', Grouping::Thousands)
            }
            _ => return Err(anyhow!("Unsupported locale: {}", s)),
        };

        Ok(Locale {
            tag,
            group,
            decimal,
            grouping,
        })
    }
}

/// Formats amounts and converted values for display.
#[derive(Debug, Clone, Default)]
pub struct NumberFormatter {
    locale: Locale,
    decimals: HashMap<String, usize>,
}

impl NumberFormatter {
    pub fn new(locale: Locale, decimals: HashMap<String, usize>) -> Self {
        let decimals = decimals
            .into_iter()
            .map(|(code, digits)| (code.to_ascii_uppercase(), digits))
            .collect();
        Self { locale, decimals }
    }

    /// Fraction digits shown for `currency`.
    pub fn precision(&self, currency: &str) -> usize {
        if let Some(digits) = self.decimals.get(currency) {
            return *digits;
        }
        if ZERO_DECIMAL.contains(&currency) {
            0
        } else if THREE_DECIMAL.contains(&currency) {
            3
        } else {
            2
        }
    }

    /// Rounds to the currency's precision, keeping trailing zeros.
    pub fn format_money(&self, value: f64, currency: &str) -> String {
        let digits = format!("{:.*}", self.precision(currency), value);
        self.localize(&digits)
    }

    /// Shows up to three fraction digits with trailing zeros dropped.
    pub fn format_amount(&self, value: f64) -> String {
        let digits = format!("{:.*}", AMOUNT_MAX_FRACTION, value);
        let digits = match digits.split_once('.') {
            Some((int, frac)) => {
                let frac = frac.trim_end_matches('0');
                if frac.is_empty() {
                    int.to_string()
                } else {
                    format!("{int}.{frac}")
                }
            }
            None => digits,
        };
        self.localize(&digits)
    }

    /// "100 USD = 92.00 EUR"
    pub fn format_conversion(&self, amount: f64, from: &str, converted: f64, to: &str) -> String {
        format!(
            "{} {} = {} {}",
            self.format_amount(amount),
            from,
            self.format_money(converted, to),
            to
        )
    }

    /// Applies grouping and decimal separators to a plain `-?\d+(\.\d+)?` string.
    fn localize(&self, plain: &str) -> String {
        let (sign, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain),
        };
        let (int, frac) = match unsigned.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (unsigned, None),
        };

        let mut out = String::from(sign);
        out.push_str(&self.group_digits(int));
        if let Some(frac) = frac {
            out.push(self.locale.decimal);
            out.push_str(frac);
        }
        out
    }

    fn group_digits(&self, int: &str) -> String {
        let len = int.len();
        let mut out = String::with_capacity(len + len / 2);
        for (i, c) in int.chars().enumerate() {
            let remaining = len - i;
            if i > 0 && self.is_group_boundary(remaining) {
                out.push_str(self.locale.group);
            }
            out.push(c);
        }
        out
    }

    /// Whether a separator goes before the digit with `remaining` digits left.
    fn is_group_boundary(&self, remaining: usize) -> bool {
        match self.locale.grouping {
            Grouping::Thousands => remaining % 3 == 0,
            Grouping::Indian => remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0),
        }
    }
}
