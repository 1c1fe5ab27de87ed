use anyhow::{bail, Context};
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{AddAssign, Mul},
    str::FromStr,
};

/// Represents an amount of money in dollars.
///
/// The amount is kept as a plain `f64`, because that is what ends up in the
/// spreadsheet cell; currency formatting is a display concern. The
/// [`Display`] implementation formats it with a leading `$`, thousands
/// separators and 2 decimal places, e.g. `$1,234.56`.
#[derive(Clone, Copy, Default, DeserializeFromStr, PartialEq, PartialOrd)]
pub struct Money(f64);

impl Money {
    #[must_use]
    pub fn new(dollars: f64) -> Self {
        Self(dollars)
    }

    #[must_use]
    pub fn dollars(self) -> f64 {
        self.0
    }
}

impl Debug for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fixed = format!("{:.2}", self.0.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        // -0.001 rounds to 0.00, which should not print as negative
        let sign = if self.0 < 0.0 && fixed != "0.00" { "-" } else { "" };
        f.pad(&format!("{sign}${grouped}.{cents}"))
    }
}

impl FromStr for Money {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("missing value");
        }
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let digits = rest.strip_prefix('$').unwrap_or(rest).replace(',', "");
        let value: f64 = digits
            .parse()
            .with_context(|| format!("{s:?} is not a number"))?;
        if !value.is_finite() {
            bail!("{s:?} is not a finite number");
        }
        Ok(Self(if negative { -value } else { value }))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<f64> for Money {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, m| {
            acc += m;
            acc
        })
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
