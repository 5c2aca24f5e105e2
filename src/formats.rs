//! Wire formats shared by request and response bodies.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate};
use serde::{
	de::{self, Unexpected, Visitor},
	Deserialize, Deserializer, Serializer,
};
use std::{fmt, str::FromStr};

/// Integer digits an amount may carry. Keeps every accepted value finite as
/// an `f64` and inside Postgres `NUMERIC` limits.
const MAX_INTEGER_DIGITS: i64 = 12;
const MAX_FRACTION_DIGITS: i64 = 20;

/// A monetary amount as sent by the client: a JSON number or a numeric string.
///
/// Magnitude is bounded at parse time. Sign is not checked here; see
/// [`Amount::non_negative`].
#[derive(Debug, Clone, PartialEq)]
pub struct Amount(pub BigDecimal);

impl Amount {
	pub fn non_negative(self) -> Option<BigDecimal> {
		if self.0 < BigDecimal::from(0) {
			None
		} else {
			Some(self.0)
		}
	}
}

fn within_bounds(value: &BigDecimal) -> bool {
	let (_, scale) = value.as_bigint_and_exponent();
	let integer_digits = value.digits() as i64 - scale;
	integer_digits <= MAX_INTEGER_DIGITS && scale <= MAX_FRACTION_DIGITS
}

struct AmountVisitor;

impl AmountVisitor {
	fn bounded<E: de::Error>(&self, value: BigDecimal, raw: Unexpected) -> Result<Amount, E> {
		if within_bounds(&value) {
			Ok(Amount(value))
		} else {
			Err(E::invalid_value(raw, self))
		}
	}
}

impl<'de> Visitor<'de> for AmountVisitor {
	type Value = Amount;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "a numeric amount with at most {MAX_INTEGER_DIGITS} integer digits")
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
		self.bounded(BigDecimal::from(v), Unexpected::Signed(v))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
		self.bounded(BigDecimal::from(v), Unexpected::Unsigned(v))
	}

	fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
		if !v.is_finite() {
			return Err(E::invalid_value(Unexpected::Float(v), &self));
		}
		// shortest round-trip repr, so 0.1 stays 0.1
		let value = BigDecimal::from_str(&v.to_string())
			.map_err(|_| E::invalid_value(Unexpected::Float(v), &self))?;
		self.bounded(value, Unexpected::Float(v))
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
		let value = BigDecimal::from_str(v.trim())
			.map_err(|_| E::invalid_value(Unexpected::Str(v), &self))?;
		self.bounded(value, Unexpected::Str(v))
	}
}

impl<'de> Deserialize<'de> for Amount {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(AmountVisitor)
	}
}

/// Serializes a stored decimal as a plain JSON number.
pub fn money<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
	let as_float = value
		.to_f64()
		.ok_or_else(|| serde::ser::Error::custom(format!("amount {value} out of range")))?;
	serializer.serialize_f64(as_float)
}

/// A calendar date sent by the client, either `YYYY-MM-DD` or a full RFC 3339 timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate(pub NaiveDate);

pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
	let raw = raw.trim();
	NaiveDate::parse_from_str(raw, "%Y-%m-%d")
		.ok()
		.or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

impl<'de> Deserialize<'de> for CalendarDate {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		parse_calendar_date(&raw).map(CalendarDate).ok_or_else(|| {
			de::Error::invalid_value(Unexpected::Str(&raw), &"a date such as 2024-03-15")
		})
	}
}
