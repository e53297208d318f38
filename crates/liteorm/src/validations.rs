//! Composable validation helpers.
//!
//! Entity types call these from their `validate` hook instead of inheriting
//! behavior; each helper records a per-field message on failure and returns
//! whether the check passed. All helpers except [`unique`] are pure —
//! `validate` itself never touches storage.
//!
//! ```ignore
//! fn validate(&mut self) {
//!     validations::not_empty("title", self);
//!     validations::max_length("title", 120, self);
//! }
//! ```

use std::sync::OnceLock;

use crate::backend::Backend;
use crate::builder::QueryBuilder;
use crate::error::OrmResult;
use crate::model::{ActiveRecord, Record};
use crate::value::Value;

fn text_of<R: Record>(field: &str, record: &R) -> Option<String> {
    match record.attribute(field) {
        Ok(Value::Text(s)) => Some(s),
        _ => None,
    }
}

/// The field must be present and non-blank.
pub fn not_empty<R: Record>(field: &str, record: &mut R) -> bool {
    let blank = match record.attribute(field) {
        Ok(Value::Null) => true,
        Ok(Value::Text(s)) => s.trim().is_empty(),
        Ok(_) => false,
        Err(_) => true,
    };
    if blank {
        record.errors_mut().add(field, "can't be blank");
    }
    !blank
}

/// A text field, when present, must have at least `min` characters.
pub fn min_length<R: Record>(field: &str, min: usize, record: &mut R) -> bool {
    if let Some(s) = text_of(field, record) {
        if s.chars().count() < min {
            record
                .errors_mut()
                .add(field, format!("is too short (minimum is {min} characters)"));
            return false;
        }
    }
    true
}

/// A text field, when present, must have at most `max` characters.
pub fn max_length<R: Record>(field: &str, max: usize, record: &mut R) -> bool {
    if let Some(s) = text_of(field, record) {
        if s.chars().count() > max {
            record
                .errors_mut()
                .add(field, format!("is too long (maximum is {max} characters)"));
            return false;
        }
    }
    true
}

/// Best-effort email validation for a text field; blank fields pass (pair
/// with [`not_empty`] to require presence).
pub fn email_format<R: Record>(field: &str, record: &mut R) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
    });

    if let Some(s) = text_of(field, record) {
        if !s.is_empty() && !re.is_match(&s) {
            record.errors_mut().add(field, "is not a valid email");
            return false;
        }
    }
    true
}

/// Two values (e.g. password and its confirmation) must match; the message
/// lands on `field`.
pub fn confirmation<R: Record>(
    field: &str,
    value: Option<&str>,
    confirmed: Option<&str>,
    record: &mut R,
) -> bool {
    if value != confirmed {
        record.errors_mut().add(field, "confirmation does not match");
        return false;
    }
    true
}

/// No other row may carry the same values for `fields` (all of them,
/// AND-connected). A persisted record is excluded from the check by its own
/// id.
///
/// This helper reads storage, so it lives outside the pure `validate` hook:
/// call it explicitly before `save`.
pub fn unique<R: ActiveRecord>(
    db: &impl Backend,
    fields: &[&str],
    record: &mut R,
) -> OrmResult<bool> {
    let mut qb = QueryBuilder::table(R::TABLE);
    for field in fields {
        qb = qb.where_eq(field, record.attribute(field)?)?;
    }
    if let Some(id) = record.id() {
        qb = qb.where_op("id", "!=", id)?;
    }

    let taken = qb.exists(db)?;
    if taken {
        for field in fields {
            record.errors_mut().add(*field, "has already been taken");
        }
    }
    Ok(!taken)
}
