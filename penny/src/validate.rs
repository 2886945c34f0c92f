//! Schema checks for user input
//!
//! Every function here is pure: it takes the raw values a form produced and
//! returns either the typed record the store expects or every problem found
//! with the input at once.

use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;

use crate::{
    category::{CategoryPatch, NewCategory},
    date::Period,
    kind::Kind,
    recurring::{NewRecurring, RecurringPatch},
    transaction::{NewTransaction, TransactionPatch},
};

pub const NAME_MAX_LENGTH: usize = 50;
pub const MIN_YEAR: i32 = 2000;
/// Largest amount a single transaction may carry, kept far enough below
/// `i64::MAX` for yearly sums to fit
pub const AMOUNT_MAX: i64 = 1_000_000_000_000;

static COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9A-Fa-f]{3}){1,2}$").expect("valid color pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn messages(&self, field: &str) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message)
            .collect()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invalid data")?;
        for (i, error) in self.fields.iter().enumerate() {
            let separator = if i == 0 { ": " } else { "; " };
            write!(f, "{separator}{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryForm<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub color: &'a str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EditCategoryForm<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub color: &'a str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionForm<'a> {
    pub name: &'a str,
    pub amount: &'a str,
    pub category_id: &'a str,
    pub kind: &'a str,
    pub month: i32,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EditTransactionForm<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub amount: &'a str,
    pub category_id: &'a str,
    pub kind: &'a str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecurringForm<'a> {
    pub name: &'a str,
    pub amount: &'a str,
    pub category_id: &'a str,
    pub kind: &'a str,
    pub count_this_month: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleRecurringForm<'a> {
    pub id: &'a str,
    pub active: bool,
}

type Validated<T> = std::result::Result<T, ValidationError>;

pub fn category(form: &CategoryForm) -> Validated<NewCategory> {
    let mut check = Checker::default();

    match (
        check.name(form.name),
        check.kind(form.kind),
        check.color(form.color),
    ) {
        (Some(name), Some(kind), Some(color)) => Ok(NewCategory { name, kind, color }),
        _ => Err(check.into()),
    }
}

pub fn edit_category(form: &EditCategoryForm) -> Validated<(i64, CategoryPatch)> {
    let mut check = Checker::default();

    match (
        check.id("id", form.id),
        check.name(form.name),
        check.color(form.color),
    ) {
        (Some(id), Some(name), Some(color)) => Ok((
            id,
            CategoryPatch {
                name: Some(name),
                color: Some(color),
            },
        )),
        _ => Err(check.into()),
    }
}

pub fn transaction(form: &TransactionForm) -> Validated<NewTransaction> {
    let mut check = Checker::default();

    match (
        check.name(form.name),
        check.amount(form.amount),
        check.id("category_id", form.category_id),
        check.kind(form.kind),
        check.period(form.year, form.month),
    ) {
        (Some(name), Some(amount), Some(category_id), Some(kind), Some(period)) => {
            Ok(NewTransaction {
                name,
                amount,
                category_id,
                kind,
                period,
            })
        }
        _ => Err(check.into()),
    }
}

/// Month and year are not part of the form: they can't change once booked
pub fn edit_transaction(form: &EditTransactionForm) -> Validated<(i64, TransactionPatch)> {
    let mut check = Checker::default();

    match (
        check.id("id", form.id),
        check.name(form.name),
        check.amount(form.amount),
        check.id("category_id", form.category_id),
        check.kind(form.kind),
    ) {
        (Some(id), Some(name), Some(amount), Some(category_id), Some(kind)) => Ok((
            id,
            TransactionPatch {
                name: Some(name),
                amount: Some(amount),
                category_id: Some(category_id),
                kind: Some(kind),
            },
        )),
        _ => Err(check.into()),
    }
}

/// `today` is the month a first transaction is booked in when the form asks
/// for the payment to count this month already
pub fn recurring(form: &RecurringForm, today: Period) -> Validated<NewRecurring> {
    let mut check = Checker::default();

    match (
        check.name(form.name),
        check.amount(form.amount),
        check.id("category_id", form.category_id),
        check.kind(form.kind),
    ) {
        (Some(name), Some(amount), Some(category_id), Some(kind)) => Ok(NewRecurring {
            name,
            amount,
            category_id,
            kind,
            count_this_month: form.count_this_month.then_some(today),
        }),
        _ => Err(check.into()),
    }
}

pub fn toggle_recurring(form: &ToggleRecurringForm) -> Validated<(i64, RecurringPatch)> {
    let mut check = Checker::default();

    match check.id("id", form.id) {
        Some(id) => Ok((
            id,
            RecurringPatch {
                active: Some(form.active),
            },
        )),
        None => Err(check.into()),
    }
}

pub fn delete(id: &str) -> Validated<i64> {
    let mut check = Checker::default();

    match check.id("id", id) {
        Some(id) => Ok(id),
        None => Err(check.into()),
    }
}

/// Collects field errors; each check returns `None` exactly when it recorded
/// an error.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl From<Checker> for ValidationError {
    fn from(check: Checker) -> Self {
        ValidationError {
            fields: check.errors,
        }
    }
}

impl Checker {
    fn fail<T>(&mut self, field: &'static str, message: &'static str) -> Option<T> {
        self.errors.push(FieldError { field, message });
        None
    }

    fn name(&mut self, value: &str) -> Option<String> {
        let length = value.chars().count();

        if length == 0 {
            self.fail("name", "Name is required")
        } else if length > NAME_MAX_LENGTH {
            self.fail("name", "Name must be at most 50 characters")
        } else {
            Some(value.to_owned())
        }
    }

    /// Amounts are typed as text and coerced, so "12" and " 1e3 " are fine
    /// while "12.5", "-5" and "" are not.
    fn amount(&mut self, value: &str) -> Option<i64> {
        let value = value.trim();

        let amount = if value.is_empty() {
            0
        } else if let Ok(amount) = value.parse::<i64>() {
            amount
        } else {
            match value.parse::<f64>() {
                Ok(amount) if amount.is_nan() => return self.fail("amount", "Amount must be a number"),
                Ok(amount) if !amount.is_finite() || amount.fract() != 0.0 => {
                    return self.fail("amount", "Amount must be a whole number")
                }
                Ok(amount) if amount.abs() > AMOUNT_MAX as f64 => {
                    return self.fail("amount", "Amount is too large")
                }
                Ok(amount) => amount as i64,
                Err(_) => return self.fail("amount", "Amount must be a number"),
            }
        };

        if amount > AMOUNT_MAX {
            self.fail("amount", "Amount is too large")
        } else if amount > 0 {
            Some(amount)
        } else {
            self.fail("amount", "Amount must be a positive whole number")
        }
    }

    fn kind(&mut self, value: &str) -> Option<Kind> {
        match value.parse() {
            Ok(kind) => Some(kind),
            Err(_) => self.fail("kind", "Kind must be income or expense"),
        }
    }

    fn color(&mut self, value: &str) -> Option<String> {
        if COLOR.is_match(value) {
            Some(value.to_owned())
        } else {
            self.fail("color", "Invalid color")
        }
    }

    fn id(&mut self, field: &'static str, value: &str) -> Option<i64> {
        match value.trim().parse::<i64>() {
            Ok(id) if id > 0 => Some(id),
            _ => self.fail(field, "Invalid identifier"),
        }
    }

    fn period(&mut self, year: i32, month: i32) -> Option<Period> {
        let month_ok = (1..=12).contains(&month);
        if !month_ok {
            self.fail::<()>("month", "Month must be between 1 and 12");
        }
        let year_ok = year >= MIN_YEAR;
        if !year_ok {
            self.fail::<()>("year", "Year must be 2000 or later");
        }

        if month_ok && year_ok {
            match Period::new(year, month) {
                Ok(period) => Some(period),
                Err(_) => self.fail("year", "Year is out of range"),
            }
        } else {
            None
        }
    }
}
