use crate::{cache::CacheKey, essentials::*};

use std::fmt::{Display, Formatter};

use chrono::{Datelike, Local, NaiveDate};

/// A calendar month, the unit transactions are booked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub month: i32,
}

impl Period {
    pub fn new(year: i32, month: i32) -> Result<Self> {
        if (1..=12).contains(&month) && NaiveDate::from_ymd_opt(year, month as u32, 1).is_some() {
            Ok(Self { year, month })
        } else {
            Err(Error::InvalidMonth(year, month))
        }
    }

    pub fn current() -> Self {
        Self::from(Local::now().date_naive())
    }

    pub fn name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|month| chrono::Month::try_from(month).ok())
            .map(|month| month.name())
            .unwrap_or("")
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::Transactions {
            month: self.month,
            year: self.year,
        }
    }
}

impl From<NaiveDate> for Period {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as i32,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
