use penny::prelude::*;

use chrono::{DateTime, Utc};

macro_rules! push_record {
    ( $builder:ident, $($col:expr),* $(,)? ) => {
        {
            use crate::utils::table_display::ColumnDisplay;
            $builder.push_record([$(ColumnDisplay::to_column(&$col),)*])
        }
    }
}

pub trait ColumnDisplay {
    fn to_column(&self) -> String;
}

impl ColumnDisplay for Option<String> {
    fn to_column(&self) -> String {
        self.clone().unwrap_or_else(String::default)
    }
}

impl ColumnDisplay for String {
    fn to_column(&self) -> String {
        self.clone()
    }
}

impl ColumnDisplay for &str {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for i64 {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for Id {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for Kind {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for Period {
    fn to_column(&self) -> String {
        format!("{} {}", self.name(), self.year)
    }
}

impl ColumnDisplay for bool {
    fn to_column(&self) -> String {
        if *self { "yes" } else { "no" }.to_owned()
    }
}

impl ColumnDisplay for Option<DateTime<Utc>> {
    fn to_column(&self) -> String {
        self.map(|date| date.date_naive().to_string())
            .unwrap_or_default()
    }
}

/// Amount signed by its kind, expenses being negative
impl ColumnDisplay for (i64, Kind) {
    fn to_column(&self) -> String {
        match self.1 {
            Kind::Income => self.0.to_string(),
            Kind::Expense => (-self.0).to_string(),
        }
    }
}
