//! Filter types and the small WHERE-clause builder the repositories share

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

/// Inclusive time window; an unset bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// No bounds: every row matches
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whole calendar days, from the start of `from` to the last millisecond of `to`
    pub fn days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(start_of_day),
            to: to.map(end_of_day),
        }
    }

    /// The `days` days ending at `now`
    pub fn last_days(days: u64, now: DateTime<Utc>) -> Self {
        Self {
            from: now.checked_sub_days(Days::new(days)),
            to: Some(now),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next) - chrono::Duration::milliseconds(1),
        None => start_of_day(date),
    }
}

/// Filter for entities that only have a name worth searching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl NameFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            limit: None,
        }
    }
}

/// Accumulates `AND`-ed conditions and their positional parameters
#[derive(Debug, Default)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `clause` must contain exactly one `?`
    pub fn push(&mut self, clause: &str, value: impl Into<Value>) {
        self.clauses.push(clause.to_string());
        self.values.push(value.into());
    }

    pub fn push_opt<V: Into<Value>>(&mut self, clause: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(clause, value);
        }
    }

    pub fn range(&mut self, column: &str, range: &DateRange) {
        if let Some(from) = range.from {
            self.push(&format!("{} >= ?", column), from.timestamp_millis());
        }
        if let Some(to) = range.to {
            self.push(&format!("{} <= ?", column), to.timestamp_millis());
        }
    }

    /// Case-insensitive substring match on any of `columns`; blank text is ignored
    pub fn like_any(&mut self, columns: &[&str], text: Option<&str>) {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        let pattern = format!("%{}%", escape_like(text));
        let ors: Vec<String> = columns
            .iter()
            .map(|c| format!("{} LIKE ? ESCAPE '\\'", c))
            .collect();
        self.clauses.push(format!("({})", ors.join(" OR ")));
        for _ in columns {
            self.values.push(Value::Text(pattern.clone()));
        }
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Append ` LIMIT ?` when a limit is set
    pub fn limit_sql(&mut self, limit: Option<usize>) -> &'static str {
        match limit {
            Some(limit) => {
                // a negative LIMIT means "no limit" to SQLite, so saturate
                self.values
                    .push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
                " LIMIT ?"
            }
            None => "",
        }
    }

    pub fn params(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.values.iter())
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Read an epoch-milliseconds column as a UTC timestamp
pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {}", millis).into(),
        )
    })
}
