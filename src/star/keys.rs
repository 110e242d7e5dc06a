use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Surrogate keys for distinct string values, 1-based in order of first
/// appearance.
#[derive(Debug, Default, Clone)]
pub struct FirstAppearanceKeys {
    ids: HashMap<String, i64>,
    order: Vec<String>,
}

impl FirstAppearanceKeys {
    pub fn build<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keys = Self::default();
        for v in values {
            if !keys.ids.contains_key(v) {
                keys.order.push(v.to_string());
                keys.ids.insert(v.to_string(), keys.order.len() as i64);
            }
        }
        keys
    }

    pub fn id(&self, value: &str) -> Option<i64> {
        self.ids.get(value).copied()
    }

    /// `(id, value)` pairs in id order.
    pub fn entries(&self) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(i, v)| (i as i64 + 1, v.as_str()))
    }
}

/// Surrogate keys for distinct dates, 1-based in chronological order.
#[derive(Debug, Default, Clone)]
pub struct DateKeys {
    ids: HashMap<NaiveDate, i64>,
    sorted: Vec<NaiveDate>,
}

impl DateKeys {
    pub fn build(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
        let sorted: Vec<NaiveDate> = distinct.into_iter().collect();
        let ids = sorted
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i as i64 + 1))
            .collect();
        Self { ids, sorted }
    }

    pub fn id(&self, date: NaiveDate) -> Option<i64> {
        self.ids.get(&date).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (i64, NaiveDate)> + '_ {
        self.sorted
            .iter()
            .enumerate()
            .map(|(i, d)| (i as i64 + 1, *d))
    }
}
