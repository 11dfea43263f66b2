//! Group-by counts over a text field.

use std::collections::HashMap;

use serde::Serialize;

use marquee_core::TitleRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: u64,
}

/// Records per title type. Records with a blank type are left out.
pub fn title_type_counts(records: &[TitleRecord]) -> Vec<NameCount> {
    count_by(records, |r| Some(r.title_type.as_str()))
}

/// Records per country of origin. Records without a country are left out.
pub fn country_counts(records: &[TitleRecord]) -> Vec<NameCount> {
    count_by(records, |r| r.country_of_origin.as_deref())
}

/// Count records per key, ordered by count descending then name.
fn count_by<'a, F>(records: &'a [TitleRecord], key: F) -> Vec<NameCount>
where
    F: Fn(&'a TitleRecord) -> Option<&'a str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for name in records.iter().filter_map(key).map(str::trim) {
        if !name.is_empty() {
            *counts.entry(name).or_default() += 1;
        }
    }

    let mut rows: Vec<NameCount> = counts
        .into_iter()
        .map(|(name, count)| NameCount {
            name: name.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rows
}
