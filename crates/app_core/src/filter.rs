//! Search, facet filtering and sorting
//!
//! [`apply`] runs a fixed pipeline: scope, text query, type, size, date,
//! tags, then a stable sort. Empty facets do not restrict anything; facets
//! combine with AND, values inside one facet with OR.

use app_fs::{collate_names, FileCategory, Item, VirtualPath};
use chrono::{DateTime, Duration, Months, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Size facet buckets, inclusive ranges in megabytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 5] = [
        SizeBucket::Tiny,
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::Huge,
    ];

    /// `[min, max]` in MB
    pub fn range_mb(self) -> (f64, f64) {
        match self {
            SizeBucket::Tiny => (0.0, 1.0),
            SizeBucket::Small => (1.0, 10.0),
            SizeBucket::Medium => (10.0, 100.0),
            SizeBucket::Large => (100.0, 500.0),
            SizeBucket::Huge => (500.0, 1000.0),
        }
    }

    pub fn contains_mb(self, mb: f64) -> bool {
        let (min, max) = self.range_mb();
        mb >= min && mb <= max
    }
}

/// Date facet buckets, relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBucket {
    Today,
    Week,
    Month,
    Year,
}

impl DateBucket {
    pub const ALL: [DateBucket; 4] = [
        DateBucket::Today,
        DateBucket::Week,
        DateBucket::Month,
        DateBucket::Year,
    ];

    /// Does `modified` fall in this bucket as seen from `now`?
    ///
    /// Month and year compare against midnight of the same calendar day one
    /// month/year back; week is exactly 7×24h.
    ///
    /// A day missing from the earlier month clamps to that month's last day:
    /// on 31 March the month window opens on 29 February, never rolling over
    /// into early March. Likewise 29 February a year back becomes 28 February.
    pub fn matches<Tz: TimeZone>(self, modified: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let local = modified.with_timezone(&now.timezone());
        match self {
            DateBucket::Today => local.date_naive() == now.date_naive(),
            DateBucket::Week => modified >= now.with_timezone(&Utc) - Duration::days(7),
            DateBucket::Month => since_midnight_months_ago(local.naive_local(), now, 1),
            DateBucket::Year => since_midnight_months_ago(local.naive_local(), now, 12),
        }
    }
}

fn since_midnight_months_ago<Tz: TimeZone>(local: NaiveDateTime, now: &DateTime<Tz>, months: u32) -> bool {
    now.date_naive()
        .checked_sub_months(Months::new(months))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .is_some_and(|start| local >= start)
}

/// Sort order of the result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Natural, case-insensitive name order
    #[default]
    Name,
    /// Largest first
    Size,
    /// Ascending by extension
    Type,
    /// Newest first
    Modified,
    /// Query match score, best first
    Relevance,
}

/// Which items a search looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Direct children of one folder (browse mode)
    Folder(VirtualPath),
    /// The whole collection (search mode)
    Everywhere,
}

/// One active facet value, as shown in the chip row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "facet", content = "value", rename_all = "lowercase")]
pub enum FilterChip {
    Type(FileCategory),
    Size(SizeBucket),
    Date(DateBucket),
    Tag(String),
}

/// Active facet values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub file_types: BTreeSet<FileCategory>,
    pub size_ranges: BTreeSet<SizeBucket>,
    pub date_ranges: BTreeSet<DateBucket>,
    pub tags: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch a facet value on or off. Blank tags are ignored.
    pub fn toggle(&mut self, chip: FilterChip) {
        fn flip<T: Ord>(set: &mut BTreeSet<T>, value: T) {
            if set.contains(&value) {
                set.remove(&value);
            } else {
                set.insert(value);
            }
        }

        match chip {
            FilterChip::Type(c) => flip(&mut self.file_types, c),
            FilterChip::Size(s) => flip(&mut self.size_ranges, s),
            FilterChip::Date(d) => flip(&mut self.date_ranges, d),
            FilterChip::Tag(tag) => {
                let tag = tag.trim();
                if !tag.is_empty() {
                    flip(&mut self.tags, tag.to_string());
                }
            }
        }
    }

    /// Remove one chip; returns false if it was not active
    pub fn remove(&mut self, chip: &FilterChip) -> bool {
        match chip {
            FilterChip::Type(c) => self.file_types.remove(c),
            FilterChip::Size(s) => self.size_ranges.remove(s),
            FilterChip::Date(d) => self.date_ranges.remove(d),
            FilterChip::Tag(t) => self.tags.remove(t),
        }
    }

    pub fn chips(&self) -> Vec<FilterChip> {
        self.file_types
            .iter()
            .map(|c| FilterChip::Type(*c))
            .chain(self.size_ranges.iter().map(|s| FilterChip::Size(*s)))
            .chain(self.date_ranges.iter().map(|d| FilterChip::Date(*d)))
            .chain(self.tags.iter().map(|t| FilterChip::Tag(t.clone())))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.file_types.len() + self.size_ranges.len() + self.date_ranges.len() + self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn matches<Tz: TimeZone>(&self, item: &Item, now: &DateTime<Tz>) -> bool {
        self.matches_type(item)
            && self.matches_size(item)
            && self.matches_date(item, now)
            && self.matches_tags(item)
    }

    fn matches_type(&self, item: &Item) -> bool {
        if self.file_types.is_empty() {
            return true;
        }
        item.extension()
            .is_some_and(|ext| self.file_types.iter().any(|c| c.contains(&ext)))
    }

    fn matches_size(&self, item: &Item) -> bool {
        self.size_ranges.is_empty() || self.size_ranges.iter().any(|b| b.contains_mb(item.size_mb()))
    }

    fn matches_date<Tz: TimeZone>(&self, item: &Item, now: &DateTime<Tz>) -> bool {
        self.date_ranges.is_empty() || self.date_ranges.iter().any(|b| b.matches(item.modified_at, now))
    }

    fn matches_tags(&self, item: &Item) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        self.tags.iter().any(|wanted| {
            let wanted = wanted.to_lowercase();
            item.tags.iter().any(|t| t.to_lowercase().contains(&wanted))
        })
    }
}

/// Filtered, sorted items and their count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub items: Vec<Item>,
    pub count: usize,
}

impl SearchResults {
    pub fn ids(&self) -> Vec<app_fs::ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }
}

/// Dropdown suggestion for the search box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub path: String,
    pub category: Option<FileCategory>,
}

fn name_matches(item: &Item, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle)
}

fn tag_matches(item: &Item, needle: &str) -> bool {
    item.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn relevance(item: &Item, needle: &str) -> u8 {
    if needle.is_empty() {
        return 0;
    }
    (if name_matches(item, needle) { 2 } else { 0 }) + u8::from(tag_matches(item, needle))
}

fn compare(a: &Item, b: &Item, key: SortKey, needle: &str) -> Ordering {
    match key {
        SortKey::Name => collate_names(&a.name, &b.name),
        SortKey::Size => b.size.cmp(&a.size),
        SortKey::Type => a.extension().unwrap_or_default().cmp(&b.extension().unwrap_or_default()),
        SortKey::Modified => b.modified_at.cmp(&a.modified_at),
        SortKey::Relevance => relevance(b, needle)
            .cmp(&relevance(a, needle))
            .then_with(|| collate_names(&a.name, &b.name)),
    }
}

/// Run the search pipeline over `items`
pub fn apply<Tz: TimeZone>(
    items: &[Item],
    scope: &Scope,
    query: &str,
    filters: &FilterState,
    sort_key: SortKey,
    now: &DateTime<Tz>,
) -> SearchResults {
    let needle = query.trim().to_lowercase();

    let mut results: Vec<Item> = items
        .iter()
        .filter(|item| match scope {
            Scope::Folder(folder) => item.is_in(folder),
            Scope::Everywhere => true,
        })
        .filter(|item| {
            needle.is_empty()
                || name_matches(item, &needle)
                || tag_matches(item, &needle)
                || item.path.to_lowercase().contains(&needle)
        })
        .filter(|item| filters.matches(item, now))
        .cloned()
        .collect();

    results.sort_by(|a, b| compare(a, b, sort_key, &needle));

    tracing::trace!(
        "Search {:?} in {:?}: {} results ({} filters)",
        query,
        scope,
        results.len(),
        filters.active_count()
    );

    SearchResults {
        count: results.len(),
        items: results,
    }
}

/// Items whose name or tags contain `query`, in collection order
pub fn suggestions(items: &[Item], query: &str, limit: usize) -> Vec<Suggestion> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    items
        .iter()
        .filter(|item| name_matches(item, &needle) || tag_matches(item, &needle))
        .take(limit)
        .map(|item| Suggestion {
            name: item.name.clone(),
            path: item.path.clone(),
            category: item.extension().and_then(|e| FileCategory::of_extension(&e)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const MB: u64 = 1_048_576;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 15, 0, 0).unwrap()
    }

    fn sample() -> Vec<Item> {
        let t = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap();
        vec![
            Item::file(1, "Project_Report.pdf", 2 * MB, "documents/work", t(30)).with_tags(["work", "urgent"]),
            Item::file(2, "vacation.jpg", 3 * MB, "pictures", t(10)).with_tags(["holiday"]),
            Item::file(3, "notes.txt", 1024, "", t(31)),
            Item::folder(4, "documents", "", t(1)),
            Item::file(5, "setup.exe", 600 * MB, "", t(20)).with_tags(["report-tool"]),
            Item::file(6, "README", 10, "", t(2)),
        ]
    }

    fn run(items: &[Item], query: &str, filters: &FilterState, key: SortKey) -> Vec<u64> {
        apply(items, &Scope::Everywhere, query, filters, key, &now())
            .items
            .iter()
            .map(|i| i.id.0)
            .collect()
    }

    #[test]
    fn test_size_scenario() {
        let items = vec![
            Item::file(1, "a.pdf", 2 * MB, "", now()),
            Item::file(2, "b.jpg", 600 * MB, "", now()),
        ];

        let mut filters = FilterState::new();
        filters.toggle(FilterChip::Size(SizeBucket::Tiny));
        assert!(run(&items, "", &filters, SortKey::Name).is_empty());

        filters.clear();
        filters.toggle(FilterChip::Size(SizeBucket::Small));
        assert_eq!(run(&items, "", &filters, SortKey::Name), vec![1]);
    }

    #[test]
    fn test_bucket_edges_inclusive() {
        assert!(SizeBucket::Tiny.contains_mb(1.0));
        assert!(SizeBucket::Small.contains_mb(1.0));
        assert!(!SizeBucket::Huge.contains_mb(1000.5));
    }

    #[test]
    fn test_no_filters_returns_scope() {
        let items = sample();
        let result = apply(&items, &Scope::Everywhere, "", &FilterState::new(), SortKey::Size, &now());
        assert_eq!(result.count, items.len());
        assert_eq!(result.items[0].id.0, 5);

        let root = apply(
            &items,
            &Scope::Folder(VirtualPath::new("/")),
            "",
            &FilterState::new(),
            SortKey::Name,
            &now(),
        );
        assert_eq!(root.names(), vec!["documents", "notes.txt", "README", "setup.exe"]);
    }

    #[test]
    fn test_toggle_on_off_restores_results() {
        let items = sample();
        let baseline = run(&items, "", &FilterState::new(), SortKey::Modified);

        let chips = [
            FilterChip::Type(FileCategory::Image),
            FilterChip::Size(SizeBucket::Huge),
            FilterChip::Date(DateBucket::Today),
            FilterChip::Tag("work".to_string()),
        ];
        for chip in chips {
            let mut filters = FilterState::new();
            filters.toggle(chip.clone());
            assert_ne!(run(&items, "", &filters, SortKey::Modified), baseline);
            filters.toggle(chip);
            assert!(filters.is_empty());
            assert_eq!(run(&items, "", &filters, SortKey::Modified), baseline);
        }
    }

    #[test]
    fn test_query_matches_name_tags_and_path() {
        let items = sample();
        assert_eq!(run(&items, "REPORT", &FilterState::new(), SortKey::Relevance), vec![1, 5]);
        assert_eq!(run(&items, "pictures", &FilterState::new(), SortKey::Name), vec![2]);
    }

    #[test]
    fn test_type_facet_needs_extension() {
        let mut filters = FilterState::new();
        filters.toggle(FilterChip::Type(FileCategory::Document));
        assert_eq!(run(&sample(), "", &filters, SortKey::Name), vec![3, 1]);
    }

    #[test]
    fn test_facets_and_values_or() {
        let mut filters = FilterState::new();
        filters.toggle(FilterChip::Type(FileCategory::Document));
        filters.toggle(FilterChip::Type(FileCategory::Image));
        filters.toggle(FilterChip::Tag("HOLI".to_string()));
        assert_eq!(run(&sample(), "", &filters, SortKey::Name), vec![2]);
        assert_eq!(filters.active_count(), 3);

        assert!(filters.remove(&FilterChip::Tag("HOLI".to_string())));
        assert!(!filters.remove(&FilterChip::Tag("HOLI".to_string())));
        assert_eq!(filters.chips().len(), 2);
    }

    #[test]
    fn test_date_buckets() {
        let now = now();
        let at = |y, m, d, h| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();

        assert!(DateBucket::Today.matches(at(2024, 3, 31, 0), &now));
        assert!(!DateBucket::Today.matches(at(2024, 3, 30, 23), &now));
        assert!(DateBucket::Week.matches(at(2024, 3, 24, 15), &now));
        assert!(!DateBucket::Week.matches(at(2024, 3, 24, 14), &now));
        // 31 March minus one month clamps to 29 February
        assert!(DateBucket::Month.matches(at(2024, 2, 29, 0), &now));
        assert!(!DateBucket::Month.matches(at(2024, 2, 28, 23), &now));
        assert!(DateBucket::Year.matches(at(2023, 3, 31, 0), &now));
        assert!(!DateBucket::Year.matches(at(2023, 3, 30, 12), &now));
    }

    #[test]
    fn test_year_back_from_leap_day() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap();
        let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();

        assert!(DateBucket::Year.matches(at(2023, 2, 28), &now));
        assert!(!DateBucket::Year.matches(at(2023, 2, 27), &now));
        assert!(DateBucket::Month.matches(at(2024, 1, 29), &now));
        assert!(!DateBucket::Month.matches(at(2024, 1, 28), &now));
    }

    #[test]
    fn test_today_uses_local_calendar() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = tokyo.with_ymd_and_hms(2024, 3, 31, 8, 0, 0).unwrap();
        // 2024-03-30 20:00 UTC is already 31 March in Tokyo
        assert!(DateBucket::Today.matches(Utc.with_ymd_and_hms(2024, 3, 30, 20, 0, 0).unwrap(), &now));
    }

    #[test]
    fn test_name_sort_is_stable_and_idempotent() {
        let mut items = sample();
        items.push(Item::file(7, "readme", 10, "", now()));
        let once = apply(&items, &Scope::Everywhere, "", &FilterState::new(), SortKey::Name, &now());
        let twice = apply(&once.items, &Scope::Everywhere, "", &FilterState::new(), SortKey::Name, &now());
        assert_eq!(once.ids(), twice.ids());
        assert_eq!(
            once.names(),
            vec!["documents", "notes.txt", "Project_Report.pdf", "README", "readme", "setup.exe", "vacation.jpg"]
        );
    }

    #[test]
    fn test_relevance_ties_by_name() {
        let items = vec![
            Item::file(1, "b report.txt", 1, "", now()),
            Item::file(2, "a report.txt", 1, "", now()),
            Item::file(3, "misc.txt", 1, "reports", now()),
        ];
        assert_eq!(run(&items, "report", &FilterState::new(), SortKey::Relevance), vec![2, 1, 3]);
    }

    #[test]
    fn test_type_sort() {
        let ids = run(&sample(), "", &FilterState::new(), SortKey::Type);
        // no extension first, then exe, jpg, pdf, txt
        assert_eq!(ids, vec![4, 6, 5, 2, 1, 3]);
    }

    #[test]
    fn test_suggestions() {
        let items = sample();
        let found = suggestions(&items, "report", 8);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].category, Some(FileCategory::Document));
        assert!(suggestions(&items, "  ", 8).is_empty());
        assert_eq!(suggestions(&items, "e", 1).len(), 1);
    }
}
