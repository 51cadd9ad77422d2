//! Search, filtering and ordering over an already-fetched catalog.
//!
//! Everything here is pure: inputs are borrowed, never mutated, and equal
//! inputs always yield equal outputs.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};

use crate::models::{Course, CourseFile, CourseMetadata, Semester};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Code,
    Title,
    Level,
    Credits,
    Semester,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQuery {
    #[serde(default, rename = "q")]
    pub search_text: String,
    #[serde(default, rename = "department")]
    pub department_filter: Option<String>,
    #[serde(default, rename = "level")]
    pub level_filter: Option<u32>,
    #[serde(default, rename = "semester")]
    pub semester_filter: Option<Semester>,
    #[serde(default, rename = "credits")]
    pub credits_filter: Option<u32>,
    #[serde(default, rename = "sort")]
    pub sort_key: Option<SortKey>,
    #[serde(default, rename = "order")]
    pub sort_order: SortOrder,
}

impl CourseQuery {
    /// True when the query neither filters nor reorders.
    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty()
            && self.department_filter.is_none()
            && self.level_filter.is_none()
            && self.semester_filter.is_none()
            && self.credits_filter.is_none()
            && self.sort_key.is_none()
    }

    fn matches_search(&self, metadata: &CourseMetadata) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        [&metadata.title, &metadata.code, &metadata.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_filters(&self, metadata: &CourseMetadata) -> bool {
        if let Some(dept) = &self.department_filter {
            if !metadata.has_department(dept) {
                return false;
            }
        }
        if self.level_filter.is_some() && metadata.level != self.level_filter {
            return false;
        }
        if self.credits_filter.is_some() && metadata.credits != self.credits_filter {
            return false;
        }
        if self.semester_filter.is_some() && metadata.semester != self.semester_filter {
            return false;
        }
        true
    }
}

/// Produces the display list for `query`. The sort is stable, so courses
/// with equal keys keep their input order.
pub fn derive_view(courses: &[Course], query: &CourseQuery) -> Vec<Course> {
    let mut view: Vec<Course> = courses
        .iter()
        .filter(|c| query.matches_search(&c.metadata) && query.matches_filters(&c.metadata))
        .cloned()
        .collect();

    if let Some(key) = query.sort_key {
        let text = TextOrder::new();
        view.sort_by(|a, b| query.sort_order.apply(compare_by(&text, key, &a.metadata, &b.metadata)));
    }
    view
}

fn compare_by(text: &TextOrder, key: SortKey, a: &CourseMetadata, b: &CourseMetadata) -> Ordering {
    match key {
        SortKey::Code => text.compare(&a.code, &b.code),
        SortKey::Title => text.compare(&a.title, &b.title),
        // `None` orders before `Some`, so missing values lead in ascending order.
        SortKey::Level => a.level.cmp(&b.level),
        SortKey::Credits => a.credits.cmp(&b.credits),
        SortKey::Semester => a.semester.cmp(&b.semester),
    }
}

/// Case-insensitive, accent-aware string ordering using the root-locale
/// collation at secondary strength.
struct TextOrder {
    collator: Option<Collator>,
}

impl TextOrder {
    fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        let collator = Collator::try_new(&Default::default(), options)
            .inspect_err(|e| tracing::warn!("collator unavailable, ordering by case-folded code points: {}", e))
            .ok();
        Self { collator }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub levels: Vec<u32>,
    pub semesters: Vec<Semester>,
}

/// Distinct values present in the catalog, for populating filter controls.
pub fn filter_options(courses: &[Course]) -> FilterOptions {
    let departments: BTreeSet<&String> = courses
        .iter()
        .filter_map(|c| c.metadata.departments.as_ref())
        .flatten()
        .collect();
    let levels: BTreeSet<u32> = courses.iter().filter_map(|c| c.metadata.level).collect();

    FilterOptions {
        departments: departments.into_iter().cloned().collect(),
        levels: levels.into_iter().collect(),
        semesters: vec![Semester::First, Semester::Second],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSortKey {
    Name,
    Size,
}

pub fn sort_files(files: &[CourseFile], key: FileSortKey, order: SortOrder) -> Vec<CourseFile> {
    let text = TextOrder::new();
    let mut sorted = files.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match key {
            FileSortKey::Name => text.compare(&a.name, &b.name),
            FileSortKey::Size => a.size.cmp(&b.size),
        };
        order.apply(ordering)
    });
    sorted
}
