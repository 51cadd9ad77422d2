use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::error::{CatalogError, StoreError};
use crate::models::{Course, CourseDetails, CourseFile, CourseMetadata};
use crate::store::{ContentStore, DirEntry, EntryKind, Listing};

pub const METADATA_FILE: &str = "metadata.json";

/// A slug is a single, non-blank path segment that cannot climb out of the root.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.trim().is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

/// Reads the course catalog out of a content store. Each immediate
/// subdirectory of `root` is one course.
#[derive(Clone)]
pub struct CourseRepository {
    store: Arc<dyn ContentStore>,
    root: String,
}

impl CourseRepository {
    pub fn new(store: Arc<dyn ContentStore>, root: impl Into<String>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    fn course_path(&self, slug: &str) -> String {
        format!("{}/{}", self.root, slug)
    }

    /// Lists every course with valid metadata. Courses whose metadata is
    /// missing, unreadable or malformed are skipped; only a missing or
    /// non-directory root fails the whole call.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        info!("Fetching courses from '{}'", self.root);

        let entries = match self.store.list_directory(&self.root).await {
            Ok(Listing::Directory(entries)) => entries,
            Ok(Listing::NotADirectory) => {
                error!("Catalog root '{}' is not a directory", self.root);
                return Err(CatalogError::InvalidCatalogStructure(self.root.clone()));
            }
            Err(StoreError::NotFound(_)) => {
                error!("Catalog root '{}' not found", self.root);
                return Err(CatalogError::CatalogRootMissing(self.root.clone()));
            }
            Err(e) => {
                error!("Failed to list catalog root '{}': {}", self.root, e);
                return Err(e.into());
            }
        };

        let fetches = entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Dir)
            .map(|entry| self.load_listed_course(entry));

        let courses: Vec<Course> = join_all(fetches).await.into_iter().flatten().collect();

        info!("Returning {} courses", courses.len());
        Ok(courses)
    }

    async fn load_listed_course(&self, entry: DirEntry) -> Option<Course> {
        let slug = entry.name;
        match self.fetch_metadata(&slug, &entry.path).await {
            Ok(metadata) => {
                debug!("Processed metadata for {}", slug);
                Some(Course { slug, metadata })
            }
            Err(CatalogError::CourseNotFound(_)) => {
                warn!("Skipping directory {}: {} not found", slug, METADATA_FILE);
                None
            }
            Err(e) => {
                warn!("Skipping directory {}: {}", slug, e);
                None
            }
        }
    }

    async fn fetch_metadata(&self, slug: &str, course_dir: &str) -> Result<CourseMetadata, CatalogError> {
        let path = format!("{}/{}", course_dir, METADATA_FILE);
        let text = match self.store.read_file_raw(&path).await {
            Ok(text) => text,
            Err(StoreError::NotFound(_)) => return Err(CatalogError::CourseNotFound(slug.to_string())),
            Err(e) => return Err(e.into()),
        };

        CourseMetadata::from_json(&text).map_err(|source| CatalogError::MalformedMetadata {
            slug: slug.to_string(),
            source,
        })
    }

    /// Loads one course's metadata and resource files. Unlike
    /// [`list_courses`](Self::list_courses), malformed metadata is an error here.
    pub async fn get_course_details(&self, slug: &str) -> Result<CourseDetails, CatalogError> {
        if !is_valid_slug(slug) {
            return Err(CatalogError::CourseNotFound(slug.to_string()));
        }
        info!("Fetching details for course '{}'", slug);

        let path = self.course_path(slug);
        let metadata = self.fetch_metadata(slug, &path).await.inspect_err(|e| {
            error!("Failed to load metadata for '{}': {}", slug, e);
        })?;

        let entries = match self.store.list_directory(&path).await {
            Ok(Listing::Directory(entries)) => entries,
            Ok(Listing::NotADirectory) => {
                warn!("Course path {} is not a directory", path);
                return Err(CatalogError::InvalidCourseStructure(slug.to_string()));
            }
            Err(StoreError::NotFound(_)) => {
                warn!("Course directory {} not found", path);
                return Err(CatalogError::CourseNotFound(slug.to_string()));
            }
            Err(e) => {
                error!("Failed to list course contents for '{}': {}", slug, e);
                return Err(e.into());
            }
        };

        let files: Vec<CourseFile> = entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File && entry.name != METADATA_FILE)
            .map(|entry| CourseFile {
                name: entry.name,
                url: entry.download_url,
                size: entry.size.unwrap_or(0),
            })
            .collect();

        info!("Found {} files for '{}'", files.len(), slug);
        Ok(CourseDetails { metadata, files })
    }
}
