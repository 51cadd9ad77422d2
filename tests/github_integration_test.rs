use std::sync::Arc;

use coursehub::{
    config::DEFAULT_COURSES_ROOT,
    repository::CourseRepository,
    store::{ContentStore, GitHubConfig, GitHubContentStore, Listing},
};

fn live_repository() -> (Arc<GitHubContentStore>, CourseRepository) {
    dotenvy::dotenv().ok();

    let config = GitHubConfig::new_from_env().expect("Failed to load GitHub config");
    let store = Arc::new(GitHubContentStore::new(config).expect("Failed to create GitHub client"));
    let root = std::env::var("COURSES_ROOT").unwrap_or_else(|_| DEFAULT_COURSES_ROOT.to_string());
    (store.clone(), CourseRepository::new(store, root))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_list_courses_from_github() {
    let (_, repository) = live_repository();

    let courses = repository.list_courses().await.expect("Failed to list courses");
    println!("Fetched {} courses from GitHub", courses.len());

    for course in &courses {
        assert!(!course.metadata.title.is_empty(), "Empty title for {}", course.slug);
        assert!(!course.metadata.code.is_empty(), "Empty code for {}", course.slug);
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_course_details_from_github() {
    let (_, repository) = live_repository();

    let courses = repository.list_courses().await.expect("Failed to list courses");
    let Some(first) = courses.first() else {
        println!("No courses in repository, nothing to check");
        return;
    };

    let details = repository
        .get_course_details(&first.slug)
        .await
        .expect("Failed to fetch course details");
    assert_eq!(details.metadata.code, first.metadata.code);
    assert!(details.files.iter().all(|f| f.name != "metadata.json"));
    println!("✓ {} has {} files", first.slug, details.files.len());
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_missing_path_is_not_found() {
    let (store, _) = live_repository();

    let result = store.list_directory("this/path/should/not/exist").await;
    assert!(
        matches!(result, Err(coursehub::error::StoreError::NotFound(_))),
        "unexpected result: {:?}",
        result.map(|listing| matches!(listing, Listing::Directory(_)))
    );
}
