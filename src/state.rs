use std::time::Duration;

use crate::repository::CourseRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: CourseRepository,
    /// How long clients and proxies may reuse a successful response.
    pub revalidate: Duration,
}
