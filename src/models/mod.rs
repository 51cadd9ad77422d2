pub mod course;

pub use course::{Course, CourseDetails, CourseFile, CourseMetadata, Semester};
