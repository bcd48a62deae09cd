use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{Assignment, User};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Full projection of a course with its roster and assignments. Nested
/// users and assignments are plain row structs, so serialization cannot
/// cycle back into courses.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub students: Vec<User>,
    pub instructors: Vec<User>,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourseRequest {
    pub code: String,
    pub name: String,
}
