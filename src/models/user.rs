use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Course;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub netid: String,
}

/// Full projection of a user with the courses they belong to in either
/// role. Nested courses are plain row structs without rosters.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub id: i64,
    pub name: String,
    pub netid: String,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub netid: String,
}
