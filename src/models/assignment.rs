use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub due_date: String,
    pub course_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignmentRequest {
    pub title: String,
    pub due_date: String,
}
