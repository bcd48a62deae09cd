use serde::Deserialize;

/// Role a user holds within a course. One enrollment row exists per
/// (course, user, role) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "instructor" => Some(Role::Instructor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

/// Body of `POST /api/courses/{id}/add/`. The role arrives as a free-form
/// `type` field and is validated after the user lookup, which keeps the
/// error ordering of the endpoint stable.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub role: String,
}
