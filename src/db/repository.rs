use sqlx::SqlitePool;

use crate::models::{
    Assignment, Course, CourseDetail, NewAssignmentRequest, NewCourseRequest, NewUserRequest,
    Role, User, UserDetail,
};

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, code, name FROM courses ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, code, name FROM courses WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course(
    db: &SqlitePool,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = sqlx::query("INSERT INTO courses (code, name) VALUES (?1, ?2)")
        .bind(&req.code)
        .bind(&req.name)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(Course {
        id,
        code: req.code,
        name: req.name,
    })
}

/// Removes a course together with its enrollments and assignments in one
/// transaction. Children go first so the foreign keys stay satisfied.
pub async fn delete_course(db: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM enrollments WHERE course_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM assignments WHERE course_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

pub async fn fetch_roster(
    db: &SqlitePool,
    course_id: i64,
    role: Role,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.netid
        FROM users u
        JOIN enrollments e ON e.user_id = u.id
        WHERE e.course_id = ?1 AND e.role = ?2
        ORDER BY u.id
        "#,
    )
    .bind(course_id)
    .bind(role.as_str())
    .fetch_all(db)
    .await
}

pub async fn fetch_course_assignments(
    db: &SqlitePool,
    course_id: i64,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        "SELECT id, title, due_date, course_id FROM assignments WHERE course_id = ?1 ORDER BY id",
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn load_course_detail(
    db: &SqlitePool,
    course: Course,
) -> Result<CourseDetail, sqlx::Error> {
    let students = fetch_roster(db, course.id, Role::Student).await?;
    let instructors = fetch_roster(db, course.id, Role::Instructor).await?;
    let assignments = fetch_course_assignments(db, course.id).await?;

    Ok(CourseDetail {
        id: course.id,
        code: course.code,
        name: course.name,
        students,
        instructors,
        assignments,
    })
}

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, sqlx::Error> {
    let id = sqlx::query("INSERT INTO users (name, netid) VALUES (?1, ?2)")
        .bind(&req.name)
        .bind(&req.netid)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(User {
        id,
        name: req.name,
        netid: req.netid,
    })
}

pub async fn find_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, netid FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Courses the user belongs to in any role, deduplicated when they hold
/// both roles in the same course.
pub async fn fetch_user_courses(db: &SqlitePool, user_id: i64) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT DISTINCT c.id, c.code, c.name
        FROM courses c
        JOIN enrollments e ON e.course_id = c.id
        WHERE e.user_id = ?1
        ORDER BY c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn load_user_detail(db: &SqlitePool, user: User) -> Result<UserDetail, sqlx::Error> {
    let courses = fetch_user_courses(db, user.id).await?;

    Ok(UserDetail {
        id: user.id,
        name: user.name,
        netid: user.netid,
        courses,
    })
}

/// Re-enrolling an existing (user, role) pair is a no-op rather than a
/// duplicate row.
pub async fn enroll_user(
    db: &SqlitePool,
    course_id: i64,
    user_id: i64,
    role: Role,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO enrollments (course_id, user_id, role) VALUES (?1, ?2, ?3)")
        .bind(course_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(db)
        .await?;

    Ok(())
}

pub async fn insert_assignment(
    db: &SqlitePool,
    course_id: i64,
    req: NewAssignmentRequest,
) -> Result<Assignment, sqlx::Error> {
    let id = sqlx::query("INSERT INTO assignments (title, due_date, course_id) VALUES (?1, ?2, ?3)")
        .bind(&req.title)
        .bind(&req.due_date)
        .bind(course_id)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(Assignment {
        id,
        title: req.title,
        due_date: req.due_date,
        course_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        crate::db::MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    #[tokio::test]
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;

        let req = NewCourseRequest {
            code: "CS 1998".to_string(),
            name: "Intro to Backend Development".to_string(),
        };

        let course = insert_course(&pool, req).await.expect("Failed to insert course");
        assert_eq!(course.code, "CS 1998");

        let courses = fetch_courses(&pool).await.expect("Failed to fetch courses");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, course.id);

        let found = find_course_by_id(&pool, course.id)
            .await
            .expect("Failed to look up course")
            .expect("Course not found");
        assert_eq!(found.name, "Intro to Backend Development");
    }

    #[tokio::test]
    async fn test_roster_split_by_role() {
        let pool = setup_test_db().await;

        let course = insert_course(
            &pool,
            NewCourseRequest {
                code: "CS 1998".to_string(),
                name: "Intro to Backend Development".to_string(),
            },
        )
        .await
        .expect("Failed to insert course");

        let student = insert_user(
            &pool,
            NewUserRequest {
                name: "Alicia Wang".to_string(),
                netid: "aw123".to_string(),
            },
        )
        .await
        .expect("Failed to insert user");

        let instructor = insert_user(
            &pool,
            NewUserRequest {
                name: "Conner Swenberg".to_string(),
                netid: "cs999".to_string(),
            },
        )
        .await
        .expect("Failed to insert user");

        enroll_user(&pool, course.id, student.id, Role::Student)
            .await
            .expect("Failed to enroll student");
        enroll_user(&pool, course.id, instructor.id, Role::Instructor)
            .await
            .expect("Failed to enroll instructor");

        let students = fetch_roster(&pool, course.id, Role::Student)
            .await
            .expect("Failed to fetch students");
        let instructors = fetch_roster(&pool, course.id, Role::Instructor)
            .await
            .expect("Failed to fetch instructors");

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, student.id);
        assert_eq!(instructors.len(), 1);
        assert_eq!(instructors[0].id, instructor.id);
    }

    #[tokio::test]
    async fn test_enroll_twice_is_idempotent() {
        let pool = setup_test_db().await;

        let course = insert_course(
            &pool,
            NewCourseRequest {
                code: "CS 2110".to_string(),
                name: "OO Programming and Data Structures".to_string(),
            },
        )
        .await
        .expect("Failed to insert course");

        let user = insert_user(
            &pool,
            NewUserRequest {
                name: "Alicia Wang".to_string(),
                netid: "aw123".to_string(),
            },
        )
        .await
        .expect("Failed to insert user");

        enroll_user(&pool, course.id, user.id, Role::Student)
            .await
            .expect("Failed to enroll");
        enroll_user(&pool, course.id, user.id, Role::Student)
            .await
            .expect("Failed to re-enroll");

        let students = fetch_roster(&pool, course.id, Role::Student)
            .await
            .expect("Failed to fetch students");
        assert_eq!(students.len(), 1);
    }

    #[tokio::test]
    async fn test_user_courses_deduplicated_across_roles() {
        let pool = setup_test_db().await;

        let course = insert_course(
            &pool,
            NewCourseRequest {
                code: "CS 1998".to_string(),
                name: "Intro to Backend Development".to_string(),
            },
        )
        .await
        .expect("Failed to insert course");

        let user = insert_user(
            &pool,
            NewUserRequest {
                name: "Conner Swenberg".to_string(),
                netid: "cs999".to_string(),
            },
        )
        .await
        .expect("Failed to insert user");

        enroll_user(&pool, course.id, user.id, Role::Student)
            .await
            .expect("Failed to enroll as student");
        enroll_user(&pool, course.id, user.id, Role::Instructor)
            .await
            .expect("Failed to enroll as instructor");

        let courses = fetch_user_courses(&pool, user.id)
            .await
            .expect("Failed to fetch user courses");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, course.id);
    }

    #[tokio::test]
    async fn test_delete_course_removes_children() {
        let pool = setup_test_db().await;

        let course = insert_course(
            &pool,
            NewCourseRequest {
                code: "CS 1998".to_string(),
                name: "Intro to Backend Development".to_string(),
            },
        )
        .await
        .expect("Failed to insert course");

        let user = insert_user(
            &pool,
            NewUserRequest {
                name: "Alicia Wang".to_string(),
                netid: "aw123".to_string(),
            },
        )
        .await
        .expect("Failed to insert user");

        enroll_user(&pool, course.id, user.id, Role::Student)
            .await
            .expect("Failed to enroll");
        insert_assignment(
            &pool,
            course.id,
            NewAssignmentRequest {
                title: "PA4".to_string(),
                due_date: "2026-11-05".to_string(),
            },
        )
        .await
        .expect("Failed to insert assignment");

        delete_course(&pool, course.id)
            .await
            .expect("Failed to delete course");

        assert!(find_course_by_id(&pool, course.id)
            .await
            .expect("Failed to look up course")
            .is_none());
        let assignments = fetch_course_assignments(&pool, course.id)
            .await
            .expect("Failed to fetch assignments");
        assert!(assignments.is_empty());
        let courses = fetch_user_courses(&pool, user.id)
            .await
            .expect("Failed to fetch user courses");
        assert!(courses.is_empty());
    }

    #[tokio::test]
    async fn test_insert_assignment_links_course() {
        let pool = setup_test_db().await;

        let course = insert_course(
            &pool,
            NewCourseRequest {
                code: "CS 1998".to_string(),
                name: "Intro to Backend Development".to_string(),
            },
        )
        .await
        .expect("Failed to insert course");

        let assignment = insert_assignment(
            &pool,
            course.id,
            NewAssignmentRequest {
                title: "PA4".to_string(),
                due_date: "2026-11-05".to_string(),
            },
        )
        .await
        .expect("Failed to insert assignment");

        assert_eq!(assignment.course_id, course.id);

        let assignments = fetch_course_assignments(&pool, course.id)
            .await
            .expect("Failed to fetch assignments");
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].title, "PA4");
    }
}
