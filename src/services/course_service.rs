use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{Course, CourseQuery, CourseRow, CreateCourse, UpdateCourse};

#[derive(Clone)]
pub struct CourseService {
    db: SqlitePool,
    max_students_per_course: usize,
}

impl CourseService {
    pub fn new(db: SqlitePool, max_students_per_course: usize) -> Self {
        Self {
            db,
            max_students_per_course,
        }
    }

    pub async fn list_courses(&self, query: &CourseQuery) -> Result<Vec<Course>, AppError> {
        let mut conn = self.db.acquire().await?;
        query_courses(&mut conn, query).await
    }

    pub async fn get_course(&self, course_id: i64) -> Result<Course, AppError> {
        let mut conn = self.db.acquire().await?;
        fetch_course(&mut conn, course_id).await
    }

    pub async fn create_course(&self, request: CreateCourse) -> Result<Course, AppError> {
        let name = validate_name(&request.name)?;
        let students = self.normalize_students(request.students)?;

        // First statement must be a write: a deferred transaction that reads
        // first gets SQLITE_BUSY on upgrade without waiting on the busy timeout.
        let mut tx = self.db.begin().await?;
        let row = sqlx::query_as::<_, CourseRow>(
            "INSERT INTO courses (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        ensure_students_exist(&mut tx, &students).await?;
        replace_students(&mut tx, row.id, &students).await?;
        tx.commit().await?;

        tracing::info!("Created course {} with {} students", row.id, students.len());
        Ok(Course::from_row(row, students))
    }

    /// Partial update: only the fields present in `request` change.
    pub async fn update_course(&self, course_id: i64, request: UpdateCourse) -> Result<Course, AppError> {
        let name = request.name.as_deref().map(validate_name).transpose()?;
        let students = request
            .students
            .map(|ids| self.normalize_students(ids))
            .transpose()?;

        // The first statement is a write, see `create_course`. SQLite counts
        // matched rows, so an unchanged name still reports one row.
        let mut tx = self.db.begin().await?;
        let result = sqlx::query("UPDATE courses SET name = COALESCE(?, name) WHERE id = ?")
            .bind(name)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CourseNotFound(course_id));
        }

        if let Some(students) = &students {
            ensure_students_exist(&mut tx, students).await?;
            replace_students(&mut tx, course_id, students).await?;
        }

        let course = fetch_course(&mut tx, course_id).await?;
        tx.commit().await?;

        tracing::info!("Updated course {}", course_id);
        Ok(course)
    }

    /// Full update: name and the whole student set are overwritten.
    pub async fn replace_course(&self, course_id: i64, request: CreateCourse) -> Result<Course, AppError> {
        self.update_course(
            course_id,
            UpdateCourse {
                name: Some(request.name),
                students: Some(request.students),
            },
        )
        .await
    }

    pub async fn delete_course(&self, course_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(course_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CourseNotFound(course_id));
        }

        tracing::info!("Deleted course {}", course_id);
        Ok(())
    }

    pub async fn count_courses(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }

    fn normalize_students(&self, mut ids: Vec<i64>) -> Result<Vec<i64>, AppError> {
        ids.sort_unstable();
        ids.dedup();

        if ids.len() > self.max_students_per_course {
            return Err(AppError::TooManyStudents {
                limit: self.max_students_per_course,
                requested: ids.len(),
            });
        }

        Ok(ids)
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::EmptyName);
    }
    Ok(name.to_string())
}

/// `students` must be sorted and free of duplicates.
async fn ensure_students_exist(conn: &mut SqliteConnection, students: &[i64]) -> Result<(), AppError> {
    if students.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM students WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in students {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: Vec<i64> = builder.build_query_scalar().fetch_all(&mut *conn).await?;
    let missing: Vec<i64> = students
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();

    if !missing.is_empty() {
        return Err(AppError::UnknownStudents(missing));
    }

    Ok(())
}

async fn replace_students(conn: &mut SqliteConnection, course_id: i64, students: &[i64]) -> Result<(), AppError> {
    sqlx::query("DELETE FROM course_students WHERE course_id = ?")
        .bind(course_id)
        .execute(&mut *conn)
        .await?;

    if students.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO course_students (course_id, student_id) ");
    builder.push_values(students, |mut row, student_id| {
        row.push_bind(course_id).push_bind(*student_id);
    });
    builder.build().execute(&mut *conn).await?;

    Ok(())
}

async fn fetch_course(conn: &mut SqliteConnection, course_id: i64) -> Result<Course, AppError> {
    let mut courses = query_courses(conn, &CourseQuery::by_id(course_id)).await?;
    courses.pop().ok_or(AppError::CourseNotFound(course_id))
}

/// One row per (course, student) pair, grouped back into courses. Only the
/// filters are bound, so the statement size does not grow with the result.
async fn query_courses(conn: &mut SqliteConnection, query: &CourseQuery) -> Result<Vec<Course>, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT c.id, c.name, cs.student_id FROM courses c \
         LEFT JOIN course_students cs ON cs.course_id = c.id WHERE 1 = 1",
    );

    if let Some(id) = query.id {
        builder.push(" AND c.id = ").push_bind(id);
    }
    if let Some(name) = &query.name {
        builder.push(" AND c.name = ").push_bind(name.clone());
    }
    builder.push(" ORDER BY c.id, cs.student_id");

    let rows: Vec<(i64, String, Option<i64>)> =
        builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut courses: Vec<Course> = Vec::new();
    for (id, name, student_id) in rows {
        if let Some(course) = courses.last_mut().filter(|course| course.id == id) {
            course.students.extend(student_id);
            continue;
        }
        courses.push(Course {
            id,
            name,
            students: student_id.into_iter().collect(),
        });
    }

    Ok(courses)
}
