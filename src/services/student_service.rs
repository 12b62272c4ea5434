use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::{CreateStudent, Student};

#[derive(Clone)]
pub struct StudentService {
    db: SqlitePool,
}

impl StudentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_student(&self, student_data: CreateStudent) -> Result<Student, AppError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, birth_date)
            VALUES (?, ?)
            RETURNING id, name, birth_date
            "#,
        )
        .bind(student_data.name)
        .bind(student_data.birth_date)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!("Created student {}", student.id);
        Ok(student)
    }

    pub async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, birth_date FROM students WHERE id = ?",
        )
        .bind(student_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(student)
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, name, birth_date FROM students ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(students)
    }

    pub async fn count_students(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}
