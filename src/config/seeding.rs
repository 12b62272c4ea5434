use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::{CreateCourse, CreateStudent};
use crate::services::{CourseService, StudentService};

const DEMO_STUDENTS: &[(&str, (i32, u32, u32))] = &[
    ("Anna Smirnova", (2002, 4, 11)),
    ("Boris Ivanov", (2001, 9, 23)),
    ("Vera Kuznetsova", (2003, 1, 5)),
    ("Grigory Popov", (2000, 12, 30)),
];

const DEMO_COURSES: &[(&str, &[usize])] = &[
    ("Mathematics", &[0, 1, 2]),
    ("Biology", &[1, 3]),
    ("English", &[]),
];

pub struct DatabaseSeeder {
    pool: SqlitePool,
    max_students_per_course: usize,
}

impl DatabaseSeeder {
    pub fn new(pool: SqlitePool, max_students_per_course: usize) -> Self {
        Self {
            pool,
            max_students_per_course,
        }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        let student_ids = self.seed_students().await?;
        self.seed_courses(&student_ids).await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    /// Returns the ids of the demo students, or of existing students when the table was not empty.
    async fn seed_students(&self) -> Result<Vec<i64>> {
        let student_service = StudentService::new(self.pool.clone());

        if student_service.count_students().await? > 0 {
            tracing::debug!("Students already present, skipping");
            let existing = student_service.list_students().await?;
            return Ok(existing.into_iter().map(|s| s.id).collect());
        }

        let mut ids = Vec::with_capacity(DEMO_STUDENTS.len());
        for (name, (year, month, day)) in DEMO_STUDENTS {
            let student = student_service
                .create_student(CreateStudent {
                    name: name.to_string(),
                    birth_date: NaiveDate::from_ymd_opt(*year, *month, *day),
                })
                .await?;
            ids.push(student.id);
        }

        tracing::info!("Created {} demo students", ids.len());
        Ok(ids)
    }

    async fn seed_courses(&self, student_ids: &[i64]) -> Result<()> {
        let course_service = CourseService::new(self.pool.clone(), self.max_students_per_course);

        if course_service.count_courses().await? > 0 {
            tracing::debug!("Courses already present, skipping");
            return Ok(());
        }

        for (name, members) in DEMO_COURSES {
            let students = members
                .iter()
                .filter_map(|index| student_ids.get(*index).copied())
                .take(self.max_students_per_course)
                .collect();

            course_service
                .create_course(CreateCourse {
                    name: name.to_string(),
                    students,
                })
                .await?;
        }

        tracing::info!("Created {} demo courses", DEMO_COURSES.len());
        Ok(())
    }
}
