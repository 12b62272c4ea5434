#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Once;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

use students_api::api::routes::create_routes;
use students_api::config::{run_migrations, AppConfig, DatabaseConfig};
use students_api::models::{Course, CreateCourse, CreateStudent, Student};
use students_api::services::{CourseService, StudentService};

static INIT: Once = Once::new();

/// Backing directory for the shared-commit database. It has a fixed name
/// under the system temp dir and is wiped on first use, so each run starts
/// from an empty database and at most one directory is left behind.
static SHARED_DATABASE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    let dir = std::env::temp_dir().join("students-api-shared-tests");
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("Failed to clear shared database directory");
    }
    std::fs::create_dir_all(&dir).expect("Failed to create shared database directory");
    dir
});

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Router plus the pool it runs on.
pub struct TestApp {
    pub pool: SqlitePool,
    pub config: AppConfig,
    router: Router,
}

impl TestApp {
    /// Fresh in-memory database; nothing is visible to other tests.
    pub async fn isolated() -> Self {
        Self::isolated_with_config(AppConfig::default()).await
    }

    pub async fn isolated_with_config(config: AppConfig) -> Self {
        Self::start(DatabaseConfig::in_memory(), config).await
    }

    /// Database file shared by every test in the binary. Committed rows stay
    /// visible to later tests, so callers must run under `#[serial]`.
    pub async fn shared() -> Self {
        let path = SHARED_DATABASE_DIR.join("courses.db");
        Self::start(DatabaseConfig::file(&path), AppConfig::default()).await
    }

    async fn start(database: DatabaseConfig, config: AppConfig) -> Self {
        init_test_logging();

        let pool = database
            .create_pool()
            .await
            .expect("Failed to connect to test database");
        run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let router = create_routes(pool.clone(), &config);

        Self {
            pool,
            config,
            router,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient {
            router: self.router.clone(),
        }
    }

    pub fn course_factory(&self) -> CourseFactory {
        CourseFactory {
            service: CourseService::new(self.pool.clone(), self.config.max_students_per_course),
        }
    }

    pub fn student_factory(&self) -> StudentFactory {
        StudentFactory {
            service: StudentService::new(self.pool.clone()),
        }
    }
}

/// In-process HTTP client driving the full router, middleware included.
#[derive(Clone)]
pub struct ApiClient {
    router: Router,
}

impl ApiClient {
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Sends a raw body, for malformed payload tests.
    pub async fn post_raw(&self, uri: &str, body: &'static str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap();

        self.dispatch(request).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(body_data) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body_data.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "response body is not JSON ({}): {:?}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn course(&self) -> Course {
        serde_json::from_value(self.json()).expect("body is not a course")
    }

    pub fn courses(&self) -> Vec<Course> {
        serde_json::from_value(self.json()).expect("body is not a course list")
    }
}

/// Inserts courses straight through the service layer, bypassing HTTP.
pub struct CourseFactory {
    service: CourseService,
}

impl CourseFactory {
    pub async fn create(&self) -> Course {
        self.create_named(&Self::fake_name()).await
    }

    pub async fn create_named(&self, name: &str) -> Course {
        self.insert(name, Vec::new()).await
    }

    pub async fn create_with_students(&self, name: &str, students: &[Student]) -> Course {
        self.insert(name, students.iter().map(|s| s.id).collect())
            .await
    }

    pub async fn create_batch(&self, quantity: usize) -> Vec<Course> {
        let mut courses = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            courses.push(self.create().await);
        }
        courses
    }

    async fn insert(&self, name: &str, students: Vec<i64>) -> Course {
        self.service
            .create_course(CreateCourse {
                name: name.to_string(),
                students,
            })
            .await
            .expect("Failed to create course")
    }

    fn fake_name() -> String {
        let word: String = Word().fake();
        format!("{} {}", word, (100..1000).fake::<u32>())
    }
}

pub struct StudentFactory {
    service: StudentService,
}

impl StudentFactory {
    pub async fn create(&self) -> Student {
        let birth_date = NaiveDate::from_ymd_opt(
            (1995..2008).fake::<i32>(),
            (1..13).fake::<u32>(),
            (1..29).fake::<u32>(),
        );

        self.service
            .create_student(CreateStudent {
                name: Name().fake(),
                birth_date,
            })
            .await
            .expect("Failed to create student")
    }

    pub async fn create_batch(&self, quantity: usize) -> Vec<Student> {
        let mut students = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            students.push(self.create().await);
        }
        students
    }
}
