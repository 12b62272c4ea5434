pub mod app;
pub mod database;
pub mod seeding;

pub use app::{AppConfig, DEFAULT_MAX_STUDENTS_PER_COURSE};
pub use database::{run_migrations, DatabaseConfig};
pub use seeding::DatabaseSeeder;
