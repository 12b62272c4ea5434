// Course and student records

pub mod course;
pub mod student;

pub use course::*;
pub use student::*;
