// API routes and handlers

pub mod courses;
pub mod health;
pub mod middleware;
pub mod routes;
