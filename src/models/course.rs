use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
}

/// A course as served over HTTP: `students` holds student ids, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub students: Vec<i64>,
}

impl Course {
    pub fn from_row(row: CourseRow, students: Vec<i64>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            students,
        }
    }
}

/// Body of `POST` and `PUT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    pub name: String,
    #[serde(default)]
    pub students: Vec<i64>,
}

/// Body of `PATCH`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub students: Option<Vec<i64>>,
}

/// Exact-match filters accepted by the list endpoint. Empty values mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
}

impl CourseQuery {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}
