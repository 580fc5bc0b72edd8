//! Guest (visitor) log entity

use chrono::{DateTime, NaiveDate, Utc};
use library_shared::PageMeta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestLog {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// NIM/NIDN, or the placeholder when the campus record has neither.
    pub identifier: String,
    pub institution: String,
    pub faculty: Option<String>,
    pub major: Option<String>,
    pub visit_date: DateTime<Utc>,
    /// Calendar day of `visit_date` in the library's offset; one check-in per email per day.
    pub visit_day: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGuestLog {
    pub name: String,
    pub email: String,
    pub identifier: String,
    pub institution: String,
    pub faculty: Option<String>,
    pub major: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub visit_day: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestPage {
    pub logs: Vec<GuestLog>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyCount {
    pub faculty: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorCount {
    pub major: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestStats {
    pub by_faculty: Vec<FacultyCount>,
    pub by_major: Vec<MajorCount>,
}
