//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const COLLECTION_LIST_LIMIT: i64 = 100;
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 86_400;
pub const CAMPUS_API_TIMEOUT_SECS: u64 = 5;
/// Campus endpoint listing every known person, relative to the base URL.
pub const CAMPUS_DIRECTORY_PATH: &str = "/users";
pub const RATE_LIMIT_PURGE_SECS: u64 = 60;
pub const DEFAULT_INSTITUTION: &str = "UMC";
/// Stored when the campus record has no value for a required text column.
pub const PLACEHOLDER_VALUE: &str = "-";
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;
