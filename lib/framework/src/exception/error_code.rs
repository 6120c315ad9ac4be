pub const BAD_REQUEST: &str = "BAD_REQUEST";
pub const FORBIDDEN: &str = "FORBIDDEN";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const STORE_ERROR: &str = "STORE_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
