use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "123user", "-user", "user-name", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();

    /// Regex for validating a join code as entered by the user
    /// Uppercase alphanumeric, with an optional timestamp-suffixed tail
    pub static ref JOIN_CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9]{6,12}$").unwrap();
}
