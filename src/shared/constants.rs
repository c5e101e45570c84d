/// Length of a generated join code
pub const JOIN_CODE_LENGTH: usize = 6;

/// Characters a join code is drawn from
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Bounded attempts for join-code generation and room creation
pub const JOIN_CODE_MAX_ATTEMPTS: usize = 3;

/// Length of the timestamp suffix appended when probing keeps colliding
pub const JOIN_CODE_SUFFIX_LENGTH: usize = 4;

/// Display name used when an author's profile cannot be resolved
pub const ANONYMOUS_USERNAME: &str = "Anonymous";
