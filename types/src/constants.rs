/// Maximum codename length accepted by the server
pub const MAX_CODENAME_LENGTH: usize = 32;

/// Maximum length of locale fields and other short labels
pub const MAX_LABEL_LENGTH: usize = 64;

/// Maximum length of server-issued hashes and URLs
pub const MAX_TEXT_LENGTH: usize = 1024;

/// Maximum size of a single framed response payload
pub const MAX_PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Maximum number of requests in one batch
pub const MAX_BATCH_REQUESTS: usize = 16;

/// Maximum number of list entries (items, currencies, badges) in one message
pub const MAX_LIST_ENTRIES: usize = 1024;

/// Number of tutorial states the server tracks
pub const MAX_TUTORIAL_STATES: usize = 16;
