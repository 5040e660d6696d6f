// Content hash length in hex characters
pub const HASH_LENGTH: usize = 8;

// Postgres truncates identifiers longer than NAMEDATALEN - 1 bytes
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

// Generated object name suffixes
pub const INDEX_SUFFIX: &str = "idx";
pub const UNIQUE_SUFFIX: &str = "key";
pub const CHECK_SUFFIX: &str = "chk";
pub const FOREIGN_KEY_SUFFIX: &str = "fkey";
pub const TRIGGER_SUFFIX: &str = "trg";
pub const PRIMARY_KEY_SUFFIX: &str = "pkey";

pub const GENERATED_NAME_SUFFIXES: [&str; 6] = [
    INDEX_SUFFIX,
    UNIQUE_SUFFIX,
    CHECK_SUFFIX,
    FOREIGN_KEY_SUFFIX,
    TRIGGER_SUFFIX,
    PRIMARY_KEY_SUFFIX,
];

// Configuration file name
pub const CONFIG_FILENAME: &str = "pgdelta.yaml";

// Times the rename oracle is consulted; a table rename can expose column candidates
pub const MAX_ORACLE_ROUNDS: usize = 2;

// Schema that always exists and is never created or dropped
pub const DEFAULT_SCHEMA: &str = "public";
