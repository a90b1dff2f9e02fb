//! Hard caps on operator input. The combinatorial core grows as
//! `categories^children`, so these are checked before anything is enumerated.

/// Maximum beds (basic + extra) in a single setup.
pub const MAX_BEDS_PER_SETUP: u32 = 12;

/// Maximum bed setups on one room type.
pub const MAX_SETUPS_PER_ROOM: usize = 16;

/// Maximum categories in a catalog.
pub const MAX_CATEGORIES: usize = 16;

/// Maximum rules a single regeneration may produce for one room type.
pub const MAX_RULES_PER_ROOM_TYPE: u64 = 20_000;

/// Maximum length of setup, room type, matrix and context ids.
pub const MAX_ID_LEN: usize = 128;

/// Maximum length of labels and notes.
pub const MAX_LABEL_LEN: usize = 1024;
