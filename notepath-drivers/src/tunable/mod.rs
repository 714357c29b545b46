//! Tunable value stores

pub mod table;

pub use table::{TunableEntry, TunableError, TunableTable, MAX_KEY_LEN, MAX_TUNABLES};
