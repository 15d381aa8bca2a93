mod cdr_store;

pub use cdr_store::{CdrStore, CdrStoreError};
