mod postgres_cdr_store;

pub use postgres_cdr_store::PgCdrStore;
