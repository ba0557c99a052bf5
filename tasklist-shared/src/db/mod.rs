/// Database layer for Tasklist
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded schema migrations
///
/// Models and their queries live in [`crate::models`]; the trait-based
/// access used by services lives in [`crate::store`].

pub mod migrations;
pub mod pool;
