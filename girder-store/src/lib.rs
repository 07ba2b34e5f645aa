//! Connection pools for the backing stores girder services talk to.
//!
//! Both pools are constructed lazily: creating one never touches the
//! network, so services come up even when a store is briefly down and
//! readiness checks report the truth per request.

pub mod postgres;
pub mod redis;

pub use postgres::PostgresStore;
pub use redis::RedisStore;
