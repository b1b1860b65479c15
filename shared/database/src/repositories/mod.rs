//! Repository module for database CRUD operations
//!
//! Typed access to the SKU record table and the bucket counter table.

pub mod sku;
pub mod counter;

pub use sku::SkuRepository;
pub use counter::CounterRepository;
