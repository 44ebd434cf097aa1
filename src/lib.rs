//! Renders parametrized CRUD statements from plain Rust structs.
//!
//! ```rust
//! use tabula::{Entity, builder};
//!
//! #[derive(Entity, Clone, Default)]
//! #[tabula(name = "Entities")]
//! #[allow(non_snake_case)]
//! struct Customer {
//!     #[tabula(key, name = "Id")]
//!     CustomerId: i64,
//!     #[tabula(name = "Name")]
//!     FullName: String,
//! }
//!
//! let customer = Customer { CustomerId: 0, FullName: "Alice".into() };
//! assert_eq!(
//!     builder::insert(&customer).unwrap().sql(),
//!     "INSERT INTO Entities (Name) VALUES (@FullName)"
//! );
//! ```
pub use tabula_core::*;
pub use tabula_macros::*;
