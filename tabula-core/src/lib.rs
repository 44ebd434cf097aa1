mod as_value;
pub mod builder;
mod connection;
mod descriptor;
mod dialect;
mod driver;
mod entity;
mod error;
mod executor;
mod handler;
mod operations;
mod query;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use descriptor::*;
pub use dialect::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use handler::*;
pub use operations::*;
pub use query::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T, E = Error> = anyhow::Result<T, E>;
pub type Error = anyhow::Error;
