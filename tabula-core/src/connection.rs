use crate::{Executor, Result};
use std::future::Future;

pub trait Connection: Executor {
    /// Open a connection to the given url, its scheme names the driver.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;
}
