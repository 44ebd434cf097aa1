use crate::{Connection, Dialect};

/// Backend implementation.
///
/// The dialect used to render backend specific statements is looked up from
/// [`Driver::NAME`], a driver can override [`Driver::dialect`] when its name
/// does not tell it apart.
pub trait Driver: Send + Sync {
    type Connection: Connection<Driver = Self>;

    /// Name of the backend, also the scheme of its connection urls.
    const NAME: &'static str;

    fn dialect(&self) -> Dialect {
        Dialect::from_driver_name(Self::NAME)
    }
}
