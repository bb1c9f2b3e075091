use std::fmt::{self, Debug, Display, Formatter};

/// Defines the requirements for holders of user detail. The `Display` implementation is used as
/// the identity in transfer records.
pub trait UserDetail: Send + Sync + Display + Debug {
    /// true if this is an anonymous login. Transfer records distinguish anonymous access from
    /// real accounts.
    fn is_anonymous(&self) -> bool {
        false
    }
}

/// DefaultUser is a default implementation of the `UserDetail` trait that doesn't hold any user
/// information.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct DefaultUser;

impl UserDetail for DefaultUser {}

impl Display for DefaultUser {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultUser")
    }
}
