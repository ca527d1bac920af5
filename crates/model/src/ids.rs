use derive_more::{Display, From, FromStr};
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, FromStr, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);
        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

identifier!(
    /// Identifier of a [`Document`](crate::Document). Unique across the catalog.
    DocId
);
identifier!(
    /// Identifier of a [`Version`](crate::Version).
    ///
    /// Unique across the *whole* catalog (not just within one document), which
    /// is why it's the key used for preview lookups.
    VersionId
);
identifier!(TagId);
identifier!(
    /// Identifier of the user that uploaded a version.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id: VersionId = "42".parse().unwrap();
        assert_eq!(id, VersionId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("forty-two".parse::<DocId>().is_err());
    }

    #[test]
    fn test_transparent_json() {
        let id: DocId = serde_json::from_str("7").unwrap();
        assert_eq!(id.get(), 7);
        assert_eq!(serde_json::to_string(&TagId::new(3)).unwrap(), "3");
    }
}
