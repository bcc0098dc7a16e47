use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};

/// Globally unique identifier of an inventory record.
///
/// Sites and every device kind share a single identifier space within a run,
/// so a [`Guid`] alone is enough to look a record up.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new(value: impl Into<String>) -> Self {
        Guid(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Guid(value.to_owned())
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        Guid(value)
    }
}

impl Borrow<str> for Guid {
    fn borrow(&self) -> &str {
        &self.0
    }
}
