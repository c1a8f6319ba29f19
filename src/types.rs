use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::utils::parse_labels;

/// Set of required label equality constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector(BTreeMap<String, String>);

impl Selector {
    /// An empty selector matches every object.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_labels(s)
            .map(Selector)
            .map_err(|reason| Error::InvalidSelector {
                selector: s.to_string(),
                reason,
            })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

/// One log-worthy pod lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent<'a> {
    Created(&'a str),
    Updated(&'a str),
    Deleted(&'a str),
}

impl fmt::Display for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Created(name) => write!(f, "Pod created: {}", name),
            LogEvent::Updated(name) => write!(f, "Pod updated: {}", name),
            LogEvent::Deleted(name) => write!(f, "Pod deleted: {}", name),
        }
    }
}
