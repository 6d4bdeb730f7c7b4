use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Listable;

/// User-selectable date order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Error)]
#[error("unknown sort order \"{0}\" (expected newest or oldest)")]
pub struct SortOrderParseError(pub String);

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = SortOrderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "new" | "desc" => Ok(Self::Newest),
            "oldest" | "old" | "asc" => Ok(Self::Oldest),
            _ => Err(SortOrderParseError(s.to_owned())),
        }
    }
}

/// Fixed ordering rule applied before the date order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tiering {
    /// Date order only.
    #[default]
    DateOnly,
    /// Critical items first, date order within each tier.
    CriticalFirst,
}

/// Sort in place. Stable: ties keep their input order.
///
/// Undated items go after dated ones in both directions.
pub fn sort_items<T: Listable>(items: &mut [&T], order: SortOrder, tiering: Tiering) {
    items.sort_by(|a, b| {
        let tier = match tiering {
            Tiering::DateOnly => Ordering::Equal,
            Tiering::CriticalFirst => b.is_critical().cmp(&a.is_critical()),
        };
        tier.then_with(|| compare_dates(*a, *b, order))
    });
}

fn compare_dates<T: Listable>(a: &T, b: &T, order: SortOrder) -> Ordering {
    match (a.published(), b.published()) {
        (Some(x), Some(y)) => match order {
            SortOrder::Newest => y.cmp(&x),
            SortOrder::Oldest => x.cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
