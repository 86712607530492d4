//! Three-state result of an accessor operation.

use crate::error::AccessError;

/// `Found` carries the value, `NotFound` means the table or row does not exist,
/// `Failed` carries the reason an operation could not complete (already logged).
#[must_use]
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
    Failed(AccessError),
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// True when the statement executed. For update/delete this holds even if no row matched.
    pub fn succeeded(&self) -> bool {
        self.is_found()
    }

    /// Collapse to "absent" for both not-found and failure.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Found(v) => Some(v),
            Outcome::NotFound | Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&AccessError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Found(v) => Outcome::Found(f(v)),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }

    /// `Ok(Some)` / `Ok(None)` / `Err` for callers who prefer `?`.
    pub fn into_result(self) -> Result<Option<T>, AccessError> {
        match self {
            Outcome::Found(v) => Ok(Some(v)),
            Outcome::NotFound => Ok(None),
            Outcome::Failed(e) => Err(e),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Collapse to the empty value for both not-found and failure.
    pub fn unwrap_or_default(self) -> T {
        self.ok().unwrap_or_default()
    }
}
