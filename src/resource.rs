//! Tri-state result envelope returned by every operation that can fail on the
//! network or while parsing a payload.

use crate::errors::{AppError, AppResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Resource::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Resource::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success(v) => Resource::Success(f(v)),
            Resource::Error(msg) => Resource::Error(msg),
        }
    }

    /// Run one of the callbacks depending on the outcome; `Loading` runs neither.
    pub fn handle<E, S>(self, on_error: E, on_success: S)
    where
        E: FnOnce(String),
        S: FnOnce(T),
    {
        match self {
            Resource::Loading => {}
            Resource::Success(v) => on_success(v),
            Resource::Error(msg) => on_error(msg),
        }
    }

    /// Combine two differently typed resources. Same precedence as [`combine`].
    pub fn zip<U>(self, other: Resource<U>) -> Resource<(T, U)> {
        match (self, other) {
            (Resource::Error(msg), _) | (_, Resource::Error(msg)) => Resource::Error(msg),
            (Resource::Success(a), Resource::Success(b)) => Resource::Success((a, b)),
            _ => Resource::Loading,
        }
    }
}

impl<T> From<AppResult<T>> for Resource<T> {
    fn from(result: AppResult<T>) -> Self {
        match result {
            Ok(v) => Resource::Success(v),
            Err(e) => Resource::Error(e.user_message()),
        }
    }
}

impl<T> From<AppError> for Resource<T> {
    fn from(e: AppError) -> Self {
        Resource::Error(e.user_message())
    }
}

/// Combine independent resources into one.
///
/// The first `Error` in input order wins; otherwise any `Loading` makes the
/// whole thing `Loading`; otherwise every value is collected in order.
pub fn combine<T, I>(resources: I) -> Resource<Vec<T>>
where
    I: IntoIterator<Item = Resource<T>>,
{
    let mut values = Vec::new();
    let mut loading = false;

    for r in resources {
        match r {
            Resource::Error(msg) => return Resource::Error(msg),
            Resource::Loading => loading = true,
            Resource::Success(v) => values.push(v),
        }
    }

    if loading {
        Resource::Loading
    } else {
        Resource::Success(values)
    }
}
