use serde::{Deserialize, Deserializer};

use super::fields;
use crate::error::AppError;

/// One field of an update payload.
///
/// Keeps "not sent" apart from "sent as null", so `false`, `0` and `""`
/// are applied like any other value. Fields must carry `#[serde(default)]`
/// for `Absent` to be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Value(value) => Some(value),
            Patch::Absent | Patch::Null => None,
        }
    }

    /// The sent value of a field the payload must carry.
    pub fn required(self, field: &'static str) -> Result<T, AppError> {
        self.into_option()
            .ok_or_else(|| AppError::missing_fields(&[field]))
    }

    /// Converts a sent value, for fields parsed out of their wire form.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(f(value)?),
        })
    }

    /// Replaces `slot` only when a value was sent.
    pub fn apply(self, slot: &mut T) {
        if let Patch::Value(value) = self {
            *slot = value;
        }
    }
}

impl<T: Default> Patch<T> {
    /// Like `apply`, but an explicit null resets the field to its default.
    pub fn apply_or_clear(self, slot: &mut T) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = T::default(),
            Patch::Value(value) => *slot = value,
        }
    }
}

impl Patch<String> {
    pub fn trimmed(self) -> Self {
        match self {
            Patch::Value(value) => Patch::Value(fields::trimmed(value)),
            other => other,
        }
    }

    /// For optional text fields: a blank value clears the field like null.
    pub fn non_blank(self) -> Patch<Option<String>> {
        match self.trimmed() {
            Patch::Absent => Patch::Absent,
            Patch::Value(value) if !value.is_empty() => Patch::Value(Some(value)),
            _ => Patch::Null,
        }
    }
}
