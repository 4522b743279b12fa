//! Operator parameters: values, declared schemas, and validation.
//!
//! Every operator owns a [`ParamSet`] built from a static list of
//! [`ParamSpec`]s. The set starts out holding each parameter's default
//! and only ever stores values that passed validation against the
//! schema, so operators can read typed values back without re-checking.
//!
//! The UI layer hands values over as strings more often than not, so the
//! numeric and boolean kinds also accept text that parses as such.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A parameter value as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Integer view. Floats with no fractional part and numeric text count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::Float(_) => None,
        }
    }

    /// Floating-point view. Integers and numeric text count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Boolean view. `"true"`/`"false"` text counts.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Int(_) | Self::Float(_) => None,
        }
    }

    /// Text view; only [`ParamValue::Text`] qualifies.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// The declared type of a parameter, with its default and admissible range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Integer in `min..=max`.
    Int { default: i64, min: i64, max: i64 },
    /// Finite float in `min..=max`.
    Float { default: f64, min: f64, max: f64 },
    Bool { default: bool },
    /// One of a fixed list of option names.
    Choice {
        options: &'static [&'static str],
        default: &'static str,
    },
    /// Free text.
    Text { default: &'static str },
}

impl ParamKind {
    /// The value a freshly constructed operator holds.
    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        match *self {
            Self::Int { default, .. } => ParamValue::Int(default),
            Self::Float { default, .. } => ParamValue::Float(default),
            Self::Bool { default } => ParamValue::Bool(default),
            Self::Choice { default, .. } | Self::Text { default } => {
                ParamValue::Text(default.to_owned())
            }
        }
    }

    const fn type_name(&self) -> &'static str {
        match self {
            Self::Int { .. } => "integer",
            Self::Float { .. } => "number",
            Self::Bool { .. } => "boolean",
            Self::Choice { .. } => "choice",
            Self::Text { .. } => "text",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { default, min, max } => {
                write!(f, "integer {min}..={max} (default {default})")
            }
            Self::Float { default, min, max } => {
                write!(f, "number {min}..={max} (default {default})")
            }
            Self::Bool { default } => write!(f, "boolean (default {default})"),
            Self::Choice { options, default } => {
                write!(f, "one of {} (default {default})", options.join("|"))
            }
            Self::Text { default } => write!(f, "text (default {default:?})"),
        }
    }
}

/// A named parameter declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    #[must_use]
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind }
    }
}

/// Validation failures raised by [`ParamSet::set`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// The operator declares no parameter with this name.
    #[error("unknown parameter {key:?}")]
    UnknownParam { key: String },

    /// The value cannot be read as the declared type.
    #[error("parameter {key:?} expects {expected}, got {value}")]
    WrongType {
        key: String,
        expected: &'static str,
        value: ParamValue,
    },

    /// The value lies outside the declared range.
    #[error("parameter {key:?} must be within {min}..={max}, got {value}")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The value names none of the declared options.
    #[error("parameter {key:?} must be one of [{}], got {value:?}", .options.join(", "))]
    InvalidChoice {
        key: String,
        value: String,
        options: &'static [&'static str],
    },
}

/// The current parameter values of one operator, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    specs: &'static [ParamSpec],
    values: BTreeMap<&'static str, ParamValue>,
}

impl ParamSet {
    /// A set holding every declared parameter at its default.
    #[must_use]
    pub fn new(specs: &'static [ParamSpec]) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.name, spec.kind.default_value()))
            .collect();
        Self { specs, values }
    }

    /// The declared schema.
    #[must_use]
    pub const fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    /// Validate `value` against the schema for `key` and store it.
    ///
    /// The stored value is normalised to the declared type, so `"3"`
    /// set on an integer parameter is stored as `3`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownParam`] for undeclared keys,
    /// [`ParamError::WrongType`] when the value cannot be read as the
    /// declared type, [`ParamError::OutOfRange`] for numbers outside the
    /// declared range, and [`ParamError::InvalidChoice`] for choice
    /// values that name no option. On error the stored value is
    /// unchanged.
    #[allow(clippy::cast_precision_loss)]
    pub fn set(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        let spec = self
            .specs
            .iter()
            .find(|spec| spec.name == key)
            .ok_or_else(|| ParamError::UnknownParam { key: key.to_owned() })?;

        let wrong_type = |value: &ParamValue| ParamError::WrongType {
            key: key.to_owned(),
            expected: spec.kind.type_name(),
            value: value.clone(),
        };

        let normalized = match spec.kind {
            ParamKind::Int { min, max, .. } => {
                let v = value.as_i64().ok_or_else(|| wrong_type(&value))?;
                if !(min..=max).contains(&v) {
                    return Err(ParamError::OutOfRange {
                        key: key.to_owned(),
                        value: v as f64,
                        min: min as f64,
                        max: max as f64,
                    });
                }
                ParamValue::Int(v)
            }
            ParamKind::Float { min, max, .. } => {
                let v = value
                    .as_f64()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| wrong_type(&value))?;
                if !(min..=max).contains(&v) {
                    return Err(ParamError::OutOfRange {
                        key: key.to_owned(),
                        value: v,
                        min,
                        max,
                    });
                }
                ParamValue::Float(v)
            }
            ParamKind::Bool { .. } => {
                ParamValue::Bool(value.as_bool().ok_or_else(|| wrong_type(&value))?)
            }
            ParamKind::Choice { options, .. } => {
                let text = value.as_str().ok_or_else(|| wrong_type(&value))?;
                let normalized = text.trim().to_ascii_lowercase();
                if !options.contains(&normalized.as_str()) {
                    return Err(ParamError::InvalidChoice {
                        key: key.to_owned(),
                        value: text.to_owned(),
                        options,
                    });
                }
                ParamValue::Text(normalized)
            }
            ParamKind::Text { .. } => match value {
                ParamValue::Text(s) => ParamValue::Text(s),
                other => return Err(wrong_type(&other)),
            },
        };

        self.values.insert(spec.name, normalized);
        Ok(())
    }

    /// The stored value for `key`, if declared.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> + '_ {
        self.specs
            .iter()
            .filter_map(|spec| self.values.get(spec.name).map(|v| (spec.name, v)))
    }

    /// Typed integer read.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownParam`] if `key` is not declared and
    /// [`ParamError::WrongType`] if it is not an integer parameter.
    pub fn int(&self, key: &str) -> Result<i64, ParamError> {
        self.typed(key, "integer", ParamValue::as_i64)
    }

    /// Typed float read. Integer parameters are widened.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownParam`] if `key` is not declared and
    /// [`ParamError::WrongType`] if it is not numeric.
    pub fn float(&self, key: &str) -> Result<f64, ParamError> {
        self.typed(key, "number", ParamValue::as_f64)
    }

    /// Typed boolean read.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownParam`] if `key` is not declared and
    /// [`ParamError::WrongType`] if it is not a boolean parameter.
    pub fn flag(&self, key: &str) -> Result<bool, ParamError> {
        self.typed(key, "boolean", ParamValue::as_bool)
    }

    /// Typed text read; works for choice and text parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownParam`] if `key` is not declared and
    /// [`ParamError::WrongType`] if it is not textual.
    pub fn text(&self, key: &str) -> Result<&str, ParamError> {
        self.typed(key, "text", ParamValue::as_str)
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        read: impl FnOnce(&'a ParamValue) -> Option<T>,
    ) -> Result<T, ParamError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ParamError::UnknownParam { key: key.to_owned() })?;
        read(value).ok_or_else(|| ParamError::WrongType {
            key: key.to_owned(),
            expected,
            value: value.clone(),
        })
    }
}
