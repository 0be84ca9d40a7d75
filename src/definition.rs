//! Benchmark definitions: the capability a benchmarked type exposes to the runner.
//!
//! A definition lists its measurable operations, the parameters it can be
//! configured with, and how to build an instance for one parameter
//! combination. The runner never inspects the instance beyond handing it to
//! the operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// One legal value of a benchmark parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

/// A named parameter and the ordered values it is swept over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDomain {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl ParameterDomain {
    pub fn new<V: Into<ParamValue>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// One chosen value per declared parameter, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterCombination {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterCombination {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a new combination extended with one more entry.
    pub fn with(&self, name: &str, value: ParamValue) -> Self {
        let mut entries = self.entries.clone();
        entries.push((name.to_string(), value));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Reads an integer parameter.
    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(ParamValue::Str(s)) => Err(BenchError::invalid_parameter(
                name,
                format!("expected an integer, got {s:?}"),
            )),
            None => Err(BenchError::invalid_parameter(name, "not in combination")),
        }
    }

    /// Reads an integer parameter that must fit a `usize`.
    pub fn usize(&self, name: &str) -> Result<usize> {
        let v = self.int(name)?;
        usize::try_from(v)
            .map_err(|_| BenchError::invalid_parameter(name, format!("{v} is negative")))
    }

    /// Reads a string parameter.
    pub fn str(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(ParamValue::Str(s)) => Ok(s),
            Some(ParamValue::Int(v)) => Err(BenchError::invalid_parameter(
                name,
                format!("expected a string, got {v}"),
            )),
            None => Err(BenchError::invalid_parameter(name, "not in combination")),
        }
    }

    /// Name/value pairs rendered as strings, for reports.
    pub fn stringified(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(n, v)| (n.clone(), v.to_string()))
            .collect()
    }
}

type OperationFn<T> = Box<dyn Fn(&mut T)>;

/// A named, zero-argument unit of work measured against an instance.
pub struct Operation<T> {
    name: String,
    body: OperationFn<T>,
}

impl<T> Operation<T> {
    pub fn new(name: impl Into<String>, body: impl Fn(&mut T) + 'static) -> Self {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// An operation that does not touch the instance.
    pub fn unbound(name: impl Into<String>, body: impl Fn() + 'static) -> Self
    where
        T: 'static,
    {
        Self::new(name, move |_: &mut T| body())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, instance: &mut T) {
        (self.body)(instance)
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}

/// Implemented once per benchmarked type.
///
/// `construct` is called with a fresh combination for every
/// (configuration, operation) pair, followed by `setup`; instances are never
/// shared between operations.
pub trait BenchmarkDefinition {
    type Instance;

    /// Display and lookup name.
    fn name(&self) -> &str;

    fn operations(&self) -> Vec<Operation<Self::Instance>>;

    fn parameters(&self) -> Vec<ParameterDomain> {
        Vec::new()
    }

    fn construct(&self, combination: &ParameterCombination) -> Result<Self::Instance>;

    fn setup(&self, _instance: &mut Self::Instance) -> Result<()> {
        Ok(())
    }
}
