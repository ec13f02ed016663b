//! Named model parameters and the material table.
//!
//! Components read their dimensions from a [`FuncDataBase`] using keys
//! built from their own name (`PipeLength`, `PipeRadius`, ...). Typed reads
//! go through [`FromValue`].

mod material;
mod value;

pub use material::{Material, MaterialDatabase, VOID};
pub use value::{FromValue, Value};

use std::collections::BTreeMap;

use crate::error::{Result, VariableError};

/// Key/value store of model parameters.
#[derive(Debug, Clone, Default)]
pub struct FuncDataBase {
    vars: BTreeMap<String, Value>,
}

impl FuncDataBase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable.
    pub fn add_variable(&mut self, key: &str, value: impl Into<Value>) {
        self.vars.insert(key.to_string(), value.into());
    }

    /// True when `key` is set.
    #[must_use]
    pub fn has_variable(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    fn convert<T: FromValue>(key: &str, value: &Value) -> Result<T> {
        T::from_value(value).ok_or_else(|| {
            VariableError::TypeMismatch {
                key: key.to_string(),
                expected: T::EXPECTED,
            }
            .into()
        })
    }

    /// Typed value of `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing or has the wrong type.
    pub fn eval_var<T: FromValue>(&self, key: &str) -> Result<T> {
        let value = self
            .vars
            .get(key)
            .ok_or_else(|| VariableError::NotFound(key.to_string()))?;
        Self::convert(key, value)
    }

    /// Typed value of `key`, or `default` if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` exists with the wrong type.
    pub fn eval_def_var<T: FromValue>(&self, key: &str, default: T) -> Result<T> {
        match self.vars.get(key) {
            Some(value) => Self::convert(key, value),
            None => Ok(default),
        }
    }

    /// Typed value of `primary`, falling back to `fallback`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither key exists or the found one has the
    /// wrong type.
    pub fn eval_pair<T: FromValue>(&self, primary: &str, fallback: &str) -> Result<T> {
        if self.has_variable(primary) {
            self.eval_var(primary)
        } else {
            self.eval_var(fallback)
        }
    }

    /// Material id stored under `key`, given either as a name or an id.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing or names an unknown material.
    pub fn eval_mat(&self, materials: &MaterialDatabase, key: &str) -> Result<i32> {
        let value = self
            .vars
            .get(key)
            .ok_or_else(|| VariableError::NotFound(key.to_string()))?;
        Self::material_id(materials, key, value)
    }

    /// Like [`FuncDataBase::eval_mat`] but returns `default` if `key` is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` names an unknown material.
    pub fn eval_def_mat(&self, materials: &MaterialDatabase, key: &str, default: &str) -> Result<i32> {
        match self.vars.get(key) {
            Some(value) => Self::material_id(materials, key, value),
            None => materials.id(default),
        }
    }

    fn material_id(materials: &MaterialDatabase, key: &str, value: &Value) -> Result<i32> {
        if let Some(name) = value.as_text() {
            return materials.id(name);
        }
        let id: i32 = Self::convert(key, value)?;
        if materials.has_id(id) {
            Ok(id)
        } else {
            Err(VariableError::UnknownMaterial(id.to_string()).into())
        }
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
