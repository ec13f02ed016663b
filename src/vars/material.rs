use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, VariableError};

/// Name given to material id `0`.
pub const VOID: &str = "Void";

/// One named material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: i32,
    pub name: String,
    /// Mass density in g/cm3.
    pub density: f64,
}

/// Maps material names to the integer ids written on cell cards.
#[derive(Debug, Clone)]
pub struct MaterialDatabase {
    by_id: BTreeMap<i32, Material>,
    names: HashMap<String, i32>,
}

impl Default for MaterialDatabase {
    fn default() -> Self {
        let mut db = Self {
            by_id: BTreeMap::new(),
            names: HashMap::new(),
        };
        db.add_material(0, VOID, 0.0);
        db
    }
}

impl MaterialDatabase {
    /// Creates a database holding only `Void`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a material.
    pub fn add_material(&mut self, id: i32, name: &str, density: f64) {
        if let Some(old) = self.by_id.insert(
            id,
            Material {
                id,
                name: name.to_string(),
                density,
            },
        ) {
            self.names.remove(&old.name);
        }
        self.names.insert(name.to_string(), id);
    }

    /// Id of a named material.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown.
    pub fn id(&self, name: &str) -> Result<i32> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| VariableError::UnknownMaterial(name.to_string()).into())
    }

    /// Material with id `id`.
    #[must_use]
    pub fn material(&self, id: i32) -> Option<&Material> {
        self.by_id.get(&id)
    }

    /// True when `id` is defined.
    #[must_use]
    pub fn has_id(&self, id: i32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Materials in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.by_id.values()
    }
}
