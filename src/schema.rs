//! Table schemas

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::ColumnType;

/// A named, typed column declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub column_type: ColumnType,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Field {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered list of uniquely named fields
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
    /// Column name -> position
    index: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema, rejecting duplicate column names
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (pos, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), pos).is_some() {
                return Err(Error::DuplicateColumnName(field.name.clone()));
            }
        }
        Ok(Schema { fields, index })
    }

    /// Build from `(name, type)` pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, ColumnType)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|(name, ty)| Field::new(name.as_ref(), *ty))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, pos: usize) -> Option<&Field> {
        self.fields.get(pos)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a column
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Positions of several columns, failing on the first absent one
    pub fn indices_of<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names.iter().map(|n| self.index_of(n.as_ref())).collect()
    }

    /// Type of a column
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        let pos = self.index_of(name)?;
        Ok(self.fields[pos].column_type)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// New schema with `extra` appended
    pub fn with_fields(&self, extra: Vec<Field>) -> Result<Self> {
        let mut fields = self.fields.clone();
        fields.extend(extra);
        Self::new(fields)
    }

    /// New schema where every column name is prefixed with `alias.`
    pub fn qualified(&self, alias: &str) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|f| Field::new(format!("{}.{}", alias, f.name), f.column_type))
            .collect::<Vec<_>>();
        let index = fields
            .iter()
            .enumerate()
            .map(|(pos, f)| (f.name.clone(), pos))
            .collect();
        Schema { fields, index }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root")?;
        for field in &self.fields {
            writeln!(f, " |-- {}: {}", field.name, field.column_type)?;
        }
        Ok(())
    }
}
