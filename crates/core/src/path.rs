//! Locations inside a value tree, used to point conversion errors at the
//! node that caused them.

use std::fmt;

/// One step from a parent node to a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Named attribute of an object.
    Field(String),
    /// Position in a list, tuple, set, or JSON array.
    Index(usize),
    /// Key of a map.
    Key(String),
}

/// Path from the root of a tree to one of its nodes.
///
/// Renders as `$` for the root, `$.secret.items[2]` for nested fields and
/// positions, and `$.labels["team"]` for map keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValuePath {
    steps: Vec<PathStep>,
}

impl ValuePath {
    pub fn root() -> Self {
        ValuePath::default()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn field(&self, name: &str) -> Self {
        self.child(PathStep::Field(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathStep::Index(index))
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(PathStep::Key(key.to_string()))
    }

    /// `other` appended below `self`.
    pub fn join(&self, other: &ValuePath) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        ValuePath { steps }
    }

    fn child(&self, step: PathStep) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        ValuePath { steps }
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.steps {
            match step {
                PathStep::Field(name) => write!(f, ".{}", name)?,
                PathStep::Index(i) => write!(f, "[{}]", i)?,
                PathStep::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}
