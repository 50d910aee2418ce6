use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{AnswerValue, FieldPath};

/// Error type for form state writes.
#[derive(Debug, thiserror::Error)]
pub enum FormStateError {
    #[error("Missing value for path: {0}")]
    MissingPath(FieldPath),

    #[error("Cannot store a value at an empty path")]
    EmptyPath,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Branch(BTreeMap<String, Node>),
    Leaf(AnswerValue),
}

/// The answers of one questionnaire session, stored as a tree.
///
/// A value set at `"personalInfo.age"` lives in the `age` entry of the
/// `personalInfo` map. Intermediate maps are created on write and pruned
/// when their last value is removed. Leaves are always `AnswerValue`s;
/// branches never carry a value of their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    root: BTreeMap<String, Node>,
}

impl FormState {
    /// Create a new empty form state.
    pub fn new() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Store a value at the given path, returning the previous leaf value.
    ///
    /// A leaf standing where an intermediate map is needed is replaced by that
    /// map, and a subtree standing where the leaf goes is replaced by the leaf.
    pub fn set(
        &mut self,
        path: impl Into<FieldPath>,
        value: impl Into<AnswerValue>,
    ) -> Result<Option<AnswerValue>, FormStateError> {
        let path = path.into();
        let segments: Vec<&str> = path.segments().collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(FormStateError::EmptyPath);
        };

        let mut current = &mut self.root;
        for segment in parents {
            let node = current
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            if let Node::Leaf(old) = node {
                log::debug!("Replacing {} at '{segment}' with a nested map for {path}", old.type_name());
                *node = Node::Branch(BTreeMap::new());
            }
            let Node::Branch(children) = node else {
                return Err(FormStateError::MissingPath(path.clone()));
            };
            current = children;
        }

        let previous = current.insert((*last).to_string(), Node::Leaf(value.into()));
        Ok(match previous {
            Some(Node::Leaf(old)) => Some(old),
            _ => None,
        })
    }

    /// Get the value stored at the given path.
    pub fn get(&self, path: &FieldPath) -> Option<&AnswerValue> {
        let mut segments = path.segments().peekable();
        let mut current = &self.root;
        while let Some(segment) = segments.next() {
            let node = current.get(segment)?;
            match (node, segments.peek()) {
                (Node::Leaf(value), None) => return Some(value),
                (Node::Branch(children), Some(_)) => current = children,
                _ => return None,
            }
        }
        None
    }

    /// Check if a value exists at the given path.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }

    /// Remove the value at the given path, pruning maps left empty.
    pub fn remove(&mut self, path: &FieldPath) -> Option<AnswerValue> {
        let segments: Vec<&str> = path.segments().collect();
        remove_in(&mut self.root, &segments)
    }

    /// All leaves with their full paths, in path order.
    pub fn leaves(&self) -> Vec<(FieldPath, &AnswerValue)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &FieldPath::empty(), &mut out);
        out
    }

    /// Get the number of stored values.
    pub fn len(&self) -> usize {
        self.leaves().len()
    }

    /// Check if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Render the tree as nested JSON objects, e.g. `{"personalInfo": {"age": 31.0}}`.
    pub fn to_json(&self) -> Value {
        Value::Object(map_to_json(&self.root))
    }
}

fn remove_in(map: &mut BTreeMap<String, Node>, segments: &[&str]) -> Option<AnswerValue> {
    let (first, rest) = segments.split_first()?;
    if rest.is_empty() {
        return match map.remove(*first) {
            Some(Node::Leaf(value)) => Some(value),
            Some(branch) => {
                // Not a leaf: put the subtree back untouched.
                map.insert((*first).to_string(), branch);
                None
            }
            None => None,
        };
    }

    let Some(Node::Branch(children)) = map.get_mut(*first) else {
        return None;
    };
    let removed = remove_in(children, rest);
    if children.is_empty() {
        map.remove(*first);
    }
    removed
}

fn collect_leaves<'a>(
    map: &'a BTreeMap<String, Node>,
    prefix: &FieldPath,
    out: &mut Vec<(FieldPath, &'a AnswerValue)>,
) {
    for (key, node) in map {
        let path = prefix.child(key);
        match node {
            Node::Leaf(value) => out.push((path, value)),
            Node::Branch(children) => collect_leaves(children, &path, out),
        }
    }
}

fn map_to_json(map: &BTreeMap<String, Node>) -> Map<String, Value> {
    map.iter()
        .map(|(key, node)| {
            let value = match node {
                Node::Leaf(value) => value.to_json(),
                Node::Branch(children) => Value::Object(map_to_json(children)),
            };
            (key.clone(), value)
        })
        .collect()
}
