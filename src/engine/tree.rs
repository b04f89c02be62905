//! Nested YAML document assembly.
//!
//! The tree owns its root mapping and hands out `&mut Mapping` for the node at an
//! address, so serializing always starts from the root without any back-pointers.

use serde_yaml::{Mapping, Value};

use super::address::NodeAddress;
use crate::error::{Result, VivError};

/// A YAML mapping built up level by level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedTree {
    root: Mapping,
}

impl NestedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole document. Empty input yields an empty tree.
    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        let mut tree = Self::new();
        unmarshal_into(&mut tree.root, data)?;
        Ok(tree)
    }

    /// Build a tree holding `rendered` at `address`.
    pub fn wrap(address: &NodeAddress, rendered: &[u8]) -> Result<Self> {
        let mut tree = Self::new();
        let node = tree.select_or_create(address);
        unmarshal_into(node, rendered)?;
        Ok(tree)
    }

    /// Descend to `address`, creating missing levels on the way.
    ///
    /// Existing mappings are reused, so siblings already present at any level survive.
    /// A non-mapping value in the way is replaced by an empty mapping.
    pub fn select_or_create(&mut self, address: &NodeAddress) -> &mut Mapping {
        let mut node = &mut self.root;
        for segment in address.segments() {
            let slot = node
                .entry(Value::String(segment.clone()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if !slot.is_mapping() {
                *slot = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(child) = slot else {
                unreachable!("slot was just made a mapping")
            };
            node = child;
        }
        node
    }

    /// The node at `address`, if every level exists and is a mapping.
    pub fn get(&self, address: &NodeAddress) -> Option<&Mapping> {
        address
            .segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.get(segment.as_str())?.as_mapping())
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Serialize the whole document from the root.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }
}

/// Deserialize `data` and merge its top-level keys into `node`.
///
/// Blank or `null` documents leave the node empty. Anything other than a mapping is a
/// serialization error carrying the original bytes.
pub fn unmarshal_into(node: &mut Mapping, data: &[u8]) -> Result<()> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let parsed: Value = serde_yaml::from_slice(data).map_err(|e| VivError::Serialization {
        message: e.to_string(),
        content: data.to_vec(),
    })?;

    match parsed {
        Value::Null => Ok(()),
        Value::Mapping(map) => {
            for (key, value) in map {
                node.insert(key, value);
            }
            Ok(())
        }
        other => Err(VivError::Serialization {
            message: format!("expected a mapping at the document root, found {}", kind(&other)),
            content: data.to_vec(),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
