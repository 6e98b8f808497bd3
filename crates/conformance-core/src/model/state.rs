// crates/conformance-core/src/model/state.rs
// ============================================================================
// Module: Tracked State
// Description: Engine-side record of deployed resources and their attributes.
// Purpose: Give the verifier a uniform, flattened view of tracked state.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Declarative engines record every deployed resource with an identifier and
//! a flat attribute map. Nested values are flattened with the conventions
//! checks are written against:
//!
//! - lists produce `<key>.#` (element count) and `<key>.<index>` entries,
//! - nested maps produce `<key>.%` (entry count) and `<key>.<name>` entries,
//! - nulls are omitted, booleans and numbers are rendered as text.
//!
//! # Invariants
//! - A resource with an empty id has not been created.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::model::identifiers::ResourceAddress;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Flattened attribute map.
pub type AttributeMap = BTreeMap<String, String>;

/// One resource recorded in an engine's tracked state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedResource {
    /// Address of the resource.
    pub address: ResourceAddress,
    /// Resource type label.
    pub resource_type: String,
    /// Primary identifier assigned by the remote service.
    pub id: String,
    /// Flattened attributes.
    pub attributes: AttributeMap,
}

impl TrackedResource {
    /// Creates a tracked resource with no attributes.
    #[must_use]
    pub fn new(address: ResourceAddress, id: impl Into<String>) -> Self {
        let resource_type = address.resource_type().to_string();
        Self {
            address,
            resource_type,
            id: id.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// Replaces the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns a tracked attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns true when the resource carries a primary identifier.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Tracked state of a deployment keyed by resource address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedState {
    /// Resources keyed by address.
    resources: BTreeMap<ResourceAddress, TrackedResource>,
}

impl TrackedState {
    /// Creates an empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a resource, returning the previous entry.
    pub fn insert(&mut self, resource: TrackedResource) -> Option<TrackedResource> {
        self.resources.insert(resource.address.clone(), resource)
    }

    /// Removes a resource by address.
    pub fn remove(&mut self, address: &ResourceAddress) -> Option<TrackedResource> {
        self.resources.remove(address)
    }

    /// Returns a resource by address.
    #[must_use]
    pub fn get(&self, address: &ResourceAddress) -> Option<&TrackedResource> {
        self.resources.get(address)
    }

    /// Iterates resources of one type in address order.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a TrackedResource> + 'a {
        self.resources.values().filter(move |resource| resource.resource_type == resource_type)
    }

    /// Iterates all resources in address order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedResource> {
        self.resources.values()
    }

    /// Returns the tracked addresses in order.
    #[must_use]
    pub fn addresses(&self) -> Vec<ResourceAddress> {
        self.resources.keys().cloned().collect()
    }

    /// Returns the number of tracked resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Forgets every tracked resource.
    pub fn clear(&mut self) {
        self.resources.clear();
    }
}

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Flattens a JSON object of resource attributes into an [`AttributeMap`].
///
/// Non-object roots produce an empty map.
#[must_use]
pub fn flatten_attributes(value: &Value) -> AttributeMap {
    let mut out = AttributeMap::new();
    if let Value::Object(map) = value {
        for (key, value) in map {
            flatten_into(key, value, &mut out);
        }
    }
    out
}

/// Writes `value` under `prefix`, recursing into lists and maps.
fn flatten_into(prefix: &str, value: &Value, out: &mut AttributeMap) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            out.insert(prefix.to_string(), flag.to_string());
        }
        Value::Number(number) => {
            out.insert(prefix.to_string(), number.to_string());
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        Value::Array(items) => {
            out.insert(format!("{prefix}.#"), items.len().to_string());
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}.{index}"), item, out);
            }
        }
        Value::Object(map) => {
            out.insert(format!("{prefix}.%"), map.len().to_string());
            for (key, item) in map {
                flatten_into(&format!("{prefix}.{key}"), item, out);
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
