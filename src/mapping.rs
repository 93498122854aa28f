//! Field mapping between typed properties and document fields
//!
//! A mapping decides which collection a document type lives in and how a
//! typed property name appears as a document field. Mappings are
//! deterministic and side-effect free; translation output is fully
//! determined by (mapping, query description).

/// Maps typed names onto search-service names
pub trait FieldMapping: Send + Sync {
    /// Collection identifier for a document type
    fn collection(&self, type_name: &str) -> String;

    /// Document field name for a typed property
    fn field(&self, type_name: &str, property: &str) -> String;
}

/// Default mapping: lowercased type names, passthrough field names
///
/// An optional field prefix supports services that nest documents under
/// a common envelope key.
#[derive(Debug, Clone, Default)]
pub struct DefaultFieldMapping {
    /// Prefix prepended to every field name
    pub field_prefix: Option<String>,
}

impl DefaultFieldMapping {
    /// Create a mapping with no field prefix
    pub fn new() -> Self {
        Self { field_prefix: None }
    }

    /// Sets the field prefix
    pub fn with_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.field_prefix = Some(prefix.into());
        self
    }
}

impl FieldMapping for DefaultFieldMapping {
    fn collection(&self, type_name: &str) -> String {
        // Unqualified, lowercased type name: `demo::Robot` -> `robot`
        let unqualified = type_name.rsplit("::").next().unwrap_or(type_name);
        unqualified.to_lowercase()
    }

    fn field(&self, _type_name: &str, property: &str) -> String {
        match &self.field_prefix {
            Some(prefix) => format!("{}.{}", prefix, property),
            None => property.to_string(),
        }
    }
}
