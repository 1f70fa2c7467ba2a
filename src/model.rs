//! In-memory contract document model.
//!
//! Typed over the parts projection reads or edits (paths, operations, request
//! bodies, component schemas and their references, properties, required sets,
//! enums, items and composition lists). Every other OpenAPI keyword is kept
//! verbatim in an `extra` map so a document converts back to OpenAPI 3.0
//! JSON or YAML without loss.

use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::GuidanceError;
use crate::types::Verb;

/// Prefix of a local reference to a named component schema.
pub const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";

/// A full or projected contract document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    /// `openapi`, `info`, `servers` and any other top-level keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Operations available on one path, keyed by verb.
///
/// Path-level keys that are not verbs (`parameters`, `summary`, ...) live in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PathItem {
    pub operations: IndexMap<Verb, Operation>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// `responses`, `parameters`, `operationId`, ... Responses are never
    /// inspected by projection.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Either a reference to a named component schema or an inline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    Reference(Reference),
    Inline(Box<InlineSchema>),
}

/// `{"$ref": "#/components/schemas/Name"}`.
///
/// OpenAPI 3.0 ignores keys next to `$ref`, so they are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub target: String,
}

impl Reference {
    /// Reference to the component schema `name`.
    pub fn to(name: &str) -> Self {
        Self {
            target: format!("{}{}", COMPONENT_REF_PREFIX, name),
        }
    }

    /// Component schema name this reference points at.
    ///
    /// # Errors
    ///
    /// `SchemaNotFound` carrying the raw target when it does not point into
    /// `#/components/schemas/`.
    pub fn name(&self) -> Result<&str, GuidanceError> {
        self.target
            .strip_prefix(COMPONENT_REF_PREFIX)
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| GuidanceError::SchemaNotFound {
                name: self.target.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineSchema {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    /// `type`, `format`, `nullable`, `description`, `additionalProperties`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    pub fn reference(name: &str) -> Self {
        Schema::Reference(Reference::to(name))
    }

    pub fn inline(schema: InlineSchema) -> Self {
        Schema::Inline(Box::new(schema))
    }

    pub fn as_inline(&self) -> Option<&InlineSchema> {
        match self {
            Schema::Inline(inline) => Some(&**inline),
            Schema::Reference(_) => None,
        }
    }

    pub fn as_inline_mut(&mut self) -> Option<&mut InlineSchema> {
        match self {
            Schema::Inline(inline) => Some(&mut **inline),
            Schema::Reference(_) => None,
        }
    }

    /// Direct child schemas: items, property schemas, then allOf, oneOf and
    /// anyOf members. A reference has no children of its own.
    pub fn children(&self) -> impl Iterator<Item = &Schema> {
        let inline = self.as_inline();
        let items = inline.and_then(|s| s.items.as_ref());
        let properties = inline.into_iter().flat_map(|s| s.properties.values());
        let compositions = inline
            .into_iter()
            .flat_map(|s| s.all_of.iter().chain(&s.one_of).chain(&s.any_of));
        items.into_iter().chain(properties).chain(compositions)
    }
}

impl InlineSchema {
    /// Schema carrying only the given `type` keyword.
    pub fn typed(type_name: &str) -> Self {
        let mut schema = InlineSchema::default();
        schema
            .extra
            .insert("type".to_string(), Value::String(type_name.to_string()));
        schema
    }

    pub fn with_property(mut self, name: &str, schema: Schema) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        self
    }

    pub fn with_items(mut self, items: Schema) -> Self {
        self.items = Some(items);
        self
    }
}

impl Document {
    /// Inline definition of the component schema `name`.
    ///
    /// # Errors
    ///
    /// `SchemaNotFound` if no component has that name, `InvariantViolation`
    /// if the component is itself a bare reference.
    pub fn component_mut(&mut self, name: &str) -> Result<&mut InlineSchema, GuidanceError> {
        match self.components.schemas.get_mut(name) {
            Some(Schema::Inline(inline)) => Ok(&mut **inline),
            Some(Schema::Reference(reference)) => Err(GuidanceError::InvariantViolation {
                message: format!(
                    "component schema \"{}\" is an alias of {} and cannot be edited",
                    name, reference.target
                ),
            }),
            None => Err(GuidanceError::SchemaNotFound {
                name: name.to_string(),
            }),
        }
    }

    pub fn component(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }

    /// The single operation left after selection.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` unless exactly one path with exactly one
    /// operation remains.
    pub fn sole_operation(&self) -> Result<(&str, Verb, &Operation), GuidanceError> {
        let mut paths = self.paths.iter();
        let (path, item) = match (paths.next(), paths.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(GuidanceError::InvariantViolation {
                    message: format!(
                        "expected exactly one path after selection, found {}",
                        self.paths.len()
                    ),
                })
            }
        };
        let mut operations = item.operations.iter();
        match (operations.next(), operations.next()) {
            (Some((verb, operation)), None) => Ok((path.as_str(), *verb, operation)),
            _ => Err(GuidanceError::InvariantViolation {
                message: format!(
                    "expected exactly one operation on {} after selection, found {}",
                    path,
                    item.operations.len()
                ),
            }),
        }
    }
}

impl Operation {
    /// Schema of the first request-body media type: the root for projection.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when there is no request body, it declares no
    /// media types, or the first media type carries no schema.
    pub fn request_schema(&self) -> Result<&Schema, GuidanceError> {
        let body = self
            .request_body
            .as_ref()
            .ok_or_else(|| invariant("operation declares no request body"))?;
        let (media_type, entry) = body
            .content
            .first()
            .ok_or_else(|| invariant("request body declares no media types"))?;
        entry
            .schema
            .as_ref()
            .ok_or_else(|| invariant(&format!("media type {} has no schema", media_type)))
    }
}

fn invariant(message: &str) -> GuidanceError {
    GuidanceError::InvariantViolation {
        message: message.to_string(),
    }
}

impl TryFrom<Map<String, Value>> for PathItem {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut item = PathItem::default();
        for (key, value) in map {
            match Verb::from_key(&key) {
                Some(verb) => {
                    item.operations.insert(verb, serde_json::from_value(value)?);
                }
                None => {
                    item.extra.insert(key, value);
                }
            }
        }
        Ok(item)
    }
}

impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + self.operations.len()))?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        for (verb, operation) in &self.operations {
            map.serialize_entry(verb.as_str(), operation)?;
        }
        map.end()
    }
}
