//! Serialized hierarchy descriptions (TOML and JSON)
//!
//! ```toml
//! [[class]]
//! name = "Base"
//!
//! [[class.method]]
//! name = "foo"
//! virtuality = "pure-virtual"
//!
//! [[class]]
//! name = "Derived"
//! bases = ["Base"]
//! final = true
//!
//! [[class.method]]
//! name = "foo"
//! override = true
//! ```
//!
//! JSON uses the same field names (`{"class": [{"name": "Base", ...}]}`);
//! `classes` and `methods` are accepted as aliases. `pure = true` is a
//! shorthand for `virtuality = "pure-virtual"`. Descriptions carry no source
//! positions, so diagnostics for them have no spans.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hierarchy::{ClassNode, MethodDeclaration, Virtuality};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFormat {
    Toml,
    Json,
}

impl DescriptionFormat {
    /// Pick the format from a file name's extension
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Some(DescriptionFormat::Toml),
            "json" => Some(DescriptionFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionFormat::Toml => write!(f, "TOML"),
            DescriptionFormat::Json => write!(f, "JSON"),
        }
    }
}

#[derive(Debug)]
pub enum DescriptionError {
    Toml(toml::de::Error),
    Json(serde_json::Error),
    /// Writing a description back out failed
    Encode(DescriptionFormat, String),
}

impl DescriptionError {
    pub fn format(&self) -> DescriptionFormat {
        match self {
            DescriptionError::Toml(_) => DescriptionFormat::Toml,
            DescriptionError::Json(_) => DescriptionFormat::Json,
            DescriptionError::Encode(format, _) => *format,
        }
    }

    /// The underlying message without the format prefix
    pub fn message(&self) -> String {
        match self {
            DescriptionError::Toml(e) => e.message().to_string(),
            DescriptionError::Json(e) => e.to_string(),
            DescriptionError::Encode(_, message) => message.clone(),
        }
    }
}

impl fmt::Display for DescriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionError::Toml(e) => write!(f, "invalid TOML hierarchy description: {}", e),
            DescriptionError::Json(e) => write!(f, "invalid JSON hierarchy description: {}", e),
            DescriptionError::Encode(format, message) => {
                write!(f, "could not encode {} hierarchy description: {}", format, message)
            }
        }
    }
}

impl std::error::Error for DescriptionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DescriptionError::Toml(e) => Some(e),
            DescriptionError::Json(e) => Some(e),
            DescriptionError::Encode(..) => None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_non_virtual(value: &Virtuality) -> bool {
    *value == Virtuality::NonVirtual
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HierarchyDescription {
    #[serde(rename = "class", alias = "classes", default)]
    pub classes: Vec<ClassDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(rename = "final", default, skip_serializing_if = "is_false")]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub instantiated: bool,
    #[serde(rename = "method", alias = "methods", default)]
    pub methods: Vec<MethodDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_non_virtual")]
    pub virtuality: Virtuality,
    #[serde(rename = "override", default, skip_serializing_if = "is_false")]
    pub is_override: bool,
    #[serde(rename = "final", default, skip_serializing_if = "is_false")]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pure: bool,
}

impl HierarchyDescription {
    pub fn from_toml_str(content: &str) -> Result<Self, DescriptionError> {
        toml::from_str(content).map_err(DescriptionError::Toml)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DescriptionError> {
        serde_json::from_str(content).map_err(DescriptionError::Json)
    }

    pub fn parse(content: &str, format: DescriptionFormat) -> Result<Self, DescriptionError> {
        match format {
            DescriptionFormat::Toml => Self::from_toml_str(content),
            DescriptionFormat::Json => Self::from_json_str(content),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, DescriptionError> {
        toml::to_string(self)
            .map_err(|e| DescriptionError::Encode(DescriptionFormat::Toml, e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, DescriptionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DescriptionError::Encode(DescriptionFormat::Json, e.to_string()))
    }

    /// Describe existing classes (spans are dropped)
    pub fn from_classes(classes: &[ClassNode]) -> Self {
        let classes = classes
            .iter()
            .map(|class| ClassDescription {
                name: class.name.clone(),
                bases: class.bases.iter().map(|b| b.name.clone()).collect(),
                is_final: class.is_final,
                instantiated: class.instantiated,
                methods: class
                    .methods
                    .iter()
                    .map(|m| MethodDescription {
                        name: m.name.clone(),
                        virtuality: m.virtuality,
                        is_override: m.is_override,
                        is_final: m.is_final,
                        pure: false,
                    })
                    .collect(),
            })
            .collect();
        Self { classes }
    }

    pub fn into_classes(self) -> Vec<ClassNode> {
        self.classes
            .into_iter()
            .map(ClassDescription::into_class)
            .collect()
    }
}

impl ClassDescription {
    pub fn into_class(self) -> ClassNode {
        let mut class = ClassNode::new(self.name);
        class.is_final = self.is_final;
        class.instantiated = self.instantiated;
        class.bases = self.bases.iter().map(|b| b.as_str().into()).collect();
        class.methods = self
            .methods
            .into_iter()
            .map(MethodDescription::into_declaration)
            .collect();
        class
    }
}

impl MethodDescription {
    pub fn into_declaration(self) -> MethodDeclaration {
        let virtuality = if self.pure {
            Virtuality::PureVirtual
        } else {
            self.virtuality
        };
        let mut method = MethodDeclaration::new(self.name, virtuality);
        method.is_override = self.is_override;
        method.is_final = self.is_final;
        method
    }
}
