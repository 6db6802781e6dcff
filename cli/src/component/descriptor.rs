//! # Component Descriptor Model
//!
//! File: cli/src/component/descriptor.rs
//!
//! ## Overview
//!
//! The component descriptor is the machine-readable half of a component
//! archive: it names the component (name + version) and lists the resources
//! the component declares. On disk it is a YAML document stored as
//! `component-descriptor.yaml` at the root of every archive encoding.
//!
//! The archive writers treat the descriptor as an opaque serializable value;
//! only [`ComponentDescriptor::validate`] and
//! [`ComponentDescriptor::local_blob_references`] look inside it.
//!
//! ## Example document
//!
//! ```yaml
//! meta:
//!   schemaVersion: v2
//! component:
//!   name: github.com/acme/my-comp
//!   version: 1.0.0
//!   provider: internal
//!   resources:
//!     - name: values
//!       version: 1.0.0
//!       type: helm-values
//!       relation: local
//!       access:
//!         type: localFilesystemBlob
//!         filename: values.yaml
//! ```
//!
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Fixed name of the descriptor file (directory layout) and tar entry.
pub const DESCRIPTOR_FILE_NAME: &str = "component-descriptor.yaml";

/// Schema version written when none is given.
pub const SCHEMA_VERSION: &str = "v2";

/// Access type marking a resource whose content is a blob inside the archive.
pub const LOCAL_BLOB_ACCESS_TYPE: &str = "localFilesystemBlob";

/// Top-level descriptor document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(default)]
    pub meta: Metadata,
    pub component: Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

/// Identity and declared content of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub version: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub repository_contexts: Vec<serde_yaml::Value>,
    #[serde(default)]
    pub sources: Vec<serde_yaml::Value>,
    #[serde(default)]
    pub component_references: Vec<serde_yaml::Value>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

fn default_provider() -> String {
    "internal".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: serde_yaml::Value,
}

/// A resource declared by the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub relation: ResourceRelation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

/// Whether a resource is produced with the component or referenced from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceRelation {
    #[default]
    Local,
    External,
}

/// How a resource's content can be fetched. Only `type` is interpreted; every
/// other field is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Access {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

impl Access {
    /// Access pointing at a blob stored in the archive under `filename`.
    pub fn local_blob(filename: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            "filename".to_string(),
            serde_yaml::Value::String(filename.into()),
        );
        Self {
            kind: LOCAL_BLOB_ACCESS_TYPE.to_string(),
            fields,
        }
    }
}

impl ComponentDescriptor {
    /// A descriptor with the given identity and no resources.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            meta: Metadata::default(),
            component: Component {
                name: name.into(),
                version: version.into(),
                provider: default_provider(),
                labels: Vec::new(),
                repository_contexts: Vec::new(),
                sources: Vec::new(),
                component_references: Vec::new(),
                resources: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.component.name
    }

    pub fn version(&self) -> &str {
        &self.component.version
    }

    /// Parses a descriptor document and validates it.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self> {
        let descriptor: ComponentDescriptor = serde_yaml::from_slice(bytes)
            .with_context(|| format!("Failed to parse {}", DESCRIPTOR_FILE_NAME))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Serializes the descriptor. Equal descriptors always produce equal bytes.
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        let text = serde_yaml::to_string(self)
            .with_context(|| format!("Failed to serialize {}", DESCRIPTOR_FILE_NAME))?;
        Ok(text.into_bytes())
    }

    /// Checks the identity fields and resource name uniqueness.
    pub fn validate(&self) -> Result<()> {
        if self.component.name.trim().is_empty() {
            anyhow::bail!(ArchiveError::InvalidArchive(
                "component descriptor has an empty component name".to_string()
            ));
        }
        if self.component.version.trim().is_empty() {
            anyhow::bail!(ArchiveError::InvalidArchive(format!(
                "component '{}' has an empty version",
                self.component.name
            )));
        }
        let mut seen = HashSet::new();
        for resource in &self.component.resources {
            if !seen.insert(resource.name.as_str()) {
                anyhow::bail!(ArchiveError::InvalidArchive(format!(
                    "component '{}' declares resource '{}' more than once",
                    self.component.name, resource.name
                )));
            }
        }
        Ok(())
    }

    /// File names of the blobs referenced by `localFilesystemBlob` resources.
    pub fn local_blob_references(&self) -> Vec<&str> {
        self.component
            .resources
            .iter()
            .filter_map(|resource| resource.access.as_ref())
            .filter(|access| access.kind == LOCAL_BLOB_ACCESS_TYPE)
            .filter_map(|access| access.fields.get("filename"))
            .filter_map(serde_yaml::Value::as_str)
            .collect()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
meta:
  schemaVersion: v2
component:
  name: github.com/acme/my-comp
  version: 1.0.0
  provider: internal
  repositoryContexts: []
  sources: []
  componentReferences: []
  resources:
    - name: values
      version: 1.0.0
      type: helm-values
      relation: local
      access:
        type: localFilesystemBlob
        filename: values.yaml
        mediaType: application/yaml
    - name: image
      version: 2.3.0
      type: ociImage
      relation: external
      access:
        type: ociRegistry
        imageReference: registry.example.com/acme/image:2.3.0
"#;

    #[test]
    fn test_parse_sample_descriptor() {
        let descriptor = ComponentDescriptor::from_yaml(SAMPLE.as_bytes()).unwrap();
        assert_eq!(descriptor.name(), "github.com/acme/my-comp");
        assert_eq!(descriptor.version(), "1.0.0");
        assert_eq!(descriptor.component.resources.len(), 2);
        assert_eq!(
            descriptor.component.resources[1].relation,
            ResourceRelation::External
        );
        assert_eq!(descriptor.local_blob_references(), vec!["values.yaml"]);
    }

    #[test]
    fn test_yaml_round_trip_preserves_access_fields() {
        let descriptor = ComponentDescriptor::from_yaml(SAMPLE.as_bytes()).unwrap();
        let bytes = descriptor.to_yaml().unwrap();
        let reparsed = ComponentDescriptor::from_yaml(&bytes).unwrap();
        assert_eq!(descriptor, reparsed);
        let access = reparsed.component.resources[0].access.as_ref().unwrap();
        assert_eq!(
            access.fields.get("mediaType").and_then(|v| v.as_str()),
            Some("application/yaml")
        );
    }

    #[test]
    fn test_minimal_descriptor_gets_defaults() {
        let descriptor =
            ComponentDescriptor::from_yaml(b"component:\n  name: my-comp\n  version: 1.0.0\n")
                .unwrap();
        assert_eq!(descriptor.meta.schema_version, SCHEMA_VERSION);
        assert_eq!(descriptor.component.provider, "internal");
        assert_eq!(descriptor, ComponentDescriptor::new("my-comp", "1.0.0"));
    }

    #[test]
    fn test_validation_failures() {
        let err = ComponentDescriptor::from_yaml(b"component:\n  name: ''\n  version: 1.0.0\n")
            .unwrap_err();
        assert!(err.to_string().contains("empty component name"));

        let mut descriptor = ComponentDescriptor::new("my-comp", "1.0.0");
        let resource = Resource {
            name: "values".into(),
            version: "1.0.0".into(),
            kind: "helm-values".into(),
            relation: ResourceRelation::Local,
            labels: Vec::new(),
            access: Some(Access::local_blob("values.yaml")),
        };
        descriptor.component.resources = vec![resource.clone(), resource];
        let err = descriptor.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::InvalidArchive(_))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(ComponentDescriptor::from_yaml(b"component: [not, a, map]").is_err());
    }
}
