//! Resource graph and its serialized template

use super::resource::Resource;
use super::value::Value;
use crate::error::{CloudError, Result, ValidationError};
use indexmap::IndexMap;
use serde::Serialize;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A named export attached to the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    #[serde(skip)]
    pub logical_id: String,

    #[serde(rename = "Value")]
    pub value: Value,

    #[serde(rename = "Description")]
    pub description: String,
}

/// The serialized form of a graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Resources")]
    pub resources: IndexMap<String, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// In-memory set of declared resources and outputs
///
/// Resources and outputs keep insertion order. CloudFormation orders
/// creation by `Ref`/`GetAtt`/`DependsOn` edges, so the order only makes
/// the emitted document reproducible.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    resources: IndexMap<String, Resource>,
    outputs: IndexMap<String, Output>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, resource: Resource) -> Result<()> {
        if self.resources.contains_key(&resource.logical_id) {
            return Err(CloudError::DuplicateName(resource.logical_id));
        }
        tracing::debug!(
            "Adding {} {}",
            resource.type_tag(),
            resource.logical_id
        );
        self.resources.insert(resource.logical_id.clone(), resource);
        Ok(())
    }

    /// Attach an export; every resource `value` points at must already be declared
    pub fn add_output(
        &mut self,
        logical_id: impl Into<String>,
        value: Value,
        description: impl Into<String>,
    ) -> Result<()> {
        let logical_id = logical_id.into();
        if self.outputs.contains_key(&logical_id) {
            return Err(CloudError::DuplicateName(logical_id));
        }
        if let Some(missing) = value
            .referenced_ids()
            .into_iter()
            .find(|id| !self.resources.contains_key(*id))
        {
            return Err(CloudError::UnknownReference(missing.to_string()));
        }

        self.outputs.insert(
            logical_id.clone(),
            Output {
                logical_id,
                value,
                description: description.into(),
            },
        );
        Ok(())
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resource_mut(&mut self, logical_id: &str) -> Option<&mut Resource> {
        self.resources.get_mut(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.values()
    }

    pub fn output(&self, logical_id: &str) -> Option<&Output> {
        self.outputs.get(logical_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources of one type tag, in declaration order
    pub fn by_type<'a>(&'a self, type_tag: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .values()
            .filter(move |r| r.type_tag() == type_tag)
    }

    /// Check every resource and reference, reporting all violations at once
    pub fn validate_all(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut violations = Vec::new();

        for resource in self.resources.values() {
            for reason in resource.kind.violations() {
                violations.push(ValidationError::new(&resource.logical_id, reason));
            }
            for id in resource.referenced_ids() {
                if id == resource.logical_id {
                    violations.push(ValidationError::new(
                        &resource.logical_id,
                        "resource references itself",
                    ));
                } else if !self.resources.contains_key(&id) {
                    violations.push(ValidationError::new(
                        &resource.logical_id,
                        format!("references undeclared resource {}", id),
                    ));
                }
            }
        }

        for output in self.outputs.values() {
            for id in output.value.referenced_ids() {
                if !self.resources.contains_key(id) {
                    violations.push(ValidationError::new(
                        &output.logical_id,
                        format!("output references undeclared resource {}", id),
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn to_template(&self) -> Template {
        Template {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            resources: self.resources.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Validate, then serialize to the template body sent to CloudFormation
    pub fn to_json(&self) -> Result<String> {
        self.validate_all().map_err(CloudError::Validation)?;
        self.to_template().to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::resource::{Bucket, Deployment, ResourceKind, RestApi};

    fn rest_api(name: &str) -> Resource {
        Resource::new(
            name,
            ResourceKind::RestApi(RestApi {
                name: name.to_string(),
            }),
        )
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut graph = ResourceGraph::new();
        graph.add_resource(rest_api("Api")).unwrap();

        let err = graph.add_resource(rest_api("Api")).unwrap_err();
        assert!(matches!(err, CloudError::DuplicateName(name) if name == "Api"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_output_requires_declared_resource() {
        let mut graph = ResourceGraph::new();

        let err = graph
            .add_output("Data", Value::reference("DataBucket"), "data bucket")
            .unwrap_err();
        assert!(matches!(err, CloudError::UnknownReference(name) if name == "DataBucket"));

        graph
            .add_resource(Resource::new(
                "DataBucket",
                ResourceKind::Bucket(Bucket::default()),
            ))
            .unwrap();
        graph
            .add_output("Data", Value::reference("DataBucket"), "data bucket")
            .unwrap();
        assert_eq!(graph.output("Data").unwrap().description, "data bucket");
    }

    #[test]
    fn test_serialization_is_deterministic_and_ordered() {
        let mut graph = ResourceGraph::new();
        graph.add_resource(rest_api("Zeta")).unwrap();
        graph.add_resource(rest_api("Alpha")).unwrap();

        let first = graph.to_json().unwrap();
        let second = graph.to_json().unwrap();
        assert_eq!(first, second);
        assert!(first.find("Zeta").unwrap() < first.find("Alpha").unwrap());

        let doc: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(doc["AWSTemplateFormatVersion"], "2010-09-09");
        assert!(doc.get("Outputs").is_none());
    }

    #[test]
    fn test_validate_collects_every_violation() {
        let mut graph = ResourceGraph::new();
        graph
            .add_resource(
                Resource::new(
                    "Deploy",
                    ResourceKind::Deployment(Deployment {
                        rest_api_id: Value::reference("MissingApi"),
                    }),
                )
                .with_depends_on("MissingMethod"),
            )
            .unwrap();
        graph
            .add_resource(Resource::new(
                "Unnamed",
                ResourceKind::RestApi(RestApi {
                    name: String::new(),
                }),
            ))
            .unwrap();

        let violations = graph.validate_all().unwrap_err();
        assert_eq!(violations.len(), 3);
        assert_eq!(
            violations[0],
            ValidationError::new("Deploy", "references undeclared resource MissingApi")
        );
        assert_eq!(violations[2].resource, "Unnamed");

        let err = graph.to_json().unwrap_err();
        assert!(matches!(err, CloudError::Validation(v) if v.len() == 3));
    }
}
