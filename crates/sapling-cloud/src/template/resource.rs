//! Resource declarations
//!
//! Every infrastructure kind the templates use is one variant of
//! [`ResourceKind`]. Type tags, CloudFormation properties and structural
//! checks are each produced by a single exhaustive `match`.

use super::value::Value;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// CloudFormation resource type tags
pub mod type_tag {
    pub const ROLE: &str = "AWS::IAM::Role";
    pub const FUNCTION: &str = "AWS::Lambda::Function";
    pub const PERMISSION: &str = "AWS::Lambda::Permission";
    pub const REST_API: &str = "AWS::ApiGateway::RestApi";
    pub const GATEWAY_RESOURCE: &str = "AWS::ApiGateway::Resource";
    pub const METHOD: &str = "AWS::ApiGateway::Method";
    pub const DEPLOYMENT: &str = "AWS::ApiGateway::Deployment";
    pub const STAGE: &str = "AWS::ApiGateway::Stage";
    pub const API_KEY: &str = "AWS::ApiGateway::ApiKey";
    pub const BUCKET: &str = "AWS::S3::Bucket";
}

pub const POLICY_VERSION: &str = "2012-10-17";

/// One declared resource in a graph
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Logical id, unique within the graph
    pub logical_id: String,

    pub kind: ResourceKind,

    /// Logical id of a resource that must be created first
    pub depends_on: Option<String>,
}

impl Resource {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
            depends_on: None,
        }
    }

    pub fn with_depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on = Some(logical_id.into());
        self
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    /// Logical ids this resource points at through properties or `DependsOn`
    pub fn referenced_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .kind
            .properties()
            .values()
            .flat_map(|v| v.referenced_ids())
            .map(str::to_string)
            .collect();
        if let Some(dep) = &self.depends_on {
            ids.push(dep.clone());
        }
        ids
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.depends_on.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("Type", self.type_tag())?;
        map.serialize_entry("Properties", &self.kind.properties())?;
        if let Some(dep) = &self.depends_on {
            map.serialize_entry("DependsOn", dep)?;
        }
        map.end()
    }
}

/// The kinds of infrastructure a template can declare
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceKind {
    Role(Role),
    Function(Function),
    RestApi(RestApi),
    GatewayResource(GatewayResource),
    Permission(Permission),
    Method(Method),
    Deployment(Deployment),
    Stage(Stage),
    ApiKey(ApiKey),
    Bucket(Bucket),
}

impl ResourceKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Role(_) => type_tag::ROLE,
            Self::Function(_) => type_tag::FUNCTION,
            Self::RestApi(_) => type_tag::REST_API,
            Self::GatewayResource(_) => type_tag::GATEWAY_RESOURCE,
            Self::Permission(_) => type_tag::PERMISSION,
            Self::Method(_) => type_tag::METHOD,
            Self::Deployment(_) => type_tag::DEPLOYMENT,
            Self::Stage(_) => type_tag::STAGE,
            Self::ApiKey(_) => type_tag::API_KEY,
            Self::Bucket(_) => type_tag::BUCKET,
        }
    }

    /// The `Properties` object as it appears in the template
    pub fn properties(&self) -> IndexMap<String, Value> {
        let mut props = IndexMap::new();
        let mut put = |key: &str, value: Value| {
            props.insert(key.to_string(), value);
        };

        match self {
            Self::Role(role) => {
                put("Path", role.path.as_str().into());
                put(
                    "Policies",
                    Value::list(role.policies.iter().map(|p| {
                        Value::map([
                            ("PolicyName", Value::from(&p.name)),
                            ("PolicyDocument", p.document.to_value()),
                        ])
                    })),
                );
                put("AssumeRolePolicyDocument", role.assume_role_policy.to_value());
            }
            Self::Function(function) => {
                put("Code", function.code.to_value());
                put("Handler", Value::from(&function.handler));
                put("Runtime", Value::from(&function.runtime));
                put("Role", function.role.clone());
            }
            Self::RestApi(api) => {
                put("Name", Value::from(&api.name));
            }
            Self::GatewayResource(resource) => {
                put("RestApiId", resource.rest_api_id.clone());
                put("PathPart", Value::from(&resource.path_part));
                put("ParentId", resource.parent_id.clone());
            }
            Self::Permission(permission) => {
                put("Action", Value::from(&permission.action));
                put("FunctionName", permission.function_name.clone());
                put("Principal", Value::from(&permission.principal));
                put("SourceArn", permission.source_arn.clone());
            }
            Self::Method(method) => {
                put("RestApiId", method.rest_api_id.clone());
                put("ResourceId", method.resource_id.clone());
                put("HttpMethod", Value::from(&method.http_method));
                put("AuthorizationType", Value::from(&method.authorization_type));
                put(
                    "Integration",
                    Value::map([
                        ("Type", Value::from(&method.integration.integration_type)),
                        (
                            "IntegrationHttpMethod",
                            Value::from(&method.integration.http_method),
                        ),
                        ("Uri", method.integration.uri.clone()),
                    ]),
                );
                put(
                    "MethodResponses",
                    Value::list(
                        method
                            .response_status_codes
                            .iter()
                            .map(|code| Value::map([("StatusCode", Value::from(code))])),
                    ),
                );
            }
            Self::Deployment(deployment) => {
                put("RestApiId", deployment.rest_api_id.clone());
            }
            Self::Stage(stage) => {
                put("StageName", Value::from(&stage.stage_name));
                put("RestApiId", stage.rest_api_id.clone());
                put("DeploymentId", stage.deployment_id.clone());
            }
            Self::ApiKey(key) => {
                put(
                    "StageKeys",
                    Value::list(key.stage_keys.iter().map(|sk| {
                        Value::map([
                            ("RestApiId", sk.rest_api_id.clone()),
                            ("StageName", sk.stage_name.clone()),
                        ])
                    })),
                );
            }
            Self::Bucket(bucket) => {
                put("AccessControl", Value::from(&bucket.access_control));
            }
        }

        props
    }

    /// Structural problems local to this resource, reference checks excluded
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut require = |ok: bool, reason: &str| {
            if !ok {
                problems.push(reason.to_string());
            }
        };

        match self {
            Self::Role(role) => {
                require(!role.policies.is_empty(), "role has no inline policy");
                for policy in &role.policies {
                    require(!policy.name.is_empty(), "policy has no name");
                    require(
                        !policy.document.statements.is_empty(),
                        "policy document has no statements",
                    );
                }
                require(
                    role.assume_role_policy
                        .statements
                        .iter()
                        .any(|s| !s.principal_services.is_empty()),
                    "trust policy names no service principal",
                );
            }
            Self::Function(function) => {
                require(!function.handler.is_empty(), "function has no handler");
                require(!function.runtime.is_empty(), "function has no runtime");
                require(!function.code.is_empty(), "function has no code");
                require(
                    function.role.is_reference(),
                    "function role must reference an IAM role",
                );
            }
            Self::RestApi(api) => {
                require(!api.name.is_empty(), "rest api has no name");
            }
            Self::GatewayResource(resource) => {
                require(!resource.path_part.is_empty(), "resource has no path part");
                require(
                    resource.rest_api_id.is_reference(),
                    "resource must reference a rest api",
                );
                require(
                    resource.parent_id.is_reference(),
                    "resource must reference a parent resource",
                );
            }
            Self::Permission(permission) => {
                require(!permission.action.is_empty(), "permission has no action");
                require(!permission.principal.is_empty(), "permission has no principal");
                require(
                    permission.function_name.is_reference(),
                    "permission must reference a function",
                );
                require(
                    permission.source_arn.is_intrinsic(),
                    "permission source arn must be built from the rest api",
                );
            }
            Self::Method(method) => {
                require(!method.http_method.is_empty(), "method has no http method");
                require(
                    method.rest_api_id.is_reference(),
                    "method must reference a rest api",
                );
                require(
                    method.resource_id.is_reference(),
                    "method must reference a gateway resource",
                );
                require(
                    method.integration.uri.is_intrinsic(),
                    "method integration uri must be built from the function",
                );
            }
            Self::Deployment(deployment) => {
                require(
                    deployment.rest_api_id.is_reference(),
                    "deployment must reference a rest api",
                );
            }
            Self::Stage(stage) => {
                require(!stage.stage_name.is_empty(), "stage has no name");
                require(
                    stage.rest_api_id.is_reference(),
                    "stage must reference a rest api",
                );
                require(
                    stage.deployment_id.is_reference(),
                    "stage must reference a deployment",
                );
            }
            Self::ApiKey(key) => {
                require(!key.stage_keys.is_empty(), "api key is bound to no stage");
                for stage_key in &key.stage_keys {
                    require(
                        stage_key.rest_api_id.is_reference(),
                        "stage key must reference a rest api",
                    );
                    require(
                        stage_key.stage_name.is_reference(),
                        "stage key must reference a stage",
                    );
                }
            }
            Self::Bucket(bucket) => {
                require(
                    !bucket.access_control.is_empty(),
                    "bucket has no access control",
                );
            }
        }

        problems
    }
}

/// IAM role with inline policies
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub path: String,
    pub policies: Vec<Policy>,
    pub assume_role_policy: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub name: String,
    pub document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    pub version: String,
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements,
        }
    }

    fn to_value(&self) -> Value {
        Value::map([
            ("Version", Value::from(&self.version)),
            (
                "Statement",
                Value::list(self.statements.iter().map(Statement::to_value)),
            ),
        ])
    }
}

/// A single `Allow` statement
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub actions: Vec<String>,
    /// Resource ARNs; empty for trust policies
    pub resources: Vec<String>,
    /// Service principals; only set on trust policies
    pub principal_services: Vec<String>,
}

impl Statement {
    pub fn allow(actions: &[&str], resources: &[&str]) -> Self {
        Self {
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources: resources.iter().map(|r| r.to_string()).collect(),
            principal_services: Vec::new(),
        }
    }

    pub fn assume_role(services: &[&str]) -> Self {
        Self {
            actions: vec!["sts:AssumeRole".to_string()],
            resources: Vec::new(),
            principal_services: services.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn to_value(&self) -> Value {
        let mut entries = vec![("Action", Value::list(self.actions.iter()))];
        if !self.resources.is_empty() {
            entries.push(("Resource", Value::list(self.resources.iter())));
        }
        entries.push(("Effect", Value::from("Allow")));
        if !self.principal_services.is_empty() {
            entries.push((
                "Principal",
                Value::map([("Service", Value::list(self.principal_services.iter()))]),
            ));
        }
        Value::map(entries)
    }
}

/// Lambda function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub code: FunctionCode,
    pub handler: String,
    pub runtime: String,
    /// Normally `GetAtt(role, "Arn")`
    pub role: Value,
}

/// Where the function's code comes from
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCode {
    /// Source lines joined with newlines into `Code.ZipFile`
    Inline(Vec<String>),
    /// A packaged zip already uploaded to S3
    S3 { bucket: String, key: String },
}

impl FunctionCode {
    fn is_empty(&self) -> bool {
        match self {
            Self::Inline(lines) => lines.iter().all(|l| l.trim().is_empty()),
            Self::S3 { bucket, key } => bucket.is_empty() || key.is_empty(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Inline(lines) => Value::map([(
                "ZipFile",
                Value::join("\n", lines.iter().map(Value::from).collect()),
            )]),
            Self::S3 { bucket, key } => Value::map([
                ("S3Bucket", Value::from(bucket)),
                ("S3Key", Value::from(key)),
            ]),
        }
    }
}

impl Default for FunctionCode {
    /// Echo handler: answers 200 with the incoming event as the JSON body,
    /// so the stack can come up before any real code has been uploaded.
    fn default() -> Self {
        Self::Inline(
            [
                "import json",
                "",
                "def handler(event, context):",
                "\tresponse = {",
                "\t\t'statusCode': 200,",
                "\t\t'headers': {},",
                "\t\t'body': json.dumps(event),",
                "\t\t'isBase64Encoded': False",
                "\t}",
                "\treturn response",
            ]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestApi {
    pub name: String,
}

/// A path segment under a REST API
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResource {
    pub rest_api_id: Value,
    pub parent_id: Value,
    pub path_part: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Permission {
    pub action: String,
    pub function_name: Value,
    pub principal: String,
    pub source_arn: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub rest_api_id: Value,
    pub resource_id: Value,
    pub http_method: String,
    pub authorization_type: String,
    pub integration: Integration,
    pub response_status_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Integration {
    /// e.g. `AWS_PROXY`
    pub integration_type: String,
    pub http_method: String,
    pub uri: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub rest_api_id: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub stage_name: String,
    pub rest_api_id: Value,
    pub deployment_id: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub stage_keys: Vec<StageKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageKey {
    pub rest_api_id: Value,
    pub stage_name: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub access_control: String,
}

impl Default for Bucket {
    fn default() -> Self {
        Self {
            access_control: "Private".to_string(),
        }
    }
}
