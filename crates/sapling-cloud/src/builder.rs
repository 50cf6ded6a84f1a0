//! Lambda + API Gateway topology builder
//!
//! Populates a [`ResourceGraph`] with the fixed "function behind an HTTP
//! gateway" stack:
//!
//! ```text
//! LambdaExecutionRole ──Arn──▶ Function ◀──Arn── Permission ◀─DependsOn─ Method
//!                                                                          ▲
//! RestApi ──RootResourceId──▶ {proxy+} Resource ────────────────────────────┘
//!    │                                                                     │
//!    └──────────────▶ Deployment ◀───────────────DependsOn─────────────────┘
//!                         │
//!                       Stage ◀── ApiKey
//! ```

use crate::error::{CloudError, Result};
use crate::naming::{NameRole, derived_name};
use crate::template::value::{ACCOUNT_ID, REGION};
use crate::template::{
    ApiKey, Bucket, Deployment, Function, FunctionCode, GatewayResource, Integration, Method,
    Permission, Policy, PolicyDocument, Resource, ResourceGraph, ResourceKind, RestApi, Role,
    Stage, StageKey, Statement, Value,
};

pub const DEFAULT_ROLE_NAME: &str = "LambdaExecutionRole";
pub const DEFAULT_HANDLER: &str = "index.handler";
pub const DEFAULT_RUNTIME: &str = "python3.6";
pub const DEFAULT_STAGE_NAME: &str = "v1";

const LAMBDA_SERVICE: &str = "lambda.amazonaws.com";
const APIGATEWAY_SERVICE: &str = "apigateway.amazonaws.com";

/// Declared IAM role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRef(String);

impl RoleRef {
    pub fn logical_id(&self) -> &str {
        &self.0
    }

    pub fn arn(&self) -> Value {
        Value::get_att(&self.0, "Arn")
    }
}

/// Declared Lambda function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef(String);

impl FunctionRef {
    pub fn logical_id(&self) -> &str {
        &self.0
    }

    pub fn arn(&self) -> Value {
        Value::get_att(&self.0, "Arn")
    }
}

/// Logical ids of everything [`TemplateBuilder::add_api_gateway`] declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRef {
    pub rest_api: String,
    pub proxy_resource: String,
    pub permission: String,
    pub method: String,
    pub deployment: String,
    pub stage: String,
    pub api_key: String,
}

impl GatewayRef {
    /// The six resources hung off the REST API, in creation order
    pub fn children(&self) -> [&str; 6] {
        [
            self.proxy_resource.as_str(),
            self.permission.as_str(),
            self.method.as_str(),
            self.deployment.as_str(),
            self.stage.as_str(),
            self.api_key.as_str(),
        ]
    }
}

/// One build session over a fresh graph
#[derive(Debug)]
pub struct TemplateBuilder {
    graph: ResourceGraph,
    stage_name: String,
    function: Option<FunctionRef>,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            graph: ResourceGraph::new(),
            stage_name: DEFAULT_STAGE_NAME.to_string(),
            function: None,
        }
    }

    pub fn with_stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.stage_name = stage_name.into();
        self
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ResourceGraph {
        &mut self.graph
    }

    pub fn into_graph(self) -> ResourceGraph {
        self.graph
    }

    /// The most recently declared function, if any
    pub fn function(&self) -> Option<&FunctionRef> {
        self.function.as_ref()
    }

    /// Execution role assumable by Lambda and API Gateway
    ///
    /// Grants `logs:*`, `s3:GetObject`/`s3:PutObject` on every bucket and
    /// `lambda:*`.
    pub fn add_compute_role(&mut self, role_name: &str) -> Result<RoleRef> {
        tracing::info!("Creating AWS Lambda Role {}", role_name);

        let role = Role {
            path: "/".to_string(),
            policies: vec![Policy {
                name: "root".to_string(),
                document: PolicyDocument::new(vec![
                    Statement::allow(&["logs:*"], &["arn:aws:logs:*:*:*"]),
                    Statement::allow(&["s3:GetObject", "s3:PutObject"], &["arn:aws:s3:::*"]),
                    Statement::allow(&["lambda:*"], &["*"]),
                ]),
            }],
            assume_role_policy: PolicyDocument::new(vec![Statement::assume_role(&[
                LAMBDA_SERVICE,
                APIGATEWAY_SERVICE,
            ])]),
        };

        self.graph
            .add_resource(Resource::new(role_name, ResourceKind::Role(role)))?;
        Ok(RoleRef(role_name.to_string()))
    }

    pub fn add_function(
        &mut self,
        function_name: &str,
        role: &RoleRef,
        handler: &str,
        runtime: &str,
        code: FunctionCode,
    ) -> Result<FunctionRef> {
        tracing::info!(
            "Adding AWS Lambda Function {} with handler {}",
            function_name,
            handler
        );

        self.graph.add_resource(Resource::new(
            function_name,
            ResourceKind::Function(Function {
                code,
                handler: handler.to_string(),
                runtime: runtime.to_string(),
                role: role.arn(),
            }),
        ))?;

        let function = FunctionRef(function_name.to_string());
        self.function = Some(function.clone());
        Ok(function)
    }

    /// Default role plus a function running the inline echo handler
    pub fn add_lambda(&mut self, function_name: &str) -> Result<FunctionRef> {
        let role = self.add_compute_role(DEFAULT_ROLE_NAME)?;
        self.add_function(
            function_name,
            &role,
            DEFAULT_HANDLER,
            DEFAULT_RUNTIME,
            FunctionCode::default(),
        )
    }

    /// REST API routing every request to the session's function
    pub fn add_api_gateway(&mut self, gateway_name: &str) -> Result<GatewayRef> {
        let function = self
            .function
            .clone()
            .ok_or_else(|| CloudError::MissingFunction(gateway_name.to_string()))?;
        self.add_api_gateway_for(gateway_name, &function)
    }

    /// REST API routing every request to `function`
    ///
    /// Declares the API itself, then in order: a `{proxy+}` resource, the
    /// invoke permission scoped to this API, an `ANY` proxy method, a
    /// deployment, a stage and an API key bound to the stage.
    pub fn add_api_gateway_for(
        &mut self,
        gateway_name: &str,
        function: &FunctionRef,
    ) -> Result<GatewayRef> {
        let declared = self
            .graph
            .resource(function.logical_id())
            .is_some_and(|r| matches!(r.kind, ResourceKind::Function(_)));
        if !declared {
            return Err(CloudError::MissingFunction(gateway_name.to_string()));
        }

        tracing::info!("Adding API Gateway {}", gateway_name);

        let names = GatewayRef {
            rest_api: gateway_name.to_string(),
            proxy_resource: derived_name(gateway_name, NameRole::ProxyResource),
            permission: derived_name(gateway_name, NameRole::Permission),
            method: derived_name(gateway_name, NameRole::Method),
            deployment: derived_name(&self.stage_name, NameRole::Deployment),
            stage: derived_name(&self.stage_name, NameRole::Stage),
            api_key: derived_name(gateway_name, NameRole::ApiKey),
        };
        // Check every name up front so a collision leaves the graph untouched
        if let Some(taken) = std::iter::once(gateway_name)
            .chain(names.children())
            .find(|id| self.graph.contains(id))
        {
            return Err(CloudError::DuplicateName(taken.to_string()));
        }
        let api = Value::reference(gateway_name);

        self.graph.add_resource(Resource::new(
            gateway_name,
            ResourceKind::RestApi(RestApi {
                name: gateway_name.to_string(),
            }),
        ))?;

        self.graph.add_resource(Resource::new(
            &names.proxy_resource,
            ResourceKind::GatewayResource(GatewayResource {
                rest_api_id: api.clone(),
                parent_id: Value::get_att(gateway_name, "RootResourceId"),
                path_part: "{proxy+}".to_string(),
            }),
        ))?;

        self.graph.add_resource(Resource::new(
            &names.permission,
            ResourceKind::Permission(Permission {
                action: "lambda:invokeFunction".to_string(),
                function_name: function.arn(),
                principal: APIGATEWAY_SERVICE.to_string(),
                source_arn: Value::join(
                    "",
                    vec![
                        "arn:aws:execute-api:".into(),
                        Value::reference(REGION),
                        ":".into(),
                        Value::reference(ACCOUNT_ID),
                        ":".into(),
                        api.clone(),
                        "/*".into(),
                    ],
                ),
            }),
        ))?;

        self.graph.add_resource(
            Resource::new(
                &names.method,
                ResourceKind::Method(Method {
                    rest_api_id: api.clone(),
                    resource_id: Value::reference(&names.proxy_resource),
                    http_method: "ANY".to_string(),
                    authorization_type: "NONE".to_string(),
                    integration: Integration {
                        integration_type: "AWS_PROXY".to_string(),
                        http_method: "POST".to_string(),
                        uri: Value::join(
                            "",
                            vec![
                                "arn:aws:apigateway:".into(),
                                Value::reference(REGION),
                                ":lambda:path/2015-03-31/functions/".into(),
                                function.arn(),
                                "/invocations".into(),
                            ],
                        ),
                    },
                    response_status_codes: vec!["200".to_string()],
                }),
            )
            .with_depends_on(&names.permission),
        )?;

        self.graph.add_resource(
            Resource::new(
                &names.deployment,
                ResourceKind::Deployment(Deployment {
                    rest_api_id: api.clone(),
                }),
            )
            .with_depends_on(&names.method),
        )?;

        self.graph.add_resource(Resource::new(
            &names.stage,
            ResourceKind::Stage(Stage {
                stage_name: self.stage_name.clone(),
                rest_api_id: api.clone(),
                deployment_id: Value::reference(&names.deployment),
            }),
        ))?;

        self.graph.add_resource(Resource::new(
            &names.api_key,
            ResourceKind::ApiKey(ApiKey {
                stage_keys: vec![StageKey {
                    rest_api_id: api,
                    stage_name: Value::reference(&names.stage),
                }],
            }),
        ))?;

        Ok(names)
    }

    /// Private bucket exported as a stack output
    pub fn add_s3_bucket(&mut self, bucket_name: &str, description: &str) -> Result<()> {
        tracing::info!("Adding S3 Bucket {}", bucket_name);
        self.graph.add_resource(Resource::new(
            bucket_name,
            ResourceKind::Bucket(Bucket::default()),
        ))?;
        self.graph
            .add_output(bucket_name, Value::reference(bucket_name), description)
    }
}
