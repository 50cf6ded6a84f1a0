//! CloudFormation template model

pub mod graph;
pub mod resource;
pub mod value;

pub use graph::{Output, ResourceGraph, TEMPLATE_FORMAT_VERSION, Template};
pub use resource::{
    ApiKey, Bucket, Deployment, Function, FunctionCode, GatewayResource, Integration, Method,
    Permission, Policy, PolicyDocument, Resource, ResourceKind, RestApi, Role, Stage, StageKey,
    Statement, type_tag,
};
pub use value::Value;
