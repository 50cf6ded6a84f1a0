//! Logical-id naming policy
//!
//! Child resources take their logical ids from a caller-chosen base name
//! and a fixed suffix per role. Two independently named gateways that share
//! a base name will collide; avoiding that is up to the caller.

/// What a derived resource is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    /// `{proxy+}` resource under the API root
    ProxyResource,
    /// Grant allowing the gateway to invoke the function
    Permission,
    /// `ANY` method routed to the function
    Method,
    ApiKey,
    /// Deployment, keyed by stage name
    Deployment,
    /// Stage, keyed by stage name
    Stage,
}

impl NameRole {
    pub fn suffix(&self) -> &'static str {
        match self {
            NameRole::ProxyResource => "Resource",
            NameRole::Permission => "LambdaPermission",
            NameRole::Method => "LambdaMethod",
            NameRole::ApiKey => "ApiKey",
            NameRole::Deployment => "Deployment",
            NameRole::Stage => "Stage",
        }
    }
}

pub fn derived_name(base: &str, role: NameRole) -> String {
    format!("{}{}", base, role.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        assert_eq!(derived_name("Api", NameRole::ProxyResource), "ApiResource");
        assert_eq!(
            derived_name("Api", NameRole::Permission),
            "ApiLambdaPermission"
        );
        assert_eq!(derived_name("Api", NameRole::Method), "ApiLambdaMethod");
        assert_eq!(derived_name("Api", NameRole::ApiKey), "ApiApiKey");
        assert_eq!(derived_name("v1", NameRole::Deployment), "v1Deployment");
        assert_eq!(derived_name("v1", NameRole::Stage), "v1Stage");
    }

    #[test]
    fn test_distinct_roles_never_collide_for_one_base() {
        let roles = [
            NameRole::ProxyResource,
            NameRole::Permission,
            NameRole::Method,
            NameRole::ApiKey,
            NameRole::Deployment,
            NameRole::Stage,
        ];
        let mut names: Vec<String> = roles.iter().map(|r| derived_name("X", *r)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), roles.len());
    }
}
