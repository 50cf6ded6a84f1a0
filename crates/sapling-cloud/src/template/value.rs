//! Property values and intrinsic references

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Pseudo parameters are resolved by CloudFormation itself and never
/// name a resource in the graph.
const PSEUDO_PARAMETER_PREFIX: &str = "AWS::";

pub const REGION: &str = "AWS::Region";
pub const ACCOUNT_ID: &str = "AWS::AccountId";

/// A property value inside a template
///
/// `Ref`, `GetAtt` and `Join` are left symbolic and resolved by
/// CloudFormation when the stack is created.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// `{"Ref": logical_id}`
    Ref(String),
    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    GetAtt(String, String),
    /// `{"Fn::Join": [separator, [parts...]]}`
    Join(String, Vec<Value>),
}

impl Value {
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Self::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt(logical_id.into(), attribute.into())
    }

    pub fn join(separator: impl Into<String>, parts: Vec<Value>) -> Self {
        Self::Join(separator.into(), parts)
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Whether this value is an intrinsic pointer to another resource
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Ref(_) | Self::GetAtt(..))
    }

    /// Whether CloudFormation computes this value when the stack is created
    pub fn is_intrinsic(&self) -> bool {
        matches!(self, Self::Ref(_) | Self::GetAtt(..) | Self::Join(..))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Logical ids of every resource this value points at, in order of appearance
    pub fn referenced_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_references(&mut ids);
        ids
    }

    fn collect_references<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Self::Ref(id) if !id.starts_with(PSEUDO_PARAMETER_PREFIX) => ids.push(id),
            Self::GetAtt(id, _) => ids.push(id),
            Self::List(items) | Self::Join(_, items) => {
                for item in items {
                    item.collect_references(ids);
                }
            }
            Self::Map(entries) => {
                for value in entries.values() {
                    value.collect_references(ids);
                }
            }
            Self::Ref(_) | Self::String(_) | Self::Number(_) | Self::Bool(_) => {}
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_i64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Self::GetAtt(id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id, attribute])?;
                map.end()
            }
            Self::Join(separator, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(separator, parts))?;
                map.end()
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
