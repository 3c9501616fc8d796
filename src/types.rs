//! Core types for proxy configuration schemas.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// Keys holding definitions tables. Never emitted by the resolver.
pub const DEFINITION_KEYS: &[&str] = &["$defs", "definitions"];

/// Key marking a reference node.
pub const REF_KEY: &str = "$ref";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shape of a single schema node, decided once by looking for `$ref`.
///
/// Sibling keys next to `$ref` are ignored: a reference node means
/// "substitute the target" and nothing else.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    /// Object carrying a string `$ref`.
    Reference(&'a str),
    /// Object carrying a `$ref` that is not a string.
    InvalidReference(&'a Value),
    /// Object without `$ref`.
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    /// null, boolean, number or string.
    Primitive(&'a Value),
}

impl<'a> NodeKind<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => match map.get(REF_KEY) {
                Some(Value::String(pointer)) => NodeKind::Reference(pointer),
                Some(other) => NodeKind::InvalidReference(other),
                None => NodeKind::Object(map),
            },
            Value::Array(arr) => NodeKind::Array(arr),
            other => NodeKind::Primitive(other),
        }
    }
}

/// Service variant offered by a `oneOf` union in a services schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    LoadBalancer,
    Weighted,
    Mirroring,
    Failover,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::LoadBalancer,
        Variant::Weighted,
        Variant::Mirroring,
        Variant::Failover,
    ];

    /// Name used as the `properties` key in the schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::LoadBalancer => "loadBalancer",
            Variant::Weighted => "weighted",
            Variant::Mirroring => "mirroring",
            Variant::Failover => "failover",
        }
    }

    /// Parse a variant name. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    /// Variants the proxy offers for services of the given protocol.
    pub fn offered_by(protocol: Protocol) -> &'static [Variant] {
        match protocol {
            Protocol::Http => &Self::ALL,
            Protocol::Tcp => &[Variant::LoadBalancer, Variant::Weighted],
            Protocol::Udp => &[Variant::LoadBalancer],
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
            format!("unknown variant \"{}\": expected {}", s, names.join(", "))
        })
    }
}

/// Proxy protocol a configuration object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    /// Resource kinds with a published schema for this protocol.
    pub fn resource_kinds(&self) -> &'static [ResourceKind] {
        match self {
            Protocol::Http | Protocol::Tcp => &ResourceKind::ALL,
            Protocol::Udp => &[
                ResourceKind::Routers,
                ResourceKind::Services,
                ResourceKind::Middlewares,
            ],
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(format!(
                "unknown protocol \"{}\": expected http, tcp, or udp",
                other
            )),
        }
    }
}

/// Kind of configuration object a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Routers,
    Services,
    Middlewares,
    ServersTransport,
    Tls,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Routers,
        ResourceKind::Services,
        ResourceKind::Middlewares,
        ResourceKind::ServersTransport,
        ResourceKind::Tls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Routers => "routers",
            ResourceKind::Services => "services",
            ResourceKind::Middlewares => "middlewares",
            ResourceKind::ServersTransport => "serversTransport",
            ResourceKind::Tls => "tls",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind \"{}\"", s))
    }
}
