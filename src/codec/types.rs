//! Closed enumerations for the string-typed record fields.
//!
//! Each enum has exactly one table mapping variants to their on-disk strings.
//! Decoding an unrecognised string logs a warning and yields the `Unknown`
//! sentinel instead of failing the build.

use std::fmt;

/// Node type carried in the `NodeType` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Branch,
    Sensor,
    Actuator,
    Attribute,
    Struct,
    Property,
    Unknown,
}

const NODE_KINDS: &[(NodeKind, &str)] = &[
    (NodeKind::Branch, "branch"),
    (NodeKind::Sensor, "sensor"),
    (NodeKind::Actuator, "actuator"),
    (NodeKind::Attribute, "attribute"),
    (NodeKind::Struct, "struct"),
    (NodeKind::Property, "property"),
];

impl NodeKind {
    pub fn from_wire(value: &str) -> Self {
        lookup(NODE_KINDS, value).unwrap_or_else(|| {
            log::warn!("unknown node type |{value}|");
            NodeKind::Unknown
        })
    }

    /// On-disk string; empty for [`NodeKind::Unknown`].
    pub fn as_str(self) -> &'static str {
        reverse(NODE_KINDS, self)
    }

    /// Branches and structs group other nodes and carry no signal metadata.
    pub fn is_branch(self) -> bool {
        matches!(self, NodeKind::Branch | NodeKind::Struct)
    }

    pub fn is_leaf_kind(self) -> bool {
        matches!(
            self,
            NodeKind::Sensor | NodeKind::Actuator | NodeKind::Attribute | NodeKind::Property
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Value type of a signal or attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Datatype {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Double,
    Float,
    Boolean,
    String,
    Int8Array,
    Uint8Array,
    Int16Array,
    Uint16Array,
    Int32Array,
    Uint32Array,
    Int64Array,
    Uint64Array,
    DoubleArray,
    FloatArray,
    BooleanArray,
    StringArray,
    Unknown,
}

const DATATYPES: &[(Datatype, &str)] = &[
    (Datatype::Int8, "int8"),
    (Datatype::Uint8, "uint8"),
    (Datatype::Int16, "int16"),
    (Datatype::Uint16, "uint16"),
    (Datatype::Int32, "int32"),
    (Datatype::Uint32, "uint32"),
    (Datatype::Int64, "int64"),
    (Datatype::Uint64, "uint64"),
    (Datatype::Double, "double"),
    (Datatype::Float, "float"),
    (Datatype::Boolean, "boolean"),
    (Datatype::String, "string"),
    (Datatype::Int8Array, "int8[]"),
    (Datatype::Uint8Array, "uint8[]"),
    (Datatype::Int16Array, "int16[]"),
    (Datatype::Uint16Array, "uint16[]"),
    (Datatype::Int32Array, "int32[]"),
    (Datatype::Uint32Array, "uint32[]"),
    (Datatype::Int64Array, "int64[]"),
    (Datatype::Uint64Array, "uint64[]"),
    (Datatype::DoubleArray, "double[]"),
    (Datatype::FloatArray, "float[]"),
    (Datatype::BooleanArray, "boolean[]"),
    (Datatype::StringArray, "string[]"),
];

impl Datatype {
    /// Decodes the datatype field. An empty field means "no datatype".
    pub fn from_wire(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(lookup(DATATYPES, value).unwrap_or_else(|| {
            log::warn!("unknown datatype |{value}|");
            Datatype::Unknown
        }))
    }

    pub fn as_str(self) -> &'static str {
        reverse(DATATYPES, self)
    }

    pub fn is_array(self) -> bool {
        self.as_str().ends_with("[]")
    }

    /// Scalar element type of an array datatype; scalars map to themselves.
    pub fn element(self) -> Self {
        match self.as_str().strip_suffix("[]") {
            Some(scalar) => lookup(DATATYPES, scalar).unwrap_or(Datatype::Unknown),
            None => self,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Access-control hint carried per node.
///
/// Ordering follows the precedence used when combining hints along a path:
/// read-write beats write-only, and consent beats no consent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Validate {
    #[default]
    None,
    WriteOnly,
    ReadWrite,
    WriteOnlyConsent,
    ReadWriteConsent,
}

const VALIDATES: &[(Validate, &str)] = &[
    (Validate::None, ""),
    (Validate::WriteOnly, "write-only"),
    (Validate::ReadWrite, "read-write"),
    (Validate::WriteOnlyConsent, "write-only+consent"),
    (Validate::ReadWriteConsent, "read-write+consent"),
];

impl Validate {
    pub fn from_wire(value: &str) -> Self {
        lookup(VALIDATES, value).unwrap_or_else(|| {
            log::warn!("unknown validate value |{value}|");
            Validate::None
        })
    }

    pub fn as_str(self) -> &'static str {
        reverse(VALIDATES, self)
    }

    /// 0 = none, 1 = write-only, 2 = read-write.
    pub fn access_level(self) -> u8 {
        match self {
            Validate::None => 0,
            Validate::WriteOnly | Validate::WriteOnlyConsent => 1,
            Validate::ReadWrite | Validate::ReadWriteConsent => 2,
        }
    }

    pub fn requires_consent(self) -> bool {
        matches!(self, Validate::WriteOnlyConsent | Validate::ReadWriteConsent)
    }

    /// Combines two hints, keeping the strongest access level and any consent.
    pub fn strongest(self, other: Validate) -> Validate {
        let access = self.access_level().max(other.access_level());
        let consent = self.requires_consent() || other.requires_consent();
        match (access, consent) {
            (2, true) => Validate::ReadWriteConsent,
            (1, true) => Validate::WriteOnlyConsent,
            // consent without an access level is not representable on disk
            (0, _) => Validate::None,
            (2, false) => Validate::ReadWrite,
            _ => Validate::WriteOnly,
        }
    }
}

impl fmt::Display for Validate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validate::None => f.write_str("none"),
            other => f.write_str(other.as_str()),
        }
    }
}

fn lookup<T: Copy>(table: &[(T, &'static str)], value: &str) -> Option<T> {
    table
        .iter()
        .find(|(_, name)| *name == value)
        .map(|(variant, _)| *variant)
}

fn reverse<T: Copy + PartialEq>(table: &[(T, &'static str)], variant: T) -> &'static str {
    table
        .iter()
        .find(|(candidate, _)| *candidate == variant)
        .map(|(_, name)| *name)
        .unwrap_or("")
}
