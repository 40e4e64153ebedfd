//! Identifiers, restrictions and decisions.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A declared identifier (role, resource or action name).
macro_rules! define_name {
    ($name:ident, $what:literal) => {
        #[doc = concat!("Name of a declared ", $what, ".")]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a ", $what, " name.")]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_name!(RoleName, "role");
define_name!(ResourceName, "resource");
define_name!(ActionName, "action");

/// Identifier of an actor or of the actor referenced by a record field.
///
/// Equality is canonical: an integer and the string holding its decimal
/// rendering are the same identifier (`5 == "5"`), while padded or signed
/// spellings (`"05"`, `"+5"`) are not.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Numeric identifier.
    Int(i64),
    /// Opaque string identifier (UUIDs, slugs, numbers from query strings).
    Str(String),
}

impl Identifier {
    /// Canonical comparable form.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::Str(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Read an identifier out of a record field.
    ///
    /// Objects, arrays, booleans and null carry no identity and yield `None`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::Str(u.to_string()))
                } else {
                    let f = n.as_f64()?;
                    // `i64::MAX as f64` rounds up to 2^63, which `as i64` would saturate.
                    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                        Some(Self::Int(f as i64))
                    } else {
                        Some(Self::Str(n.to_string()))
                    }
                }
            }
            _ => None,
        }
    }

    /// Whether a record field refers to this identifier.
    pub fn matches_value(&self, value: &serde_json::Value) -> bool {
        Self::from_value(value).is_some_and(|other| other == *self)
    }

    /// JSON form handed to the data layer.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Str(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// The authenticated entity a request is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Identifier,
    pub role: RoleName,
}

impl Actor {
    pub fn new(id: impl Into<Identifier>, role: impl Into<RoleName>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}

/// Scope granted for a role, resource and action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Restriction {
    /// Every instance.
    #[serde(alias = "ALL")]
    All,
    /// Instances whose owner field is the actor.
    #[serde(alias = "OWN")]
    Own,
    /// Instances whose assignee field is the actor.
    #[serde(alias = "ASSIGNED")]
    Assigned,
    /// Nothing.
    #[default]
    #[serde(alias = "NONE")]
    None,
}

impl Restriction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Own => "OWN",
            Self::Assigned => "ASSIGNED",
            Self::None => "NONE",
        }
    }

    /// Whether the restriction is decided per instance.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Self::Own | Self::Assigned)
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Restriction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "own" => Ok(Self::Own),
            "assigned" => Ok(Self::Assigned),
            "none" => Ok(Self::None),
            other => Err(format!("unknown restriction `{other}`")),
        }
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Allowed,
    ForbiddenNoPermission,
    ForbiddenNotOwner,
    ForbiddenNotAssigned,
    ForbiddenInsufficientRole,
    TargetRequired,
    UnknownRole,
    MisconfiguredOwnership,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::ForbiddenNoPermission => "FORBIDDEN_NO_PERMISSION",
            Self::ForbiddenNotOwner => "FORBIDDEN_NOT_OWNER",
            Self::ForbiddenNotAssigned => "FORBIDDEN_NOT_ASSIGNED",
            Self::ForbiddenInsufficientRole => "FORBIDDEN_INSUFFICIENT_ROLE",
            Self::TargetRequired => "TARGET_REQUIRED",
            Self::UnknownRole => "UNKNOWN_ROLE",
            Self::MisconfiguredOwnership => "MISCONFIGURED_OWNERSHIP",
        }
    }

    /// Codes that point at a broken declaration or broken wiring rather than
    /// at an actor lacking access.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MisconfiguredOwnership | Self::UnknownRole)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a matrix check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub restriction: Restriction,
    pub code: ReasonCode,
}

impl Decision {
    pub(crate) fn allow(restriction: Restriction) -> Self {
        Self {
            allowed: true,
            restriction,
            code: ReasonCode::Allowed,
        }
    }

    pub(crate) fn deny(restriction: Restriction, code: ReasonCode) -> Self {
        Self {
            allowed: false,
            restriction,
            code,
        }
    }
}

/// Outcome of a role gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDecision {
    pub allowed: bool,
    pub code: ReasonCode,
}
