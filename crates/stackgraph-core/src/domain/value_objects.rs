//! Domain value objects: StackId, LogicalId, ServiceKind, StackKind,
//! AccountId, Region, DeploymentEnvironment, Tags.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. Every
//! string-backed type is validated on construction, so a value that exists
//! is always well-formed. Per-service constants (ports, image tags, names)
//! live in `profiles.rs`, not here.
//!
//! # Adding New Service Kinds
//!
//! 1. Add the `ServiceKind` variant here
//! 2. Add the `as_str`, `FromStr` and `ALL` entries here
//! 3. Add a `ServiceProfile` in `profiles.rs`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── StackId ──────────────────────────────────────────────────────────────────

/// Unique identifier of a stack within one run.
///
/// Doubles as the CloudFormation stack name, so it follows the same rules:
/// starts with a letter, then letters, digits or hyphens, at most 128 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StackId(String);

impl StackId {
    pub const MAX_LEN: usize = 128;

    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let invalid = |reason: &str| DomainError::InvalidStackId {
            id: id.clone(),
            reason: reason.to_string(),
        };

        let Some(first) = id.chars().next() else {
            return Err(invalid("must not be empty"));
        };
        if !first.is_ascii_alphabetic() {
            return Err(invalid("must start with a letter"));
        }
        if id.len() > Self::MAX_LEN {
            return Err(invalid("must be at most 128 characters"));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid("only letters, digits and hyphens are allowed"));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StackId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StackId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StackId> for String {
    fn from(id: StackId) -> Self {
        id.0
    }
}

impl PartialEq<str> for StackId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StackId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ── LogicalId ────────────────────────────────────────────────────────────────

/// Logical id of a resource inside one stack template.
///
/// CloudFormation requires these to be alphanumeric; uniqueness within the
/// stack is enforced by `StackScope`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub const MAX_LEN: usize = 255;

    /// Validate `id` for use inside `stack`.
    pub fn new(stack: &StackId, id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("must not be empty")
        } else if id.len() > Self::MAX_LEN {
            Some("must be at most 255 characters")
        } else if !id.starts_with(|c: char| c.is_ascii_alphabetic()) {
            Some("must start with a letter")
        } else if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some("must be alphanumeric")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidLogicalId {
                stack: stack.to_string(),
                id,
                reason: reason.to_string(),
            }),
            None => Ok(Self(id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── ServiceKind ──────────────────────────────────────────────────────────────

/// One of the three e-commerce workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Products,
    Audit,
    Invoices,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [Self::Products, Self::Audit, Self::Invoices];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Audit => "audit",
            Self::Invoices => "invoices",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "products" => Ok(Self::Products),
            "audit" => Ok(Self::Audit),
            "invoices" => Ok(Self::Invoices),
            _ => Err(DomainError::UnknownStackKind(s.to_string())),
        }
    }
}

// ── StackKind ────────────────────────────────────────────────────────────────

/// The kind of stack a plan entry builds. Selects the `StackUnit` used by
/// the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StackKind {
    Registry,
    Network,
    Cluster,
    LoadBalancer,
    Service(ServiceKind),
    Gateway,
}

impl StackKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Network => "network",
            Self::Cluster => "cluster",
            Self::LoadBalancer => "load-balancer",
            Self::Service(ServiceKind::Products) => "products-service",
            Self::Service(ServiceKind::Audit) => "audit-service",
            Self::Service(ServiceKind::Invoices) => "invoices-service",
            Self::Gateway => "gateway",
        }
    }

    /// Whether this kind has no upstream inputs at all.
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Registry | Self::Network)
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "registry" | "ecr" => Ok(Self::Registry),
            "network" | "vpc" => Ok(Self::Network),
            "cluster" => Ok(Self::Cluster),
            "load-balancer" | "loadbalancer" | "nlb" => Ok(Self::LoadBalancer),
            "gateway" | "api" => Ok(Self::Gateway),
            other => match other.strip_suffix("-service") {
                Some(service) => service
                    .parse::<ServiceKind>()
                    .map(Self::Service)
                    .map_err(|_| DomainError::UnknownStackKind(s.to_string())),
                None => Err(DomainError::UnknownStackKind(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for StackKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StackKind> for String {
    fn from(kind: StackKind) -> Self {
        kind.as_str().to_string()
    }
}

// ── AccountId / Region ───────────────────────────────────────────────────────

/// A 12-digit AWS account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.len() == 12 && id.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(id))
        } else {
            Err(DomainError::InvalidEnvironment(format!(
                "account '{id}' must be exactly 12 digits"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// An AWS region code such as `us-east-1` or `us-gov-west-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn new(region: impl Into<String>) -> Result<Self, DomainError> {
        let region = region.into();
        let parts: Vec<&str> = region.split('-').collect();

        let well_formed = (3..=4).contains(&parts.len())
            && parts.iter().all(|p| {
                !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
            && parts[0].len() == 2
            && parts[0].chars().all(|c| c.is_ascii_lowercase())
            && parts
                .last()
                .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));

        if well_formed {
            Ok(Self(region))
        } else {
            Err(DomainError::InvalidEnvironment(format!(
                "region '{region}' is not a valid AWS region code"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Region {
    fn default() -> Self {
        Self("us-east-1".to_string())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Region {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

// ── DeploymentEnvironment ────────────────────────────────────────────────────

/// Target account and region of a synthesized assembly.
///
/// The account is optional: without one the templates are
/// environment-agnostic and the manifest records `unknown-account`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEnvironment {
    pub account: Option<AccountId>,
    pub region: Region,
}

impl DeploymentEnvironment {
    pub const UNKNOWN_ACCOUNT: &'static str = "unknown-account";

    pub fn new(account: Option<AccountId>, region: Region) -> Self {
        Self { account, region }
    }

    /// Parse raw strings, as read from configuration or flags.
    pub fn parse(account: Option<&str>, region: &str) -> Result<Self, DomainError> {
        Ok(Self {
            account: account.map(AccountId::new).transpose()?,
            region: Region::new(region)?,
        })
    }

    /// `aws://<account>/<region>`
    pub fn uri(&self) -> String {
        let account = self
            .account
            .as_ref()
            .map_or(Self::UNKNOWN_ACCOUNT, AccountId::as_str);
        format!("aws://{account}/{}", self.region)
    }
}

// ── Tags ─────────────────────────────────────────────────────────────────────

/// Resource tags, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub const MAX_KEY_LEN: usize = 128;
    pub const MAX_VALUE_LEN: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let key = key.into();
        let value = value.into();
        Self::validate(&key, &value)?;
        self.0.insert(key, value);
        Ok(())
    }

    pub fn with(mut self, key: &str, value: &str) -> Result<Self, DomainError> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Parse a `KEY=VALUE` pair as given on the command line.
    pub fn parse_pair(pair: &str) -> Result<(String, String), DomainError> {
        let (key, value) = pair.split_once('=').ok_or_else(|| DomainError::InvalidTag {
            key: pair.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        })?;
        Self::validate(key, value)?;
        Ok((key.to_string(), value.to_string()))
    }

    /// Returns a copy of `self` with `overrides` applied on top.
    pub fn merged(&self, overrides: &Tags) -> Tags {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Tags(merged)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(key: &str, value: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| {
            Err(DomainError::InvalidTag {
                key: key.to_string(),
                reason: reason.to_string(),
            })
        };

        if key.is_empty() {
            return invalid("key must not be empty");
        }
        if key.len() > Self::MAX_KEY_LEN {
            return invalid("key must be at most 128 characters");
        }
        if key.to_ascii_lowercase().starts_with("aws:") {
            return invalid("the 'aws:' prefix is reserved");
        }
        if value.len() > Self::MAX_VALUE_LEN {
            return invalid("value must be at most 256 characters");
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, String>> for Tags {
    type Error = DomainError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut tags = Tags::new();
        for (key, value) in map {
            tags.insert(key, value)?;
        }
        Ok(tags)
    }
}

impl From<Tags> for BTreeMap<String, String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}
