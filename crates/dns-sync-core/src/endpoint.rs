//! Endpoint model shared by sources, providers and the plan engine.
//!
//! An [`Endpoint`] is a single desired or observed DNS name→target mapping.
//! The plan engine aggregates endpoints that share a record type and name
//! into an [`EndpointSet`], the unit of change handed to providers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Reserved label key identifying the instance that owns a record.
///
/// Providers populate this label on current-state endpoints; the registry
/// layer uses it to keep one instance from deleting or rewriting records
/// created by another (see [`crate::registry`]).
pub const OWNER_LABEL_KEY: &str = "dns-sync/owner";

/// Labels attached to an endpoint or endpoint set.
pub type Labels = HashMap<String, String>;

/// DNS record type carried by an endpoint.
///
/// Record types this crate does not interpret are carried opaquely in
/// [`RecordType::Other`]: they compare by string value, never match the
/// known cases, and round-trip unchanged through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordType {
    /// A record (IPv4 address)
    A,
    /// CNAME record (canonical name)
    Cname,
    /// TXT record (free-form text)
    Txt,
    /// Internal indirection pseudo-type, never emitted to a backend.
    ///
    /// A desired endpoint with this type resolves against the plan's alias
    /// index instead of contributing a literal record (see [`crate::plan`]).
    InternalAlias,
    /// Any record type this crate does not interpret.
    Other(String),
}

impl RecordType {
    /// Wire spelling of the record type.
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::InternalAlias => "INTERNAL-ALIAS",
            RecordType::Other(other) => other,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "A" => RecordType::A,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            "INTERNAL-ALIAS" => RecordType::InternalAlias,
            _ => RecordType::Other(value),
        }
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecordType::from(s.to_string()))
    }
}

/// A single desired or observed DNS mapping.
///
/// `alias_target == true` marks the endpoint as a non-emitted indirection
/// record: "this DNS name currently resolves, via some out-of-band
/// mechanism, to `target` with the concrete `record_type`". Alias-target
/// endpoints are consumed by the plan's alias index and never become
/// records themselves.
///
/// Endpoints are plain immutable data; construct one and hand it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// The DNS name this endpoint maps (case-sensitive in this model).
    pub dns_name: String,

    /// The literal target, or the aliased name for `InternalAlias` records.
    pub target: String,

    /// Record type of the mapping.
    pub record_type: RecordType,

    /// Marks the endpoint as an alias-index entry rather than a record.
    #[serde(default)]
    pub alias_target: bool,

    /// Labels attached to the endpoint (ownership metadata on current state).
    #[serde(default)]
    pub labels: Labels,
}

impl Endpoint {
    /// Create a regular endpoint with no labels.
    pub fn new(
        dns_name: impl Into<String>,
        target: impl Into<String>,
        record_type: RecordType,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            target: target.into(),
            record_type,
            alias_target: false,
            labels: Labels::new(),
        }
    }

    /// Create an alias-target endpoint for the plan's alias index.
    pub fn new_alias_target(
        dns_name: impl Into<String>,
        target: impl Into<String>,
        record_type: RecordType,
    ) -> Self {
        Self {
            alias_target: true,
            ..Self::new(dns_name, target, record_type)
        }
    }

    /// Attach a single label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Replace the label set.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.record_type, self.dns_name, self.target)
    }
}

/// The aggregated unit of change: all targets for one (type, name) record.
///
/// `targets` may contain duplicates when multiple contributing endpoints
/// resolve to the same literal value; compare target lists with
/// [`targets_match`], never positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSet {
    /// The DNS name of the record.
    pub dns_name: String,

    /// Record type of the record.
    pub record_type: RecordType,

    /// All target values, in aggregation order.
    pub targets: Vec<String>,

    /// Current-state labels (empty on sets built from desired state).
    #[serde(default)]
    pub labels: Labels,
}

impl EndpointSet {
    /// Create an endpoint set with no labels.
    pub fn new(
        dns_name: impl Into<String>,
        record_type: RecordType,
        targets: Vec<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type,
            targets,
            labels: Labels::new(),
        }
    }

    /// Replace the label set.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// The owner id recorded on this set, with an absent label read as "".
    pub fn owner(&self) -> &str {
        self.labels
            .get(OWNER_LABEL_KEY)
            .map_or("", String::as_str)
    }
}

impl fmt::Display for EndpointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.record_type,
            self.dns_name,
            self.targets.join(",")
        )
    }
}

/// Multiset equality over target lists.
///
/// Two lists match iff they hold the same elements with the same
/// multiplicities, regardless of order. Aggregation order across desired
/// and current snapshots is not guaranteed to line up, so positional
/// comparison would report false changes.
pub fn targets_match(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_round_trips_known_spellings() {
        for (ty, wire) in [
            (RecordType::A, "A"),
            (RecordType::Cname, "CNAME"),
            (RecordType::Txt, "TXT"),
            (RecordType::InternalAlias, "INTERNAL-ALIAS"),
        ] {
            assert_eq!(ty.to_string(), wire);
            assert_eq!(wire.parse::<RecordType>().unwrap(), ty);
        }
    }

    #[test]
    fn record_type_carries_unknown_values_opaquely() {
        let ty: RecordType = "SRV".parse().unwrap();
        assert_eq!(ty, RecordType::Other("SRV".to_string()));
        assert_eq!(ty.to_string(), "SRV");
        assert_ne!(ty, RecordType::A);

        // Unknown types survive a serde round trip unchanged
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"SRV\"");
        let back: RecordType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn alias_target_constructor_sets_flag() {
        let ep = Endpoint::new_alias_target("node/a/external", "1.2.3.4", RecordType::A);
        assert!(ep.alias_target);
        assert_eq!(ep.dns_name, "node/a/external");

        let ep = Endpoint::new("example.com", "1.2.3.4", RecordType::A);
        assert!(!ep.alias_target);
        assert!(ep.labels.is_empty());
    }

    #[test]
    fn targets_match_is_order_independent() {
        let a = vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()];
        let b = vec!["2.2.2.2".to_string(), "1.1.1.1".to_string()];
        assert!(targets_match(&a, &b));
        assert!(!targets_match(&a, &a[..1]));
    }

    #[test]
    fn targets_match_respects_multiplicity() {
        let twice = vec!["1.1.1.1".to_string(), "1.1.1.1".to_string()];
        let once_each = vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()];
        assert!(!targets_match(&twice, &once_each));
        assert!(targets_match(&twice, &twice));
    }

    #[test]
    fn owner_reads_absent_label_as_empty() {
        let set = EndpointSet::new("example.com", RecordType::A, vec!["1.2.3.4".to_string()]);
        assert_eq!(set.owner(), "");

        let set = set.with_labels(Labels::from([(
            OWNER_LABEL_KEY.to_string(),
            "instance-1".to_string(),
        )]));
        assert_eq!(set.owner(), "instance-1");
    }
}
