//! Capability rules and the bus permission wire shape
//!
//! A capability is a single publish or subscribe grant on a subject pattern.
//! Sets of capabilities are scoped to one principal for one request and are
//! empty unless policy explicitly adds rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Direction of a capability on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Permission to publish on matching subjects
    Publish,
    /// Permission to subscribe to matching subjects
    Subscribe,
}

/// A single publish/subscribe grant on a subject pattern
///
/// Patterns may end with the bus's trailing `>` wildcard, matching any
/// suffix under the prefix (`commands.V1.>` covers `commands.V1.lock`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CapabilityRule {
    /// Grant direction
    pub direction: Direction,
    /// Subject pattern the grant applies to
    pub subject: String,
}

impl CapabilityRule {
    /// Create a publish grant
    pub fn publish(subject: impl Into<String>) -> Self {
        Self {
            direction: Direction::Publish,
            subject: subject.into(),
        }
    }

    /// Create a subscribe grant
    pub fn subscribe(subject: impl Into<String>) -> Self {
        Self {
            direction: Direction::Subscribe,
            subject: subject.into(),
        }
    }
}

/// A duplicate-free set of capability rules for one principal
///
/// Default is empty: a principal holds nothing until policy grants it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    rules: BTreeSet<CapabilityRule>,
}

impl CapabilitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule; duplicates collapse
    pub fn add(&mut self, rule: CapabilityRule) {
        self.rules.insert(rule);
    }

    /// Add every rule from an iterator
    pub fn extend(&mut self, rules: impl IntoIterator<Item = CapabilityRule>) {
        self.rules.extend(rules);
    }

    /// Check whether the set grants nothing
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get the number of distinct rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether a specific rule is granted
    pub fn contains(&self, rule: &CapabilityRule) -> bool {
        self.rules.contains(rule)
    }

    /// Iterate the rules in deterministic order
    pub fn iter(&self) -> impl Iterator<Item = &CapabilityRule> {
        self.rules.iter()
    }

    /// Render the set in the bus's permission wire shape
    pub fn to_permissions(&self) -> Permissions {
        let mut permissions = Permissions::default();
        for rule in &self.rules {
            let list = match rule.direction {
                Direction::Publish => &mut permissions.publish,
                Direction::Subscribe => &mut permissions.subscribe,
            };
            list.allow.push(rule.subject.clone());
        }
        permissions
    }
}

impl FromIterator<CapabilityRule> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = CapabilityRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// The bus's permission payload: `{"pub": {"allow": []}, "sub": {"allow": []}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// Publish grants
    #[serde(rename = "pub")]
    pub publish: PermissionList,
    /// Subscribe grants
    #[serde(rename = "sub")]
    pub subscribe: PermissionList,
}

/// One direction's allowed subject patterns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionList {
    /// Allowed subject patterns
    #[serde(default)]
    pub allow: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_grants_nothing() {
        let set = CapabilitySet::new();
        assert!(set.is_empty());
        let permissions = set.to_permissions();
        assert!(permissions.publish.allow.is_empty());
        assert!(permissions.subscribe.allow.is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = CapabilitySet::new();
        set.add(CapabilityRule::subscribe("commands.V1.>"));
        set.add(CapabilityRule::subscribe("commands.V1.>"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_subject_both_directions() {
        let mut set = CapabilitySet::new();
        set.add(CapabilityRule::publish("telemetry.V1.>"));
        set.add(CapabilityRule::subscribe("telemetry.V1.>"));
        assert_eq!(set.len(), 2);

        let permissions = set.to_permissions();
        assert_eq!(permissions.publish.allow, vec!["telemetry.V1.>"]);
        assert_eq!(permissions.subscribe.allow, vec!["telemetry.V1.>"]);
    }

    #[test]
    fn test_wire_shape() {
        let mut set = CapabilitySet::new();
        set.add(CapabilityRule::subscribe("commands.VIN123.>"));

        let encoded = serde_json::to_value(set.to_permissions()).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({
                "pub": {"allow": []},
                "sub": {"allow": ["commands.VIN123.>"]},
            })
        );
    }

    #[test]
    fn test_from_iterator() {
        let set: CapabilitySet = vec![
            CapabilityRule::publish("telemetry.V1.>"),
            CapabilityRule::publish("telemetry.V1.>"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&CapabilityRule::publish("telemetry.V1.>")));
    }
}
