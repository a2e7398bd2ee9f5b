//! Role-to-capability policy
//!
//! A static declarative table maps provider roles to rule templates
//! parameterized by the principal id. Roles absent from the table contribute
//! nothing: an unrecognized role is not an error, it is simply no authority.

use callout_core::{CapabilityRule, CapabilitySet, Direction};

/// Placeholder substituted with the principal id when a template is rendered
const PRINCIPAL_VAR: &str = "{principal}";

/// A capability template bound to a role
struct RuleTemplate {
    direction: Direction,
    pattern: &'static str,
}

/// The role table. Single source of truth for what each role may do.
// TODO: collectors currently receive telemetry for any principal named in
// their token; restrict to principals that granted collection consent once
// the consent registry is available.
const ROLE_RULES: &[(&str, &[RuleTemplate])] = &[
    (
        "edge-device",
        &[RuleTemplate {
            direction: Direction::Subscribe,
            pattern: "commands.{principal}.>",
        }],
    ),
    (
        "telemetry-client",
        &[RuleTemplate {
            direction: Direction::Publish,
            pattern: "telemetry.{principal}.>",
        }],
    ),
    (
        "telemetry-collector",
        &[RuleTemplate {
            direction: Direction::Subscribe,
            pattern: "telemetry.{principal}.>",
        }],
    ),
];

/// Derive the capability set for a principal holding the given roles
///
/// Multiple roles contribute the union of their rules; duplicates collapse.
/// Never fails: unknown roles yield no rules and the empty set denies
/// everything downstream.
pub fn derive_capabilities(principal: &str, roles: &[String]) -> CapabilitySet {
    let mut capabilities = CapabilitySet::new();
    for role in roles {
        let Some((_, templates)) = ROLE_RULES.iter().find(|(name, _)| name == role) else {
            continue;
        };
        for template in *templates {
            capabilities.add(CapabilityRule {
                direction: template.direction,
                subject: template.pattern.replace(PRINCIPAL_VAR, principal),
            });
        }
    }
    capabilities
}
