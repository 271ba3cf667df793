//! Ability evaluation
//!
//! Two pure read operations over a compiled ability:
//!
//! - [`can`]: instance check, "last matching rule wins", default deny.
//! - [`filter_for`]: fold the rules for one action, in list order, into a
//!   query filter. Grants are ORed in, denials AND the negation of their
//!   conditions into whatever has been allowed so far.

use crate::ability::compiler::Ability;
use crate::ability::filter::Filter;
use crate::ability::rule::Rule;
use crate::ability::subject::Subject;
use crate::ability::types::Action;
use tracing::trace;

/// Can the ability perform `action` on `instance`?
pub fn can(ability: &Ability, action: Action, instance: &dyn Subject) -> bool {
    let subject = instance.resource_type();

    let decision = ability
        .rules()
        .iter()
        .rev()
        .filter(|rule| rule.applies_to(subject, action))
        .find(|rule| rule.matches(instance))
        .map(|rule| !rule.inverted);

    trace!(
        subject = %subject,
        action = %action,
        decision = ?decision,
        "Evaluated instance check"
    );

    decision.unwrap_or(false)
}

/// Compile the rules for `action` into a query filter
pub fn filter_for(ability: &Ability, action: Action) -> Filter {
    rules_for(ability, action).fold(Filter::Nothing, |allowed, rule| {
        let selected = rule
            .conditions
            .as_ref()
            .map_or(Filter::Everything, Filter::from_condition);

        if rule.inverted {
            allowed.and(selected.negate())
        } else {
            allowed.or(selected)
        }
    })
}

/// Whether any grant for `action` survives the last unconditional denial.
///
/// When this is false the action is categorically unavailable to the
/// session, whatever the target record.
pub fn has_grant(ability: &Ability, action: Action) -> bool {
    let rules: Vec<&Rule> = rules_for(ability, action).collect();
    let start = rules
        .iter()
        .rposition(|rule| rule.inverted && rule.is_unconditional())
        .map_or(0, |idx| idx + 1);

    rules[start..].iter().any(|rule| !rule.inverted)
}

fn rules_for(ability: &Ability, action: Action) -> impl Iterator<Item = &Rule> {
    let subject = ability.subject();
    ability
        .rules()
        .iter()
        .filter(move |rule| rule.applies_to(subject, action))
}
