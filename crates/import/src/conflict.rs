//! Checks candidate import addresses against what is already in state.

use strata_core::{AbsResourceInstance, Diagnostics};
use strata_state::{FilterValue, State, StateFilter};

/// Summary of the diagnostic reported for an address that already holds an
/// object.
pub const ALREADY_MANAGED: &str = "Resource already managed";

/// Report every candidate that already holds an object in `state`.
///
/// Every candidate is checked; nothing stops at the first hit. The caller is
/// expected to hold one read guard on the store across the whole call so all
/// candidates see the same state.
#[must_use]
pub fn scan_conflicts(state: &State, candidates: &[AbsResourceInstance]) -> Diagnostics {
    let filter = StateFilter::new(state);
    let mut diags = Diagnostics::new();

    for addr in candidates {
        let results = match filter.filter(&addr.to_string()) {
            Ok(results) => results,
            Err(err) => {
                diags.error(
                    "Failed to check existing state",
                    format!("Error while checking for existing {addr} in state: {err}"),
                );
                continue;
            }
        };

        for result in results {
            let FilterValue::Instance(existing) = result.value else {
                continue;
            };
            tracing::warn!(%addr, id = %existing.id, "import target already managed");
            diags.error(
                ALREADY_MANAGED,
                format!(
                    "A remote object for {addr} is already managed, with the id {:?}. \
                     To import to this address you must first remove the existing \
                     object from the state.",
                    existing.id
                ),
            );
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::{AbsProviderConfig, InstanceKey, ModuleInstance};
    use strata_state::{InstanceState, ResourceState};

    fn seeded(addrs: &[(&AbsResourceInstance, &str)]) -> State {
        let mut state = State::new();
        for (addr, id) in addrs {
            state.put(
                &addr.module,
                addr.legacy_state_key(),
                ResourceState::for_instance(
                    addr,
                    AbsProviderConfig::root("acme"),
                    InstanceState::new(*id),
                ),
            );
        }
        state
    }

    #[test]
    fn every_conflict_is_reported() {
        let a = AbsResourceInstance::managed("widget", "a");
        let b = AbsResourceInstance::managed("widget", "b");
        let c = AbsResourceInstance::managed("widget", "c");
        let state = seeded(&[(&a, "id-a"), (&c, "id-c")]);

        let diags = scan_conflicts(&state, &[a, b, c]);
        assert_eq!(diags.len(), 2);
        let details: Vec<&str> = diags.iter().map(|d| d.detail.as_str()).collect();
        assert!(details[0].contains("widget.a") && details[0].contains("\"id-a\""));
        assert!(details[1].contains("widget.c") && details[1].contains("\"id-c\""));
        assert!(diags.iter().all(|d| d.summary == ALREADY_MANAGED));
    }

    #[test]
    fn clear_addresses_report_nothing() {
        let existing = AbsResourceInstance::managed("widget", "a");
        let state = seeded(&[(&existing, "id-a")]);

        let diags = scan_conflicts(
            &state,
            &[
                AbsResourceInstance::managed("widget", "a-1"),
                AbsResourceInstance::managed("gadget", "a"),
                existing.clone().in_module(ModuleInstance::root().child("net", InstanceKey::None)),
            ],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn unkeyed_candidate_collides_with_keyed_record() {
        let keyed = AbsResourceInstance::managed("widget", "a").with_key(InstanceKey::Int(2));
        let state = seeded(&[(&keyed, "id-2")]);
        let diags = scan_conflicts(&state, &[AbsResourceInstance::managed("widget", "a")]);
        assert!(diags.has_errors());
    }

    #[test]
    fn unqueryable_candidate_is_reported_alongside_conflicts() {
        let existing = AbsResourceInstance::managed("widget", "a");
        let state = seeded(&[(&existing, "id-a")]);
        let bad_type = AbsResourceInstance::managed("1bad", "a");

        let diags = scan_conflicts(&state, &[bad_type, existing]);
        let summaries: Vec<&str> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Failed to check existing state", ALREADY_MANAGED]);
        assert!(diags.iter().next().unwrap().detail.contains("1bad.a"));
    }

    #[test]
    fn string_key_with_quotes_is_checked_like_any_other() {
        let keyed = AbsResourceInstance::managed("widget", "a")
            .with_key(InstanceKey::Str("say \"hi\"".into()));
        let state = seeded(&[(&keyed, "id-q")]);

        let diags = scan_conflicts(&state, &[keyed]);
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().all(|d| d.summary == ALREADY_MANAGED));
    }

    #[test]
    fn record_without_object_is_not_a_conflict() {
        let addr = AbsResourceInstance::managed("widget", "a");
        let mut state = State::new();
        let mut record = ResourceState::for_instance(
            &addr,
            AbsProviderConfig::root("acme"),
            InstanceState::new("x"),
        );
        record.primary = None;
        state.put(&addr.module, addr.legacy_state_key(), record);

        assert!(scan_conflicts(&state, &[addr]).is_empty());
    }
}
