//! Target addresses for the objects one import discovered.

use std::collections::HashMap;

use strata_core::AbsResourceInstance;
use strata_state::InstanceState;

/// The address `state` would be stored at before de-duplication: the
/// declared address, with the resource type replaced by the state's
/// ephemeral type when it has one.
#[must_use]
pub fn candidate_address(
    declared: &AbsResourceInstance,
    state: &InstanceState,
) -> AbsResourceInstance {
    let mut addr = declared.clone();
    if !state.ephemeral.type_name.is_empty() {
        addr.resource.resource.type_name.clone_from(&state.ephemeral.type_name);
    }
    addr
}

/// One pairwise-distinct address per discovered state, in input order.
///
/// The first state landing on a given candidate address keeps it. Each later
/// one gets `-1`, `-2`, ... appended to the resource name.
#[must_use]
pub fn resolve_target_addresses(
    declared: &AbsResourceInstance,
    states: &[InstanceState],
) -> Vec<AbsResourceInstance> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    states
        .iter()
        .map(|state| {
            let mut addr = candidate_address(declared, state);
            match seen.get_mut(&addr.to_string()) {
                Some(count) => {
                    *count += 1;
                    addr.resource.resource.name = format!("{}-{count}", addr.name());
                }
                None => {
                    seen.insert(addr.to_string(), 0);
                }
            }
            addr
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use strata_core::{InstanceKey, ModuleInstance};

    fn typed(t: &str) -> InstanceState {
        InstanceState::new("x").with_type(t)
    }

    fn rendered(addrs: &[AbsResourceInstance]) -> Vec<String> {
        addrs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn ephemeral_type_replaces_declared_type() {
        let declared = AbsResourceInstance::managed("r", "a");
        assert_eq!(candidate_address(&declared, &typed("widget")).to_string(), "widget.a");
        assert_eq!(candidate_address(&declared, &InstanceState::new("x")).to_string(), "r.a");
    }

    #[test]
    fn repeats_get_increasing_suffixes() {
        let declared = AbsResourceInstance::managed("r", "a");
        let states = vec![typed("widget"), typed("widget"), typed("gadget"), typed("widget")];
        assert_eq!(
            rendered(&resolve_target_addresses(&declared, &states)),
            vec!["widget.a", "widget.a-1", "gadget.a", "widget.a-2"]
        );
    }

    #[test]
    fn suffix_goes_on_name_not_key() {
        let declared = AbsResourceInstance::managed("r", "a")
            .with_key(InstanceKey::Int(0))
            .in_module(ModuleInstance::root().child("net", InstanceKey::None));
        let states = vec![typed("widget"), typed("widget")];
        assert_eq!(
            rendered(&resolve_target_addresses(&declared, &states)),
            vec!["module.net.widget.a[0]", "module.net.widget.a-1[0]"]
        );
    }

    #[test]
    fn no_states_no_addresses() {
        let declared = AbsResourceInstance::managed("r", "a");
        assert!(resolve_target_addresses(&declared, &[]).is_empty());
    }

    proptest! {
        #[test]
        fn addresses_are_pairwise_distinct(
            types in prop::collection::vec(
                prop::sample::select(vec!["", "widget", "gadget", "r"]),
                0..24,
            )
        ) {
            let declared = AbsResourceInstance::managed("r", "a");
            let states: Vec<InstanceState> = types.iter().map(|t| typed(t)).collect();
            let addrs = resolve_target_addresses(&declared, &states);

            prop_assert_eq!(addrs.len(), states.len());
            let unique: HashSet<String> = addrs.iter().map(ToString::to_string).collect();
            prop_assert_eq!(unique.len(), addrs.len());
        }

        #[test]
        fn m_repeats_get_suffixes_one_to_m(m in 0usize..16) {
            let declared = AbsResourceInstance::managed("r", "a");
            let states = vec![typed("widget"); m + 1];
            let addrs = resolve_target_addresses(&declared, &states);

            prop_assert_eq!(addrs[0].name(), "a");
            for (i, addr) in addrs.iter().enumerate().skip(1) {
                prop_assert_eq!(addr.name().to_owned(), format!("a-{i}"));
            }
        }
    }
}
