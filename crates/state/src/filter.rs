//! Address-pattern queries over a [`State`].

use strata_core::{AbsResourceInstance, InstanceKey, ModuleInstance};

use crate::error::StateError;
use crate::instance::InstanceState;
use crate::state::{ModuleState, ResourceState, State};

/// Queries a borrowed [`State`] by address pattern.
///
/// The caller decides how the state is protected; typically it holds a read
/// guard from [`StateStore::read`](crate::StateStore::read) for as long as
/// the filter and its results are alive.
#[derive(Debug, Clone, Copy)]
pub struct StateFilter<'a> {
    state: &'a State,
}

/// What a [`FilterResult`] points at.
#[derive(Debug, Clone, Copy)]
pub enum FilterValue<'a> {
    /// A whole module.
    Module(&'a ModuleState),
    /// A resource record.
    Resource(&'a ResourceState),
    /// The object stored in a resource record.
    Instance(&'a InstanceState),
}

/// One match of a filter query.
#[derive(Debug, Clone)]
pub struct FilterResult<'a> {
    /// Module the match lives in.
    pub path: ModuleInstance,
    /// Legacy key of the matched resource, empty for module matches.
    pub key: String,
    /// The matched value.
    pub value: FilterValue<'a>,
}

impl<'a> StateFilter<'a> {
    /// Filter over `state`.
    #[must_use]
    pub fn new(state: &'a State) -> Self {
        Self { state }
    }

    /// Everything matching `pattern`.
    ///
    /// - `""` matches every module and everything in it.
    /// - A module path (`module.a`) matches that module and its resources.
    /// - A resource address matches records in exactly that module with the
    ///   same mode, type and name. An unkeyed pattern matches every instance
    ///   key; a keyed pattern only that key. Each matching record yields a
    ///   [`FilterValue::Resource`] followed by a [`FilterValue::Instance`]
    ///   when it holds an object.
    pub fn filter(&self, pattern: &str) -> Result<Vec<FilterResult<'a>>, StateError> {
        if pattern.is_empty() {
            return Ok(self.state.modules.iter().flat_map(module_results).collect());
        }
        if let Ok(addr) = pattern.parse::<AbsResourceInstance>() {
            return Ok(self.resource_results(&addr));
        }
        match pattern.parse::<ModuleInstance>() {
            Ok(path) => Ok(self.state.module(&path).map(module_results).unwrap_or_default()),
            Err(source) => Err(StateError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            }),
        }
    }

    fn resource_results(&self, addr: &AbsResourceInstance) -> Vec<FilterResult<'a>> {
        let Some(module) = self.state.module(&addr.module) else {
            return Vec::new();
        };
        let wanted = &addr.resource.resource;
        let mut results = Vec::new();
        for (key, record) in &module.resources {
            let same_resource = record.mode == wanted.mode
                && record.type_name == wanted.type_name
                && record.name == wanted.name;
            let key_matches =
                addr.resource.key == InstanceKey::None || addr.resource.key == record.key;
            if same_resource && key_matches {
                push_record(&mut results, &module.path, key, record);
            }
        }
        results
    }
}

fn module_results(module: &ModuleState) -> Vec<FilterResult<'_>> {
    let mut results = vec![FilterResult {
        path: module.path.clone(),
        key: String::new(),
        value: FilterValue::Module(module),
    }];
    for (key, record) in &module.resources {
        push_record(&mut results, &module.path, key, record);
    }
    results
}

fn push_record<'a>(
    results: &mut Vec<FilterResult<'a>>,
    path: &ModuleInstance,
    key: &str,
    record: &'a ResourceState,
) {
    results.push(FilterResult {
        path: path.clone(),
        key: key.to_owned(),
        value: FilterValue::Resource(record),
    });
    if let Some(primary) = &record.primary {
        results.push(FilterResult {
            path: path.clone(),
            key: key.to_owned(),
            value: FilterValue::Instance(primary),
        });
    }
}
