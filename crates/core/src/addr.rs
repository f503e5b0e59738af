//! Resource and provider addresses.
//!
//! Addresses render and parse with one grammar:
//!
//! ```text
//! module.<name>[<key>]...  [data.]<type>.<name>[<key>]
//! module.<name>[<key>]...  provider.<type>[.<alias>]
//! ```
//!
//! Names use ASCII letters, digits, `_` and `-`, and must not start with a
//! digit or `-`. Keys are either integers (`[0]`) or quoted strings
//! (`["blue"]`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Instance key of a resource or module call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKey {
    /// Single instance, no key.
    #[default]
    None,
    /// `count`-style integer key.
    Int(i64),
    /// `for_each`-style string key.
    Str(String),
}

impl InstanceKey {
    /// Returns `true` if this is [`InstanceKey::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int(i) => write!(f, "[{i}]"),
            Self::Str(s) => {
                f.write_str("[\"")?;
                for c in s.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"]")
            }
        }
    }
}

/// One `module.<name>[<key>]` step of a module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleStep {
    /// Module call name.
    pub name: String,
    /// Instance key of the module call.
    pub key: InstanceKey,
}

/// Path of a module instance. Empty is the root module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleInstance(Vec<ModuleStep>);

impl ModuleInstance {
    /// The root module.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` for the root module.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a child module call below this one.
    #[must_use]
    pub fn child(&self, name: impl Into<String>, key: InstanceKey) -> Self {
        let mut steps = self.0.clone();
        steps.push(ModuleStep {
            name: name.into(),
            key,
        });
        Self(steps)
    }

    /// Path of the calling module, or `None` for the root module.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Steps from the root down.
    #[must_use]
    pub fn steps(&self) -> &[ModuleStep] {
        &self.0
    }
}

impl fmt::Display for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "module.{}{}", step.name, step.key)?;
        }
        Ok(())
    }
}

impl FromStr for ModuleInstance {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut p = Parser::new(s);
        let module = p.module_path()?;
        // `module_path` leaves the separator of the next segment unread.
        if !p.at_end() {
            return Err(p.unexpected());
        }
        Ok(module)
    }
}

impl TryFrom<String> for ModuleInstance {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModuleInstance> for String {
    fn from(module: ModuleInstance) -> Self {
        module.to_string()
    }
}

/// Whether a resource is managed or read-only data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    /// A `resource` block.
    #[default]
    Managed,
    /// A `data` block.
    Data,
}

/// A resource declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource {
    /// Managed or data.
    pub mode: ResourceMode,
    /// Resource type, e.g. `acme_widget`.
    pub type_name: String,
    /// Local name.
    pub name: String,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == ResourceMode::Data {
            f.write_str("data.")?;
        }
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

/// A single instance of a [`Resource`] within its module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceInstance {
    /// The resource.
    pub resource: Resource,
    /// Instance key.
    pub key: InstanceKey,
}

impl fmt::Display for ResourceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.resource, self.key)
    }
}

/// Absolute address of a resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AbsResourceInstance {
    /// Module containing the resource.
    pub module: ModuleInstance,
    /// Resource instance within that module.
    pub resource: ResourceInstance,
}

impl AbsResourceInstance {
    /// Managed, unkeyed resource instance in the root module.
    #[must_use]
    pub fn managed(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: ModuleInstance::root(),
            resource: ResourceInstance {
                resource: Resource {
                    mode: ResourceMode::Managed,
                    type_name: type_name.into(),
                    name: name.into(),
                },
                key: InstanceKey::None,
            },
        }
    }

    /// Same address with the given instance key.
    #[must_use]
    pub fn with_key(mut self, key: InstanceKey) -> Self {
        self.resource.key = key;
        self
    }

    /// Same address placed in the given module.
    #[must_use]
    pub fn in_module(mut self, module: ModuleInstance) -> Self {
        self.module = module;
        self
    }

    /// Resource type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.resource.resource.type_name
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.resource.resource.name
    }

    /// The provider configuration implied by the resource type: the type
    /// prefix up to the first `_`, in the root module.
    #[must_use]
    pub fn default_provider_config(&self) -> AbsProviderConfig {
        let type_name = self.type_name();
        let provider = type_name.split('_').next().unwrap_or(type_name);
        AbsProviderConfig::root(provider)
    }

    /// The key this instance is stored under inside its module's state.
    ///
    /// `type.name`, prefixed with `data.` for data resources. Integer keys
    /// append `.<n>`; string keys keep their quoted `["key"]` form so they
    /// never collide with integer keys. The module path is not part of the
    /// key.
    #[must_use]
    pub fn legacy_state_key(&self) -> String {
        let mut key = self.resource.resource.to_string();
        match &self.resource.key {
            InstanceKey::None => {}
            InstanceKey::Int(i) => key.push_str(&format!(".{i}")),
            InstanceKey::Str(_) => key.push_str(&self.resource.key.to_string()),
        }
        key
    }
}

impl fmt::Display for AbsResourceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.module.is_root() {
            write!(f, "{}.", self.module)?;
        }
        write!(f, "{}", self.resource)
    }
}

impl FromStr for AbsResourceInstance {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Parser::new(s);
        let module = p.module_path()?;
        if !module.is_root() {
            p.expect('.')?;
        }
        let mode = if p.eat_keyword("data.") {
            ResourceMode::Data
        } else {
            ResourceMode::Managed
        };
        let type_name = p.name()?;
        p.expect('.')?;
        let name = p.name()?;
        let key = p.key()?;
        if !p.at_end() {
            return Err(p.unexpected());
        }
        Ok(Self {
            module,
            resource: ResourceInstance {
                resource: Resource {
                    mode,
                    type_name,
                    name,
                },
                key,
            },
        })
    }
}

impl TryFrom<String> for AbsResourceInstance {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AbsResourceInstance> for String {
    fn from(addr: AbsResourceInstance) -> Self {
        addr.to_string()
    }
}

/// Absolute address of a provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AbsProviderConfig {
    /// Module the configuration lives in.
    pub module: ModuleInstance,
    /// Provider type, e.g. `acme`.
    pub type_name: String,
    /// Optional alias for additional configurations of the same type.
    pub alias: Option<String>,
}

impl AbsProviderConfig {
    /// Default (unaliased) configuration of `type_name` in the root module.
    #[must_use]
    pub fn root(type_name: impl Into<String>) -> Self {
        Self {
            module: ModuleInstance::root(),
            type_name: type_name.into(),
            alias: None,
        }
    }

    /// Same configuration with an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Same configuration placed in the given module.
    #[must_use]
    pub fn in_module(mut self, module: ModuleInstance) -> Self {
        self.module = module;
        self
    }

    /// The same configuration one module up, or `None` in the root module.
    #[must_use]
    pub fn inherited(&self) -> Option<Self> {
        let module = self.module.parent()?;
        Some(Self {
            module,
            type_name: self.type_name.clone(),
            alias: self.alias.clone(),
        })
    }
}

impl fmt::Display for AbsProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.module.is_root() {
            write!(f, "{}.", self.module)?;
        }
        write!(f, "provider.{}", self.type_name)?;
        if let Some(alias) = &self.alias {
            write!(f, ".{alias}")?;
        }
        Ok(())
    }
}

impl FromStr for AbsProviderConfig {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Parser::new(s);
        let module = p.module_path()?;
        if !module.is_root() {
            p.expect('.')?;
        }
        if !p.eat_keyword("provider.") {
            return Err(AddressError::Expected {
                input: s.to_owned(),
                expected: "provider.",
            });
        }
        let type_name = p.name()?;
        let alias = if p.eat('.') { Some(p.name()?) } else { None };
        if !p.at_end() {
            return Err(p.unexpected());
        }
        Ok(Self {
            module,
            type_name,
            alias,
        })
    }
}

impl TryFrom<String> for AbsProviderConfig {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AbsProviderConfig> for String {
    fn from(addr: AbsProviderConfig) -> Self {
        addr.to_string()
    }
}

/// Cursor over an address string.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.rest().starts_with(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), AddressError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> AddressError {
        if self.at_end() {
            AddressError::UnexpectedEnd {
                input: self.input.to_owned(),
            }
        } else {
            AddressError::UnexpectedChar {
                input: self.input.to_owned(),
                position: self.pos,
            }
        }
    }

    /// Consume leading `module.<name>[<key>]` steps, separated by `.`.
    ///
    /// The `.` after the last step is left unread.
    fn module_path(&mut self) -> Result<ModuleInstance, AddressError> {
        let mut steps = Vec::new();
        loop {
            let before = self.pos;
            if !steps.is_empty() && !self.eat('.') {
                break;
            }
            if !self.eat_keyword("module.") {
                self.pos = before;
                break;
            }
            let name = self.name()?;
            let key = self.key()?;
            steps.push(ModuleStep { name, key });
        }
        Ok(ModuleInstance(steps))
    }

    fn name(&mut self) -> Result<String, AddressError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        let name = &rest[..len];
        match name.chars().next() {
            None => Err(self.unexpected()),
            Some(first) if first.is_ascii_digit() || first == '-' => Err(AddressError::InvalidName {
                input: self.input.to_owned(),
                name: name.to_owned(),
            }),
            Some(_) => {
                self.pos += len;
                Ok(name.to_owned())
            }
        }
    }

    fn key(&mut self) -> Result<InstanceKey, AddressError> {
        if !self.eat('[') {
            return Ok(InstanceKey::None);
        }
        let key = if self.eat('"') {
            InstanceKey::Str(self.quoted()?)
        } else {
            let rest = self.rest();
            let end = rest.find(']').ok_or_else(|| AddressError::UnexpectedEnd {
                input: self.input.to_owned(),
            })?;
            let raw = &rest[..end];
            let value = raw.parse::<i64>().map_err(|_| AddressError::InvalidKey {
                input: self.input.to_owned(),
                key: raw.to_owned(),
            })?;
            self.pos += end;
            InstanceKey::Int(value)
        };
        self.expect(']')?;
        Ok(key)
    }

    /// Body of a quoted string after its opening `"`, with `\"` and `\\`
    /// unescaped. Consumes the closing `"`.
    fn quoted(&mut self) -> Result<String, AddressError> {
        let mut value = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(value);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                _ => value.push(c),
            }
        }
        Err(AddressError::UnexpectedEnd {
            input: self.input.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("widget.a")]
    #[case("data.widget.a")]
    #[case("widget.a[0]")]
    #[case("widget.a[\"blue\"]")]
    #[case("widget.a-1")]
    #[case("module.net.widget.a")]
    #[case("module.net[2].module.edge[\"x\"].acme_widget.web[3]")]
    fn resource_address_display_matches_input(#[case] input: &str) {
        let addr: AbsResourceInstance = input.parse().unwrap();
        assert_eq!(addr.to_string(), input);
    }

    #[test]
    fn parse_resource_address_fields() {
        let addr: AbsResourceInstance = "module.net.data.acme_zone.main[1]".parse().unwrap();
        assert_eq!(addr.module, ModuleInstance::root().child("net", InstanceKey::None));
        assert_eq!(addr.resource.resource.mode, ResourceMode::Data);
        assert_eq!(addr.type_name(), "acme_zone");
        assert_eq!(addr.name(), "main");
        assert_eq!(addr.resource.key, InstanceKey::Int(1));
    }

    #[rstest]
    #[case("")]
    #[case("widget")]
    #[case("widget.")]
    #[case("widget.a.b")]
    #[case("widget.1a")]
    #[case("widget.a[x]")]
    #[case("widget.a[0")]
    #[case("module.net")]
    fn parse_rejects_malformed_resource_addresses(#[case] input: &str) {
        assert!(input.parse::<AbsResourceInstance>().is_err(), "{input:?}");
    }

    #[rstest]
    #[case("provider.acme")]
    #[case("provider.acme.west")]
    #[case("module.net.provider.acme")]
    fn provider_address_display_matches_input(#[case] input: &str) {
        let addr: AbsProviderConfig = input.parse().unwrap();
        assert_eq!(addr.to_string(), input);
    }

    #[test]
    fn provider_address_requires_keyword() {
        let err = "acme".parse::<AbsProviderConfig>().unwrap_err();
        assert!(matches!(err, AddressError::Expected { .. }));
    }

    #[test]
    fn module_instance_roundtrip_and_parent() {
        let module: ModuleInstance = "module.a.module.b[1]".parse().unwrap();
        assert_eq!(module.steps().len(), 2);
        assert_eq!(module.parent().unwrap().to_string(), "module.a");
        assert!(ModuleInstance::root().parent().is_none());
        assert!("".parse::<ModuleInstance>().unwrap().is_root());
    }

    #[rstest]
    #[case("widget.a", "widget.a")]
    #[case("data.widget.a", "data.widget.a")]
    #[case("widget.a[3]", "widget.a.3")]
    #[case("widget.a[\"k\"]", "widget.a[\"k\"]")]
    #[case("widget.a[\"0\"]", "widget.a[\"0\"]")]
    #[case("module.net.widget.a[0]", "widget.a.0")]
    fn legacy_state_key(#[case] input: &str, #[case] expected: &str) {
        let addr: AbsResourceInstance = input.parse().unwrap();
        assert_eq!(addr.legacy_state_key(), expected);
    }

    #[test]
    fn legacy_keys_distinguish_int_and_string_keys() {
        let int = AbsResourceInstance::managed("widget", "a").with_key(InstanceKey::Int(0));
        let string =
            AbsResourceInstance::managed("widget", "a").with_key(InstanceKey::Str("0".into()));
        assert_ne!(int.legacy_state_key(), string.legacy_state_key());
    }

    #[rstest]
    #[case("say \"hi\"", r#"widget.a["say \"hi\""]"#)]
    #[case(r"back\slash", r#"widget.a["back\\slash"]"#)]
    #[case("a]b", r#"widget.a["a]b"]"#)]
    fn string_keys_escape_and_roundtrip(#[case] key: &str, #[case] rendered: &str) {
        let addr =
            AbsResourceInstance::managed("widget", "a").with_key(InstanceKey::Str(key.into()));
        assert_eq!(addr.to_string(), rendered);
        let back: AbsResourceInstance = rendered.parse().unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn unterminated_string_key_is_rejected() {
        assert!(r#"widget.a["abc\"]"#.parse::<AbsResourceInstance>().is_err());
    }

    #[test]
    fn implied_provider_uses_type_prefix() {
        let addr = AbsResourceInstance::managed("acme_widget", "a");
        assert_eq!(addr.default_provider_config().to_string(), "provider.acme");

        let addr = AbsResourceInstance::managed("widget", "a");
        assert_eq!(addr.default_provider_config().to_string(), "provider.widget");
    }

    #[test]
    fn provider_inherited_walks_up_one_module() {
        let module = ModuleInstance::root()
            .child("a", InstanceKey::None)
            .child("b", InstanceKey::None);
        let provider = AbsProviderConfig::root("acme").in_module(module);
        let up = provider.inherited().unwrap();
        assert_eq!(up.to_string(), "module.a.provider.acme");
        let root = up.inherited().unwrap();
        assert_eq!(root.to_string(), "provider.acme");
        assert!(root.inherited().is_none());
    }

    #[test]
    fn addresses_serialize_as_strings() {
        let addr: AbsResourceInstance = "module.x.widget.a[0]".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"module.x.widget.a[0]\"");
        let back: AbsResourceInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
