//
// Copyright 2026 The durarpc Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Effective-policy resolution and caching.
//!
//! Resolution folds three levels per method: global defaults, then
//! interface-level overrides, then method-level overrides. Inheritance is
//! walked breadth-first with first occurrence winning, so the most-derived
//! declaration of a method takes precedence over anything it shadows.
//! Resolution is pure; results are cached per interface and activation
//! mode.

use super::contract::{InterfaceContract, MethodDescriptor, PolicyAttributes, ReturnMode};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// The fully resolved execution policy of one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectivePolicy {
    /// Response deadline for a two-way call.
    pub timeout: Duration,
    /// Disables the durable retry loop; any disconnect mid-wait aborts the
    /// call.
    pub no_retries: bool,
    /// Preserves the timeout budget across reconnects instead of granting
    /// a fresh window per retry.
    pub timeout_is_strict: bool,
    /// The receiving side appends the sender's endpoint to the argument
    /// list.
    pub requires_endpoint: bool,
    /// Whether the call waits for a response.
    pub return_mode: ReturnMode,
}

impl EffectivePolicy {
    /// The response deadline applied when nothing overrides it.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            no_retries: false,
            timeout_is_strict: false,
            requires_endpoint: false,
            return_mode: ReturnMode::TwoWay,
        }
    }
}

/// Errors raised while registering or resolving contracts.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A contract with this name is already registered.
    #[error("interface contract {name} is already registered")]
    DuplicateContract {
        /// The conflicting interface name.
        name: String,
    },

    /// No contract with this name is registered.
    #[error("interface contract {name} is not registered")]
    UnknownContract {
        /// The missing interface name.
        name: String,
    },
}

/// The per-method policies of one interface, keyed by method name.
pub type PolicyTable = BTreeMap<String, EffectivePolicy>;

/// Holds registered contracts and caches their resolved policy tables.
///
/// Contracts are immutable after registration, so a cached table never
/// goes stale. Tables are keyed by interface name and activation mode,
/// because the activation mode decides the default return mode of void
/// methods.
///
/// # Examples
///
/// ```rust
/// use durarpc::policy::{ContractBuilder, PolicyRegistry, ReturnMode};
///
/// # fn example() -> Result<(), durarpc::policy::PolicyError> {
/// let registry = PolicyRegistry::new();
/// registry.register(
///     ContractBuilder::new("IEcho")
///         .method("Echo", 1, true, |m| m)
///         .build(),
/// )?;
///
/// let table = registry.resolve("IEcho", ReturnMode::TwoWay)?;
/// assert_eq!(table["Echo"].return_mode, ReturnMode::TwoWay);
/// # Ok(())
/// # }
/// ```
pub struct PolicyRegistry {
    contracts: RwLock<HashMap<String, Arc<InterfaceContract>>>,
    cache: RwLock<HashMap<(String, ReturnMode), Arc<PolicyTable>>>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contracts: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a contract.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateContract`] if the name is taken.
    pub fn register(&self, contract: InterfaceContract) -> Result<(), PolicyError> {
        let mut contracts = self.contracts.write();
        if contracts.contains_key(contract.name()) {
            return Err(PolicyError::DuplicateContract {
                name: contract.name().to_string(),
            });
        }
        debug!(interface = contract.name(), "interface contract registered");
        contracts.insert(contract.name().to_string(), Arc::new(contract));
        Ok(())
    }

    /// Returns the registered contract with the given name.
    #[must_use]
    pub fn contract(&self, name: &str) -> Option<Arc<InterfaceContract>> {
        self.contracts.read().get(name).cloned()
    }

    /// Resolves the policy table of an interface under the given activation
    /// mode.
    ///
    /// The activation mode is the return mode void methods default to; a
    /// value-returning method defaults to two-way regardless. Forced
    /// return-mode declarations beat both defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownContract`] if the interface or any
    /// interface it extends is not registered.
    pub fn resolve(
        &self,
        interface: &str,
        activation_mode: ReturnMode,
    ) -> Result<Arc<PolicyTable>, PolicyError> {
        let key = (interface.to_string(), activation_mode);
        if let Some(table) = self.cache.read().get(&key) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.resolve_uncached(interface, activation_mode)?);
        self.cache.write().insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Resolves the policy of one method.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownContract`] for unregistered
    /// interfaces. An unknown method resolves to `None` inside `Ok`.
    pub fn resolve_method(
        &self,
        interface: &str,
        method: &str,
        activation_mode: ReturnMode,
    ) -> Result<Option<EffectivePolicy>, PolicyError> {
        Ok(self
            .resolve(interface, activation_mode)?
            .get(method)
            .copied())
    }

    fn resolve_uncached(
        &self,
        interface: &str,
        activation_mode: ReturnMode,
    ) -> Result<PolicyTable, PolicyError> {
        let contracts = self.contracts.read();
        let lookup = |name: &str| -> Result<Arc<InterfaceContract>, PolicyError> {
            contracts
                .get(name)
                .cloned()
                .ok_or_else(|| PolicyError::UnknownContract {
                    name: name.to_string(),
                })
        };

        let mut table = PolicyTable::new();
        let mut queue = VecDeque::from([lookup(interface)?]);
        let mut visited: HashSet<String> = HashSet::from([interface.to_string()]);

        while let Some(contract) = queue.pop_front() {
            for method in contract.methods() {
                // First occurrence wins: a method already resolved at a
                // more-derived level shadows this declaration.
                if !table.contains_key(&method.name) {
                    table.insert(
                        method.name.clone(),
                        fold_policy(contract.attributes(), method, activation_mode),
                    );
                }
            }
            for parent in contract.extends() {
                if visited.insert(parent.clone()) {
                    queue.push_back(lookup(parent)?);
                }
            }
        }

        debug!(
            interface,
            %activation_mode,
            methods = table.len(),
            "policy table resolved"
        );
        Ok(table)
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn fold_policy(
    interface_attrs: &PolicyAttributes,
    method: &MethodDescriptor,
    activation_mode: ReturnMode,
) -> EffectivePolicy {
    let mut policy = EffectivePolicy::default();
    for attrs in [interface_attrs, &method.attributes] {
        if let Some(timeout) = attrs.timeout {
            policy.timeout = timeout;
        }
        if let Some(no_retries) = attrs.no_retries {
            policy.no_retries = no_retries;
        }
        if let Some(strict) = attrs.timeout_is_strict {
            policy.timeout_is_strict = strict;
        }
        if let Some(requires) = attrs.requires_endpoint {
            policy.requires_endpoint = requires;
        }
    }

    let default_mode = if method.returns_value {
        ReturnMode::TwoWay
    } else {
        activation_mode
    };
    policy.return_mode = method
        .attributes
        .forced_return_mode
        .or(interface_attrs.forced_return_mode)
        .unwrap_or(default_mode);
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ContractBuilder;

    fn registry_with(contracts: Vec<InterfaceContract>) -> PolicyRegistry {
        let registry = PolicyRegistry::new();
        for contract in contracts {
            registry.register(contract).unwrap();
        }
        registry
    }

    #[test]
    fn test_defaults_applied() {
        let registry = registry_with(vec![ContractBuilder::new("IEcho")
            .method("Echo", 1, true, |m| m)
            .build()]);

        let table = registry.resolve("IEcho", ReturnMode::TwoWay).unwrap();
        let policy = table["Echo"];
        assert_eq!(policy.timeout, EffectivePolicy::DEFAULT_TIMEOUT);
        assert!(!policy.no_retries);
        assert!(!policy.timeout_is_strict);
        assert!(!policy.requires_endpoint);
        assert_eq!(policy.return_mode, ReturnMode::TwoWay);
    }

    #[test]
    fn test_method_override_beats_interface() {
        let registry = registry_with(vec![ContractBuilder::new("ISlow")
            .timeout(Duration::from_secs(30))
            .method("Quick", 0, true, |m| m.timeout(Duration::from_secs(2)))
            .method("Slow", 0, true, |m| m)
            .build()]);

        let table = registry.resolve("ISlow", ReturnMode::TwoWay).unwrap();
        assert_eq!(table["Quick"].timeout, Duration::from_secs(2));
        assert_eq!(table["Slow"].timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_void_method_follows_activation_mode() {
        let registry = registry_with(vec![ContractBuilder::new("INotify")
            .method("Notify", 1, false, |m| m)
            .method("Query", 0, true, |m| m)
            .build()]);

        let one_way = registry.resolve("INotify", ReturnMode::OneWay).unwrap();
        assert_eq!(one_way["Notify"].return_mode, ReturnMode::OneWay);
        // A value-returning method is two-way regardless of activation.
        assert_eq!(one_way["Query"].return_mode, ReturnMode::TwoWay);

        let two_way = registry.resolve("INotify", ReturnMode::TwoWay).unwrap();
        assert_eq!(two_way["Notify"].return_mode, ReturnMode::TwoWay);
    }

    #[test]
    fn test_forced_return_mode_wins() {
        let registry = registry_with(vec![ContractBuilder::new("IMixed")
            .method("FireAndForget", 1, true, |m| {
                m.forced_return_mode(ReturnMode::OneWay)
            })
            .method("Confirm", 0, false, |m| {
                m.forced_return_mode(ReturnMode::TwoWay)
            })
            .build()]);

        let table = registry.resolve("IMixed", ReturnMode::TwoWay).unwrap();
        assert_eq!(table["FireAndForget"].return_mode, ReturnMode::OneWay);

        let table = registry.resolve("IMixed", ReturnMode::OneWay).unwrap();
        assert_eq!(table["Confirm"].return_mode, ReturnMode::TwoWay);
    }

    #[test]
    fn test_first_occurrence_wins_across_inheritance() {
        let registry = registry_with(vec![
            ContractBuilder::new("IBase")
                .method("Shared", 0, true, |m| m.timeout(Duration::from_secs(90)))
                .method("BaseOnly", 0, true, |m| m)
                .build(),
            ContractBuilder::new("IDerived")
                .extends("IBase")
                .method("Shared", 0, true, |m| m.timeout(Duration::from_secs(3)))
                .build(),
        ]);

        let table = registry.resolve("IDerived", ReturnMode::TwoWay).unwrap();
        // The derived declaration shadows the base one.
        assert_eq!(table["Shared"].timeout, Duration::from_secs(3));
        // Inherited methods are still present.
        assert_eq!(
            table["BaseOnly"].timeout,
            EffectivePolicy::DEFAULT_TIMEOUT
        );
    }

    #[test]
    fn test_diamond_inheritance_resolves_once() {
        let registry = registry_with(vec![
            ContractBuilder::new("IRoot")
                .method("Ping", 0, true, |m| m)
                .build(),
            ContractBuilder::new("ILeft").extends("IRoot").build(),
            ContractBuilder::new("IRight").extends("IRoot").build(),
            ContractBuilder::new("IDiamond")
                .extends("ILeft")
                .extends("IRight")
                .build(),
        ]);

        let table = registry.resolve("IDiamond", ReturnMode::TwoWay).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains_key("Ping"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let registry = registry_with(vec![
            ContractBuilder::new("IBase")
                .method("A", 0, true, |m| m.strict_timeout())
                .build(),
            ContractBuilder::new("IDerived")
                .extends("IBase")
                .method("B", 1, false, |m| m.requires_endpoint())
                .build(),
        ]);

        let first = registry.resolve("IDerived", ReturnMode::TwoWay).unwrap();
        let second = registry.resolve("IDerived", ReturnMode::TwoWay).unwrap();
        assert_eq!(*first, *second);
        // The second resolution is served from cache.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_contract() {
        let registry = PolicyRegistry::new();
        assert!(matches!(
            registry.resolve("IMissing", ReturnMode::TwoWay),
            Err(PolicyError::UnknownContract { .. })
        ));
    }

    #[test]
    fn test_unknown_parent() {
        let registry = registry_with(vec![ContractBuilder::new("IOrphan")
            .extends("INowhere")
            .build()]);
        assert!(matches!(
            registry.resolve("IOrphan", ReturnMode::TwoWay),
            Err(PolicyError::UnknownContract { .. })
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = registry_with(vec![ContractBuilder::new("IEcho").build()]);
        assert!(matches!(
            registry.register(ContractBuilder::new("IEcho").build()),
            Err(PolicyError::DuplicateContract { .. })
        ));
    }

    #[test]
    fn test_resolve_method() {
        let registry = registry_with(vec![ContractBuilder::new("IEcho")
            .method("Echo", 1, true, |m| m.requires_endpoint())
            .build()]);

        let policy = registry
            .resolve_method("IEcho", "Echo", ReturnMode::TwoWay)
            .unwrap()
            .unwrap();
        assert!(policy.requires_endpoint);

        assert!(registry
            .resolve_method("IEcho", "Missing", ReturnMode::TwoWay)
            .unwrap()
            .is_none());
    }
}
