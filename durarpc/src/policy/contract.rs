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

//! Interface contracts and their declared policy attributes.
//!
//! A contract is the static description of one remote interface: its name,
//! the interfaces it extends, and its methods with their declared policy
//! overrides. Contracts are immutable once built; the
//! [`resolver`](super::resolver) folds them into effective per-method
//! policies.

use std::fmt;
use std::time::Duration;

/// How a resolved method returns to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnMode {
    /// Fire and forget; the caller never waits for a response.
    OneWay,
    /// The caller blocks until a response or exception arrives.
    TwoWay,
}

impl fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneWay => f.write_str("one-way"),
            Self::TwoWay => f.write_str("two-way"),
        }
    }
}

/// Declared policy overrides. Every field is optional; `None` means
/// "inherit from the level above".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyAttributes {
    /// Response deadline override.
    pub timeout: Option<Duration>,
    /// Disables the durable retry loop for the method when `Some(true)`.
    pub no_retries: Option<bool>,
    /// Preserves the timeout budget across reconnects when `Some(true)`.
    pub timeout_is_strict: Option<bool>,
    /// Requests sender-endpoint injection when `Some(true)`.
    pub requires_endpoint: Option<bool>,
    /// Pins the return mode regardless of the computed default.
    pub forced_return_mode: Option<ReturnMode>,
}

impl PolicyAttributes {
    /// Returns true if no override is declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.timeout.is_none()
            && self.no_retries.is_none()
            && self.timeout_is_strict.is_none()
            && self.requires_endpoint.is_none()
            && self.forced_return_mode.is_none()
    }
}

/// One method of an interface contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name, unique within its interface.
    pub name: String,
    /// Number of declared parameters.
    pub arity: usize,
    /// Whether the method produces a value.
    pub returns_value: bool,
    /// Declared method-level overrides.
    pub attributes: PolicyAttributes,
}

/// An immutable description of a remote interface.
///
/// Build one with [`ContractBuilder`]:
///
/// ```rust
/// use durarpc::policy::ContractBuilder;
/// use std::time::Duration;
///
/// let contract = ContractBuilder::new("ICalculator")
///     .method("Add", 2, true, |m| m.timeout(Duration::from_secs(5)))
///     .method("Reset", 0, false, |m| m)
///     .build();
///
/// assert_eq!(contract.name(), "ICalculator");
/// assert_eq!(contract.methods().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceContract {
    name: String,
    extends: Vec<String>,
    attributes: PolicyAttributes,
    methods: Vec<MethodDescriptor>,
}

impl InterfaceContract {
    /// Returns the contract's interface name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the names of the interfaces this one extends, in declaration
    /// order.
    #[must_use]
    pub fn extends(&self) -> &[String] {
        &self.extends
    }

    /// Returns the interface-level overrides.
    #[must_use]
    pub const fn attributes(&self) -> &PolicyAttributes {
        &self.attributes
    }

    /// Returns the methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }
}

/// Configures one method's declared overrides inside
/// [`ContractBuilder::method`].
#[derive(Debug, Default)]
pub struct MethodBuilder {
    attributes: PolicyAttributes,
}

impl MethodBuilder {
    /// Overrides the response deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.attributes.timeout = Some(timeout);
        self
    }

    /// Disables the durable retry loop.
    #[must_use]
    pub const fn no_retries(mut self) -> Self {
        self.attributes.no_retries = Some(true);
        self
    }

    /// Preserves the timeout budget across reconnects.
    #[must_use]
    pub const fn strict_timeout(mut self) -> Self {
        self.attributes.timeout_is_strict = Some(true);
        self
    }

    /// Asks the receiving side to append the sender's endpoint to the
    /// argument list.
    #[must_use]
    pub const fn requires_endpoint(mut self) -> Self {
        self.attributes.requires_endpoint = Some(true);
        self
    }

    /// Pins the method to the given return mode.
    #[must_use]
    pub const fn forced_return_mode(mut self, mode: ReturnMode) -> Self {
        self.attributes.forced_return_mode = Some(mode);
        self
    }
}

/// Builds an [`InterfaceContract`].
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    extends: Vec<String>,
    attributes: PolicyAttributes,
    methods: Vec<MethodDescriptor>,
}

impl ContractBuilder {
    /// Starts a contract for the named interface.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            attributes: PolicyAttributes::default(),
            methods: Vec::new(),
        }
    }

    /// Declares that this interface extends another.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    /// Overrides the response deadline for every method of this interface.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.attributes.timeout = Some(timeout);
        self
    }

    /// Disables the durable retry loop for every method of this interface.
    #[must_use]
    pub const fn no_retries(mut self) -> Self {
        self.attributes.no_retries = Some(true);
        self
    }

    /// Preserves timeout budgets across reconnects for every method of this
    /// interface.
    #[must_use]
    pub const fn strict_timeout(mut self) -> Self {
        self.attributes.timeout_is_strict = Some(true);
        self
    }

    /// Pins every method of this interface to the given return mode.
    #[must_use]
    pub const fn forced_return_mode(mut self, mode: ReturnMode) -> Self {
        self.attributes.forced_return_mode = Some(mode);
        self
    }

    /// Declares a method.
    ///
    /// `configure` receives a [`MethodBuilder`] for method-level overrides;
    /// pass `|m| m` for a method with none.
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        arity: usize,
        returns_value: bool,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self {
        let builder = configure(MethodBuilder::default());
        self.methods.push(MethodDescriptor {
            name: name.into(),
            arity,
            returns_value,
            attributes: builder.attributes,
        });
        self
    }

    /// Finishes the contract.
    #[must_use]
    pub fn build(self) -> InterfaceContract {
        InterfaceContract {
            name: self.name,
            extends: self.extends,
            attributes: self.attributes,
            methods: self.methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_methods_in_order() {
        let contract = ContractBuilder::new("ICalculator")
            .method("Add", 2, true, |m| m)
            .method("Reset", 0, false, |m| m)
            .build();

        let names: Vec<&str> = contract.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Add", "Reset"]);
    }

    #[test]
    fn test_method_overrides_recorded() {
        let contract = ContractBuilder::new("ISlow")
            .method("Crunch", 1, true, |m| {
                m.timeout(Duration::from_secs(120)).strict_timeout()
            })
            .build();

        let method = &contract.methods()[0];
        assert_eq!(method.attributes.timeout, Some(Duration::from_secs(120)));
        assert_eq!(method.attributes.timeout_is_strict, Some(true));
        assert!(method.attributes.no_retries.is_none());
    }

    #[test]
    fn test_interface_level_attributes() {
        let contract = ContractBuilder::new("IFast")
            .timeout(Duration::from_secs(2))
            .no_retries()
            .method("Ping", 0, true, |m| m)
            .build();

        assert_eq!(contract.attributes().timeout, Some(Duration::from_secs(2)));
        assert_eq!(contract.attributes().no_retries, Some(true));
    }

    #[test]
    fn test_extends_order_preserved() {
        let contract = ContractBuilder::new("IChild")
            .extends("IFirst")
            .extends("ISecond")
            .build();
        assert_eq!(contract.extends(), ["IFirst", "ISecond"]);
    }

    #[test]
    fn test_empty_attributes() {
        assert!(PolicyAttributes::default().is_empty());
        let attrs = PolicyAttributes {
            requires_endpoint: Some(true),
            ..PolicyAttributes::default()
        };
        assert!(!attrs.is_empty());
    }

    #[test]
    fn test_return_mode_display() {
        assert_eq!(ReturnMode::OneWay.to_string(), "one-way");
        assert_eq!(ReturnMode::TwoWay.to_string(), "two-way");
    }
}
