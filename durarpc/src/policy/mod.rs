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

//! Interface contracts and per-method execution policy.
//!
//! Callers declare interfaces once as [`InterfaceContract`]s, including the
//! interfaces they extend and any declared overrides. The
//! [`PolicyRegistry`] folds those declarations into one [`EffectivePolicy`]
//! per method and caches the result, so the invocation pipeline reads a
//! plain struct on every call instead of re-walking the hierarchy.
//!
//! ```rust
//! use durarpc::policy::{ContractBuilder, PolicyRegistry, ReturnMode};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), durarpc::policy::PolicyError> {
//! let registry = PolicyRegistry::new();
//! registry.register(
//!     ContractBuilder::new("ICalculator")
//!         .method("Add", 2, true, |m| m.timeout(Duration::from_secs(5)))
//!         .build(),
//! )?;
//!
//! let policy = registry
//!     .resolve_method("ICalculator", "Add", ReturnMode::TwoWay)?
//!     .expect("declared above");
//! assert_eq!(policy.timeout, Duration::from_secs(5));
//! # Ok(())
//! # }
//! ```

mod contract;
mod resolver;

pub use self::contract::{
    ContractBuilder, InterfaceContract, MethodBuilder, MethodDescriptor, PolicyAttributes,
    ReturnMode,
};
pub use self::resolver::{EffectivePolicy, PolicyError, PolicyRegistry, PolicyTable};
