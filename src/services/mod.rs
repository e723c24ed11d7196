// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cards;
pub mod debounce;
pub mod identity;
pub mod reference;

pub use cards::CardRepository;
pub use debounce::Debouncer;
pub use identity::IdentityClient;
pub use reference::ReferenceDataClient;
