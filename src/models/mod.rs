// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod card;
pub mod reference;
pub mod summary;
pub mod totals;
pub mod user;

pub use card::{CardDocument, CardFormInput, CardRecord, Condition, ItemType};
pub use reference::{CardLookup, CardQuery};
pub use summary::InventorySummary;
pub use totals::UserTotals;
pub use user::{AuthSession, UserContext};
