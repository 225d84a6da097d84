//! Manager permission bitmask
//!
//! Every capability a manager can hold is one independent bit of a 32-bit
//! integer stored in `managers.permissions`. The `ADMIN` bit overrides every
//! other check.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// A set of permission flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Permissions(i32);

impl Permissions {
    /// Administrative override
    pub const ADMIN: Self = Self(1 << 0);
    pub const MANAGE_ORDERS: Self = Self(1 << 1);
    pub const MANAGE_CATEGORIES: Self = Self(1 << 2);
    pub const MANAGE_PRODUCTS: Self = Self(1 << 3);
    pub const MANAGE_CUSTOMERS: Self = Self(1 << 4);
    pub const EXECUTE_SQL: Self = Self(1 << 5);
    pub const READ_STATISTICS: Self = Self(1 << 6);
    pub const READ_REPORTS: Self = Self(1 << 7);

    pub const NONE: Self = Self(0);

    /// Granted to newly created managers unless stated otherwise
    pub const DEFAULT: Self = Self(
        Self::MANAGE_ORDERS.0
            | Self::MANAGE_CATEGORIES.0
            | Self::MANAGE_PRODUCTS.0
            | Self::MANAGE_CUSTOMERS.0
            | Self::READ_STATISTICS.0
            | Self::READ_REPORTS.0,
    );

    /// Wrap a raw bitmask; unknown bits are kept as-is
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    /// True if every bit of `other` is set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Authorization predicate: admins pass everything, everyone else needs
    /// every required bit.
    pub const fn check(self, required: Self) -> bool {
        self.contains(Self::ADMIN) || self.contains(required)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
