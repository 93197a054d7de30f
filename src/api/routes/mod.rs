//! API Routes
//!
//! Route handlers organized by functionality.

pub mod balances;
pub mod health;
pub mod portfolio;
pub mod wallets;
