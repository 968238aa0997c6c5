//! Ordering core
//!
//! - [`cart`]: request schema and validation boundary
//! - [`pricing`]: unit price resolution
//! - [`materializer`]: cart → persisted order, one transaction
//! - [`state_machine`]: status / payment transitions, item removal
//! - [`queries`]: read-side lookups

pub mod cart;
pub mod materializer;
pub mod money;
pub mod pricing;
pub mod queries;
pub mod state_machine;

pub use cart::{CartRequest, ValidatedCart};
pub use materializer::create_order;
pub use state_machine::{
    Applied, OrderRef, StatusUpdateRequest, TransitionRequest, TransitionSource,
};
