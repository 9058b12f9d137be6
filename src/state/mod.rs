//! Application state
//!
//! - [`transition`] - pure state transitions and the effects they imply
//! - [`store`] - the shared [`AppStore`] that commits transitions and runs effects
//! - [`toast`] - the transient toast queue with per-toast expiry
//! - [`events`] - change notifications for subscribers

pub mod events;
pub mod store;
pub mod toast;
pub mod transition;


pub use events::StateEvent;
pub use store::AppStore;
pub use toast::{ToastQueue, DEFAULT_TOAST_TTL};
pub use transition::{Action, AppSnapshot, Effect, Slice, ToastText, Transition};
