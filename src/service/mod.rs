//! Dispatcher building blocks: auth gate, identity resolution, studio shortcut.

mod auth;
mod identity;
mod studio;
pub use auth::{is_websocket_upgrade, AuthGate};
pub use identity::{IdentityResolver, INSTANCE_NAME};
pub use studio::{studio_shortcut, StudioOptions, STUDIO_PATH};
