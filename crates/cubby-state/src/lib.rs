//! Session and persistent key-value state for CLI invocations.
//!
//! The public face of the cubby subsystem. A [`StateStore`] talks to the
//! state service; [`StateStore::begin_session`] registers the current
//! invocation and hands back a [`Session`] whose id scopes every
//! session-level read and write. Persistent values live on the store itself
//! and survive across invocations.
//!
//! ```rust,ignore
//! let state = StateStore::connect("/run/user/1000/cubby/state.sock");
//!
//! let session = state.begin_session().await?;
//! session.set("project_root", &root).await?;
//!
//! state.set_persistent("last_run", &timestamp).await?;
//!
//! session.destroy().await?; // on exit
//! ```
//!
//! Session scope is carried by the handle, not by hidden instance state:
//! once `destroy()` consumes the [`Session`], no session-scoped call can be
//! expressed at all.

mod session;
mod store;
mod values;

pub mod error;

pub use error::{Error, Result};
pub use session::Session;
pub use store::StateStore;

#[cfg(test)]
mod tests;
