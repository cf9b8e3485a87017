//! Promise-style confirmation dialogs for ratatui applications.
//!
//! Mount a [`ConfirmationProvider`] once per scope, then ask for a decision
//! from anywhere that holds the [`ConfirmationRegistry`]:
//!
//! ```no_run
//! use confirm_box_tui::{ConfirmOptions, ConfirmationProvider, ConfirmationRegistry};
//!
//! # async fn example() -> Result<(), confirm_box_tui::ConfirmError> {
//! let registry = ConfirmationRegistry::default();
//! let _provider = ConfirmationProvider::mount(&registry)?;
//! let confirmed = registry
//!     .prompt(ConfirmOptions::new().title("Delete?").warning())?
//!     .await;
//! # let _ = confirmed;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod factory;
mod handlers;
pub mod provider;
pub mod registry;
mod request;
pub mod view;

pub use config::{ConfirmConfig, DuplicateProviderPolicy, UnmountPolicy, DEFAULT_SCOPE};
pub use error::{ConfirmError, ConfirmResult};
pub use factory::{create_confirmation, ScopedConfirmation};
pub use provider::{ConfirmationProvider, DialogPhase, DialogView};
pub use registry::{ConfirmationRegistry, LiveEntry, Snapshot, Subscription};
pub use request::{
    ConfirmOptions, Confirmation, RequestId, SideEffect, Variant, DEFAULT_CANCEL_TEXT,
    DEFAULT_CONFIRM_TEXT, DEFAULT_DESCRIPTION, DEFAULT_TITLE,
};
pub use view::{
    DefaultDialogRenderer, DialogAction, DialogActions, DialogCursor, DialogProps, DialogRenderer,
};
