//! Session multiplexing module
//!
//! This module provides the core components for operating several remote
//! sessions through one view: the session directory, the theme preference,
//! the controller state machine and the event channel that feeds it.

pub mod action_channel;
pub mod controller;
pub mod directory;
pub mod preferences;

pub use action_channel::{ActionChannel, ControllerEvent, RequestTicket};
pub use controller::{ControllerSettings, ControllerState, Notice, NoticeLevel, SessionController};
pub use directory::SessionDirectory;
pub use preferences::PreferenceStore;
