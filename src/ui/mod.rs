//! Terminal UI layer for interactive chat sessions.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! Key submodules include:
//! - [`chat_loop`]: the event loop that turns keys and stream messages into
//!   [`crate::core::app::AppAction`]s and spawns streams via
//!   [`crate::core::chat_stream`].
//! - [`chat_view`] and [`panel`]: view caches updated from
//!   [`crate::core::app::UiEffect`]s.
//! - [`renderer`], [`layout`], [`markdown`] and [`wrap`]: frame composition.
//! - [`theme`]: light and dark styles.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns domain logic and persistence.

pub mod chat_loop;
pub mod chat_view;
pub mod layout;
pub mod markdown;
pub mod panel;
pub mod renderer;
pub mod theme;
pub mod wrap;
