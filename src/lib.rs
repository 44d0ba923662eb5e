//! Spatial interaction and layout engine for note boards and knowledge graphs.
//!
//! Two interactive surfaces share one core:
//!
//! * a **canvas** ([`canvas::Board`]) of rectangular items joined by labelled
//!   connections, and
//! * a **graph** ([`graph::Graph`]) of circular vertices joined by weighted
//!   edges, arranged by a force simulation or a discrete layout.
//!
//! Both are driven through a [`Viewport`] (pan/zoom) and a
//! [`GestureController`] (pan, drag, pinch, long press), wrapped together in a
//! [`CanvasSession`] or [`GraphSession`]. State is exchanged as JSON through
//! the codecs in [`canvas::codec`] and [`graph::codec`]; anything unreadable
//! falls back to a built-in demo dataset.

pub mod canvas;
pub mod error;
pub mod gesture;
pub mod graph;
pub mod model;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod viewport;

pub use error::{ColorError, DecodeError, EditError, SettingsError, StoreError};
pub use gesture::{GestureConfig, GestureController, GestureMode, GestureOutcome, PointerId, Scene};
pub use session::{CanvasSession, GraphSession, LoadOutcome};
pub use settings::EngineSettings;
pub use viewport::{Transform, Viewport, ViewportState, ZoomRange};
