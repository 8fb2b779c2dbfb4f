//! EpiView crate root: re-exports and module wiring.
//!
//! Two linked views of a COVID time-series/geospatial dataset, built on
//! egui/eframe:
//! - a choropleth world map (click to toggle country selection)
//! - a line chart with a ranked hover overlay, re-filtered by the selection
//!
//! The interesting machinery is the cross-view coordination:
//! - `selection`: shared selection state and the dirty, pull-on-notify
//!   synchronization protocol (map notified before chart)
//! - `hover` + `data::date_axis`: pointer-to-snapped-date inversion
//! - `overlay`: ranked, stably-sorted hover readout and crosshair geometry
//! - `color`: per-mode color identity (continent vs. country domains)
//! - `events`: the input command type and the subscriber event system

mod app;

pub mod color;
pub mod config;
pub mod data;
pub mod events;
pub mod hover;
pub mod overlay;
pub mod selection;
pub mod views;

// Public re-exports for a compact external API
pub use app::{run, run_with_config, EpiViewApp};
pub use color::{ColorDomain, ColorRegistry};
pub use config::{Controllers, EpiViewConfig, FeatureFlags};
pub use data::dataset::{CaseRecord, Dataset, CONTINENT_PREFIX};
pub use data::date_axis::DateAxis;
pub use events::{EventController, EventFilter, EventKind, InputEvent, LinkEvent};
pub use hover::{ChartFrame, OverlayQuery, PointerInversion};
pub use overlay::{OverlayModel, OverlayRow};
pub use selection::{DirtyFlag, SelectionState, SharedSelection, ViewSynchronizer};
pub use views::chart::LineChartView;
pub use views::map::{MapView, WorldMap};
