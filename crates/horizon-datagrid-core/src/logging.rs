//! Logging facilities for Horizon DataGrid.
//!
//! Horizon DataGrid uses the `tracing` crate for instrumentation. To see
//! logs, install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber;
//!
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every span and event in the workspace carries one of the targets below,
//! so subsystems can be filtered with `tracing` directives such as
//! `horizon_datagrid::pipeline=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Core plumbing target.
    pub const CORE: &str = "horizon_datagrid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_datagrid_core::signal";
    /// Row/column model target.
    pub const MODEL: &str = "horizon_datagrid::model";
    /// Row-processing pipeline target (filter/sort/group/page).
    pub const PIPELINE: &str = "horizon_datagrid::pipeline";
    /// Selection tracking target.
    pub const SELECTION: &str = "horizon_datagrid::selection";
    /// Cell-edit session target.
    pub const EDITING: &str = "horizon_datagrid::editing";
    /// Column drag/resize gesture target.
    pub const INTERACTION: &str = "horizon_datagrid::interaction";
    /// Infinite-load coordinator target.
    pub const LOADER: &str = "horizon_datagrid::loader";
}
