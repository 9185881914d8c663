#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod topology;

pub use config::{LayoutConfig, load_config};
pub use error::FlowError;
pub use layout::{FlowLayoutEngine, Layout, LayoutEdge, LayoutNode, compute_layout};
pub use model::{Pipeline, Todo};

#[cfg(feature = "cli")]
pub use cli::run;
