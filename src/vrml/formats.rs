//! Output format implementations for scene serialization
//!
//! - treeviz: one line per node, indented, with Unicode icons
//! - json: the scene arena through serde

pub mod json;
pub mod registry;
pub mod treeviz;

pub use json::{to_json, JsonFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
