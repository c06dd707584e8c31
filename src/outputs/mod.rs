//! Output generation for the terminal and for JSON export.
//!
//! # Submodules
//!
//! - [`insights`]: Aggregate statistics over the working set (histograms, keyword tags)
//! - [`markdown`]: Renders answers, article lists, insights and the transcript as Markdown
//! - [`json`]: Writes a session snapshot to a dated JSON file
//!
//! # Output Structure
//!
//! ```text
//! stdout                     # Markdown, one block per user action
//!
//! json_output_dir/
//! └── 2025-05-06/
//!     └── 금리_141500.json   # Snapshot (articles, transcript, insights)
//! ```

pub mod insights;
pub mod json;
pub mod markdown;
