//! Renderer Contract: a read-only `cursive` dashboard over the Query Layer.
//! The dashboard computes nothing; `panels` builds the data objects it
//! draws, `layout` picks their arrangement, `theme` picks their colors.

pub mod dashboard;
pub mod layout;
pub mod panels;
pub mod theme;

pub use dashboard::run;
