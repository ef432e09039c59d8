//! ILP Renderers

pub mod typst;
