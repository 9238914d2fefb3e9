//! Render pipelines: the instanced matcap pipeline and the axes helper.

pub mod axes;
pub mod matcap;
