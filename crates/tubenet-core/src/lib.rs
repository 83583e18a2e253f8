pub mod geom;
pub mod mesh;
pub mod metadata;
pub mod model;
pub mod ocs;
pub mod overlay;
pub mod registry;
pub mod report;
pub mod validate;
