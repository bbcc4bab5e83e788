pub mod component;
pub mod container;
