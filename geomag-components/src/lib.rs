//! Standalone physical model components that accompany the field-synthesis
//! core: self-contained lookups and conversions with no shared state.

pub mod atmosphere;
