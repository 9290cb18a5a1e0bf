//! Building blocks shared by the cruise and lowering slices

pub mod params;
pub mod records;
pub mod validation;
