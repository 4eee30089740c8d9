//! Image compositing: transform descriptors, pixel buffers and the blit decision tree.

pub(crate) mod blend;
pub(crate) mod blit;
pub(crate) mod dsc;
pub(crate) mod scratch;
pub(crate) mod surface;
pub(crate) mod transform;
