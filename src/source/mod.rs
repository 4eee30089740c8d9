pub(crate) mod blob;
pub(crate) mod image_source;
pub(crate) mod legacy;
