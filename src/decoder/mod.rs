pub(crate) mod callback;
pub(crate) mod caps;
pub(crate) mod context;
pub(crate) mod descriptor;
pub(crate) mod registry;
pub(crate) mod session;
