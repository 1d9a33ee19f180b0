pub(crate) mod renderer;
pub(crate) mod scratch;
pub(crate) mod texture;
