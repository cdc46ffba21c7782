pub(crate) mod assembler;
pub(crate) mod merge;
pub(crate) mod mutator;
pub(crate) mod sharing;
pub(crate) mod slot;
