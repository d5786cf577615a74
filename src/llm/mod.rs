// Local model selection and generation parameters

pub mod selection;

pub use selection::*;
