pub mod controller;
pub mod relay;
pub(crate) mod validation;
