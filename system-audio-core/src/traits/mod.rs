pub mod capture_provider;
pub mod delivery_target;
pub mod session_observer;
