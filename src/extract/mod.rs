pub mod modular;
pub mod monolith;
