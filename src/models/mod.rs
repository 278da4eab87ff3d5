pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod filters;

pub use appointment::*;
pub use doctor::*;
pub use enums::*;
pub use filters::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
