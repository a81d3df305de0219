pub mod enums;
pub mod filters;
pub mod pickup;

pub use enums::*;
pub use filters::*;
pub use pickup::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
