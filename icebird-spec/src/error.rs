/*!
Error type for the iceberg metadata model
*/

use thiserror::Error;

#[derive(Error, Debug)]
/// Iceberg metadata error
pub enum Error {
    /// Type error
    #[error("Value {0} doesn't have the {1} type.")]
    Type(String, String),
    /// Conversion error
    #[error("Failed to convert {0} to {1}.")]
    Conversion(String, String),
    /// Missing field in a decoded record
    #[error("Field {0} missing in {1}.")]
    MissingField(String, String),
    /// Serde json
    #[error(transparent)]
    JSONSerde(#[from] serde_json::Error),
    /// Try from int error
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),
    /// derive builder
    #[error(transparent)]
    DeriveBuilder(#[from] derive_builder::UninitializedFieldError),
}
