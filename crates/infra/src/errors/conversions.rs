//! Conversions from infrastructure errors into domain errors.

use gameap_common::CommonError;
use gameap_domain::GameapError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GameapError);

impl From<InfraError> for GameapError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GameapError> for InfraError {
    fn from(value: GameapError) -> Self {
        InfraError(value)
    }
}

trait IntoGameapError {
    fn into_gameap(self) -> GameapError;
}

/* -------------------------------------------------------------------------- */
/* gameap_common::CommonError → GameapError */
/* -------------------------------------------------------------------------- */

impl IntoGameapError for CommonError {
    fn into_gameap(self) -> GameapError {
        let message = self.to_string();
        match self {
            CommonError::Validation { .. } => GameapError::Config(message),
            CommonError::Serialization { .. } | CommonError::Unsupported { .. } => {
                GameapError::Cache(message)
            }
        }
    }
}

impl From<CommonError> for InfraError {
    fn from(value: CommonError) -> Self {
        InfraError(value.into_gameap())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → GameapError */
/* -------------------------------------------------------------------------- */

impl IntoGameapError for JsonError {
    fn into_gameap(self) -> GameapError {
        CommonError::from(self).into_gameap()
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_gameap())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
