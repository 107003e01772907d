//! Rule templates - parameter validation and instantiation

mod instantiate;
mod parameters;
pub mod placeholders;

pub use instantiate::{instantiate, InstantiatedRule, InstantiationError, InstantiationTarget};
pub use parameters::{
    merge_defaults, validate_parameters, validate_value, ParameterError, ParameterErrorType,
    ParameterMap,
};
