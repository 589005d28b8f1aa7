use thiserror::Error;

pub type VmResult<T> = Result<T, VmError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("Not a number for {what}: {raw:?}")]
    NotANumber { what: &'static str, raw: String },

    #[error("Negative value for {what}: {value}")]
    Negative { what: &'static str, value: f64 },

    #[error("Fractional value for integer {what}: {value}")]
    Fractional { what: &'static str, value: f64 },

    #[error("Integer out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },
}
