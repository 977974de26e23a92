//! Error types for vendor calls and service dispatch

use landroid_core::InputError;
use thiserror::Error;

/// Result type for calls into the vendor SDK
pub type CloudResult<T> = Result<T, CloudError>;

/// Result type for service calls
pub type ServiceResult = Result<(), ServiceError>;

/// Errors raised by the vendor cloud SDK
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    #[error("request was malformed")]
    Request,

    #[error("unauthorized, check the account credentials")]
    Authorization,

    #[error("server rejected access")]
    Forbidden,

    #[error("endpoint not found")]
    NotFound,

    #[error("too many requests, IP address temporarily banned")]
    TooManyRequests,

    #[error("internal server error")]
    InternalServer,

    #[error("service unavailable")]
    ServiceUnavailable,

    #[error("API error: {0}")]
    Api(String),

    /// The device has no one-time-schedule support
    #[error("This device does not support Edge-Cut-OnDemand")]
    NoOneTimeSchedule,

    /// The device has no party mode support
    #[error("This device does not support Party Mode")]
    NoPartymode,
}

/// Errors that can occur when calling a Landroid service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("service not supported by this device: {service}")]
    NotSupported { service: String },

    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("cloud call failed: {0}")]
    Cloud(#[from] CloudError),

    #[error("device has not reported its schedules")]
    NoSchedules,

    #[error("device worker is not running")]
    WorkerGone,
}
