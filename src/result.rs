use super::errors::{PoolError, TaskError};

pub type PoolResult<T> = Result<T, PoolError>;

pub type TaskResult<T> = Result<T, TaskError>;
