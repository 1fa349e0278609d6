//! Пул потоков фиксированного размера для блокирующих и CPU-bound задач
//! 
//! # Features
//! - Фиксированное число OS-потоков, общая FIFO очередь
//! - Результат каждой задачи приходит в одноразовый `ResultHandle` (блокирующий `get` или `.await`)
//! - Паника в задаче не убивает воркер, а возвращается как `TaskError::Panic`
//! - Graceful shutdown: новые задачи отклоняются, очередь дорабатывается до конца
//! - Опционально ограниченная очередь и метрики

pub mod errors;
pub mod handle;
pub mod model;
pub mod pool;
pub mod queue;
pub mod result;

pub use errors::{PoolError, TaskError};
pub use handle::ResultHandle;
pub use pool::{Config, ThreadPool};
pub use result::{PoolResult, TaskResult};
