/// Ошибки уровня пула: возвращаются синхронно из конструктора и `submit`
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum PoolError {
    /// Пул без воркеров принимал бы задачи, но никогда бы их не выполнил
    #[error("thread pool requires at least one worker")]
    ZeroWorkers,

    #[error("thread pool has already been stopped")]
    Stopped,

    #[error("task queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

/// Ошибки конкретной задачи: доставляются через `ResultHandle`
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panic(String),

    /// Задача была уничтожена, так и не отдав результат
    #[error("task was dropped before producing a result")]
    Abandoned,

    /// Результат уже был забран из этого handle
    #[error("task result was already taken")]
    Consumed,
}
