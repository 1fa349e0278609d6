use super::{
    errors::PoolError,
    result::PoolResult,
    handle::{
        task_with_handle,
        ResultHandle,
        Task,
    },
    model::{
        PoolMetrics,
        TaskOutcome,
    },
    queue::TaskQueue,
};
use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use crossbeam::utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, trace, warn};


/// Конфигурация пула потоков
#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: usize,
    /// `None` - очередь без ограничения (поведение по умолчанию)
    pub max_pending: Option<usize>,
    pub thread_name: String,
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            max_pending: None,
            thread_name: "pool-worker".to_string(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn cpu_bound() -> Self {
        Self::default()
    }

    pub fn io_bound() -> Self {
        Self {
            num_threads: num_cpus::get() * 2, // Воркеры будут подолгу стоять в блокирующих вызовах
            ..Self::default()
        }
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = Some(max_pending);
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }
}


/// Всё, что меняется под единственным мьютексом пула
struct State {
    queue: TaskQueue,
    stop: bool,
    active: usize,
    idle: usize,
}

struct Shared {
    state: Mutex<State>,
    task_available: Condvar,
    all_tasks_completed: Condvar,
    total_submitted: CachePadded<AtomicUsize>,
    completed_tasks: CachePadded<AtomicUsize>,
    failed_tasks: CachePadded<AtomicUsize>,
    rejected_tasks: CachePadded<AtomicUsize>,
}

impl Shared {
    fn new(max_pending: Option<usize>) -> Self {
        Self {
            state: Mutex::new(State {
                queue: TaskQueue::with_capacity(max_pending),
                stop: false,
                active: 0,
                idle: 0,
            }),
            task_available: Condvar::new(),
            all_tasks_completed: Condvar::new(),
            total_submitted: CachePadded::new(AtomicUsize::new(0)),
            completed_tasks: CachePadded::new(AtomicUsize::new(0)),
            failed_tasks: CachePadded::new(AtomicUsize::new(0)),
            rejected_tasks: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Цикл воркера. Выходит только когда stop выставлен и очередь пуста,
    /// так что уже принятые задачи всегда дорабатываются.
    fn worker_loop(&self, index: usize) {
        debug!(worker = index, "worker started");

        loop {
            let task = {
                let mut state = self.state.lock();
                state.idle += 1;
                self.task_available
                    .wait_while(&mut state, |s| !s.stop && s.queue.is_empty());
                state.idle -= 1;

                match state.queue.pop_front() {
                    Some(task) => {
                        state.active += 1;
                        task
                    }
                    None => break,
                }
            };

            trace!(worker = index, "running task");
            match task() {
                TaskOutcome::Completed => {
                    self.completed_tasks.fetch_add(1, Ordering::Relaxed);
                }
                TaskOutcome::Failed => {
                    self.failed_tasks.fetch_add(1, Ordering::Relaxed);
                    warn!(worker = index, "task panicked, error delivered to its handle");
                }
            }

            let mut state = self.state.lock();
            state.active -= 1;
            if state.active == 0 && state.queue.is_empty() {
                self.all_tasks_completed.notify_all();
            }
        }

        debug!(worker = index, "worker stopped");
    }

    /// Выставляет stop (один раз) и будит всех воркеров
    fn request_stop(&self) {
        let mut state = self.state.lock();
        if !state.stop {
            state.stop = true;
            info!(queued = state.queue.len(), "shutting down, draining queue");
        }
        self.task_available.notify_all();
    }
}


/// Пул с фиксированным числом OS-потоков и общей FIFO очередью.
///
/// Задачи принимаются через [`ThreadPool::submit`], результат приходит
/// в [`ResultHandle`]. При `shutdown` (или `Drop`) новые задачи перестают
/// приниматься, очередь дорабатывается до конца, все потоки join-ятся.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    worker_ids: Vec<thread::ThreadId>,
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> PoolResult<Self> {
        let config = Config {
            num_threads,
            ..Default::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> PoolResult<Self> {
        if config.num_threads == 0 {
            return Err(PoolError::ZeroWorkers);
        }

        let shared = Arc::new(Shared::new(config.max_pending));
        let mut workers = Vec::with_capacity(config.num_threads);

        // Запускаем воркеры
        for index in 0..config.num_threads {
            let mut builder = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let worker_shared = Arc::clone(&shared);
            match builder.spawn(move || worker_shared.worker_loop(index)) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    warn!(worker = index, error = %e, "failed to spawn worker, stopping started ones");
                    shared.request_stop();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(PoolError::Spawn(e.to_string()));
                }
            }
        }

        let worker_ids = workers.iter().map(|w| w.thread().id()).collect();
        let pool = ThreadPool {
            shared,
            workers: Mutex::new(workers),
            worker_ids,
            num_threads: config.num_threads,
        };

        debug!(
            workers = config.num_threads,
            max_pending = ?config.max_pending,
            "thread pool started"
        );
        Ok(pool)
    }

    /// Ставит задачу в очередь и сразу возвращает handle на её результат.
    ///
    /// Если пул уже останавливается, задача не принимается и ошибка
    /// возвращается здесь же, а не через handle.
    pub fn submit<T, F>(&self, f: F) -> PoolResult<ResultHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (task, handle) = task_with_handle(f);
        self.push_task(task)?;
        Ok(handle)
    }

    /// То же, что `submit`, но с явно переданными аргументами
    #[inline]
    pub fn submit_with<A, T, F>(&self, f: F, args: A) -> PoolResult<ResultHandle<T>>
    where
        A: Send + 'static,
        T: Send + 'static,
        F: FnOnce(A) -> T + Send + 'static,
    {
        self.submit(move || f(args))
    }

    fn push_task(&self, task: Task) -> PoolResult<()> {
        let mut state = self.shared.state.lock();

        if state.stop {
            self.shared.rejected_tasks.fetch_add(1, Ordering::Relaxed);
            return Err(PoolError::Stopped);
        }

        if state.queue.push_back(task).is_err() {
            self.shared.rejected_tasks.fetch_add(1, Ordering::Relaxed);
            let capacity = state.queue.capacity().unwrap_or_default();
            return Err(PoolError::QueueFull { capacity });
        }

        self.shared.total_submitted.fetch_add(1, Ordering::Relaxed);
        self.shared.task_available.notify_one();
        Ok(())
    }

    /// Ждёт, пока очередь опустеет и все воркеры закончат текущие задачи.
    /// Пул при этом продолжает работать.
    ///
    /// Из задачи самого пула вызывать нельзя: она сама считается активной.
    pub fn join(&self) {
        let mut state = self.shared.state.lock();
        self.shared
            .all_tasks_completed
            .wait_while(&mut state, |s| s.active > 0 || !s.queue.is_empty());
    }

    /// Останавливает приём задач, дорабатывает очередь и join-ит все воркеры.
    ///
    /// Блокирует до полной остановки пула, в том числе при нескольких
    /// одновременных вызовах: остальные ждут, пока первый не join-ит воркеры.
    /// Из задачи самого пула только выставляет stop и сразу возвращается,
    /// потому что воркер не может дождаться самого себя.
    #[tracing::instrument(skip_all, fields(workers = self.num_threads))]
    pub fn shutdown(&self) {
        self.shared.request_stop();

        if self.worker_ids.contains(&thread::current().id()) {
            warn!("shutdown called from a pool worker, not waiting for drain");
            return;
        }

        // lock держится на всё время join: параллельный вызов вернётся только после него
        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }

        for worker in workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread terminated abnormally");
            }
        }

        info!("thread pool stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().stop
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn queued_tasks(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        let (active_tasks, idle_workers, queued_tasks) = {
            let state = self.shared.state.lock();
            (state.active, state.idle, state.queue.len())
        };

        PoolMetrics {
            active_tasks,
            idle_workers,
            queued_tasks,
            total_submitted: self.shared.total_submitted.load(Ordering::Relaxed),
            completed_tasks: self.shared.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.shared.failed_tasks.load(Ordering::Relaxed),
            rejected_tasks: self.shared.rejected_tasks.load(Ordering::Relaxed),
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
