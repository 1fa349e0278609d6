use super::{
    errors::TaskError,
    model::TaskOutcome,
    result::TaskResult,
};
use std::{
    any::Any,
    fmt,
    future::Future,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    task::{Context, Poll},
};
use futures::FutureExt;
use tokio::sync::oneshot::{self, error::TryRecvError};


/// Единица работы в очереди: замыкание без аргументов, которое само
/// отправляет результат в свой `ResultHandle` и сообщает исход воркеру
pub type Task = Box<dyn FnOnce() -> TaskOutcome + Send + 'static>;


/// Упаковывает вызываемый объект в `Task` и возвращает парный handle.
///
/// Паника внутри `f` перехватывается здесь же и уходит в handle как
/// `TaskError::Panic`, поэтому воркер, выполнивший задачу, остаётся жив.
pub(crate) fn task_with_handle<T, F>(f: F) -> (Task, ResultHandle<T>)
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel::<TaskResult<T>>();

    let task: Task = Box::new(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(f))
            .map_err(|payload| TaskError::Panic(panic_message(payload.as_ref())));

        let outcome = if result.is_ok() {
            TaskOutcome::Completed
        } else {
            TaskOutcome::Failed
        };

        // handle могли уже выбросить, тогда результат просто никто не прочитает
        let _ = tx.send(result);
        outcome
    });

    (task, ResultHandle::new(rx))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}


/// Одноразовый handle на результат задачи.
///
/// Читается либо блокирующим `get()` из обычного потока, либо через `.await`.
/// Результат отдаётся ровно один раз, дальше handle возвращает
/// `TaskError::Consumed`.
pub struct ResultHandle<T> {
    receiver: Option<oneshot::Receiver<TaskResult<T>>>,
}

impl<T> ResultHandle<T> {

    fn new(receiver: oneshot::Receiver<TaskResult<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Блокирует текущий поток до готовности результата.
    ///
    /// # Panics
    ///
    /// Паникует при вызове из контекста async runtime (ограничение
    /// `tokio::sync::oneshot::Receiver::blocking_recv`). Там handle нужно `.await`-ить.
    pub fn get(self) -> TaskResult<T> {
        match self.receiver {
            Some(receiver) => receiver
                .blocking_recv()
                .unwrap_or(Err(TaskError::Abandoned)),
            None => Err(TaskError::Consumed),
        }
    }

    /// Неблокирующая проверка. `None` пока задача не завершилась;
    /// после того как результат забран, handle больше ничего не вернёт.
    pub fn try_get(&mut self) -> Option<TaskResult<T>> {
        let receiver = self.receiver.as_mut()?;
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(TaskError::Abandoned),
        };
        self.receiver = None;
        Some(result)
    }
}

impl<T> fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle")
            .field("consumed", &self.receiver.is_none())
            .finish_non_exhaustive()
    }
}

impl<T> Future for ResultHandle<T> {
    type Output = TaskResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Ready(Err(TaskError::Consumed));
        };
        match receiver.poll_unpin(cx) {
            Poll::Ready(res) => {
                this.receiver = None;
                Poll::Ready(res.unwrap_or(Err(TaskError::Abandoned)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
