use std::collections::VecDeque;

use super::handle::Task;


/// FIFO очередь ожидающих задач.
///
/// Своей синхронизации не имеет: живёт внутри состояния пула
/// и изменяется только под его мьютексом.
pub struct TaskQueue<T = Task> {
    items: VecDeque<T>,
    capacity: Option<usize>,
}

impl<T> TaskQueue<T> {
    pub fn unbounded() -> Self {
        Self {
            items: VecDeque::new(),
            capacity: None,
        }
    }

    pub fn bounded(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(c) => Self::bounded(c),
            None => Self::unbounded(),
        }
    }

    /// Кладёт элемент в хвост; при переполнении возвращает его обратно
    #[inline]
    pub fn push_back(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push_back(item);
        Ok(())
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|c| self.items.len() >= c)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
