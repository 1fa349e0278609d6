/// Чем закончилось выполнение единицы работы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed,
}


/// Снимок состояния пула на момент вызова `ThreadPool::metrics`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    pub active_tasks: usize,
    pub idle_workers: usize,
    pub queued_tasks: usize,
    pub total_submitted: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub rejected_tasks: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.active_tasks + self.idle_workers == 0 {
            return 0.0;
        }
        self.active_tasks as f64 / (self.active_tasks + self.idle_workers) as f64
    }

    pub fn queue_pressure(&self) -> f64 {
        self.queued_tasks as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed_tasks + self.failed_tasks;
        if total == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / total as f64
    }

    /// Задачи, принятые пулом, но ещё не завершённые
    pub fn pending(&self) -> usize {
        self.total_submitted
            .saturating_sub(self.completed_tasks + self.failed_tasks)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics_are_neutral() {
        let metrics = PoolMetrics::default();
        assert_eq!(metrics.utilization(), 0.0);
        assert_eq!(metrics.success_rate(), 1.0);
        assert_eq!(metrics.pending(), 0);
    }

    #[test]
    fn rates_follow_counters() {
        let metrics = PoolMetrics {
            active_tasks: 3,
            idle_workers: 1,
            queued_tasks: 5,
            total_submitted: 12,
            completed_tasks: 3,
            failed_tasks: 1,
            rejected_tasks: 0,
        };
        assert_eq!(metrics.utilization(), 0.75);
        assert_eq!(metrics.success_rate(), 0.75);
        assert_eq!(metrics.queue_pressure(), 5.0);
        assert_eq!(metrics.pending(), 8);
    }
}
