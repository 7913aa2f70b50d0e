//! # 并行作业池
//!
//! 将候选模型分发给固定数量的工作线程，共享单一消费队列。
//! 工作线程循环弹出模型并同步执行流水线；单模型失败只记录，
//! 不影响兄弟线程与整体批次。
//!
//! ## 依赖关系
//! - 被 `commands/contaminant.rs` 调用
//! - 使用 `amore/pipeline.rs`, `utils/progress.rs`
//! - 使用 `crossbeam-channel` 共享队列

use crate::amore::pipeline::run_model_pipeline;
use crate::amore::AmoreConfig;
use crate::error::Result;
use crate::models::SearchMode;
use crate::utils::{output, progress};

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// 队列弹出等待上限；超时视为队列已尽，正常收尾
const QUEUE_POP_TIMEOUT: Duration = Duration::from_secs(60);

/// 批次汇总统计
#[derive(Debug, Default)]
pub struct SearchSummary {
    /// 成功处理的模型数
    pub completed: usize,
    /// 失败的模型数
    pub failed: usize,
    /// 失败详情 (模型路径, 错误信息)
    pub failures: Vec<(String, String)>,
}

impl SearchSummary {
    /// 合并另一个工作线程的统计
    pub fn merge(&mut self, other: SearchSummary) {
        self.completed += other.completed;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }
}

/// 共享队列作业池
pub struct JobQueueRunner {
    /// 工作线程数
    workers: usize,
}

impl JobQueueRunner {
    /// 创建作业池，0 表示自动探测 CPU 数
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 { num_cpus::get() } else { workers };
        JobQueueRunner { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 将模型列表灌入共享队列并行处理
    ///
    /// 每个模型恰好被一个线程消费一次；队列发送端在入队完成后
    /// 即关闭，线程在队列断开或弹出超时后退出。调用方在本函数
    /// 返回时所有线程均已 join，结果文件完整。
    pub fn run<F>(&self, models: Vec<PathBuf>, processor: F) -> SearchSummary
    where
        F: Fn(&Path) -> Result<()> + Sync + Send,
    {
        let total = models.len();
        let pb = progress::create_progress_bar(total as u64, "Rotation search");

        let (tx, rx) = crossbeam_channel::unbounded::<PathBuf>();
        for model in models {
            tx.send(model).ok();
        }
        // 关闭发送端，队列排空后线程自然退出
        drop(tx);

        let mut summary = SearchSummary::default();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);

            for worker_idx in 0..self.workers {
                let rx = rx.clone();
                let pb = pb.clone();
                let processor = &processor;

                let handle = thread::Builder::new()
                    .name(format!("amore-worker-{}", worker_idx))
                    .spawn_scoped(scope, move || {
                        let mut local = SearchSummary::default();

                        loop {
                            let model = match rx.recv_timeout(QUEUE_POP_TIMEOUT) {
                                Ok(model) => model,
                                // 队列已尽或等待超时：正常完成
                                Err(_) => break,
                            };

                            match processor(&model) {
                                Ok(()) => local.completed += 1,
                                Err(e) => {
                                    let path = model.display().to_string();
                                    pb.suspend(|| {
                                        output::print_warning(&format!(
                                            "Model pipeline failed for {}: {}",
                                            path, e
                                        ));
                                    });
                                    local.failed += 1;
                                    local.failures.push((path, e.to_string()));
                                }
                            }
                            pb.inc(1);
                        }

                        local
                    })
                    .expect("failed to spawn worker thread");

                handles.push(handle);
            }

            for handle in handles {
                if let Ok(local) = handle.join() {
                    summary.merge(local);
                }
            }
        });

        pb.finish_and_clear();
        summary
    }
}

/// 对一个模型目录执行完整的旋转搜索批次
pub fn rotation_search(
    config: &AmoreConfig,
    mode: SearchMode,
    models: Vec<PathBuf>,
    nproc: usize,
) -> SearchSummary {
    let runner = JobQueueRunner::new(nproc);
    runner.run(models, |model| run_model_pipeline(config, mode, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn fake_models(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| PathBuf::from(format!("model_{:03}.pdb", i)))
            .collect()
    }

    #[test]
    fn test_every_model_processed_exactly_once() {
        let seen = Mutex::new(Vec::new());
        let runner = JobQueueRunner::new(4);

        let summary = runner.run(fake_models(37), |model| {
            seen.lock().unwrap().push(model.to_path_buf());
            Ok(())
        });

        let seen = seen.lock().unwrap();
        assert_eq!(summary.completed, 37);
        assert_eq!(summary.failed, 0);
        assert_eq!(seen.len(), 37);

        // 无重复消费，无遗漏
        let distinct: HashSet<_> = seen.iter().collect();
        assert_eq!(distinct.len(), 37);
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let runner = JobQueueRunner::new(2);

        let summary = runner.run(fake_models(10), |model| {
            if model.to_string_lossy().contains("003") {
                Err(crate::error::SimbadError::Other("boom".to_string()))
            } else {
                Ok(())
            }
        });

        assert_eq!(summary.completed, 9);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 10);
        assert!(summary.failures[0].0.contains("model_003"));
    }

    #[test]
    fn test_more_workers_than_models() {
        let runner = JobQueueRunner::new(8);
        let summary = runner.run(fake_models(3), |_| Ok(()));

        assert_eq!(summary.completed, 3);
    }

    #[test]
    fn test_empty_queue() {
        let runner = JobQueueRunner::new(2);
        let summary = runner.run(Vec::new(), |_| Ok(()));

        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_zero_workers_autodetects() {
        let runner = JobQueueRunner::new(0);
        assert!(runner.workers() >= 1);
    }
}
