// crates/mt_workflow/src/runner.rs

//! 批处理运行器模块
//!
//! 对一组文件逐个调用处理函数，每个文件产生一条 [`FileResult`]。
//!
//! - 单个文件、线程数为 1 或禁用并行时，在调用线程内顺序处理
//! - 否则启动固定数量的具名工作线程，从预先枚举的文件列表中
//!   通过原子游标领取下一个文件，结果经通道返回调用线程汇总
//!
//! 处理函数返回的错误以及 panic 都转为失败记录，其余文件照常处理。
//! 停止请求在文件边界生效：尚未开始的文件记为 "cancelled"。
//! 结果按输入顺序排列，与线程数和调度无关。

use crate::error::WorkflowError;
use crate::events::{ConvertEvent, EventDispatcher};
use crate::summary::{display_name, BatchSummary, ConvertedFile, FileResult, ProcessingMode};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{debug, error};

/// 运行器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// 工作线程数
    pub workers: usize,
    /// 是否允许并行
    pub enable_parallel: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            enable_parallel: true,
        }
    }
}

impl RunnerConfig {
    /// 创建配置
    pub fn new(workers: usize, enable_parallel: bool) -> Self {
        Self {
            workers,
            enable_parallel,
        }
    }

    /// 给定文件数时的处理模式
    pub fn mode(&self, n_files: usize) -> ProcessingMode {
        if n_files <= 1 || self.workers <= 1 || !self.enable_parallel {
            ProcessingMode::Sequential
        } else {
            ProcessingMode::Parallel
        }
    }
}

/// 停止请求句柄
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// 创建句柄
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停止（在下一个文件边界生效）
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// 是否已请求停止
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 批处理运行器
#[derive(Debug, Clone)]
pub struct BatchDriver {
    config: RunnerConfig,
    events: Arc<EventDispatcher>,
    stop: StopHandle,
}

impl BatchDriver {
    /// 创建运行器
    pub fn new(config: RunnerConfig, events: Arc<EventDispatcher>) -> Self {
        Self {
            config,
            events,
            stop: StopHandle::new(),
        }
    }

    /// 使用外部停止句柄
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// 停止句柄
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// 配置
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// 处理全部文件并汇总
    pub fn run<F, E>(&self, files: &[PathBuf], process: F) -> BatchSummary
    where
        F: Fn(&Path) -> Result<ConvertedFile, E> + Sync,
        E: std::fmt::Display,
    {
        let n = files.len();
        let mode = self.config.mode(n);
        let workers = match mode {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => self.config.workers.min(n),
        };
        self.events.emit(ConvertEvent::BatchStarted {
            total_files: n,
            mode,
            workers,
        });

        let mut slots: Vec<Option<FileResult>> = vec![None; n];
        if mode == ProcessingMode::Parallel {
            self.run_parallel(files, workers, &process, &mut slots);
        }

        // 顺序模式，或并行模式下未能领取的文件
        for (i, slot) in slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(self.process_one(&files[i], "main", &process));
            }
        }

        let results: Vec<FileResult> = slots.into_iter().flatten().collect();
        let summary = BatchSummary::from_results(mode, workers, results);
        self.events.emit(ConvertEvent::BatchFinished {
            successful: summary.successful_files,
            total: summary.total_files,
            mode,
        });
        summary
    }

    fn run_parallel<F, E>(
        &self,
        files: &[PathBuf],
        workers: usize,
        process: &F,
        slots: &mut [Option<FileResult>],
    ) where
        F: Fn(&Path) -> Result<ConvertedFile, E> + Sync,
        E: std::fmt::Display,
    {
        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, FileResult)>();

        thread::scope(|s| {
            for w in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                let spawned = thread::Builder::new()
                    .name(format!("mt-worker-{w}"))
                    .spawn_scoped(s, move || {
                        let worker = thread::current().name().unwrap_or("worker").to_string();
                        loop {
                            let i = cursor.fetch_add(1, Ordering::SeqCst);
                            if i >= files.len() {
                                break;
                            }
                            let result = self.process_one(&files[i], &worker, process);
                            if tx.send((i, result)).is_err() {
                                break;
                            }
                        }
                    });
                if let Err(e) = spawned {
                    error!("无法启动工作线程 mt-worker-{}: {}", w, e);
                }
            }
            drop(tx);

            for (i, result) in rx.iter() {
                slots[i] = Some(result);
            }
        });
    }

    /// 处理单个文件；错误与 panic 都转为失败记录
    fn process_one<F, E>(&self, path: &Path, worker: &str, process: &F) -> FileResult
    where
        F: Fn(&Path) -> Result<ConvertedFile, E>,
        E: std::fmt::Display,
    {
        let file = display_name(path);

        if self.stop.is_stop_requested() {
            self.events.emit(ConvertEvent::FileCancelled { file: file.clone() });
            return FileResult::cancelled(file);
        }

        self.events.emit(ConvertEvent::FileStarted {
            file: file.clone(),
            worker: worker.to_string(),
        });

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| process(path)));
        let result = match outcome {
            Ok(Ok(converted)) => {
                self.events.emit(ConvertEvent::FileCompleted { file: file.clone() });
                FileResult::converted(file, converted)
            }
            Ok(Err(e)) => {
                let error = e.to_string();
                self.events.emit(ConvertEvent::FileFailed {
                    file: file.clone(),
                    error: error.clone(),
                });
                FileResult::failed(file, error)
            }
            Err(payload) => {
                let error = WorkflowError::Panicked(panic_message(payload.as_ref())).to_string();
                self.events.emit(ConvertEvent::FileFailed {
                    file: file.clone(),
                    error: error.clone(),
                });
                FileResult::failed(file, error)
            }
        };
        debug!("{} 处理结束 [线程: {}]", path.display(), worker);
        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
