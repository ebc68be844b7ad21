// crates/mt_workflow/src/events.rs

//! 事件系统模块
//!
//! 批处理过程中的进度与结果以 [`ConvertEvent`] 发出，经 [`EventDispatcher`]
//! 分发给监听器。监听器在构造分发器时确定，运行中不再变化；
//! 事件分发由一把互斥锁串行化，多个工作线程的日志不会交错。

use crate::summary::ProcessingMode;
use parking_lot::Mutex;
use std::sync::Arc;

/// 转换事件
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertEvent {
    /// 批处理开始
    BatchStarted {
        /// 文件总数
        total_files: usize,
        /// 处理模式
        mode: ProcessingMode,
        /// 工作线程数
        workers: usize,
    },
    /// 文件开始处理
    FileStarted {
        /// 文件名
        file: String,
        /// 工作线程名
        worker: String,
    },
    /// 全场文件已写出
    FullFieldWritten {
        /// 文件名
        file: String,
        /// 输出路径
        path: String,
        /// 数据点数
        points: usize,
        /// 单元数
        elements: usize,
    },
    /// 全场导出失败
    FullFieldFailed {
        /// 文件名
        file: String,
        /// 错误信息
        error: String,
    },
    /// 区域文件已写出
    RegionWritten {
        /// 文件名
        file: String,
        /// 区域名
        region: String,
        /// 输出路径
        path: String,
        /// 节点数
        points: usize,
    },
    /// 区域内无单元，已跳过
    RegionSkipped {
        /// 文件名
        file: String,
        /// 区域名
        region: String,
    },
    /// 区域处理失败
    RegionFailed {
        /// 文件名
        file: String,
        /// 区域名
        region: String,
        /// 错误信息
        error: String,
    },
    /// 文件处理完成
    FileCompleted {
        /// 文件名
        file: String,
    },
    /// 文件处理失败
    FileFailed {
        /// 文件名
        file: String,
        /// 错误信息
        error: String,
    },
    /// 停止请求后未开始的文件
    FileCancelled {
        /// 文件名
        file: String,
    },
    /// 批处理结束
    BatchFinished {
        /// 成功文件数
        successful: usize,
        /// 文件总数
        total: usize,
        /// 处理模式
        mode: ProcessingMode,
    },
}

impl ConvertEvent {
    /// 事件对应的文件名（批处理级事件为 `None`）
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::FileStarted { file, .. }
            | Self::FullFieldWritten { file, .. }
            | Self::FullFieldFailed { file, .. }
            | Self::RegionWritten { file, .. }
            | Self::RegionSkipped { file, .. }
            | Self::RegionFailed { file, .. }
            | Self::FileCompleted { file }
            | Self::FileFailed { file, .. }
            | Self::FileCancelled { file } => Some(file.as_str()),
            Self::BatchStarted { .. } | Self::BatchFinished { .. } => None,
        }
    }

    /// 获取事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchStarted { .. } => "BatchStarted",
            Self::FileStarted { .. } => "FileStarted",
            Self::FullFieldWritten { .. } => "FullFieldWritten",
            Self::FullFieldFailed { .. } => "FullFieldFailed",
            Self::RegionWritten { .. } => "RegionWritten",
            Self::RegionSkipped { .. } => "RegionSkipped",
            Self::RegionFailed { .. } => "RegionFailed",
            Self::FileCompleted { .. } => "FileCompleted",
            Self::FileFailed { .. } => "FileFailed",
            Self::FileCancelled { .. } => "FileCancelled",
            Self::BatchFinished { .. } => "BatchFinished",
        }
    }
}

/// 事件监听器trait
pub trait EventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &ConvertEvent);

    /// 获取监听器名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式事件监听器
pub struct FnListener<F>
where
    F: Fn(&ConvertEvent) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ConvertEvent) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&ConvertEvent) + Send + Sync,
{
    fn on_event(&self, event: &ConvertEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志事件监听器
///
/// 每个事件输出一行日志：成功为 INFO，空区域与取消为 WARN，失败为 ERROR。
#[derive(Debug, Default)]
pub struct LoggingListener;

impl LoggingListener {
    /// 创建日志监听器
    pub fn new() -> Self {
        Self
    }
}

impl EventListener for LoggingListener {
    fn on_event(&self, event: &ConvertEvent) {
        match event {
            ConvertEvent::BatchStarted {
                total_files,
                mode,
                workers,
            } => match mode {
                ProcessingMode::Sequential => {
                    tracing::info!("开始处理 {} 个文件（{}模式）", total_files, mode)
                }
                ProcessingMode::Parallel => {
                    tracing::info!("开始处理 {} 个文件，使用 {} 个线程", total_files, workers)
                }
            },
            ConvertEvent::FileStarted { file, worker } => {
                tracing::info!("开始处理: {} [线程: {}]", file, worker)
            }
            ConvertEvent::FullFieldWritten {
                path,
                points,
                elements,
                ..
            } => {
                if *elements == 0 {
                    tracing::info!("全场输出(单元中心): {}, 数据点数: {}", path, points)
                } else {
                    tracing::info!(
                        "全场输出(节点): {}, 节点数: {}, 单元数: {}",
                        path,
                        points,
                        elements
                    )
                }
            }
            ConvertEvent::FullFieldFailed { file, error } => {
                tracing::error!("{} 全场处理失败: {}", file, error)
            }
            ConvertEvent::RegionWritten { region, path, .. } => {
                tracing::info!("区域 {} 输出: {}", region, path)
            }
            ConvertEvent::RegionSkipped { file, region } => {
                tracing::warn!("区域 {} 在 {} 中无单元，已跳过该区域", region, file)
            }
            ConvertEvent::RegionFailed {
                file,
                region,
                error,
            } => tracing::error!("区域 {} 处理失败 ({}): {}", region, file, error),
            ConvertEvent::FileCompleted { file } => tracing::info!("完成: {}", file),
            ConvertEvent::FileFailed { file, error } => {
                tracing::error!("处理 {} 时出错: {}", file, error)
            }
            ConvertEvent::FileCancelled { file } => tracing::warn!("已取消: {}", file),
            ConvertEvent::BatchFinished {
                successful,
                total,
                mode,
            } => tracing::info!(
                "处理完成（{}模式）: {}/{} 个文件成功",
                mode,
                successful,
                total
            ),
        }
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Arc<dyn EventListener>>,
    emit_lock: Mutex<()>,
}

impl EventDispatcher {
    /// 创建事件分发器
    pub fn new(listeners: Vec<Arc<dyn EventListener>>) -> Self {
        Self {
            listeners,
            emit_lock: Mutex::new(()),
        }
    }

    /// 只带日志监听器的分发器
    pub fn logging() -> Self {
        Self::new(vec![Arc::new(LoggingListener::new())])
    }

    /// 追加监听器（构造阶段）
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        tracing::debug!("Added event listener: {}", listener.name());
        self.listeners.push(listener);
        self
    }

    /// 追加函数式监听器（构造阶段）
    pub fn with_fn_listener<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ConvertEvent) + Send + Sync + 'static,
    {
        self.with_listener(Arc::new(FnListener::new(name, handler)))
    }

    /// 分发事件
    pub fn emit(&self, event: ConvertEvent) {
        let _guard = self.emit_lock.lock();

        tracing::trace!("Emitting event: {}", event.name());

        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}
