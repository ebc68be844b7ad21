// crates/mt_workflow/src/converter.rs

//! MIKE21 → Tecplot 转换器
//!
//! 把配置、网格数据源、两个导出器和批处理运行器组装在一起。
//! 每个输入文件 `<stem>.<ext>` 的输出写入 `<output_dir>/<stem>/`:
//!
//! - `<stem>_allfield.dat` 全场
//! - `<stem>_<区域名>.dat` 各区域
//!
//! 全场或某个区域失败只影响对应的结果项，文件本身仍记为成功；
//! 输出目录无法创建或网格读取失败时整个文件失败。

use crate::discovery::{discover_inputs, explicit_inputs};
use crate::error::WorkflowError;
use crate::events::{ConvertEvent, EventDispatcher};
use crate::runner::{BatchDriver, RunnerConfig, StopHandle};
use crate::summary::{display_name, BatchSummary, ConvertedFile};
use mt_config::ConverterConfig;
use mt_convert::{FullFieldExporter, Region, RegionProjector};
use mt_geo::{GeometryBackend, PlanarGeometry, Point2D};
use mt_io::exporters::TecplotWriter;
use mt_io::{JsonMeshSource, MeshSource, TimeSelector};
use mt_mesh::{FieldFrame, Mesh};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// 预加载的区域；加载失败时保留错误信息，在每个文件的结果中报告
pub type LoadedRegion = (String, Result<Region, String>);

/// MIKE21 批量转换器
pub struct Mike21Converter<G: GeometryBackend = PlanarGeometry> {
    config: ConverterConfig,
    source: Arc<dyn MeshSource>,
    events: Arc<EventDispatcher>,
    full_field: FullFieldExporter,
    projector: RegionProjector<G>,
    stop: StopHandle,
}

impl Mike21Converter<PlanarGeometry> {
    /// 使用平面几何后端创建转换器
    pub fn new(config: ConverterConfig, events: Arc<EventDispatcher>) -> Self {
        Self::with_backend(config, events, PlanarGeometry::default())
    }
}

impl<G: GeometryBackend> Mike21Converter<G> {
    /// 使用指定几何后端创建转换器
    pub fn with_backend(config: ConverterConfig, events: Arc<EventDispatcher>, backend: G) -> Self {
        let writer = TecplotWriter::new(config.output_settings.precision);
        let shift = Point2D::new(
            config.coordinate_transform.x_shift,
            config.coordinate_transform.y_shift,
        );
        debug!("几何后端: {}", backend.name());
        Self {
            source: Arc::new(JsonMeshSource::new()),
            events,
            full_field: FullFieldExporter::new(writer, shift),
            projector: RegionProjector::new(backend, writer, shift),
            stop: StopHandle::new(),
            config,
        }
    }

    /// 替换网格数据源
    pub fn with_source(mut self, source: Arc<dyn MeshSource>) -> Self {
        self.source = source;
        self
    }

    /// 配置
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// 停止句柄，可在其他线程中请求停止
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// 加载所有区域的几何
    pub fn load_regions(&self) -> Vec<LoadedRegion> {
        self.config
            .regions
            .iter()
            .map(|(name, cfg)| {
                let loaded = Region::from_dxf(
                    name.as_str(),
                    &cfg.region_geometry_path,
                    &cfg.axis_geometry_path,
                )
                .map(|r| r.with_description(cfg.description_or(name)))
                .map_err(|e| e.to_string());
                if let Err(e) = &loaded {
                    warn!("区域 {} 几何加载失败: {}", name, e);
                }
                (name.clone(), loaded)
            })
            .collect()
    }

    /// 待处理的输入文件
    ///
    /// `explicit` 非空时使用显式列表（丢弃不存在的路径），否则扫描输入目录。
    pub fn inputs(&self, explicit: &[PathBuf]) -> Vec<PathBuf> {
        if explicit.is_empty() {
            discover_inputs(&self.config.paths.input_dir, &self.config.paths.input_extension)
        } else {
            explicit_inputs(explicit)
        }
    }

    /// 处理单个输入文件
    pub fn process_file(
        &self,
        path: &Path,
        regions: &[LoadedRegion],
    ) -> Result<ConvertedFile, WorkflowError> {
        let file = display_name(path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());

        let out_dir = self.config.paths.output_dir.join(&stem);
        fs::create_dir_all(&out_dir).map_err(|source| WorkflowError::OutputDir {
            path: out_dir.clone(),
            source,
        })?;

        let selector = TimeSelector::from_index(self.config.time_settings.time_index);
        let mut handle = self.source.open(path)?;
        let (mesh, frame) = handle.read(selector)?;
        debug!(
            "{}: 节点数 {}, 单元数 {}, 时间步 {}",
            file,
            mesh.n_nodes(),
            mesh.n_elements(),
            selector
        );

        let mut converted = ConvertedFile::default();
        let outputs = &self.config.output_settings;
        if outputs.export_full_field {
            converted.full_field = self.export_full_field(&file, &mesh, &frame, &out_dir, &stem);
        }
        if outputs.export_regions {
            for (name, region) in regions {
                let ok = self.export_region(&file, name, region, &mesh, &frame, &out_dir, &stem);
                converted.regions.insert(name.clone(), ok);
            }
        }
        Ok(converted)
    }

    fn export_full_field(
        &self,
        file: &str,
        mesh: &Mesh,
        frame: &FieldFrame,
        out_dir: &Path,
        stem: &str,
    ) -> bool {
        match self.full_field.export(mesh, frame, out_dir, stem) {
            Ok(report) => {
                self.events.emit(ConvertEvent::FullFieldWritten {
                    file: file.to_string(),
                    path: report.path.display().to_string(),
                    points: report.points,
                    elements: report.elements,
                });
                true
            }
            Err(e) => {
                self.events.emit(ConvertEvent::FullFieldFailed {
                    file: file.to_string(),
                    error: e.to_string(),
                });
                false
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn export_region(
        &self,
        file: &str,
        name: &str,
        region: &Result<Region, String>,
        mesh: &Mesh,
        frame: &FieldFrame,
        out_dir: &Path,
        stem: &str,
    ) -> bool {
        let region = match region {
            Ok(region) => region,
            Err(error) => {
                self.events.emit(ConvertEvent::RegionFailed {
                    file: file.to_string(),
                    region: name.to_string(),
                    error: error.clone(),
                });
                return false;
            }
        };

        match self.projector.export(mesh, frame, region, out_dir, stem) {
            Ok(report) => {
                self.events.emit(ConvertEvent::RegionWritten {
                    file: file.to_string(),
                    region: name.to_string(),
                    path: report.path.display().to_string(),
                    points: report.points,
                });
                true
            }
            Err(e) if e.is_warning() => {
                self.events.emit(ConvertEvent::RegionSkipped {
                    file: file.to_string(),
                    region: name.to_string(),
                });
                false
            }
            Err(e) => {
                self.events.emit(ConvertEvent::RegionFailed {
                    file: file.to_string(),
                    region: name.to_string(),
                    error: e.to_string(),
                });
                false
            }
        }
    }

    /// 运行批处理
    ///
    /// `explicit` 为空时扫描配置的输入目录。
    pub fn run(&self, explicit: &[PathBuf]) -> BatchSummary {
        let files = self.inputs(explicit);
        if files.is_empty() {
            warn!("{}", crate::summary::NO_INPUT_MESSAGE);
            return BatchSummary::no_input();
        }

        let root = &self.config.paths.output_dir;
        if let Err(e) = fs::create_dir_all(root) {
            warn!("无法创建输出根目录 {}: {}", root.display(), e);
        }

        let regions = self.load_regions();
        let runner = RunnerConfig::new(
            self.config.worker_count(files.len()),
            self.config.processing.enable_parallel,
        );
        BatchDriver::new(runner, self.events.clone())
            .with_stop_handle(self.stop.clone())
            .run(&files, |path| self.process_file(path, &regions))
    }
}

impl<G: GeometryBackend> std::fmt::Debug for Mike21Converter<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mike21Converter")
            .field("source", &self.source.name())
            .field("backend", &self.projector.backend().name())
            .field("regions", &self.config.regions.len())
            .finish()
    }
}
