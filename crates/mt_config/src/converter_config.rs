// crates/mt_config/src/converter_config.rs

//! ConverterConfig - 转换器配置（YAML）
//!
//! 所有字段都有默认值，缺省的段落按默认值填充。
//! 加载后统一调用 [`ConverterConfig::validate`]，之后不再修改。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 小数位数上限
pub const MAX_PRECISION: usize = 15;

/// 转换器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConverterConfig {
    /// 输入输出路径
    #[serde(default)]
    pub paths: PathsConfig,

    /// 坐标平移
    #[serde(default)]
    pub coordinate_transform: CoordinateTransform,

    /// 时间步选择
    #[serde(default)]
    pub time_settings: TimeSettings,

    /// 区域定义（按名称排序）
    #[serde(default)]
    pub regions: BTreeMap<String, RegionConfig>,

    /// 输出选项
    #[serde(default)]
    pub output_settings: OutputSettings,

    /// 批处理选项
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// 路径配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// 输入目录
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 输入文件扩展名（不含点，不区分大小写）
    #[serde(default = "default_input_extension")]
    pub input_extension: String,
}

fn default_input_dir() -> PathBuf { PathBuf::from("input") }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_input_extension() -> String { "json".to_string() }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            input_extension: default_input_extension(),
        }
    }
}

/// 坐标平移，输出坐标 = 原坐标 - 平移量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CoordinateTransform {
    /// X 平移量
    #[serde(default)]
    pub x_shift: f64,
    /// Y 平移量
    #[serde(default)]
    pub y_shift: f64,
}

/// 时间步选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeSettings {
    /// 时间步索引，负数从末尾计数；缺省或 `null` 表示全部时间步取平均
    #[serde(default)]
    pub time_index: Option<i64>,
}

/// 单个区域配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegionConfig {
    /// 区域边界 DXF（第一条闭合多段线）
    #[serde(default, alias = "region_dxf")]
    pub region_geometry_path: PathBuf,

    /// 轴线 DXF（第一条多段线）
    #[serde(default, alias = "axis_dxf")]
    pub axis_geometry_path: PathBuf,

    /// 区域描述，用于输出标题
    #[serde(default)]
    pub description: Option<String>,
}

impl RegionConfig {
    /// 创建区域配置
    pub fn new(region: impl Into<PathBuf>, axis: impl Into<PathBuf>) -> Self {
        Self {
            region_geometry_path: region.into(),
            axis_geometry_path: axis.into(),
            description: None,
        }
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 描述，缺省时为区域名
    pub fn description_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.description.as_deref().unwrap_or(name)
    }
}

/// 输出选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// 是否导出全场
    #[serde(default = "default_true")]
    pub export_full_field: bool,

    /// 是否导出区域
    #[serde(default = "default_true")]
    pub export_regions: bool,

    /// 小数位数
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_true() -> bool { true }
fn default_precision() -> usize { 6 }

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            export_full_field: true,
            export_regions: true,
            precision: default_precision(),
        }
    }
}

/// 批处理选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// 工作线程数，缺省为 min(文件数, CPU 核数)
    #[serde(default)]
    pub parallel_workers: Option<usize>,

    /// 是否允许并行
    #[serde(default = "default_true")]
    pub enable_parallel: bool,

    /// 详细日志（INFO 级别），否则只输出 WARN 及以上
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// 日志文件（可选）
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: None,
            enable_parallel: true,
            verbose: true,
            log_file: None,
        }
    }
}

impl ConverterConfig {
    /// 从 YAML 文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_yaml_str(&content)
    }

    /// 从 YAML 文本解析并验证
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // 空文件视为全部默认值
        let config: ConverterConfig = if content.trim().is_empty() {
            ConverterConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ct = &self.coordinate_transform;
        if !ct.x_shift.is_finite() {
            return Err(ConfigError::invalid(
                "coordinate_transform.x_shift",
                ct.x_shift,
                "必须为有限数",
            ));
        }
        if !ct.y_shift.is_finite() {
            return Err(ConfigError::invalid(
                "coordinate_transform.y_shift",
                ct.y_shift,
                "必须为有限数",
            ));
        }

        if self.output_settings.precision > MAX_PRECISION {
            return Err(ConfigError::invalid(
                "output_settings.precision",
                self.output_settings.precision,
                format!("不能超过 {MAX_PRECISION}"),
            ));
        }

        if self.processing.parallel_workers == Some(0) {
            return Err(ConfigError::invalid(
                "processing.parallel_workers",
                0,
                "至少为 1",
            ));
        }

        for (name, region) in &self.regions {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::invalid(
                    "regions",
                    name,
                    "区域名不能为空或包含路径分隔符",
                ));
            }
            if region.region_geometry_path.as_os_str().is_empty() {
                return Err(ConfigError::invalid(
                    format!("regions.{name}.region_geometry_path"),
                    "",
                    "路径为空",
                ));
            }
            if region.axis_geometry_path.as_os_str().is_empty() {
                return Err(ConfigError::invalid(
                    format!("regions.{name}.axis_geometry_path"),
                    "",
                    "路径为空",
                ));
            }
        }

        Ok(())
    }

    /// 保存配置到 YAML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 解析工作线程数
    ///
    /// 配置了 `parallel_workers` 时直接使用，否则取 min(文件数, CPU 核数)，至少为 1。
    pub fn worker_count(&self, n_files: usize) -> usize {
        let workers = self.processing.parallel_workers.unwrap_or_else(|| {
            let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
            n_files.min(cpus)
        });
        workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
paths:
  input_dir: data/in
  output_dir: data/out
coordinate_transform:
  x_shift: 500000.0
  y_shift: 3000000.0
time_settings:
  time_index: 0
regions:
  upstream:
    region_dxf: geo/up_region.dxf
    axis_dxf: geo/up_axis.dxf
    description: 上游段
  bend:
    region_geometry_path: geo/bend_region.dxf
    axis_geometry_path: geo/bend_axis.dxf
output_settings:
  export_full_field: false
  precision: 3
processing:
  parallel_workers: 4
  enable_parallel: true
  verbose: false
"#;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_settings.precision, 6);
        assert_eq!(config.time_settings.time_index, None);
        assert_eq!(config.paths.input_extension, "json");
    }

    #[test]
    fn test_parse_full_yaml() {
        let config = ConverterConfig::from_yaml_str(FULL).unwrap();
        assert_eq!(config.paths.output_dir, PathBuf::from("data/out"));
        assert_eq!(config.paths.input_extension, "json");
        assert_eq!(config.coordinate_transform.y_shift, 3_000_000.0);
        assert_eq!(config.time_settings.time_index, Some(0));
        assert!(!config.output_settings.export_full_field);
        assert!(config.output_settings.export_regions);
        assert_eq!(config.output_settings.precision, 3);
        assert_eq!(config.processing.parallel_workers, Some(4));
        assert!(!config.processing.verbose);

        // 区域按名称排序，旧键名可用
        let names: Vec<&str> = config.regions.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["bend", "upstream"]);
        let up = &config.regions["upstream"];
        assert_eq!(up.region_geometry_path, PathBuf::from("geo/up_region.dxf"));
        assert_eq!(up.description_or("upstream"), "上游段");
        assert_eq!(config.regions["bend"].description_or("bend"), "bend");
    }

    #[test]
    fn test_missing_or_null_time_index_means_all_frames() {
        let config = ConverterConfig::from_yaml_str("time_settings:\n  time_index: null\n").unwrap();
        assert_eq!(config.time_settings.time_index, None);

        let config = ConverterConfig::from_yaml_str("time_settings: {}\n").unwrap();
        assert_eq!(config.time_settings.time_index, None);

        let config = ConverterConfig::from_yaml_str("time_settings:\n  time_index: -1\n").unwrap();
        assert_eq!(config.time_settings.time_index, Some(-1));
    }

    #[test]
    fn test_invalid_values() {
        let err = ConverterConfig::from_yaml_str("output_settings:\n  precision: 16\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "output_settings.precision"));

        let err = ConverterConfig::from_yaml_str("processing:\n  parallel_workers: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = ConverterConfig::from_yaml_str("regions:\n  a:\n    axis_dxf: x.dxf\n").unwrap_err();
        assert!(err.to_string().contains("regions.a.region_geometry_path"));

        let err = ConverterConfig::from_yaml_str(".nan").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let mut config = ConverterConfig::default();
        config.coordinate_transform.x_shift = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_count() {
        let mut config = ConverterConfig::default();
        assert_eq!(config.worker_count(1), 1);
        assert_eq!(config.worker_count(0), 1);
        assert!(config.worker_count(64) >= 1);

        config.processing.parallel_workers = Some(8);
        assert_eq!(config.worker_count(2), 8);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = ConverterConfig::from_yaml_str(FULL).unwrap();
        config.save_to_file(&path).unwrap();
        let reloaded = ConverterConfig::from_file(&path).unwrap();
        assert_eq!(reloaded, config);

        assert!(matches!(
            ConverterConfig::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
