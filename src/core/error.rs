//! 统一错误处理模块
//!
//! 提供模拟核心范围内的统一错误类型定义
//!
//! ## 错误策略
//!
//! 本核心遵循「初始化快速失败，稳态永不失败」：GPU 资源分配失败在构造时
//! 立即返回错误；每帧的 `update`/`draw` 没有错误路径。

use thiserror::Error;

/// 模拟核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 渲染资源错误
///
/// 仅在构造时产生；运行时的 GPU 错误属于驱动层，不在本核心的契约内。
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create buffer: {0}")]
    BufferCreation(String),

    #[error("Failed to create texture: {0}")]
    TextureCreation(String),

    #[error("Failed to create pipeline: {0}")]
    PipelineCreation(String),

    #[error("Invalid render state: {0}")]
    InvalidState(String),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
pub type RenderResult<T> = Result<T, RenderError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let render_err = RenderError::BufferCreation("out of memory".to_string());
        let engine_err: EngineError = render_err.into();
        assert!(matches!(engine_err, EngineError::Render(_)));
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::TextureCreation("random lookup table".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to create texture: random lookup table"
        );
    }

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::FileError(_)));
    }
}
