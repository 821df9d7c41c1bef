//! 核心模块
//!
//! 包含模拟核心的基础功能：
//! - `error` - 错误类型定义
//! - `macros` - 通用宏定义
//! - `SimTime` - 每帧时间资源

pub mod error;
#[macro_use]
pub mod macros;

use bevy_ecs::prelude::*;

// 重新导出错误类型
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult, RenderError, RenderResult};

/// 每帧时间资源
///
/// 由宿主循环在每帧开始时写入，驱动所有模拟系统。
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimTime {
    /// 距上一帧的秒数
    pub delta_seconds: f32,
    /// 模拟启动以来的总秒数
    pub elapsed_seconds: f64,
}

crate::impl_default!(SimTime {
    delta_seconds: 0.0,
    elapsed_seconds: 0.0,
});

impl SimTime {
    /// 推进一帧
    pub fn advance(&mut self, dt: f32) {
        self.delta_seconds = dt;
        self.elapsed_seconds += dt as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        time.advance(0.016);
        time.advance(0.016);
        assert_eq!(time.delta_seconds, 0.016);
        assert!((time.elapsed_seconds - 0.032).abs() < 1e-9);
    }
}
