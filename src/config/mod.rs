//! 统一配置系统
//!
//! 提供飞行模型与粒子系统的 TOML 配置文件支持和运行时默认值
use crate::core::error::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 模拟核心主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// 飞行模型配置
    #[serde(default)]
    pub flight: FlightConfig,

    /// 粒子系统配置
    #[serde(default)]
    pub particles: ParticleConfig,
}

impl_default!(SimConfig {
    flight: FlightConfig::default(),
    particles: ParticleConfig::default(),
});

impl SimConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.flight.validate()?;
        self.particles.validate()?;
        Ok(())
    }
}

/// 飞行模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// 船体质量
    pub mass: f32,

    /// 碰撞半径
    pub radius: f32,

    /// 最大推力
    pub thrust_max: f32,

    /// 推力上升速率（单位/秒）
    pub thrust_rise_rate: f32,

    /// 推力衰减速率（单位/秒）
    pub thrust_fall_rate: f32,

    /// 偏航角加速度（弧度/秒²）
    pub rotation_speed: f32,

    /// 每秒指数阻尼系数
    pub damping: f32,

    /// 滚转与偏航的耦合系数
    pub roll_coupling: f32,
}

impl_default!(FlightConfig {
    mass: 1.0,
    radius: 0.1,
    thrust_max: 400.0,
    thrust_rise_rate: 100.0,
    thrust_fall_rate: 200.0,
    rotation_speed: 6.0,
    damping: 0.05,
    roll_coupling: -0.25,
});

impl FlightConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.mass <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "flight.mass must be positive, got {}",
                self.mass
            )));
        }
        if self.thrust_max < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "flight.thrust_max must be non-negative, got {}",
                self.thrust_max
            )));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(ConfigError::ValidationError(format!(
                "flight.damping must lie in [0, 1), got {}",
                self.damping
            )));
        }
        Ok(())
    }
}

/// 粒子系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// 最大粒子数
    pub max_particles: u32,

    /// 单个粒子的寿命（秒）
    pub particle_lifetime: f32,

    /// 满推力下的每秒发射数量
    pub emission_rate: f32,

    /// 粒子初始尺寸（世界单位）
    pub base_size: [f32; 2],
}

impl_default!(ParticleConfig {
    max_particles: 1000,
    particle_lifetime: 1.0,
    emission_rate: 200.0,
    base_size: [0.3, 0.3],
});

impl ParticleConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        // 容量为 1 时尾焰会把持久发射器挤出缓冲，粒子流永久死亡
        if self.max_particles < 2 {
            return Err(ConfigError::ValidationError(format!(
                "particles.max_particles must be at least 2 (one slot for the \
                 persistent emitter plus at least one flare), got {}",
                self.max_particles
            )));
        }
        if self.particle_lifetime <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "particles.particle_lifetime must be positive, got {}",
                self.particle_lifetime
            )));
        }
        Ok(())
    }
}
