//! GPU 粒子系统模块
//!
//! 推进器尾焰的模拟完全在 GPU 上执行，CPU 每帧只提供发射参数。
//!
//! ## 架构设计
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Thruster Particle Stream                  │
//! ├──────────────────────────────────────────────────────────┤
//! │  Phase A. Simulate (Compute Shader)                       │
//! │     - 首帧：读取单粒子种子缓冲（恰好一次）                  │
//! │     - 稳态：按上一帧产出数量间接派发                        │
//! │     - 发射器伪粒子按推力生成尾焰；存活粒子积分、老化         │
//! │     - 产出数量原子累加进写入侧的间接绘制参数                 │
//! │                                                           │
//! │  Finalize (Compute Shader)                                │
//! │     - 产出数量截断到容量，推导下一帧的派发参数               │
//! │                                                           │
//! │  Phase B. Render (Vertex + Fragment Shader)               │
//! │     - 乒乓交换后以 draw_indirect 绘制刚写入的缓冲            │
//! │     - 相机朝向公告板，加性混合，深度测试开、写入关           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! 粒子数量只存在于 GPU 侧的间接参数里，CPU 从不回读。

pub mod emitter;
pub mod system;

pub use emitter::{
    generate_random_table, EmitterFrame, GpuParticle, ParticleUniforms, PingPong, StreamPhase,
    StreamState, PARTICLE_KIND_EMITTER, PARTICLE_KIND_FLARE, RANDOM_TABLE_WIDTH,
};
pub use system::{CameraUniforms, ThrusterParticles};
