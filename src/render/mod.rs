//! 渲染侧组件
//!
//! 本 crate 不拥有交换链或帧循环；这里只包含在宿主渲染器的命令编码器
//! 上追加工作的自包含组件。

pub mod particles;

pub use particles::ThrusterParticles;
