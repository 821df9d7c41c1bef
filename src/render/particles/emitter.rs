//! 粒子发射器的 CPU 侧状态与 GPU 数据布局
//!
//! CPU 每帧只捕获发射参数；粒子的生成、老化和消亡全部在 GPU 上进行。
//! 本模块中的类型不持有任何 GPU 资源，可以在没有设备的情况下测试。

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

// ============================================================================
// 流式模拟状态机
// ============================================================================

/// 粒子流缓冲的模拟阶段
///
/// 显式枚举而不是布尔标志：首帧必须恰好消费一次种子绘制，
/// 之后进入稳态；`Reset` 把状态机拨回 `Seeding`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// 下一次模拟从单粒子种子缓冲读取
    Seeding,
    /// 模拟从上一帧的输出缓冲读取，数量由 GPU 追踪
    SteadyState,
}

/// Ping-pong 缓冲对的索引
///
/// 固定两元素 arena + 索引的形式：任一时刻恰有一个缓冲被写入，
/// 另一个被读取。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingPong {
    write: usize,
}

impl PingPong {
    pub fn new() -> Self {
        Self { write: 0 }
    }

    /// 当前写入侧索引
    pub fn write(&self) -> usize {
        self.write
    }

    /// 当前读取侧索引
    pub fn read(&self) -> usize {
        1 - self.write
    }

    /// 交换读写角色
    pub fn flip(&mut self) {
        self.write = 1 - self.write;
    }
}

impl Default for PingPong {
    fn default() -> Self {
        Self::new()
    }
}

/// 粒子流的完整 CPU 侧状态：阶段 + ping-pong 索引 + 累积年龄
#[derive(Debug, Clone, Copy)]
pub struct StreamState {
    phase: StreamPhase,
    buffers: PingPong,
    age: f32,
}

impl StreamState {
    pub fn new() -> Self {
        Self {
            phase: StreamPhase::Seeding,
            buffers: PingPong::new(),
            age: 0.0,
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// 系统累积运行时间（秒）
    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn accumulate(&mut self, dt: f32) {
        self.age += dt;
    }

    /// 模拟阶段的输入侧索引
    pub fn simulate_source(&self) -> usize {
        self.buffers.read()
    }

    /// 模拟阶段的输出侧索引
    pub fn simulate_target(&self) -> usize {
        self.buffers.write()
    }

    /// 消费种子标志：仅在 `Seeding` 阶段返回 `true`，同时转入稳态。
    /// 每次 [`reset`](Self::reset) 之后恰好触发一次。
    pub fn take_seed(&mut self) -> bool {
        match self.phase {
            StreamPhase::Seeding => {
                self.phase = StreamPhase::SteadyState;
                true
            }
            StreamPhase::SteadyState => false,
        }
    }

    /// 模拟完成后交换读写角色；交换之后 [`draw_source`](Self::draw_source)
    /// 指向刚写入的缓冲。
    pub fn flip(&mut self) {
        self.buffers.flip();
    }

    /// 渲染阶段读取的缓冲索引
    pub fn draw_source(&self) -> usize {
        self.buffers.read()
    }

    /// 重新武装种子阶段并清零累积年龄
    pub fn reset(&mut self) {
        self.phase = StreamPhase::Seeding;
        self.age = 0.0;
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 每帧发射参数
// ============================================================================

/// CPU 每帧捕获的发射参数快照
///
/// `update` 只写入本结构，不触发任何 GPU 工作。
#[derive(Component, Debug, Clone, Copy)]
pub struct EmitterFrame {
    /// 发射点（船尾），世界空间
    pub emit_pos: Vec3,
    /// 发射体（船）的速度
    pub emit_velocity: Vec3,
    /// 发射方向（船的反向前进方向）
    pub emit_dir: Vec3,
    /// 相机位置，用于公告板展开
    pub eye_pos: Vec3,
    /// 模拟总时间（秒）
    pub game_time: f32,
    /// 本帧时间步长
    pub time_step: f32,
    /// 推力占最大推力的比值，[0, 1]
    pub thrust: f32,
}

crate::impl_default!(EmitterFrame {
    emit_pos: Vec3::ZERO,
    emit_velocity: Vec3::ZERO,
    emit_dir: Vec3::Y,
    eye_pos: Vec3::ZERO,
    game_time: 0.0,
    time_step: 0.0,
    thrust: 0.0,
});

// ============================================================================
// GPU 数据结构
// ============================================================================

/// 种子发射器伪粒子的类型标签
pub const PARTICLE_KIND_EMITTER: u32 = 0;
/// 存活尾焰粒子的类型标签
pub const PARTICLE_KIND_FLARE: u32 = 1;

/// GPU 粒子结构（对应 WGSL struct，48 字节）
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuParticle {
    /// 位置
    pub position: [f32; 3],
    /// 当前年龄
    pub age: f32,
    /// 速度
    pub velocity: [f32; 3],
    /// 类型标签（0 = 发射器，1 = 尾焰）
    pub kind: u32,
    /// 公告板尺寸
    pub size: [f32; 2],
    /// 填充
    pub _pad: [f32; 2],
}

impl GpuParticle {
    /// 持久的种子发射器伪粒子：年龄 0，类型 0，其余字段不适用。
    pub fn seed() -> Self {
        Self {
            position: [0.0; 3],
            age: 0.0,
            velocity: [0.0; 3],
            kind: PARTICLE_KIND_EMITTER,
            size: [0.0; 2],
            _pad: [0.0; 2],
        }
    }

    /// 渲染管线的实例缓冲布局
    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32,   // age
            2 => Float32x3, // velocity
            3 => Uint32,    // kind
            4 => Float32x2, // size
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuParticle>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// 粒子系统 Uniform（对应 WGSL struct，96 字节）
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    /// 相机位置
    pub eye_pos: [f32; 3],
    /// 模拟总时间
    pub game_time: f32,
    /// 发射点
    pub emit_pos: [f32; 3],
    /// 时间步长
    pub time_step: f32,
    /// 发射方向
    pub emit_dir: [f32; 3],
    /// 推力比值
    pub thrust: f32,
    /// 发射体速度
    pub emit_velocity: [f32; 3],
    /// 填充
    pub _pad: f32,
    /// 粒子基础尺寸
    pub base_size: [f32; 2],
    /// 粒子寿命（秒）
    pub lifetime: f32,
    /// 满推力下的发射间隔（秒）
    pub emission_interval: f32,
    /// 缓冲容量
    pub max_particles: u32,
    /// 填充
    pub _pad2: [f32; 3],
}

impl ParticleUniforms {
    /// 从一帧发射参数和静态配置组装 Uniform 块
    pub fn new(frame: &EmitterFrame, lifetime: f32, emission_rate: f32, max_particles: u32, base_size: [f32; 2]) -> Self {
        Self {
            eye_pos: frame.eye_pos.to_array(),
            game_time: frame.game_time,
            emit_pos: frame.emit_pos.to_array(),
            time_step: frame.time_step,
            emit_dir: frame.emit_dir.to_array(),
            thrust: frame.thrust,
            emit_velocity: frame.emit_velocity.to_array(),
            _pad: 0.0,
            base_size,
            lifetime,
            emission_interval: 1.0 / emission_rate.max(1.0),
            max_particles,
            _pad2: [0.0; 3],
        }
    }
}

// ============================================================================
// 随机查找表
// ============================================================================

/// 随机查找表宽度（1D 纹理的像素数）
pub const RANDOM_TABLE_WIDTH: u32 = 1024;

/// 生成驱动随机生成行为的查找表：均匀分布在 [-1, 1] 的 4 维向量，
/// 构造后不再变化。
pub fn generate_random_table() -> Vec<[f32; 4]> {
    let mut rng = rand::thread_rng();
    (0..RANDOM_TABLE_WIDTH)
        .map(|_| {
            [
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ]
        })
        .collect()
}

// ============================================================================
// 测试
// ============================================================================
