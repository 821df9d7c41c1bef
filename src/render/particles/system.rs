//! GPU 粒子系统
//!
//! 乒乓流式协议的 wgpu 实现：模拟阶段是一个 compute pass，从读取侧
//! 缓冲取粒子、把存活者追加到写入侧缓冲，产出数量写入 GPU 侧的间接
//! 绘制参数；渲染阶段交换读写角色后用 `draw_indirect` 绘制刚写入的
//! 缓冲。粒子数量从不回读到 CPU。

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::config::ParticleConfig;
use crate::core::error::{RenderError, RenderResult};
use crate::render::particles::emitter::{
    generate_random_table, EmitterFrame, GpuParticle, ParticleUniforms, StreamState,
    RANDOM_TABLE_WIDTH,
};

/// 模拟 compute shader 的工作组大小，与 WGSL 中的声明一致
const WORKGROUP_SIZE: u32 = 64;

/// 间接绘制参数的初始值：每实例 4 个顶点（三角带公告板），0 个实例
const DRAW_ARGS_RESET: [u32; 4] = [4, 0, 0, 0];

/// 相机 Uniform（对应 WGSL struct，80 字节）
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub world_up: [f32; 3],
    pub _pad: f32,
}

/// 推进器尾焰粒子系统
///
/// 构造时一次性分配全部 GPU 资源；分配失败是致命错误，立即上报，
/// 不存在降级模式。运行期的 `update`/`draw` 没有失败路径。
pub struct ThrusterParticles {
    max_particles: u32,
    lifetime: f32,
    emission_rate: f32,
    base_size: [f32; 2],

    frame: EmitterFrame,
    state: StreamState,

    // 乒乓缓冲对：任一时刻恰有一侧被写、一侧被读
    stream_buffers: [wgpu::Buffer; 2],
    draw_args: [wgpu::Buffer; 2],
    dispatch_args: [wgpu::Buffer; 2],

    uniform_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,

    simulate_pipeline: wgpu::ComputePipeline,
    finalize_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,

    // 按写入侧索引存放的 bind group
    seed_bind_groups: [wgpu::BindGroup; 2],
    steady_bind_groups: [wgpu::BindGroup; 2],
    finalize_bind_groups: [wgpu::BindGroup; 2],
    sim_uniform_bind_group: wgpu::BindGroup,
    draw_uniform_bind_group: wgpu::BindGroup,
    sprite_bind_group: wgpu::BindGroup,
}

impl ThrusterParticles {
    /// 创建粒子系统及其全部 GPU 资源
    ///
    /// # 参数
    ///
    /// * `device` / `queue` - 宿主渲染器的 WGPU 句柄
    /// * `config` - 粒子配置（容量、寿命、发射率、尺寸）
    /// * `sprite_view` - 尾焰精灵纹理视图（构造时传入，之后不变）
    /// * `color_format` - 宿主渲染目标的颜色格式
    /// * `depth_format` - 宿主深度缓冲格式（粒子只测试、不写入深度）
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &ParticleConfig,
        sprite_view: &wgpu::TextureView,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> RenderResult<Self> {
        let particle_size = std::mem::size_of::<GpuParticle>() as u64;
        let stream_buffer_size = particle_size * config.max_particles as u64;

        let limits = device.limits();
        if stream_buffer_size > limits.max_storage_buffer_binding_size as u64 {
            let err = RenderError::BufferCreation(format!(
                "particle stream buffer of {} bytes exceeds the device storage binding limit of {}",
                stream_buffer_size, limits.max_storage_buffer_binding_size
            ));
            log::error!("{err}");
            return Err(err);
        }

        // 单粒子种子缓冲：类型 0、年龄 0 的持久发射器
        let seed_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Seed Buffer"),
            contents: bytemuck::bytes_of(&GpuParticle::seed()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        // 种子侧的输入计数：恰好 1 个粒子
        let seed_args = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Seed Args"),
            contents: bytemuck::cast_slice(&[4u32, 1, 0, 0]),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let stream_buffers = [0, 1].map(|i| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("Particle Stream Buffer {i}")),
                size: stream_buffer_size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
                mapped_at_creation: false,
            })
        });
        let draw_args = [0, 1].map(|i| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Particle Draw Args {i}")),
                contents: bytemuck::cast_slice(&DRAW_ARGS_RESET),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::INDIRECT
                    | wgpu::BufferUsages::COPY_DST,
            })
        });
        let dispatch_args = [0, 1].map(|i| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Particle Dispatch Args {i}")),
                contents: bytemuck::cast_slice(&[0u32, 1, 1]),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::INDIRECT,
            })
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Uniforms"),
            size: std::mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let random_view = Self::create_random_texture(device, queue);

        let sim_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Sim Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_particle_sim.wgsl").into()),
        });
        let draw_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Draw Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_particle_draw.wgsl").into()),
        });

        // --- Bind group layouts ---

        let storage_entry = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let sim_storage_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Sim Storage Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                storage_entry(3, false),
            ],
        });
        let finalize_storage_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particle Finalize Storage Layout"),
                entries: &[storage_entry(4, false), storage_entry(5, false)],
            });
        let sim_uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Sim Uniform Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D1,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });
        let draw_uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Draw Uniform Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let sprite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Sprite Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // --- Pipelines ---

        let simulate_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Simulate Pipeline Layout"),
            bind_group_layouts: &[&sim_storage_layout, &sim_uniform_layout],
            push_constant_ranges: &[],
        });
        let simulate_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Simulate Pipeline"),
            layout: Some(&simulate_layout),
            module: &sim_shader,
            entry_point: "simulate",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let finalize_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Finalize Pipeline Layout"),
            bind_group_layouts: &[&finalize_storage_layout, &sim_uniform_layout],
            push_constant_ranges: &[],
        });
        let finalize_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Finalize Pipeline"),
            layout: Some(&finalize_layout),
            module: &sim_shader,
            entry_point: "finalize",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let render_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Render Pipeline Layout"),
            bind_group_layouts: &[&draw_uniform_layout, &sprite_layout],
            push_constant_ranges: &[],
        });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&render_layout),
            vertex: wgpu::VertexState {
                module: &draw_shader,
                entry_point: "vs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[GpuParticle::instance_layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            // 深度：测试开、写入关，尾焰不遮挡后续几何
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &draw_shader,
                entry_point: "fs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    // 加性混合
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        // --- Bind groups（按写入侧索引） ---

        fn buffer_binding<'a>(binding: u32, buffer: &'a wgpu::Buffer) -> wgpu::BindGroupEntry<'a> {
            wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            }
        }

        let seed_bind_groups = [0, 1].map(|write| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Particle Seed Bind Group {write}")),
                layout: &sim_storage_layout,
                entries: &[
                    buffer_binding(0, &seed_buffer),
                    buffer_binding(1, &seed_args),
                    buffer_binding(2, &stream_buffers[write]),
                    buffer_binding(3, &draw_args[write]),
                ],
            })
        });
        let steady_bind_groups = [0, 1].map(|write| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Particle Steady Bind Group {write}")),
                layout: &sim_storage_layout,
                entries: &[
                    buffer_binding(0, &stream_buffers[1 - write]),
                    buffer_binding(1, &draw_args[1 - write]),
                    buffer_binding(2, &stream_buffers[write]),
                    buffer_binding(3, &draw_args[write]),
                ],
            })
        });
        let finalize_bind_groups = [0, 1].map(|write| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Particle Finalize Bind Group {write}")),
                layout: &finalize_storage_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: draw_args[write].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: dispatch_args[write].as_entire_binding(),
                    },
                ],
            })
        });
        let sim_uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Sim Uniform Bind Group"),
            layout: &sim_uniform_layout,
            entries: &[
                buffer_binding(0, &uniform_buffer),
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&random_view),
                },
            ],
        });
        let draw_uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Draw Uniform Bind Group"),
            layout: &draw_uniform_layout,
            entries: &[
                buffer_binding(0, &uniform_buffer),
                buffer_binding(1, &camera_buffer),
            ],
        });
        let sprite_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Particle Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let sprite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Sprite Bind Group"),
            layout: &sprite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(sprite_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sprite_sampler),
                },
            ],
        });

        log::info!(
            "thruster particle system created: capacity {} particles, {} byte stream buffers",
            config.max_particles,
            stream_buffer_size
        );

        Ok(Self {
            max_particles: config.max_particles,
            lifetime: config.particle_lifetime,
            emission_rate: config.emission_rate,
            base_size: config.base_size,
            frame: EmitterFrame::default(),
            state: StreamState::new(),
            stream_buffers,
            draw_args,
            dispatch_args,
            uniform_buffer,
            camera_buffer,
            simulate_pipeline,
            finalize_pipeline,
            render_pipeline,
            seed_bind_groups,
            steady_bind_groups,
            finalize_bind_groups,
            sim_uniform_bind_group,
            draw_uniform_bind_group,
            sprite_bind_group,
        })
    }

    /// 捕获本帧发射参数；不触发任何 GPU 工作
    pub fn update(
        &mut self,
        emit_pos: Vec3,
        emit_velocity: Vec3,
        emit_dir: Vec3,
        camera_pos: Vec3,
        game_time: f32,
        dt: f32,
        thrust_fraction: f32,
    ) {
        self.frame = EmitterFrame {
            emit_pos,
            emit_velocity,
            emit_dir,
            eye_pos: camera_pos,
            game_time,
            time_step: dt,
            thrust: thrust_fraction,
        };
        self.state.accumulate(dt);
    }

    /// 上传相机矩阵，公告板展开需要
    pub fn set_camera(&self, queue: &wgpu::Queue, view_proj: Mat4, world_up: Vec3) {
        let uniforms = CameraUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            world_up: world_up.to_array(),
            _pad: 0.0,
        };
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// 模拟并渲染一帧
    ///
    /// 阶段 A：重置写入侧绘制参数，运行模拟 compute pass——首帧从单粒子
    /// 种子缓冲读取（恰好一次），之后按上一帧产出的数量间接派发——随后
    /// finalize pass 推导下一帧的派发参数。阶段 B：交换乒乓角色，以间接
    /// 绘制渲染刚写入的缓冲。两个 pass 都是作用域化的，周围渲染器的管线
    /// 状态不受影响。
    pub fn draw(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        color_view: &wgpu::TextureView,
        depth_view: Option<&wgpu::TextureView>,
    ) {
        let uniforms = ParticleUniforms::new(
            &self.frame,
            self.lifetime,
            self.emission_rate,
            self.max_particles,
            self.base_size,
        );
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let write = self.state.simulate_target();
        queue.write_buffer(
            &self.draw_args[write],
            0,
            bytemuck::cast_slice(&DRAW_ARGS_RESET),
        );

        // 阶段 A：模拟 + finalize
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Simulate Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.simulate_pipeline);
            pass.set_bind_group(1, &self.sim_uniform_bind_group, &[]);
            if self.state.take_seed() {
                log::debug!("particle stream seeding: one-vertex seed pass");
                pass.set_bind_group(0, &self.seed_bind_groups[write], &[]);
                pass.dispatch_workgroups(1, 1, 1);
            } else {
                let read = self.state.simulate_source();
                pass.set_bind_group(0, &self.steady_bind_groups[write], &[]);
                pass.dispatch_workgroups_indirect(&self.dispatch_args[read], 0);
            }

            pass.set_pipeline(&self.finalize_pipeline);
            pass.set_bind_group(0, &self.finalize_bind_groups[write], &[]);
            pass.set_bind_group(1, &self.sim_uniform_bind_group, &[]);
            pass.dispatch_workgroups(1, 1, 1);
        }

        // 乒乓交换：刚写入的缓冲成为绘制来源
        self.state.flip();

        // 阶段 B：公告板渲染
        {
            let draw_source = self.state.draw_source();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_view.map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.render_pipeline);
            pass.set_bind_group(0, &self.draw_uniform_bind_group, &[]);
            pass.set_bind_group(1, &self.sprite_bind_group, &[]);
            pass.set_vertex_buffer(0, self.stream_buffers[draw_source].slice(..));
            pass.draw_indirect(&self.draw_args[draw_source], 0);
        }
    }

    /// 重新武装种子阶段并清零累积年龄，用于重启粒子流
    pub fn reset(&mut self) {
        log::debug!("particle stream reset: re-arming seed pass");
        self.state.reset();
    }

    /// 系统累积运行时间（秒）
    pub fn age(&self) -> f32 {
        self.state.age()
    }

    /// 当前流阶段（测试与诊断用）
    pub fn phase(&self) -> crate::render::particles::emitter::StreamPhase {
        self.state.phase()
    }

    fn create_random_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
        let table = generate_random_table();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Particle Random Table"),
            size: wgpu::Extent3d {
                width: RANDOM_TABLE_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D1,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&table),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(RANDOM_TABLE_WIDTH * 16),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: RANDOM_TABLE_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}
