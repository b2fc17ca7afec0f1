//! The wgpu renderer behind the animation loop.
//!
//! This implements `anim::RenderBackend` with three pipelines:
//! - lit triangles for the solid core (ambient + two point lights + emissive),
//! - unlit triangles/lines for the halo ring and the wireframe overlay,
//! - instanced billboard quads for the particle field.
//!
//! Design goals:
//! - All geometry is static: vertex/index/instance buffers are uploaded once,
//!   on the first draw, and never rewritten. Per-frame work is a handful of
//!   uniform writes plus four draw calls.
//! - Each object owns its uniform buffer and bind group, so every
//!   `Queue::write_buffer` this frame lands in a distinct buffer and ordering
//!   relative to the encoded pass is a non-issue.
//! - 4x MSAA into an offscreen target, resolved to the surface; a depth
//!   buffer keeps the core solid while the transparent layers draw without
//!   depth writes.

use std::{borrow::Cow, mem, sync::Arc};

use anyhow::Context as _;
use wgpu::util::DeviceExt as _;
use winit::window::Window;

use crate::anim::RenderBackend;
use crate::render::gpu::Gpu;
use crate::scene::{MeshNode, ParticleField, PerspectiveCamera, Scene};

const MSAA_SAMPLES: u32 = 4;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// World-space half size of a particle quad at size factor 1.0.
const PARTICLE_HALF_SIZE: f32 = 0.02;
/// Radial pulse amplitude and its time/height frequencies.
const PULSE_AMPLITUDE: f32 = 0.25;
const PULSE_TIME_FREQ: f32 = 0.8;
const PULSE_HEIGHT_FREQ: f32 = 0.25;

/// Per-frame uniforms shared by all pipelines. Layout mirrors the WGSL
/// `FrameUniforms` struct in each shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    fog: [f32; 4],
    key_pos: [f32; 4],
    key_color: [f32; 4],
    fill_pos: [f32; 4],
    fill_color: [f32; 4],
    /// key decay, fill decay, time, unused.
    params: [f32; 4],
}

impl FrameUniforms {
    fn from_scene(scene: &Scene) -> Self {
        let key = scene.key_light;
        let fill = scene.fill_light;
        Self {
            view: scene.camera.view().to_cols_array_2d(),
            proj: scene.camera.projection().to_cols_array_2d(),
            ambient: [
                scene.ambient.color.r,
                scene.ambient.color.g,
                scene.ambient.color.b,
                scene.ambient.intensity,
            ],
            fog: [
                scene.fog.color.r,
                scene.fog.color.g,
                scene.fog.color.b,
                scene.fog.density,
            ],
            key_pos: [key.position.x, key.position.y, key.position.z, key.range],
            key_color: [key.color.r, key.color.g, key.color.b, key.intensity],
            fill_pos: [
                fill.position.x,
                fill.position.y,
                fill.position.z,
                fill.range,
            ],
            fill_color: [fill.color.r, fill.color.g, fill.color.b, fill.intensity],
            params: [key.decay, fill.decay, scene.particles.time, 0.0],
        }
    }
}

/// Per-object uniforms. Layout mirrors the WGSL `ObjectUniforms` struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
}

impl ObjectUniforms {
    fn for_node(node: &MeshNode, camera: &PerspectiveCamera) -> Self {
        let model = node.model();
        let mvp = camera.projection() * camera.view() * model;
        let mat = node.material;
        Self {
            model: model.to_cols_array_2d(),
            mvp: mvp.to_cols_array_2d(),
            color: [mat.color.r, mat.color.g, mat.color.b, mat.opacity],
            emissive: [
                mat.emissive.r,
                mat.emissive.g,
                mat.emissive.b,
                mat.emissive_intensity,
            ],
        }
    }
}

/// Particle-cloud uniforms. Layout mirrors the WGSL `ParticleUniforms` struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct ParticleUniforms {
    color: [f32; 4],
    /// half size, pulse amplitude, time freq, height freq.
    params: [f32; 4],
}

impl ParticleUniforms {
    fn for_field(field: &ParticleField) -> Self {
        Self {
            color: field.color.to_array(),
            params: [
                PARTICLE_HALF_SIZE,
                PULSE_AMPLITUDE,
                PULSE_TIME_FREQ,
                PULSE_HEIGHT_FREQ,
            ],
        }
    }
}

/// GPU vertex format for the 3D meshes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex3D {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex3D {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    #[inline]
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Per-instance particle sample: xyz position, w size factor.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct ParticleInstance {
    sample: [f32; 4],
}

impl ParticleInstance {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];

    #[inline]
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// A mesh uploaded to the GPU with an index range to draw.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// One drawable node: its geometry plus its own uniform buffer/bind group.
struct DrawObject {
    mesh: GpuMesh,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Everything uploaded from the (static) scene on the first draw.
struct SceneBuffers {
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    core: DrawObject,
    wire: DrawObject,
    halo: DrawObject,

    particle_uniform_buffer: wgpu::Buffer,
    particle_bind_group: wgpu::BindGroup,
    particle_instances: wgpu::Buffer,
    particle_count: u32,
}

/// MSAA color + depth targets for the current surface size.
struct RenderTargets {
    msaa_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    size: winit::dpi::PhysicalSize<u32>,
}

/// The backdrop's wgpu renderer.
pub struct SceneRenderer {
    window: Arc<Window>,
    gpu: Gpu,

    lit_pipeline: wgpu::RenderPipeline,
    unlit_tri_pipeline: wgpu::RenderPipeline,
    unlit_line_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,

    frame_bgl: wgpu::BindGroupLayout,
    object_bgl: wgpu::BindGroupLayout,
    particle_bgl: wgpu::BindGroupLayout,

    buffers: Option<SceneBuffers>,
    targets: Option<RenderTargets>,
}

impl SceneRenderer {
    /// Create the renderer for a window: GPU context + the four pipelines.
    ///
    /// Geometry is not touched here; it is uploaded lazily from the scene on
    /// the first `draw` call and reused forever after (the scene's geometry
    /// is immutable by construction).
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gpu = Gpu::new(window.clone()).await?;

        let frame_bgl = uniform_bind_group_layout(
            &gpu.device,
            "Backdrop Frame BGL",
            mem::size_of::<FrameUniforms>() as u64,
        );
        let object_bgl = uniform_bind_group_layout(
            &gpu.device,
            "Backdrop Object BGL",
            mem::size_of::<ObjectUniforms>() as u64,
        );
        let particle_bgl = uniform_bind_group_layout(
            &gpu.device,
            "Backdrop Particle BGL",
            mem::size_of::<ParticleUniforms>() as u64,
        );

        let lit_shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Backdrop Lit Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/lit_mesh.wgsl"
                ))),
            });
        let unlit_shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Backdrop Unlit Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/unlit.wgsl"))),
            });
        let particle_shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Backdrop Particle Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/particles.wgsl"
                ))),
            });

        let mesh_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Backdrop Mesh Pipeline Layout"),
                bind_group_layouts: &[&frame_bgl, &object_bgl],
                immediate_size: 0,
            });
        let particle_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Backdrop Particle Pipeline Layout"),
                bind_group_layouts: &[&frame_bgl, &particle_bgl],
                immediate_size: 0,
            });

        let surface_format = gpu.surface_format.add_srgb_suffix();

        // Solid core: depth-written triangles with backface culling.
        let lit_pipeline = mesh_pipeline(
            &gpu.device,
            "Backdrop Lit Pipeline",
            &mesh_layout,
            &lit_shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
            wgpu::BlendState::ALPHA_BLENDING,
            true,
        );

        // Halo ring: double-sided transparent triangles, no depth writes.
        let unlit_tri_pipeline = mesh_pipeline(
            &gpu.device,
            "Backdrop Unlit Tri Pipeline",
            &mesh_layout,
            &unlit_shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            None,
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        // Wireframe overlay: the mesh's unique edges as a line list.
        let unlit_line_pipeline = mesh_pipeline(
            &gpu.device,
            "Backdrop Unlit Line Pipeline",
            &mesh_layout,
            &unlit_shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            None,
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        // Particles: additive glow, drawn last without depth writes.
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };
        let particle_pipeline =
            gpu.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Backdrop Particle Pipeline"),
                    layout: Some(&particle_layout),
                    vertex: wgpu::VertexState {
                        module: &particle_shader,
                        entry_point: Some("vs_main"),
                        buffers: &[ParticleInstance::layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &particle_shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: surface_format,
                            blend: Some(additive),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleStrip,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: false,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: Default::default(),
                        bias: Default::default(),
                    }),
                    multisample: wgpu::MultisampleState {
                        count: MSAA_SAMPLES,
                        ..Default::default()
                    },
                    multiview_mask: None,
                    cache: None,
                });

        Ok(Self {
            window,
            gpu,
            lit_pipeline,
            unlit_tri_pipeline,
            unlit_line_pipeline,
            particle_pipeline,
            frame_bgl,
            object_bgl,
            particle_bgl,
            buffers: None,
            targets: None,
        })
    }

    /// Upload the scene's static geometry and create per-object uniforms.
    fn upload_scene(&self, scene: &Scene) -> SceneBuffers {
        let device = &self.gpu.device;

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop Frame Uniforms"),
            size: mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Backdrop Frame BG"),
            layout: &self.frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let core = self.upload_object(&scene.core, &scene.core.mesh.indices, "Core");

        // The wireframe overlay draws the mesh's unique edges, not its faces.
        let wire_lines = scene.wire.mesh.edge_lines();
        let wire = self.upload_object(&scene.wire, &wire_lines, "Wire");

        let halo = self.upload_object(&scene.halo, &scene.halo.mesh.indices, "Halo");

        let instances: Vec<ParticleInstance> = scene
            .particles
            .positions()
            .iter()
            .zip(scene.particles.scales())
            .map(|(p, &s)| ParticleInstance {
                sample: [p[0], p[1], p[2], s],
            })
            .collect();
        let particle_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Backdrop Particle Instances"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let particle_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop Particle Uniforms"),
            size: mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let particle_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Backdrop Particle BG"),
            layout: &self.particle_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: particle_uniform_buffer.as_entire_binding(),
            }],
        });

        log::debug!(
            "uploaded backdrop scene: {} particles, core/wire/halo meshes",
            instances.len()
        );

        SceneBuffers {
            frame_buffer,
            frame_bind_group,
            core,
            wire,
            halo,
            particle_uniform_buffer,
            particle_bind_group,
            particle_instances,
            particle_count: instances.len() as u32,
        }
    }

    /// Upload one node's vertices plus the given index list (triangles for
    /// solid meshes, edge pairs for the wireframe).
    fn upload_object(&self, node: &MeshNode, indices: &[u16], label: &str) -> DrawObject {
        let device = &self.gpu.device;

        let vertices: Vec<Vertex3D> = node
            .mesh
            .positions
            .iter()
            .zip(&node.mesh.normals)
            .map(|(p, n)| Vertex3D {
                position: *p,
                normal: *n,
            })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Backdrop {label} Vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Pad odd-length u16 index data to satisfy COPY_BUFFER_ALIGNMENT.
        let mut index_data = indices.to_vec();
        if index_data.len() % 2 == 1 {
            index_data.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Backdrop {label} Indices")),
            contents: bytemuck::cast_slice(&index_data),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Backdrop {label} Uniforms")),
            size: mem::size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Backdrop {label} BG")),
            layout: &self.object_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        DrawObject {
            mesh: GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
            },
            uniform_buffer,
            bind_group,
        }
    }

    /// (Re)create the MSAA color and depth targets when the size changed.
    fn ensure_targets(&mut self) {
        let size = self.gpu.size;
        if let Some(t) = &self.targets {
            if t.size == size {
                return;
            }
        }

        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };

        let msaa = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Backdrop MSAA Color"),
            size: extent,
            mip_level_count: 1,
            sample_count: MSAA_SAMPLES,
            dimension: wgpu::TextureDimension::D2,
            format: self.gpu.surface_format.add_srgb_suffix(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Backdrop Depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: MSAA_SAMPLES,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.targets = Some(RenderTargets {
            msaa_view: msaa.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            size,
        });
    }
}

impl RenderBackend for SceneRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        // Density capping happens inside the GPU context; targets follow
        // lazily on the next draw.
        self.gpu.resize(winit::dpi::PhysicalSize::new(width, height));
    }

    fn draw(&mut self, scene: &Scene) -> anyhow::Result<()> {
        // Minimized: nothing to present, and the next resize restores us.
        if self.gpu.size.width == 0 || self.gpu.size.height == 0 {
            return Ok(());
        }

        // Acquire frame (handle recoverable surface errors by skipping).
        let (surface_texture, surface_view) = match self.gpu.acquire_frame() {
            Ok(v) => v,
            Err(wgpu::SurfaceError::Outdated)
            | Err(wgpu::SurfaceError::Lost)
            | Err(wgpu::SurfaceError::Other) => {
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::anyhow!("wgpu SurfaceError::OutOfMemory"));
            }
        };

        if self.buffers.is_none() {
            self.buffers = Some(self.upload_scene(scene));
        }
        self.ensure_targets();

        let buffers = self.buffers.as_ref().context("scene buffers missing")?;
        let targets = self.targets.as_ref().context("render targets missing")?;

        // Per-frame uniform updates; geometry stays untouched.
        let queue = &self.gpu.queue;
        queue.write_buffer(
            &buffers.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_scene(scene)),
        );
        queue.write_buffer(
            &buffers.core.uniform_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::for_node(&scene.core, &scene.camera)),
        );
        queue.write_buffer(
            &buffers.wire.uniform_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::for_node(&scene.wire, &scene.camera)),
        );
        queue.write_buffer(
            &buffers.halo.uniform_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::for_node(&scene.halo, &scene.camera)),
        );
        queue.write_buffer(
            &buffers.particle_uniform_buffer,
            0,
            bytemuck::bytes_of(&ParticleUniforms::for_field(&scene.particles)),
        );

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Backdrop Encoder"),
            });

        {
            let fog = scene.fog.color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Backdrop Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.msaa_view,
                    depth_slice: None,
                    resolve_target: Some(&surface_view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: fog.r as f64,
                            g: fog.g as f64,
                            b: fog.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // Opaque-ish core first, then the transparent layers back to
            // front, particles last with additive glow.
            pass.set_bind_group(0, &buffers.frame_bind_group, &[]);

            pass.set_pipeline(&self.lit_pipeline);
            draw_object(&mut pass, &buffers.core);

            pass.set_pipeline(&self.unlit_line_pipeline);
            draw_object(&mut pass, &buffers.wire);

            pass.set_pipeline(&self.unlit_tri_pipeline);
            draw_object(&mut pass, &buffers.halo);

            pass.set_pipeline(&self.particle_pipeline);
            pass.set_bind_group(1, &buffers.particle_bind_group, &[]);
            pass.set_vertex_buffer(0, buffers.particle_instances.slice(..));
            pass.draw(0..4, 0..buffers.particle_count);
        }

        queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        Ok(())
    }
}

fn draw_object(pass: &mut wgpu::RenderPass<'_>, object: &DrawObject) {
    pass.set_bind_group(1, &object.bind_group, &[]);
    pass.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
    pass.set_index_buffer(
        object.mesh.index_buffer.slice(..),
        wgpu::IndexFormat::Uint16,
    );
    pass.draw_indexed(0..object.mesh.index_count, 0, 0..1);
}

/// A bind group layout with a single uniform buffer visible to both stages.
fn uniform_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    min_size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(min_size),
            },
            count: None,
        }],
    })
}

/// Triangle/line pipeline over the shared mesh vertex layout.
#[allow(clippy::too_many_arguments)]
fn mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: MSAA_SAMPLES,
            ..Default::default()
        },
        multiview_mask: None,
        cache: None,
    })
}
