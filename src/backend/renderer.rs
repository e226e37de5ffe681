//! [`Renderer`] that records depth passes and submits them to wgpu.
//!
//! Draws are recorded per bound target and encoded in one command buffer by
//! [`WgpuRenderer::flush`]. Each draw gets its own slot in a shared uniform
//! buffer, addressed with dynamic offsets.

use std::collections::HashMap;
use std::ops::Range;

use wgpu::util::DeviceExt;

use super::graphics::WgpuGraphics;
use super::pipeline::{align_to, BoneUniforms, DepthUniforms, PipelineCache, PipelineKey};
use super::GpuContext;
use crate::core::{
    FramebufferHandle, GraphicsContext, Id, RenderError, RenderInfo, RenderResult, Renderer,
    TextureHandle,
};
use crate::geometry::{DepthVertex, Geometry, GeometryBuffer, MAX_MORPH_TARGETS};
use crate::material::{Material, Shader};
use crate::math::Color;
use crate::scene::{NodeId, Scene};
use crate::texture::RenderTargetTexture;

/// Vertex and index buffers of one geometry.
struct GpuGeometry {
    vertex: wgpu::Buffer,
    index: Option<wgpu::Buffer>,
}

impl GpuGeometry {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertices = DepthVertex::from_geometry(geometry);
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Depth Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = (!geometry.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Depth Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        Self { vertex, index }
    }
}

struct DrawCommand {
    pipeline: PipelineKey,
    geometry: Id,
    range: Range<u32>,
    uniforms: DepthUniforms,
    bones: Option<BoneUniforms>,
}

struct TargetPass {
    framebuffer: FramebufferHandle,
    clear: Option<[f32; 4]>,
    draws: Vec<DrawCommand>,
}

/// Depth-pass renderer over a wgpu device.
pub struct WgpuRenderer {
    gl: WgpuGraphics,
    pipelines: PipelineCache,
    geometry: HashMap<Id, GpuGeometry>,
    clear_color: Color,
    clear_alpha: f32,
    auto_update_scene: bool,
    passes: Vec<TargetPass>,
    current: Option<usize>,
    mipmapped: Vec<TextureHandle>,
    info: RenderInfo,
}

impl WgpuRenderer {
    /// Create a renderer on a shared device.
    pub fn new(gpu: &GpuContext) -> Self {
        let pipelines = PipelineCache::new(&gpu.device);
        Self {
            gl: WgpuGraphics::new(gpu.clone()),
            pipelines,
            geometry: HashMap::new(),
            clear_color: Color::new(0.0, 0.0, 0.0),
            clear_alpha: 1.0,
            auto_update_scene: true,
            passes: Vec::new(),
            current: None,
            mipmapped: Vec::new(),
            info: RenderInfo::default(),
        }
    }

    /// Set the clear color the owner renders with, restored after shadow passes.
    pub fn set_clear_color(&mut self, color: Color, alpha: f32) {
        self.clear_color = color;
        self.clear_alpha = alpha;
    }

    /// Let the caller take over scene matrix updates.
    pub fn set_auto_update_scene(&mut self, enabled: bool) {
        self.auto_update_scene = enabled;
    }

    /// Statistics of the frame being recorded.
    #[inline]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    /// The graphics context, for looking up shadow map textures.
    #[inline]
    pub fn graphics(&self) -> &WgpuGraphics {
        &self.gl
    }

    /// Start a new frame's statistics.
    pub fn begin_frame(&mut self) {
        self.info.reset();
        self.info.frame += 1;
    }

    /// Forget the GPU copy of a geometry.
    pub fn release_geometry(&mut self, geometry: Id) {
        self.geometry.remove(&geometry);
    }

    fn current_pass(&mut self) -> Option<&mut TargetPass> {
        self.current.and_then(|index| self.passes.get_mut(index))
    }

    fn record(
        &mut self,
        scene: &Scene,
        camera: NodeId,
        material: &Material,
        buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()> {
        let Some(framebuffer) = self.current_pass().map(|pass| pass.framebuffer) else {
            log::warn!("Draw without a bound render target dropped");
            return Ok(());
        };
        let Some(shader) = depth_shader(material) else {
            return Ok(());
        };
        let camera = scene
            .camera(camera)
            .ok_or(RenderError::UnknownHandle { kind: "camera" })?;
        let node = scene
            .get(object)
            .ok_or(RenderError::UnknownHandle { kind: "object" })?;
        let mesh = scene
            .mesh(object)
            .ok_or(RenderError::UnknownHandle { kind: "mesh" })?;

        let mut uniforms = DepthUniforms::new(camera.projection_matrix(), &node.model_view_matrix);
        uniforms.params = [
            shader.float_or("mNear", camera.near()),
            shader.float_or("mFar", camera.far()),
            material.opacity,
            0.0,
        ];

        let skinning = material.skinning && mesh.is_skinned();
        let morphing = material.morph_targets && mesh.has_morph_targets();
        uniforms.features = [
            if skinning { 1.0 } else { 0.0 },
            if morphing { 1.0 } else { 0.0 },
            0.0,
            0.0,
        ];
        if morphing {
            uniforms.morph_influences = morph_influences(&mesh.morph_target_influences);
        }
        let bones = match (&mesh.skeleton, skinning) {
            (Some(skeleton), true) => Some(BoneUniforms::new(skeleton.bone_matrices())),
            _ => None,
        };

        let geometry = buffer.geometry();
        let device = self.gl.device().clone();
        self.geometry
            .entry(geometry.id())
            .or_insert_with(|| GpuGeometry::upload(&device, geometry));

        let target = self
            .gl
            .framebuffer(framebuffer)
            .ok_or(RenderError::UnknownHandle { kind: "framebuffer" })?;
        let key = PipelineKey::new(
            shader,
            material.side,
            &self.gl.raster_state(),
            target.color_format,
            target.depth_format,
        );
        self.pipelines.prepare(&device, shader, key);

        let command = DrawCommand {
            pipeline: key,
            geometry: geometry.id(),
            range: buffer.draw_range(),
            uniforms,
            bones,
        };
        if let Some(pass) = self.current_pass() {
            pass.draws.push(command);
        }
        self.info.draw_calls += 1;
        Ok(())
    }

    /// Encode every recorded pass and submit them.
    pub fn flush(&mut self) -> RenderResult<()> {
        let passes = std::mem::take(&mut self.passes);
        self.current = None;
        if passes.is_empty() {
            return Ok(());
        }

        let device = self.gl.device().clone();
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = align_to(std::mem::size_of::<DepthUniforms>() as u64, alignment);
        let bone_stride = align_to(std::mem::size_of::<BoneUniforms>() as u64, alignment);

        // Bone slot 0 is an identity palette shared by unskinned draws.
        let mut uniform_bytes = Vec::new();
        let mut bone_bytes = Vec::new();
        push_aligned(&mut bone_bytes, &BoneUniforms::new(&[]), bone_stride);
        let mut offsets = Vec::new();
        for draw in passes.iter().flat_map(|pass| &pass.draws) {
            let uniform_offset = uniform_bytes.len() as u32;
            push_aligned(&mut uniform_bytes, &draw.uniforms, uniform_stride);
            let bone_offset = match &draw.bones {
                Some(bones) => {
                    let offset = bone_bytes.len() as u32;
                    push_aligned(&mut bone_bytes, bones, bone_stride);
                    offset
                }
                None => 0,
            };
            offsets.push([uniform_offset, bone_offset]);
        }

        let bind_group = (!offsets.is_empty()).then(|| {
            let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Depth Uniform Buffer"),
                contents: &uniform_bytes,
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bones = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Depth Bone Buffer"),
                contents: &bone_bytes,
                usage: wgpu::BufferUsages::UNIFORM,
            });
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Depth Bind Group"),
                layout: self.pipelines.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &uniforms,
                            offset: 0,
                            size: wgpu::BufferSize::new(std::mem::size_of::<DepthUniforms>() as u64),
                        }),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &bones,
                            offset: 0,
                            size: wgpu::BufferSize::new(std::mem::size_of::<BoneUniforms>() as u64),
                        }),
                    },
                ],
            })
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Shadow Pass Encoder"),
        });
        let mut offsets = offsets.into_iter();

        for pass in &passes {
            let target = self
                .gl
                .framebuffer(pass.framebuffer)
                .ok_or(RenderError::UnknownHandle { kind: "framebuffer" })?;

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Map Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load(pass.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: target.depth.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: depth_load(pass.clear.is_some()),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &pass.draws {
                let Some([uniform_offset, bone_offset]) = offsets.next() else {
                    break;
                };
                let (Some(pipeline), Some(geometry), Some(bind_group)) = (
                    self.pipelines.get(&draw.pipeline),
                    self.geometry.get(&draw.geometry),
                    bind_group.as_ref(),
                ) else {
                    log::warn!("Skipping draw with missing GPU resources");
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, bind_group, &[uniform_offset, bone_offset]);
                render_pass.set_vertex_buffer(0, geometry.vertex.slice(..));
                match &geometry.index {
                    Some(index) => {
                        render_pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(draw.range.clone(), 0, 0..1);
                    }
                    None => render_pass.draw(draw.range.clone(), 0..1),
                }
            }
        }

        self.gl.queue().submit(Some(encoder.finish()));

        for texture in std::mem::take(&mut self.mipmapped) {
            self.gl.generate_mipmap(texture)?;
        }
        Ok(())
    }
}

impl Renderer for WgpuRenderer {
    fn gl(&mut self) -> &mut dyn GraphicsContext {
        &mut self.gl
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.gl.set_depth_test(enabled);
    }

    fn set_render_target(
        &mut self,
        target: Option<&mut dyn RenderTargetTexture>,
    ) -> RenderResult<()> {
        let Some(target) = target else {
            self.current = None;
            return Ok(());
        };
        target.allocate(&mut self.gl)?;
        let framebuffer = target
            .framebuffer()
            .ok_or(RenderError::UnknownHandle { kind: "framebuffer" })?;

        if let Some(texture) = target.texture() {
            if target.options().needs_mipmaps() && !self.mipmapped.contains(&texture) {
                self.mipmapped.push(texture);
            }
        }

        self.passes.push(TargetPass {
            framebuffer,
            clear: None,
            draws: Vec::new(),
        });
        self.current = Some(self.passes.len() - 1);
        self.info.target_switches += 1;
        Ok(())
    }

    fn clear(&mut self) {
        let color = self.gl.raster_state().clear_color;
        let Some(pass) = self.current_pass() else {
            return;
        };
        if pass.draws.is_empty() {
            pass.clear = Some(color);
            return;
        }
        let framebuffer = pass.framebuffer;
        self.passes.push(TargetPass {
            framebuffer,
            clear: Some(color),
            draws: Vec::new(),
        });
        self.current = Some(self.passes.len() - 1);
    }

    fn render_buffer_direct(
        &mut self,
        scene: &Scene,
        camera: NodeId,
        material: &Material,
        buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()> {
        self.record(scene, camera, material, buffer, object)
    }

    fn render_buffer(
        &mut self,
        scene: &Scene,
        camera: NodeId,
        material: &Material,
        buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()> {
        self.record(scene, camera, material, buffer, object)
    }

    fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn clear_alpha(&self) -> f32 {
        self.clear_alpha
    }

    fn is_auto_update_scene(&self) -> bool {
        self.auto_update_scene
    }
}

/// The program a depth draw runs, or `None` (with a warning) for materials
/// that carry no WGSL program. Such draws are skipped, not failed.
fn depth_shader(material: &Material) -> Option<&Shader> {
    let shader = material.as_shader();
    if shader.is_none() {
        log::warn!(
            "Skipping depth draw: material '{}' has no shader program",
            material.name
        );
    }
    shader
}

fn push_aligned<T: bytemuck::Pod>(bytes: &mut Vec<u8>, value: &T, stride: u64) {
    let start = bytes.len();
    bytes.extend_from_slice(bytemuck::bytes_of(value));
    bytes.resize(start + stride as usize, 0);
}

fn morph_influences(influences: &[f32]) -> [f32; 4] {
    let mut out = [0.0; MAX_MORPH_TARGETS];
    for (slot, value) in out.iter_mut().zip(influences) {
        *slot = *value;
    }
    out
}

fn color_load(clear: Option<[f32; 4]>) -> wgpu::LoadOp<wgpu::Color> {
    match clear {
        Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }),
        None => wgpu::LoadOp::Load,
    }
}

fn depth_load(clear: bool) -> wgpu::LoadOp<f32> {
    if clear {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    }
}
