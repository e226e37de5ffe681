//! Depth pass pipelines and their uniform layout.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};

use crate::core::RasterState;
use crate::geometry::DepthVertex;
use crate::material::{Shader, Side};
use crate::math::Mat4;
use crate::objects::MAX_BONES;

/// Maps OpenGL clip depth `[-1, 1]` onto wgpu's `[0, 1]`.
pub const CLIP_DEPTH_REMAP: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// Per-draw uniform block, binding 0 of every depth shader.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DepthUniforms {
    /// Projection, already remapped to wgpu clip depth.
    pub projection: [[f32; 4]; 4],
    /// Model-view of the object relative to the shadow camera.
    pub model_view: [[f32; 4]; 4],
    /// Influences of the first four morph targets.
    pub morph_influences: [f32; 4],
    /// x: near, y: far, z: opacity.
    pub params: [f32; 4],
    /// x: skinning on, y: morph targets on.
    pub features: [f32; 4],
}

impl DepthUniforms {
    /// Build the block for one draw.
    pub fn new(projection: &Mat4, model_view: &Mat4) -> Self {
        Self {
            projection: (CLIP_DEPTH_REMAP * *projection).to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
            morph_influences: [0.0; 4],
            params: [0.0, 1.0, 1.0, 0.0],
            features: [0.0; 4],
        }
    }
}

/// Bone palette, binding 1 of every depth shader.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct BoneUniforms {
    /// Bone matrices, identity past the skeleton's bone count.
    pub bones: [[[f32; 4]; 4]; MAX_BONES],
}

impl BoneUniforms {
    /// Identity palette with the given matrices copied in front.
    pub fn new(matrices: &[Mat4]) -> Self {
        let mut bones = [Mat4::IDENTITY.to_cols_array_2d(); MAX_BONES];
        for (slot, matrix) in bones.iter_mut().zip(matrices) {
            *slot = matrix.to_cols_array_2d();
        }
        Self { bones }
    }
}

/// Round `size` up to a multiple of `alignment`.
#[inline]
pub fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Identity of a shader program, from its name and source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderKey(u64);

impl ShaderKey {
    /// Key for a shader.
    pub fn of(shader: &Shader) -> Self {
        let mut hasher = DefaultHasher::new();
        shader.name().hash(&mut hasher);
        shader.source().hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Everything that selects a distinct depth pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// Shader program.
    pub shader: ShaderKey,
    /// Culled face.
    pub cull_mode: Option<wgpu::Face>,
    /// Front face winding.
    pub front_face: wgpu::FrontFace,
    /// Depth testing on.
    pub depth_test: bool,
    /// Color attachment format.
    pub color_format: wgpu::TextureFormat,
    /// Depth attachment format, if any.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl PipelineKey {
    /// Key for drawing `shader` with a material's `side` under the current raster state.
    pub fn new(
        shader: &Shader,
        side: Side,
        state: &RasterState,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let cull_mode = match side {
            Side::Double => None,
            Side::Front => state.wgpu_cull_mode(),
            Side::Back => state.wgpu_cull_mode().map(|face| match face {
                wgpu::Face::Front => wgpu::Face::Back,
                wgpu::Face::Back => wgpu::Face::Front,
            }),
        };
        Self {
            shader: ShaderKey::of(shader),
            cull_mode,
            front_face: state.wgpu_front_face(),
            depth_test: state.depth_test,
            color_format,
            depth_format,
        }
    }
}

/// Shader modules and pipelines of the depth passes, created on first use.
pub struct PipelineCache {
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    modules: HashMap<ShaderKey, wgpu::ShaderModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    /// Create the shared layouts.
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_entry = |binding: u32, size: usize| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Depth Bind Group Layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<DepthUniforms>()),
                uniform_entry(1, std::mem::size_of::<BoneUniforms>()),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            bind_group_layout,
            pipeline_layout,
            modules: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Layout of the per-draw bind group.
    #[inline]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Number of pipelines built so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether no pipeline has been built yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Get a pipeline built by [`PipelineCache::prepare`].
    #[inline]
    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Build the pipeline for `key` unless it exists.
    pub fn prepare(&mut self, device: &wgpu::Device, shader: &Shader, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let module: &wgpu::ShaderModule = self.modules.entry(key.shader).or_insert_with(|| {
            log::debug!("Compiling depth shader '{}'", shader.name());
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader.name()),
                source: wgpu::ShaderSource::Wgsl(shader.source().to_owned().into()),
            })
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Depth Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[DepthVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: key.front_face,
                cull_mode: key.cull_mode,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: key.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: key.depth_test,
                depth_compare: if key.depth_test {
                    wgpu::CompareFunction::LessEqual
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        self.pipelines.insert(key, pipeline);
    }
}
