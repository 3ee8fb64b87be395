use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use bytemuck::cast_slice;
use glam::Mat4;
use wgpu::util::DeviceExt;
use wgpu::{DepthStencilState, RenderPass, ShaderModule};
use winit::window::Window;

use crate::error::{ViewerError, ViewerResult};
use crate::{GaitEvent, Radio};

pub mod mesh;
pub mod shape_renderer;
pub mod text_renderer;
pub mod text_state;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const DEFAULT_PRIMITIVE_STATE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::TriangleList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    cull_mode: Some(wgpu::Face::Back),
    polygon_mode: wgpu::PolygonMode::Fill,
    unclipped_depth: false,
    conservative: false,
};

pub struct Wgpu {
    surface: wgpu::Surface<'static>,
    pub surface_configuration: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    pub shader: ShaderModule,
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
    pub uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::Texture,
}

impl Debug for Wgpu {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wgpu({}x{})",
            self.surface_configuration.width, self.surface_configuration.height
        )
    }
}

impl Wgpu {
    pub async fn new_async(window: Arc<Window>) -> ViewerResult<Wgpu> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|error| ViewerError::Surface(error.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .map_err(|error| ViewerError::Adapter(error.to_string()))?;
        log::info!("Adapter {}", adapter.get_info().name);
        let required_limits =
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_limits,
                ..Default::default()
            })
            .await
            .map_err(|error| ViewerError::Device(error.to_string()))?;
        let size = window.inner_size();
        let surface_configuration = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(ViewerError::SurfaceConfig)?;
        surface.configure(&device, &surface_configuration);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MVP"),
            contents: cast_slice(&[0.0f32; 16]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Uniform Bind Group"),
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let depth_texture = create_depth_texture(&device, &surface_configuration);
        Ok(Self {
            surface,
            surface_configuration,
            device,
            queue,
            uniform_bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            shader,
            depth_texture,
        })
    }

    /// Creates the context and posts it to the event loop, blocking on
    /// native and spawning on the web.
    pub fn create_and_send(window: Arc<Window>, radio: Radio) {
        #[cfg(target_arch = "wasm32")]
        {
            let future = Self::new_async(window);
            wasm_bindgen_futures::spawn_local(async move {
                Self::outcome(future.await).send(&radio);
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let outcome = futures::executor::block_on(Self::new_async(window));
            Self::outcome(outcome).send(&radio);
        }
    }

    fn outcome(result: ViewerResult<Wgpu>) -> GaitEvent {
        match result {
            Ok(wgpu) => GaitEvent::ContextCreated(wgpu),
            Err(error) => GaitEvent::ContextFailed(error.to_string()),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (
            self.surface_configuration.width,
            self.surface_configuration.height,
        )
    }

    pub fn resize(&mut self, new_size: (u32, u32)) {
        let (width, height) = new_size;
        self.surface_configuration.width = width.max(1);
        self.surface_configuration.height = height.max(1);
        self.surface
            .configure(&self.device, &self.surface_configuration);
        self.depth_texture = create_depth_texture(&self.device, &self.surface_configuration);
    }

    /// Reconfigures after the surface was lost or became outdated.
    pub fn reconfigure(&self) {
        self.surface
            .configure(&self.device, &self.surface_configuration);
    }

    pub fn get_surface_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            })
    }

    pub fn create_depth_view(&self) -> wgpu::TextureView {
        self.depth_texture
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn update_mvp_matrix(&self, matrix: Mat4) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, cast_slice(&matrix.to_cols_array()));
    }

    pub fn set_bind_group(&self, render_pass: &mut RenderPass) {
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
    }
}

/// Translucent shapes test against depth but leave it untouched.
pub fn depth_stencil_state(depth_write_enabled: bool) -> DepthStencilState {
    DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    surface_configuration: &wgpu::SurfaceConfiguration,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: surface_configuration.width,
            height: surface_configuration.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}
