use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;
use wgpu::RenderPass;

use crate::forces::ForceSlot;
use crate::leg::{LegFrame, Part, Shape};
use crate::palette;
use crate::presenter::{ArrowFrame, SegmentFrame, VISIBILITY_THRESHOLD};
use crate::stage::{StageFrame, GROUND_LEVEL, GROUND_SIZE};
use crate::wgpu::mesh::{Mesh, MeshVertex, CYLINDER_SEGMENTS};
use crate::wgpu::{depth_stencil_state, Wgpu, DEFAULT_PRIMITIVE_STATE};

const GROUND_THICKNESS: f32 = 0.02;
const COMPRESSION_RADIUS: f32 = 0.015;
const OPAQUE: f32 = 0.999;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Emphasis, taper, metallic, unused.
    pub params: [f32; 4],
}

impl ShapeInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            params: [0.0, 1.0, 0.0, 0.0],
        }
    }

    fn with_emphasis(mut self, emphasis: f32) -> Self {
        self.params[0] = emphasis;
        self
    }

    fn with_taper(mut self, taper: f32) -> Self {
        self.params[1] = taper;
        self
    }

    fn with_metallic(mut self, metallic: bool) -> Self {
        self.params[2] = if metallic { 1.0 } else { 0.0 };
        self
    }

    pub fn opacity(&self) -> f32 {
        self.color[3]
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shapes {
    pub cylinders: Vec<ShapeInstance>,
    pub cubes: Vec<ShapeInstance>,
}

impl Shapes {
    pub fn len(&self) -> usize {
        self.cylinders.len() + self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything drawn in one frame. Translucent shapes go after the opaque
/// ones and do not write depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeBatch {
    pub opaque: Shapes,
    pub translucent: Shapes,
}

impl ShapeBatch {
    pub fn from_stage(stage: &StageFrame) -> Self {
        let mut batch = ShapeBatch::default();
        batch.push_cube(ShapeInstance::new(
            Mat4::from_scale_rotation_translation(
                Vec3::new(GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE),
                Quat::IDENTITY,
                Vec3::new(0.0, GROUND_LEVEL - GROUND_THICKNESS / 2.0, 0.0),
            ),
            palette::linear_rgba(palette::GROUND, 1.0),
        ));
        for leg in &stage.legs {
            batch.push_leg(leg);
        }
        batch
    }

    fn push_leg(&mut self, leg: &LegFrame) {
        for part in leg.parts {
            self.push_part(part, leg.offset);
        }
        for (slot, arrow) in leg.arrows() {
            self.push_arrow(slot, arrow, leg.offset);
        }
        self.push_segment(&leg.compression, leg.offset);
    }

    fn push_part(&mut self, part: &Part, offset: Vec3) {
        let color = palette::linear_rgba(part.color, part.opacity);
        let center = part.center + offset;
        match part.shape {
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let scale = Vec3::new(radius_bottom, height, radius_bottom);
                let model = Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, center);
                self.push_cylinder(
                    ShapeInstance::new(model, color)
                        .with_taper(radius_top / radius_bottom)
                        .with_metallic(part.metallic),
                );
            }
            Shape::Cuboid { size } => {
                let model = Mat4::from_scale_rotation_translation(size, Quat::IDENTITY, center);
                self.push_cube(ShapeInstance::new(model, color).with_metallic(part.metallic));
            }
        }
    }

    /// A shaft and a cone head. Arrows shorter than their head shrink the
    /// head to fit.
    fn push_arrow(&mut self, slot: ForceSlot, arrow: &ArrowFrame, offset: Vec3) {
        if arrow.opacity < VISIBILITY_THRESHOLD || arrow.axial_scale <= VISIBILITY_THRESHOLD {
            return;
        }
        let hex = match slot {
            ForceSlot::GroundReaction => palette::GROUND_REACTION,
            ForceSlot::Compression => palette::COMPRESSION,
            ForceSlot::Muscle1 | ForceSlot::Muscle2 => palette::MUSCLE_FORCE,
        };
        let color = palette::linear_rgba(hex, arrow.opacity);
        let direction = arrow.direction();
        let origin = arrow.position + offset;
        let head_length = arrow.head_length.min(arrow.axial_scale);
        let shaft_length = arrow.axial_scale - head_length;
        if shaft_length > 0.0 {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::new(arrow.thickness, shaft_length, arrow.thickness),
                arrow.orientation,
                origin + direction * (shaft_length / 2.0),
            );
            self.push_cylinder(ShapeInstance::new(model, color).with_emphasis(arrow.emphasis));
        }
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(arrow.head_width, head_length, arrow.head_width),
            arrow.orientation,
            origin + direction * (shaft_length + head_length / 2.0),
        );
        self.push_cylinder(
            ShapeInstance::new(model, color)
                .with_emphasis(arrow.emphasis)
                .with_taper(0.0),
        );
    }

    fn push_segment(&mut self, segment: &SegmentFrame, offset: Vec3) {
        let span = segment.end - segment.start;
        let length = span.length();
        if segment.opacity < VISIBILITY_THRESHOLD || length <= f32::EPSILON {
            return;
        }
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(COMPRESSION_RADIUS, length, COMPRESSION_RADIUS),
            Quat::from_rotation_arc(Vec3::Y, span / length),
            (segment.start + segment.end) / 2.0 + offset,
        );
        self.push_cylinder(ShapeInstance::new(
            model,
            palette::linear_rgba(palette::COMPRESSION, segment.opacity),
        ));
    }

    fn push_cylinder(&mut self, instance: ShapeInstance) {
        self.shapes_for(&instance).cylinders.push(instance);
    }

    fn push_cube(&mut self, instance: ShapeInstance) {
        self.shapes_for(&instance).cubes.push(instance);
    }

    fn shapes_for(&mut self, instance: &ShapeInstance) -> &mut Shapes {
        if instance.opacity() >= OPAQUE {
            &mut self.opaque
        } else {
            &mut self.translucent
        }
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.translucent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(wgpu: &Wgpu, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = wgpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = wgpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }
}

#[derive(Default)]
struct InstanceRanges {
    opaque_cylinders: Range<u32>,
    opaque_cubes: Range<u32>,
    translucent_cylinders: Range<u32>,
    translucent_cubes: Range<u32>,
}

pub struct ShapeRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    cylinder: GpuMesh,
    cube: GpuMesh,
    instance_buffer: Option<wgpu::Buffer>,
    ranges: InstanceRanges,
}

impl ShapeRenderer {
    pub fn new(wgpu: &Wgpu) -> Self {
        let pipeline_layout = wgpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shape Pipeline Layout"),
                bind_group_layouts: &[&wgpu.uniform_bind_group_layout],
                immediate_size: 0,
            });
        let create_pipeline = |label: &str, depth_write_enabled: bool| {
            wgpu.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &wgpu.shader,
                        entry_point: Some("shape_vertex"),
                        compilation_options: Default::default(),
                        buffers: &[MeshVertex::desc(), ShapeInstance::desc()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &wgpu.shader,
                        entry_point: Some("shape_fragment"),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: wgpu.surface_configuration.format,
                            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: DEFAULT_PRIMITIVE_STATE,
                    depth_stencil: Some(depth_stencil_state(depth_write_enabled)),
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
        };
        Self {
            opaque_pipeline: create_pipeline("Opaque Shape Pipeline", true),
            translucent_pipeline: create_pipeline("Translucent Shape Pipeline", false),
            cylinder: GpuMesh::new(wgpu, &Mesh::cylinder(CYLINDER_SEGMENTS), "Cylinder"),
            cube: GpuMesh::new(wgpu, &Mesh::cube(), "Cube"),
            instance_buffer: None,
            ranges: InstanceRanges::default(),
        }
    }

    pub fn update(&mut self, wgpu: &Wgpu, batch: &ShapeBatch) {
        let mut instances = Vec::with_capacity(batch.len());
        let mut append = |shapes: &[ShapeInstance]| {
            let start = instances.len() as u32;
            instances.extend_from_slice(shapes);
            start..instances.len() as u32
        };
        self.ranges = InstanceRanges {
            opaque_cylinders: append(&batch.opaque.cylinders),
            opaque_cubes: append(&batch.opaque.cubes),
            translucent_cylinders: append(&batch.translucent.cylinders),
            translucent_cubes: append(&batch.translucent.cubes),
        };
        self.instance_buffer = (!instances.is_empty()).then(|| {
            wgpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Shape Instance Buffer"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
    }

    pub fn render(&self, render_pass: &mut RenderPass, bind_group: &wgpu::BindGroup) {
        let Some(instance_buffer) = &self.instance_buffer else {
            return;
        };
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
        let passes = [
            (&self.opaque_pipeline, &self.cylinder, &self.ranges.opaque_cylinders),
            (&self.opaque_pipeline, &self.cube, &self.ranges.opaque_cubes),
            (&self.translucent_pipeline, &self.cylinder, &self.ranges.translucent_cylinders),
            (&self.translucent_pipeline, &self.cube, &self.ranges.translucent_cubes),
        ];
        for (pipeline, mesh, range) in passes {
            if range.is_empty() {
                continue;
            }
            render_pass.set_pipeline(pipeline);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..mesh.index_count, 0, range.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{GaitPhase, LegType};
    use crate::stage::Stage;

    fn settled(phase: GaitPhase) -> StageFrame {
        let mut stage = Stage::new(GaitPhase::StaticStand);
        stage.retarget(phase, true);
        for _ in 0..400 {
            stage.tick(1.0 / 60.0);
        }
        stage.frame()
    }

    #[test]
    fn nothing_but_parts_before_the_first_tick() {
        let batch = ShapeBatch::from_stage(&Stage::new(GaitPhase::Midstance).frame());
        // ground plus five human parts plus four prosthetic parts
        assert_eq!(batch.len(), 10);
        assert_eq!(batch.translucent.cubes.len(), 2);
    }

    #[test]
    fn midstance_draws_every_active_force() {
        let batch = ShapeBatch::from_stage(&settled(GaitPhase::Midstance));
        // human: ground reaction and gastrocnemius as shaft and head, compression line
        // prosthesis: ground reaction shaft and head, compression line
        assert_eq!(batch.len(), 10 + 5 + 3);
        let red = palette::linear_rgba(palette::GROUND_REACTION, 1.0);
        let ground_reaction = batch
            .opaque
            .cylinders
            .iter()
            .filter(|instance| instance.color[..3] == red[..3])
            .count();
        assert_eq!(ground_reaction, 4);
    }

    #[test]
    fn cone_tip_lands_on_arrow_tip() {
        let frame = settled(GaitPhase::ToeOff);
        let human = frame
            .legs
            .iter()
            .find(|leg| leg.leg_type == LegType::Human)
            .expect("human leg");
        let mut batch = ShapeBatch::default();
        batch.push_arrow(ForceSlot::GroundReaction, &human.ground_reaction, human.offset);
        let head = batch
            .opaque
            .cylinders
            .iter()
            .find(|instance| instance.params[1] == 0.0)
            .expect("arrow head");
        let model = Mat4::from_cols_array_2d(&head.model);
        let tip = model.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        let expected = human.ground_reaction.tip() + human.offset;
        assert!(tip.distance(expected) < 1e-4, "{tip} vs {expected}");
    }

    #[test]
    fn shaft_and_head_radii_follow_the_arrow() {
        let frame = settled(GaitPhase::Midstance);
        let human = &frame.legs[0];
        let arrow = &human.ground_reaction;
        let mut batch = ShapeBatch::default();
        batch.push_arrow(ForceSlot::GroundReaction, arrow, human.offset);
        let radius = |instance: &ShapeInstance| {
            let (scale, _, _) = Mat4::from_cols_array_2d(&instance.model).to_scale_rotation_translation();
            scale.x
        };
        let cylinders = &batch.opaque.cylinders;
        assert_eq!(cylinders.len(), 2);
        let shaft = cylinders.iter().find(|instance| instance.params[1] != 0.0).expect("shaft");
        let head = cylinders.iter().find(|instance| instance.params[1] == 0.0).expect("head");
        assert!((radius(shaft) - arrow.thickness).abs() < 1e-5, "{} vs {}", radius(shaft), arrow.thickness);
        assert!((radius(head) - arrow.head_width).abs() < 1e-5, "{} vs {}", radius(head), arrow.head_width);
    }

    #[test]
    fn faded_arrows_are_skipped() {
        let frame = settled(GaitPhase::StaticStand);
        let prosthesis = &frame.legs[1];
        let mut batch = ShapeBatch::default();
        for (slot, arrow) in prosthesis.arrows() {
            batch.push_arrow(slot, arrow, prosthesis.offset);
        }
        // only the ground reaction shaft and head
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn instance_layout_matches_shader() {
        assert_eq!(size_of::<ShapeInstance>(), 96);
    }
}
