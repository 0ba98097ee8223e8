//! Frame assembly tests
//!
//! Tests for:
//! - The octahedron scene: light records, draw list, global counts
//! - 256-byte alignment of every uniform block
//! - Material and object deduplication in first-seen order
//! - Light extraction from world matrices
//! - Error paths: detached camera, material/submesh mismatch

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use oktaeder::core::OktaederError;
use oktaeder::render::{
    DirectionalLightRecord, FrameAssembler, GlobalUniforms, ObjectUniforms, PointLightRecord,
    ShaderFlags, UNIFORM_ALIGNMENT,
};
use oktaeder::resources::{
    IndexBuffer, IndexFormat, Material, Mesh, Submesh, VertexBuffer, VertexBufferDescriptor,
    VertexWrite,
};
use oktaeder::scene::{Camera, CameraKey, Light, Node, Scene};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

/// Unit octahedron: 6 vertices, 8 faces, one submesh over 24 indices.
fn octahedron() -> Arc<Mesh> {
    let positions = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let vertex_buffer = VertexBuffer::new(VertexBufferDescriptor {
        name: "Octahedron Vertices".into(),
        vertex_count: 6,
        normal: true,
        ..Default::default()
    });
    vertex_buffer
        .write(
            0,
            &VertexWrite {
                position: Some(&positions),
                normal: Some(&positions),
                ..Default::default()
            },
        )
        .unwrap();

    #[rustfmt::skip]
    let indices: [u16; 24] = [
        0, 2, 4,  2, 1, 4,  1, 3, 4,  3, 0, 4,
        2, 0, 5,  1, 2, 5,  3, 1, 5,  0, 3, 5,
    ];
    let index_buffer = IndexBuffer::new("Octahedron Indices", IndexFormat::Uint16, 24);
    index_buffer.write_u16(0, &indices).unwrap();

    Arc::new(Mesh::new(
        "Octahedron",
        Arc::new(vertex_buffer),
        Arc::new(index_buffer),
        [Submesh::new(0, 24)],
    ))
}

/// Mesh with `count` submeshes of 3 indices each, positions only.
fn split_mesh(count: u32) -> Arc<Mesh> {
    let vertex_buffer = Arc::new(VertexBuffer::new(VertexBufferDescriptor {
        vertex_count: 3,
        ..Default::default()
    }));
    let index_buffer = Arc::new(IndexBuffer::new("Split", IndexFormat::Uint32, 3 * count));
    Arc::new(Mesh::new(
        "Split",
        vertex_buffer,
        index_buffer,
        (0..count).map(|i| Submesh::new(3 * i, 3)),
    ))
}

fn material(name: &str) -> Arc<Material> {
    Arc::new(Material::new(name))
}

/// Scene with a perspective camera on a node at +5 Z.
fn scene_with_camera() -> (Scene, CameraKey) {
    let mut scene = Scene::new();
    let camera = scene.add_camera(Camera::perspective(FRAC_PI_2, 0.1, f32::INFINITY));
    let eye = scene.create_node("Eye");
    scene
        .node(eye)
        .set_position(Vec3::new(0.0, 0.0, 5.0))
        .attach_camera(camera)
        .finish()
        .unwrap();
    (scene, camera)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn read<T: bytemuck::Pod>(bytes: &[u8], offset: usize) -> T {
    bytemuck::pod_read_unaligned(&bytes[offset..offset + size_of::<T>()])
}

// ============================================================================
// Octahedron Scene
// ============================================================================

#[test]
fn octahedron_scene_packs_lights_and_one_draw() -> anyhow::Result<()> {
    init_logging();
    let (mut scene, camera) = scene_with_camera();
    let mesh = octahedron();
    scene.add_node(Node::new("Octahedron").with_mesh(mesh, vec![material("Gold")]));

    for i in 0..4 {
        let light = scene.add_light(Light::point(Vec3::ONE).with_name(format!("Point {i}")));
        let node = scene.create_node(format!("Point Light {i}"));
        scene
            .node(node)
            .set_position(Vec3::new(i as f32, 2.0, 0.0))
            .attach_light(light)
            .finish()?;
    }
    let sun = scene.add_light(Light::directional(Vec3::new(1.0, 0.9, 0.8)));
    let sun_node = scene.create_node("Sun");
    scene.attach_light(sun_node, sun)?;

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0)?;

    assert_eq!(frame.point_light_count(), 4);
    assert_eq!(frame.directional_light_count(), 1);
    assert_eq!(frame.point_light_bytes().len(), 4 * size_of::<PointLightRecord>());
    assert_eq!(
        frame.directional_light_bytes().len(),
        size_of::<DirectionalLightRecord>()
    );

    assert_eq!(frame.draws().len(), 1);
    let draw = &frame.draws()[0];
    assert_eq!(draw.index_range, 0..24);
    assert_eq!(draw.submesh, 0);
    assert_eq!(
        frame.objects()[draw.object].mesh.submeshes()[draw.submesh],
        Submesh::new(0, 24)
    );

    let global = frame.global_uniforms().unwrap();
    assert_eq!(global.point_light_count, 4);
    assert_eq!(global.directional_light_count, 1);

    let packed: GlobalUniforms = read(frame.uniform_bytes(), frame.global_offset() as usize);
    assert_eq!(packed, *global);
    Ok(())
}

#[test]
fn octahedron_uses_normal_permutation() {
    let (mut scene, camera) = scene_with_camera();
    scene.add_node(Node::new("Octahedron").with_mesh(octahedron(), vec![material("M")]));

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    assert_eq!(frame.objects()[0].flags, ShaderFlags::NORMAL);
}

// ============================================================================
// Alignment and Deduplication
// ============================================================================

#[test]
fn every_uniform_block_is_256_aligned() {
    let (mut scene, camera) = scene_with_camera();
    let mesh = split_mesh(2);
    for i in 0..5 {
        scene.add_node(
            Node::new(format!("Object {i}"))
                .with_mesh(Arc::clone(&mesh), vec![material("A"), material("B")]),
        );
    }

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    assert_eq!(frame.materials().len(), 10);
    assert_eq!(frame.objects().len(), 5);
    for entry in frame.materials() {
        assert_eq!(entry.uniform_offset as usize % UNIFORM_ALIGNMENT, 0);
    }
    for object in frame.objects() {
        assert_eq!(object.uniform_offset as usize % UNIFORM_ALIGNMENT, 0);
    }
    assert_eq!(frame.global_offset() as usize % UNIFORM_ALIGNMENT, 0);
    assert_eq!(frame.uniform_bytes().len() % UNIFORM_ALIGNMENT, 0);
    assert_eq!(frame.uniform_bytes().len(), (10 + 5 + 1) * UNIFORM_ALIGNMENT);
}

#[test]
fn shared_materials_are_packed_once_in_first_seen_order() {
    let (mut scene, camera) = scene_with_camera();
    let red = material("Red");
    let blue = material("Blue");
    let mesh = split_mesh(2);

    let parent = scene.add_node(
        Node::new("Parent").with_mesh(Arc::clone(&mesh), vec![Arc::clone(&blue), Arc::clone(&red)]),
    );
    let child_materials = vec![Arc::clone(&red), Arc::clone(&red)];
    scene
        .add_to_parent(Node::new("Child").with_mesh(mesh, child_materials), parent)
        .unwrap();

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    let names: Vec<&str> = frame.materials().iter().map(|m| m.material.name.as_str()).collect();
    assert_eq!(names, ["Blue", "Red"]);

    // parent: blue, red; child: red, red
    let materials: Vec<usize> = frame.draws().iter().map(|d| d.material).collect();
    assert_eq!(materials, [0, 1, 1, 1]);
}

#[test]
fn equal_values_are_not_merged() {
    let (mut scene, camera) = scene_with_camera();
    let mesh = split_mesh(1);
    scene.add_node(Node::new("A").with_mesh(Arc::clone(&mesh), vec![material("Same")]));
    scene.add_node(Node::new("B").with_mesh(mesh, vec![material("Same")]));

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    assert_eq!(frame.materials().len(), 2);
}

#[test]
fn draws_follow_object_then_submesh_order() {
    let (mut scene, camera) = scene_with_camera();
    let m = material("M");
    scene.add_node(Node::new("Three").with_mesh(split_mesh(3), vec![Arc::clone(&m); 3]));
    scene.add_node(Node::new("One").with_mesh(split_mesh(1), vec![m]));

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    let order: Vec<(usize, usize)> = frame.draws().iter().map(|d| (d.object, d.submesh)).collect();
    assert_eq!(order, [(0, 0), (0, 1), (0, 2), (1, 0)]);
    assert_eq!(frame.draws()[2].index_range, 6..9);
}

#[test]
fn nodes_without_mesh_are_not_objects() {
    let (mut scene, camera) = scene_with_camera();
    scene.create_node("Empty");

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    assert!(frame.objects().is_empty());
    assert!(frame.draws().is_empty());
    assert_eq!(frame.global_offset(), 0);
}

// ============================================================================
// Packed Contents
// ============================================================================

#[test]
fn object_block_holds_world_and_normal_matrix() {
    let (mut scene, camera) = scene_with_camera();
    let parent = scene.add_node(Node::new("Parent").with_translation(Vec3::new(1.0, 0.0, 0.0)));
    let child = scene
        .add_to_parent(
            Node::new("Child")
                .with_scale(Vec3::new(2.0, 1.0, 1.0))
                .with_mesh(split_mesh(1), vec![material("M")]),
            parent,
        )
        .unwrap();

    let mut assembler = FrameAssembler::new();
    assembler.assemble(&mut scene, camera, 1.0).unwrap();
    let world = scene.world_matrix(child).unwrap();
    let frame = assembler.frame();

    let object = &frame.objects()[0];
    assert_eq!(object.node, child);
    let packed: ObjectUniforms = read(frame.uniform_bytes(), object.uniform_offset as usize);
    assert_eq!(packed.world, world);

    // non-uniform scale: normals shrink along the stretched axis
    let n = packed.normal.transform_vector3(Vec3::X);
    assert!(vec3_approx(n, Vec3::new(0.5, 0.0, 0.0)));
}

#[test]
fn light_records_come_from_world_matrices() {
    let (mut scene, camera) = scene_with_camera();
    let rig = scene.add_node(Node::new("Rig").with_translation(Vec3::new(0.0, 10.0, 0.0)));

    let lamp = scene.add_light(Light::point(Vec3::new(1.0, 0.5, 0.25)));
    let lamp_node = scene
        .add_to_parent(Node::new("Lamp").with_translation(Vec3::new(1.0, 2.0, 3.0)), rig)
        .unwrap();
    scene.attach_light(lamp_node, lamp).unwrap();

    let sun = scene.add_light(Light::directional(Vec3::ONE));
    let sun_node = scene.add_node(
        Node::new("Sun").with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
    );
    scene.attach_light(sun_node, sun).unwrap();

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    let point: PointLightRecord = read(frame.point_light_bytes(), 0);
    assert!(vec3_approx(point.position, Vec3::new(1.0, 12.0, 3.0)));
    assert!(vec3_approx(point.color, Vec3::new(1.0, 0.5, 0.25)));

    // -Z rotated by -90 degrees about X points straight down
    let directional: DirectionalLightRecord = read(frame.directional_light_bytes(), 0);
    assert!(vec3_approx(directional.direction, Vec3::NEG_Y));
}

#[test]
fn unreachable_lights_are_skipped() {
    let (mut scene, camera) = scene_with_camera();
    let orphan = scene.add_light(Light::point(Vec3::ONE));
    let gone = scene.add_light(Light::point(Vec3::ONE));
    let node = scene.create_node("Temporary");
    scene.attach_light(node, gone).unwrap();
    scene.remove_node(node);

    let mut assembler = FrameAssembler::new();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    assert!(scene.light(orphan).is_some());
    assert_eq!(frame.point_light_count(), 0);
    assert!(frame.point_light_bytes().is_empty());
}

#[test]
fn global_block_holds_view_and_projection() {
    let (mut scene, camera) = scene_with_camera();
    scene.ambient_light = Vec3::splat(0.1);

    let mut assembler = FrameAssembler::new();
    let global = *assembler
        .assemble(&mut scene, camera, 2.0)
        .unwrap()
        .global_uniforms()
        .unwrap();

    let expected_view = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)).inverse();
    assert!(global.view.abs_diff_eq(expected_view, EPSILON));
    assert_eq!(
        global.projection,
        scene.camera(camera).unwrap().projection_matrix(2.0)
    );
    assert_eq!(global.ambient_light, Vec3::splat(0.1));
}

#[test]
fn reassembly_starts_from_scratch() {
    let (mut scene, camera) = scene_with_camera();
    let light = scene.add_light(Light::point(Vec3::ONE));
    let node = scene.create_node("Lamp");
    scene.attach_light(node, light).unwrap();
    scene.add_node(Node::new("Mesh").with_mesh(split_mesh(1), vec![material("M")]));

    let mut assembler = FrameAssembler::new();
    let first_len = assembler
        .assemble(&mut scene, camera, 1.0)
        .unwrap()
        .uniform_bytes()
        .len();
    let frame = assembler.assemble(&mut scene, camera, 1.0).unwrap();

    assert_eq!(frame.uniform_bytes().len(), first_len);
    assert_eq!(frame.point_light_count(), 1);
    assert_eq!(frame.materials().len(), 1);
    assert_eq!(frame.draws().len(), 1);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn detached_camera_fails_with_its_name() {
    init_logging();
    let mut scene = Scene::new();
    let camera = scene.add_camera(Camera::perspective(1.0, 0.1, 100.0).with_name("Lonely"));

    let mut assembler = FrameAssembler::new();
    let err = assembler.assemble(&mut scene, camera, 1.0).unwrap_err();

    assert_eq!(
        err,
        OktaederError::CameraDetached {
            camera: "Lonely".into()
        }
    );
    assert!(err.to_string().contains("[Lonely]"));
}

#[test]
fn removed_camera_fails() {
    let (mut scene, camera) = scene_with_camera();
    scene.remove_camera(camera);

    let mut assembler = FrameAssembler::new();
    let result = assembler.assemble(&mut scene, camera, 1.0);
    assert!(matches!(result, Err(OktaederError::CameraNotFound(_))));
}

#[test]
fn material_count_must_match_submeshes() {
    let (mut scene, camera) = scene_with_camera();
    scene.add_node(Node::new("Broken").with_mesh(split_mesh(2), vec![material("Only")]));

    let mut assembler = FrameAssembler::new();
    let err = assembler.assemble(&mut scene, camera, 1.0).unwrap_err();

    assert_eq!(
        err,
        OktaederError::MaterialCountMismatch {
            node: "Broken".into(),
            submeshes: 2,
            materials: 1,
        }
    );
}
