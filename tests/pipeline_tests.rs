//! Shader permutation tests
//!
//! Tests for:
//! - Flag packing and cache keys
//! - Memoization: identical flags resolve to the same cached value
//! - Vertex layouts with contiguous locations in fixed order
//! - Generated WGSL for several flag combinations

use std::cell::Cell;
use std::sync::Arc;

use oktaeder::core::OktaederError;
use oktaeder::render::pipeline::{PermutationCache, ShaderFlags};
use oktaeder::render::{generate_shader, generate_vertex_layout};
use oktaeder::resources::{VertexAttribute, VertexBuffer, VertexBufferDescriptor};

// ============================================================================
// Helper
// ============================================================================

/// `@location(n)` indices in the order they appear inside `struct <name>`.
fn struct_locations(source: &str, name: &str) -> Vec<u32> {
    let start = source
        .find(&format!("struct {name} {{"))
        .unwrap_or_else(|| panic!("struct {name} missing"));
    let body = &source[start..];
    let body = &body[..body.find('}').unwrap()];
    body.match_indices("@location(")
        .map(|(i, m)| {
            let rest = &body[i + m.len()..];
            rest[..rest.find(')').unwrap()].parse().unwrap()
        })
        .collect()
}

fn all_flag_sets() -> impl Iterator<Item = ShaderFlags> {
    (0u8..16).map(ShaderFlags::from_bits_truncate)
}

// ============================================================================
// Flags
// ============================================================================

#[test]
fn flags_follow_vertex_buffer_streams() {
    let buffer = VertexBuffer::new(VertexBufferDescriptor {
        vertex_count: 3,
        tex_coord: true,
        tangent: true,
        ..Default::default()
    });

    let flags = ShaderFlags::from_vertex_buffer(&buffer);
    assert_eq!(flags, ShaderFlags::TEX_COORD | ShaderFlags::TANGENT);
    assert_eq!(flags.key(), 0b1001);
}

#[test]
fn flag_attributes_keep_binding_order() {
    let flags = ShaderFlags::new(true, false, true, true);
    let attributes: Vec<VertexAttribute> = flags.attributes().collect();
    assert_eq!(
        attributes,
        [
            VertexAttribute::Position,
            VertexAttribute::TexCoord,
            VertexAttribute::Normal,
            VertexAttribute::Tangent,
        ]
    );
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn identical_flags_hit_the_same_entry() {
    let mut cache: PermutationCache<String> = PermutationCache::new();
    let builds = Cell::new(0);
    let build = |flags: ShaderFlags| {
        builds.set(builds.get() + 1);
        Ok(format!("pipeline {}", flags.key()))
    };

    let flags = ShaderFlags::NORMAL | ShaderFlags::TEX_COORD;
    let first = cache.get_or_create(flags, build).unwrap();
    let second = cache.get_or_create(flags, build).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds.get(), 1);
    assert!(cache.contains(flags));
}

#[test]
fn distinct_flags_never_collide() {
    let mut cache: PermutationCache<u32> = PermutationCache::new();
    for flags in all_flag_sets() {
        let value = cache.get_or_create(flags, |f| Ok(f.key())).unwrap();
        assert_eq!(*value, flags.key());
    }
    assert_eq!(cache.len(), 16);

    for flags in all_flag_sets() {
        assert_eq!(**cache.get(flags).unwrap(), flags.key());
    }
}

#[test]
fn failed_build_is_not_cached() {
    let mut cache: PermutationCache<u32> = PermutationCache::new();
    let flags = ShaderFlags::LIGHT_TEX_COORD;

    let result = cache.get_or_create(flags, |_| {
        Err(OktaederError::ShaderGeneration("boom".into()))
    });
    assert!(result.is_err());
    assert!(cache.is_empty());

    let value = cache.get_or_create(flags, |f| Ok(f.key())).unwrap();
    assert_eq!(*value, 0b0010);
}

// ============================================================================
// Vertex Layout
// ============================================================================

#[test]
fn position_only_layout() {
    let layout = generate_vertex_layout(ShaderFlags::empty());

    assert_eq!(layout.streams.len(), 1);
    assert_eq!(layout.streams[0].attribute, VertexAttribute::Position);
    assert_eq!(layout.streams[0].location(), 0);
    assert_eq!(layout.streams[0].array_stride, 12);
    assert!(layout.vertex_input_code.contains("@location(0) position: vec3<f32>"));
}

#[test]
fn layout_locations_are_contiguous_for_every_permutation() {
    for flags in all_flag_sets() {
        let layout = generate_vertex_layout(flags);
        let locations: Vec<u32> = layout.streams.iter().map(|s| s.location()).collect();
        let expected: Vec<u32> = (0..locations.len() as u32).collect();
        assert_eq!(locations, expected, "flags {:#06b}", flags.key());
        assert_eq!(layout.streams.len(), 1 + flags.bits().count_ones() as usize);
        assert_eq!(layout.buffer_layouts().len(), layout.streams.len());
    }
}

#[test]
fn skipped_attributes_do_not_leave_gaps() {
    let layout = generate_vertex_layout(ShaderFlags::LIGHT_TEX_COORD | ShaderFlags::TANGENT);

    assert!(layout.vertex_input_code.contains("@location(1) light_tex_coord: vec2<f32>"));
    assert!(layout.vertex_input_code.contains("@location(2) tangent: vec4<f32>"));
    assert_eq!(layout.streams[2].array_stride, 16);
}

// ============================================================================
// Shader Generation
// ============================================================================

#[test]
fn minimal_shader_omits_optional_inputs() {
    let source = generate_shader(ShaderFlags::empty()).unwrap();

    assert!(source.contains("fn vs_main"));
    assert!(source.contains("fn fs_main"));
    assert!(!source.contains("tex_coord"));
    assert!(!source.contains("fragment.normal_vs"));
    assert!(!source.contains("tangent_vs"));
    assert_eq!(struct_locations(&source, "VertexInput"), [0]);
}

#[test]
fn full_shader_declares_every_input_and_varying() {
    let source = generate_shader(ShaderFlags::all()).unwrap();

    assert_eq!(struct_locations(&source, "VertexInput"), [0, 1, 2, 3, 4]);
    for name in ["tex_coord", "light_tex_coord", "normal_vs", "tangent_vs", "bitangent_vs"] {
        assert!(source.contains(name), "missing {name}");
    }
}

#[test]
fn varying_locations_are_contiguous_for_every_permutation() {
    for flags in all_flag_sets() {
        let source = generate_shader(flags).unwrap();
        let locations = struct_locations(&source, "Varyings");
        let expected: Vec<u32> = (0..locations.len() as u32).collect();
        assert_eq!(locations, expected, "flags {:#06b}", flags.key());
    }
}

#[test]
fn tangents_without_normals_add_no_varyings() {
    let with_tangent = generate_shader(ShaderFlags::TANGENT).unwrap();
    let without = generate_shader(ShaderFlags::empty()).unwrap();

    assert_eq!(
        struct_locations(&with_tangent, "Varyings"),
        struct_locations(&without, "Varyings")
    );
    assert!(!with_tangent.contains("tangent_vs"));
}

#[test]
fn lighting_chunk_is_included() {
    let source = generate_shader(ShaderFlags::NORMAL).unwrap();
    assert!(source.contains("fn distribution_ggx"));
    assert!(!source.contains("include"));
}
