//! Camera projection tests
//!
//! Tests for:
//! - Orthographic and perspective matrices against their closed forms
//! - Reversed-Z depth: near maps to 1, far (or infinity) maps to 0
//! - Camera naming and attachment defaults

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3, Vec4};
use oktaeder::scene::{Camera, Projection};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn mat4_approx(a: Mat4, b: Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| approx_eq(*x, *y))
}

/// Projects a view-space point and returns NDC.
fn project(projection: Mat4, point: Vec3) -> Vec3 {
    let clip = projection * point.extend(1.0);
    clip.truncate() / clip.w
}

// ============================================================================
// Orthographic
// ============================================================================

#[test]
fn orthographic_matches_closed_form() {
    let camera = Camera::orthographic(2.0, 0.1, 100.0);
    let aspect = 1.5;

    let expected = Mat4::from_cols(
        Vec4::new(1.0 / (2.0 * aspect), 0.0, 0.0, 0.0),
        Vec4::new(0.0, 0.5, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0 / (0.1 - 100.0), 0.0),
        Vec4::new(0.0, 0.0, 100.0 / (100.0 - 0.1), 1.0),
    );

    assert!(mat4_approx(camera.projection_matrix(aspect), expected));
}

#[test]
fn orthographic_width_follows_aspect_ratio() {
    let camera = Camera::orthographic(2.0, 0.1, 100.0);
    let projection = camera.projection_matrix(2.0);

    // half height 2, half width 4
    let corner = project(projection, Vec3::new(4.0, 2.0, 1.0));
    assert!(approx_eq(corner.x, 1.0));
    assert!(approx_eq(corner.y, 1.0));
}

#[test]
fn orthographic_depth_is_reversed() {
    let projection = Camera::orthographic(2.0, 0.1, 100.0).projection_matrix(1.0);

    assert!(approx_eq(project(projection, Vec3::new(0.0, 0.0, 0.1)).z, 1.0));
    assert!(approx_eq(project(projection, Vec3::new(0.0, 0.0, 100.0)).z, 0.0));

    let mid = project(projection, Vec3::new(0.0, 0.0, 50.0)).z;
    assert!(mid > 0.0 && mid < 1.0);
}

// ============================================================================
// Perspective
// ============================================================================

#[test]
fn infinite_perspective_matches_closed_form() {
    let camera = Camera::perspective(FRAC_PI_2, 0.1, f32::INFINITY);
    let aspect = 16.0 / 9.0;

    // cot(pi/4) = 1
    let expected = Mat4::from_cols(
        Vec4::new(1.0 / aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 0.0, 0.1, 0.0),
    );

    let actual = camera.projection_matrix(aspect);
    assert!(mat4_approx(actual, expected));
    assert!(actual.to_cols_array().iter().all(|v| v.is_finite()));
}

#[test]
fn infinite_perspective_depth_is_reversed() {
    let projection = Camera::perspective(FRAC_PI_2, 0.1, f32::INFINITY).projection_matrix(1.0);

    assert!(approx_eq(project(projection, Vec3::new(0.0, 0.0, 0.1)).z, 1.0));

    let far = project(projection, Vec3::new(0.0, 0.0, 1.0e6)).z;
    assert!(far > 0.0 && far < 1.0e-6);
}

#[test]
fn finite_perspective_matches_closed_form() {
    let (near, far) = (0.5, 50.0);
    let camera = Camera::perspective(FRAC_PI_2, near, far);

    let expected = Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, near / (near - far), 1.0),
        Vec4::new(0.0, 0.0, near * far / (far - near), 0.0),
    );

    let projection = camera.projection_matrix(1.0);
    assert!(mat4_approx(projection, expected));
    assert!(approx_eq(project(projection, Vec3::new(0.0, 0.0, near)).z, 1.0));
    assert!(approx_eq(project(projection, Vec3::new(0.0, 0.0, far)).z, 0.0));
}

#[test]
fn perspective_field_of_view_reaches_the_frustum_edge() {
    let projection = Camera::perspective(FRAC_PI_2, 0.1, 100.0).projection_matrix(1.0);

    // 45 degrees up from the axis sits on the top plane
    let edge = project(projection, Vec3::new(0.0, 10.0, 10.0));
    assert!(approx_eq(edge.y, 1.0));
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn projection_exposes_planes() {
    let ortho = Projection::Orthographic {
        half_vertical_size: 1.0,
        near: 0.2,
        far: 30.0,
    };
    assert!(approx_eq(ortho.near(), 0.2));
    assert!(approx_eq(ortho.far(), 30.0));

    let perspective = Camera::perspective(1.0, 0.1, f32::INFINITY).projection;
    assert!(perspective.far().is_infinite());
}

#[test]
fn new_camera_is_detached() {
    let camera = Camera::perspective(1.0, 0.1, 100.0).with_name("Main");
    assert_eq!(camera.name, "Main");
    assert!(camera.node().is_none());
}
