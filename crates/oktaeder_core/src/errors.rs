//! Error Types
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, OktaederError>`. Nothing in the renderer recovers
//! silently: a failure aborts the current operation and reaches the caller.

use thiserror::Error;

/// The main error type for the oktaeder renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OktaederError {
    // ========================================================================
    // Rendering Errors
    // ========================================================================
    /// The camera passed to `render` is not attached to any node.
    #[error("Cannot render with a detached camera. Camera [{camera}] is not attached to a node.")]
    CameraDetached {
        /// Name of the camera
        camera: String,
    },

    /// A node's material list does not line up with its mesh's submeshes.
    #[error(
        "Node [{node}] has {materials} material(s) but its mesh has {submeshes} submesh(es)."
    )]
    MaterialCountMismatch {
        /// Name of the node
        node: String,
        /// Submesh count of the mesh
        submeshes: usize,
        /// Length of the material list
        materials: usize,
    },

    /// Shader template rendering failed.
    #[error("Shader generation failed: {0}")]
    ShaderGeneration(String),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Typed write into an index buffer of a different format.
    #[error(
        "Cannot write {actual} indices into index buffer [{buffer}] with format {expected}."
    )]
    IndexFormatMismatch {
        /// Name of the buffer
        buffer: String,
        /// Format of the buffer
        expected: &'static str,
        /// Format of the written data
        actual: &'static str,
    },

    /// Index write past the end of the buffer.
    #[error(
        "Index write out of bounds in [{buffer}]: offset {offset} + {count} exceeds {capacity} indices."
    )]
    IndexRangeOutOfBounds {
        /// Name of the buffer
        buffer: String,
        /// First index written
        offset: u32,
        /// Number of indices written
        count: usize,
        /// Current index count
        capacity: u32,
    },

    /// Vertex write past the end of the buffer.
    #[error(
        "Vertex write out of bounds in [{buffer}]: {attribute} offset {offset} + {count} exceeds {capacity} vertices."
    )]
    VertexRangeOutOfBounds {
        /// Name of the buffer
        buffer: String,
        /// Stream being written
        attribute: &'static str,
        /// First vertex written
        offset: u32,
        /// Number of vertices written
        count: usize,
        /// Current vertex count
        capacity: u32,
    },

    /// Write to a vertex stream the buffer was not created with.
    #[error("Vertex buffer [{buffer}] has no {attribute} stream.")]
    MissingVertexAttribute {
        /// Name of the buffer
        buffer: String,
        /// Missing stream
        attribute: &'static str,
    },

    /// Texture data of the wrong length.
    #[error("Texture [{texture}] expects {expected} bytes but got {actual}.")]
    TextureSizeMismatch {
        /// Name of the texture
        texture: String,
        /// Required byte length
        expected: usize,
        /// Provided byte length
        actual: usize,
    },

    /// CPU write into a texture that has no CPU representation.
    #[error("Texture [{texture}] is a depth texture and cannot be written from the CPU.")]
    TextureNotWritable {
        /// Name of the texture
        texture: String,
    },

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// A node handle no longer refers to a live node.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A camera key no longer refers to a live camera.
    #[error("Camera not found: {0}")]
    CameraNotFound(String),

    /// A light key no longer refers to a live light.
    #[error("Light not found: {0}")]
    LightNotFound(String),

    /// Attaching would make a node its own ancestor.
    #[error("Cannot attach node [{node}] below itself or one of its descendants.")]
    HierarchyCycle {
        /// Name of the node being attached
        node: String,
    },
}

/// Alias for `Result<T, OktaederError>`.
pub type Result<T> = std::result::Result<T, OktaederError>;
