#![warn(missing_docs)]
//! Mesh and texture loading for gallery models.
//!
//! Geometry failures are hard errors. Texture failures are reported and the
//! affected material falls back to its flat base color.

mod mesh;
mod texture;

pub use mesh::{load_model, MaterialData, MeshData, MeshVertex, Submesh};
pub use texture::{decode_texture, load_texture, TextureImage};

use std::path::PathBuf;
use thiserror::Error;

/// Errors emitted while loading assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The glTF document or its buffers could not be read.
    #[error("failed to load model {path}: {source}")]
    Gltf {
        /// File that failed.
        path: PathBuf,
        /// Underlying glTF error.
        #[source]
        source: gltf::Error,
    },
    /// The document parsed but held no triangle geometry.
    #[error("model {0} contains no triangle meshes")]
    NoGeometry(PathBuf),
    /// Image decoding failed.
    #[error("failed to decode texture {path}: {source}")]
    Image {
        /// File (or embedding model) the image came from.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },
    /// Reading the image file failed.
    #[error("failed to read texture {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The image reference is not a file or buffer view we can read.
    #[error("unsupported image source in {path}: {reason}")]
    UnsupportedImage {
        /// Model that referenced the image.
        path: PathBuf,
        /// What was wrong with the reference.
        reason: String,
    },
}
