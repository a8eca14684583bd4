//! WGSL sources. Mesh programs are prefixed with `common.wgsl`, which
//! declares the vertex input and the per-object uniform block.

/// Per-object uniforms and vertex input shared by mesh programs.
pub const COMMON: &str = include_str!("shaders/common.wgsl");

/// Linear distance depth for shadow cube faces.
pub const DEPTH: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/depth.wgsl")
);

/// Lit pass with shadow lookups.
pub const LIT: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/lit.wgsl")
);

/// HUD overlay.
pub const OVERLAY: &str = include_str!("shaders/overlay.wgsl");
