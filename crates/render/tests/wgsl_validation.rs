use gallery_render::{compile_wgsl, shaders, ParamTable};
use wgpu::naga;

fn validate_wgsl(source: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| err.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );

    validator
        .validate(&module)
        .map(|_| ())
        .map_err(|err| err.emit_to_string(source))
}

fn entry_points(source: &str) -> Vec<(naga::ShaderStage, String)> {
    let module = naga::front::wgsl::parse_str(source).expect("parses");
    module
        .entry_points
        .iter()
        .map(|entry| (entry.stage, entry.name.clone()))
        .collect()
}

#[test]
fn depth_shader_is_valid_wgsl() {
    validate_wgsl(shaders::DEPTH).unwrap();
}

#[test]
fn lit_shader_is_valid_wgsl() {
    validate_wgsl(shaders::LIT).unwrap();
}

#[test]
fn overlay_shader_is_valid_wgsl() {
    validate_wgsl(shaders::OVERLAY).unwrap();
}

#[test]
fn every_program_has_vertex_and_fragment_entries() {
    for source in [shaders::DEPTH, shaders::LIT, shaders::OVERLAY] {
        let entries = entry_points(source);
        assert!(entries.contains(&(naga::ShaderStage::Vertex, "vs_main".to_string())));
        assert!(entries.contains(&(naga::ShaderStage::Fragment, "fs_main".to_string())));
    }
}

#[test]
fn renderer_parameters_resolve() {
    let lit = ParamTable::reflect(&compile_wgsl("lit.wgsl", shaders::LIT).unwrap());
    for name in [
        "frame.view_proj",
        "frame.camera_position",
        "frame.ambient",
        "frame.lights[0].position",
        "frame.lights[1].color",
        "material.base_color",
        "material.textured",
        "object_uniforms.model",
        "object_uniforms.normal_matrix",
        "object_uniforms.emissive",
    ] {
        assert!(lit.get(name).is_some(), "lit.wgsl is missing {name}");
    }

    let depth = ParamTable::reflect(&compile_wgsl("depth.wgsl", shaders::DEPTH).unwrap());
    for name in ["face.view_proj", "face.light_position", "face.far_plane"] {
        assert!(depth.get(name).is_some(), "depth.wgsl is missing {name}");
    }

    let overlay = ParamTable::reflect(&compile_wgsl("overlay.wgsl", shaders::OVERLAY).unwrap());
    assert!(overlay.is_empty());
}

#[test]
fn common_block_is_shared_verbatim() {
    assert!(shaders::DEPTH.starts_with(shaders::COMMON));
    assert!(shaders::LIT.starts_with(shaders::COMMON));
}
