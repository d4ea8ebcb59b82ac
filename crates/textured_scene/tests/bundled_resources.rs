use std::path::PathBuf;

use textured_scene::model::load_obj_file;
use textured_scene::texture::load_texture;

fn resource_directory() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}

#[test]
fn plane_loads_as_two_clockwise_triangles() {
    let model = load_obj_file(resource_directory(), "plane.obj").unwrap();
    assert_eq!(model.vertices.len(), 6);

    for triangle in model.vertices.chunks(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|v| v.position);
        // Viewed from -z looking down +z, clockwise triangles have a
        // negative signed area in x/y.
        let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(area < 0.0, "triangle {triangle:?} is counter-clockwise");
        for vertex in triangle {
            assert_eq!(vertex.position[3], 1.0);
            assert!((0.0..=1.0).contains(&vertex.texcoord[0]));
            assert!((0.0..=1.0).contains(&vertex.texcoord[1]));
        }
    }

    assert_eq!(
        model.material.texture_file_path,
        resource_directory().join("uvChecker.png")
    );
}

#[test]
fn checker_texture_has_a_full_mip_chain() {
    let chain = load_texture(&resource_directory().join("uvChecker.png")).unwrap();
    assert_eq!((chain.width(), chain.height()), (256, 256));
    assert_eq!(chain.mip_levels(), 9);
    let last = chain.levels.last().unwrap();
    assert_eq!((last.width, last.height), (1, 1));
}
