//! Wavefront OBJ/MTL loading.
//!
//! Only the subset the demo assets use is understood: `v`, `vt`, `vn`,
//! triangular `f` records with `p/t/n` corners, and `mtllib`; materials only
//! contribute their `map_Kd` texture. Everything is converted to a
//! left-handed coordinate system on the way in.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::demo_error::AssetError;

/// GPU vertex layout: `POSITION` float4 at 0, `TEXCOORD` float2 at 16.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexData {
    pub position: [f32; 4],
    pub texcoord: [f32; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialData {
    pub texture_file_path: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelData {
    pub vertices: Vec<VertexData>,
    pub material: MaterialData,
}

pub fn load_obj_file(directory: impl AsRef<Path>, filename: &str) -> Result<ModelData, AssetError> {
    let directory = directory.as_ref();
    let path = directory.join(filename);
    let source = read_to_string(&path)?;
    let model = parse_obj(&source, &path, |material_file| {
        load_material_template_file(directory, material_file)
    })?;
    debug!(
        path = %path.display(),
        vertices = model.vertices.len(),
        texture = %model.material.texture_file_path.display(),
        "loaded model"
    );
    Ok(model)
}

pub fn load_material_template_file(
    directory: impl AsRef<Path>,
    filename: &str,
) -> Result<MaterialData, AssetError> {
    let directory = directory.as_ref();
    let path = directory.join(filename);
    let source = read_to_string(&path)?;
    Ok(parse_material(&source, directory))
}

fn read_to_string(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Texture paths are resolved against `directory`.
pub fn parse_material(source: &str, directory: &Path) -> MaterialData {
    let mut material = MaterialData::default();
    for line in source.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("map_Kd") {
            if let Some(texture_filename) = tokens.next() {
                material.texture_file_path = directory.join(texture_filename);
            }
        }
    }
    material
}

/// `path` is only used for error messages. `load_material` is called for
/// each `mtllib` record with the referenced file name.
pub fn parse_obj<F>(
    source: &str,
    path: &Path,
    mut load_material: F,
) -> Result<ModelData, AssetError>
where
    F: FnMut(&str) -> Result<MaterialData, AssetError>,
{
    let mut model = ModelData::default();
    let mut positions: Vec<[f32; 4]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    for (line_index, line) in source.lines().enumerate() {
        let mut cursor = LineCursor {
            path,
            line: line_index + 1,
            tokens: line.split_whitespace(),
        };
        let Some(identifier) = cursor.tokens.next() else {
            continue;
        };

        match identifier {
            "v" => {
                let [x, y, z] = cursor.floats("v")?;
                positions.push([x, y, z, 1.0]);
            }
            "vt" => {
                let [u, v] = cursor.floats("vt")?;
                texcoords.push([u, v]);
            }
            "vn" => {
                normals.push(cursor.floats::<3>("vn")?);
            }
            "f" => {
                let corners: Vec<&str> = cursor.tokens.by_ref().collect();
                if corners.len() != 3 {
                    return Err(AssetError::NonTriangularFace {
                        path: path.to_path_buf(),
                        line: cursor.line,
                        corners: corners.len(),
                    });
                }

                let mut triangle = [VertexData::default(); 3];
                for (vertex, corner) in triangle.iter_mut().zip(&corners) {
                    let [p, t, n] = cursor.face_indices(corner)?;
                    let mut position = *cursor.lookup(&positions, p, "position")?;
                    let mut texcoord = *cursor.lookup(&texcoords, t, "texcoord")?;
                    cursor.lookup(&normals, n, "normal")?;
                    position[0] = -position[0];
                    texcoord[1] = 1.0 - texcoord[1];
                    *vertex = VertexData { position, texcoord };
                }

                // Reversed to flip the winding along with the mirrored X axis.
                model.vertices.extend(triangle.into_iter().rev());
            }
            "mtllib" => {
                let material_filename = cursor.tokens.next().ok_or(AssetError::MissingValue {
                    path: path.to_path_buf(),
                    line: cursor.line,
                    record: "mtllib",
                })?;
                model.material = load_material(material_filename)?;
            }
            _ => {}
        }
    }

    Ok(model)
}

struct LineCursor<'a> {
    path: &'a Path,
    line: usize,
    tokens: std::str::SplitWhitespace<'a>,
}

impl LineCursor<'_> {
    fn floats<const N: usize>(&mut self, record: &'static str) -> Result<[f32; N], AssetError> {
        let mut values = [0.0; N];
        for value in values.iter_mut() {
            let token = self.tokens.next().ok_or(AssetError::MissingValue {
                path: self.path.to_path_buf(),
                line: self.line,
                record,
            })?;
            *value = token.parse().map_err(|_| AssetError::Number {
                path: self.path.to_path_buf(),
                line: self.line,
                token: token.to_string(),
            })?;
        }
        Ok(values)
    }

    fn face_indices(&self, corner: &str) -> Result<[i64; 3], AssetError> {
        let mut indices = [0; 3];
        let mut parts = corner.split('/');
        for index in indices.iter_mut() {
            let part = parts
                .next()
                .filter(|part| !part.is_empty())
                .ok_or_else(|| AssetError::FaceComponent {
                    path: self.path.to_path_buf(),
                    line: self.line,
                    corner: corner.to_string(),
                })?;
            *index = part.parse().map_err(|_| AssetError::Number {
                path: self.path.to_path_buf(),
                line: self.line,
                token: part.to_string(),
            })?;
        }
        Ok(indices)
    }

    fn lookup<'v, T>(
        &self,
        values: &'v [T],
        index: i64,
        kind: &'static str,
    ) -> Result<&'v T, AssetError> {
        usize::try_from(index)
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| values.get(index))
            .ok_or(AssetError::IndexOutOfRange {
                path: self.path.to_path_buf(),
                line: self.line,
                kind,
                index,
                available: values.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRIANGLE: &str = "\
v 1.0 2.0 3.0
v 4.0 5.0 6.0
v 7.0 8.0 9.0
vt 0.0 0.25
vt 0.5 0.5
vt 1.0 1.0
vn 0.0 0.0 1.0
vn 0.0 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/2 3/3/3
";

    fn no_materials(_: &str) -> Result<MaterialData, AssetError> {
        panic!("no mtllib expected")
    }

    #[test]
    fn face_is_emitted_in_reverse_order() {
        let model = parse_obj(TRIANGLE, Path::new("triangle.obj"), no_materials).unwrap();
        assert_eq!(
            model.vertices,
            vec![
                VertexData {
                    position: [-7.0, 8.0, 9.0, 1.0],
                    texcoord: [1.0, 0.0],
                },
                VertexData {
                    position: [-4.0, 5.0, 6.0, 1.0],
                    texcoord: [0.5, 0.5],
                },
                VertexData {
                    position: [-1.0, 2.0, 3.0, 1.0],
                    texcoord: [0.0, 0.75],
                },
            ]
        );
    }

    #[test]
    fn single_attribute_set_is_shared_by_all_corners() {
        let source = "v 1 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1\n";
        let model = parse_obj(source, Path::new("point.obj"), no_materials).unwrap();
        assert_eq!(model.vertices.len(), 3);
        assert!(model.vertices.iter().all(|v| v.position == [-1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let source = "v 1 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/2/2 3/3/3\n";
        let error = parse_obj(source, Path::new("broken.obj"), no_materials).unwrap_err();
        match error {
            AssetError::IndexOutOfRange {
                line,
                kind,
                index,
                available,
                ..
            } => {
                assert_eq!((line, kind, index, available), (4, "position", 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_index_is_an_error() {
        let source = "v 1 0 0\nvt 0 0\nvn 0 0 1\nf 0/1/1 1/1/1 1/1/1\n";
        let error = parse_obj(source, Path::new("zero.obj"), no_materials).unwrap_err();
        assert!(matches!(error, AssetError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn quads_and_missing_components_are_rejected() {
        let quad = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n";
        assert!(matches!(
            parse_obj(quad, Path::new("quad.obj"), no_materials),
            Err(AssetError::NonTriangularFace { corners: 4, .. })
        ));

        let no_texcoord = "v 0 0 0\nvn 0 0 1\nf 1//1 1//1 1//1\n";
        assert!(matches!(
            parse_obj(no_texcoord, Path::new("untextured.obj"), no_materials),
            Err(AssetError::FaceComponent { .. })
        ));

        let bad_number = "v 0 zero 0\n";
        assert!(matches!(
            parse_obj(bad_number, Path::new("nan.obj"), no_materials),
            Err(AssetError::Number { line: 1, .. })
        ));
    }

    #[test]
    fn unknown_records_are_ignored() {
        let source = "# comment\no Plane\ns 0\nusemtl Material\n\n";
        let model = parse_obj(source, Path::new("empty.obj"), no_materials).unwrap();
        assert!(model.vertices.is_empty());
    }

    #[test]
    fn map_kd_is_resolved_against_the_directory() {
        let material =
            parse_material("newmtl wall\nKd 1 1 1\nmap_Kd wall.png\n", Path::new("resources"));
        assert_eq!(material.texture_file_path, Path::new("resources/wall.png"));
    }

    #[test]
    fn mtllib_is_loaded_from_the_model_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plane.mtl"), "map_Kd checker.png\n").unwrap();
        std::fs::write(
            dir.path().join("plane.obj"),
            format!("mtllib plane.mtl\n{TRIANGLE}"),
        )
        .unwrap();

        let model = load_obj_file(dir.path(), "plane.obj").unwrap();
        assert_eq!(model.vertices.len(), 3);
        assert_eq!(model.material.texture_file_path, dir.path().join("checker.png"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        match load_obj_file(dir.path(), "missing.obj") {
            Err(AssetError::Io { path, .. }) => assert_eq!(path, dir.path().join("missing.obj")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
