use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub albedo: Vector3<f32>,
    pub roughness: f32,
    // 아직 셰이딩에서 안 씀
    pub metallic: f32,
    pub emissive_color: Vector3<f32>,
    pub emissive_intensity: f32,
}

impl Material {
    pub fn emission(&self) -> Vector3<f32> {
        self.emissive_color * self.emissive_intensity
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            roughness: 1.0,
            metallic: 0.0,
            emissive_color: Vector3::zeros(),
            emissive_intensity: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub position: Point3<f32>,
    pub radius: f32,
    pub material_index: usize,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            radius: 0.5,
            material_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub sky_color: Vector3<f32>,
    // 순서가 곧 탐색 순서. 거리가 같으면 앞에 있는 구가 이김
    pub spheres: Vec<Sphere>,
    pub materials: Vec<Material>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            sky_color: Vector3::new(0.6, 0.7, 0.9),
            spheres: vec![],
            materials: vec![],
        }
    }
}

impl Scene {
    /// 실패했을 때 돌려주는 오브젝트 번호
    pub const INVALID_INDEX: usize = usize::MAX;

    /// 파란 바닥 위에 분홍색 구, 멀리서 주황색 구가 빛을 냄.
    pub fn showcase() -> Self {
        let materials = vec![
            Material {
                albedo: Vector3::new(1.0, 0.0, 1.0),
                roughness: 0.0,
                ..Default::default()
            },
            Material {
                albedo: Vector3::new(0.2, 0.3, 1.0),
                roughness: 0.1,
                ..Default::default()
            },
            Material {
                albedo: Vector3::new(0.8, 0.5, 0.2),
                roughness: 0.1,
                emissive_color: Vector3::new(0.8, 0.5, 0.2),
                emissive_intensity: 2.0,
                ..Default::default()
            },
        ];

        let spheres = vec![
            Sphere {
                position: Point3::origin(),
                radius: 1.0,
                material_index: 0,
            },
            Sphere {
                position: Point3::new(0.0, -101.0, 0.0),
                radius: 100.0,
                material_index: 1,
            },
            Sphere {
                position: Point3::new(32.2, 3.8, -32.1),
                radius: 20.3,
                material_index: 2,
            },
        ];

        Self {
            sky_color: Vector3::new(0.6, 0.7, 0.9),
            spheres,
            materials,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    // 렌더링 중에는 검사 안 함. 불러올 때 미리 걸러내기
    pub fn validate(&self) -> Result<(), SceneError> {
        for (index, sphere) in self.spheres.iter().enumerate() {
            if sphere.material_index >= self.materials.len() {
                return Err(SceneError::MissingMaterial {
                    sphere: index,
                    material: sphere.material_index,
                });
            }

            if !(sphere.radius > 0.0) {
                return Err(SceneError::InvalidRadius {
                    sphere: index,
                    radius: sphere.radius,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    MissingMaterial { sphere: usize, material: usize },
    InvalidRadius { sphere: usize, radius: f32 },
}

impl Display for SceneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "failed to read scene: {e}"),
            SceneError::Parse(e) => write!(f, "failed to parse scene: {e}"),
            SceneError::MissingMaterial { sphere, material } => {
                write!(f, "sphere {sphere} references missing material {material}")
            }
            SceneError::InvalidRadius { sphere, radius } => {
                write!(f, "sphere {sphere} has non-positive radius {radius}")
            }
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        SceneError::Parse(e)
    }
}
