use nalgebra::{Point3, Vector3};

// 반사 후에는 방향이 정규화되어 있지 않을 수 있음
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

// I - 2 * dot(N, I) * N, N은 정규화하지 않고 그대로 씀
pub fn reflect(incoming: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incoming - normal * (2.0 * normal.dot(incoming))
}
