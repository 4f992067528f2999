use nalgebra::{Point3, Vector3};

use crate::lantern::ray::Ray;
use crate::lantern::scene::Scene;

// HitPayload는 빛의 경로에 대한 정보만 담고
// 이를 이용해 색상을 알아내는건 integrator에서 함
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitPayload {
    /// 못 맞췄으면 -1
    pub hit_distance: f32,
    pub world_position: Point3<f32>,
    /// 구 중심에서 바깥쪽으로 향하는 단위 벡터
    pub world_normal: Vector3<f32>,
    /// 못 맞췄으면 `Scene::INVALID_INDEX`
    pub object_index: usize,
}

impl HitPayload {
    pub fn is_miss(&self) -> bool {
        self.object_index == Scene::INVALID_INDEX
    }
}

// DirectX의 TraceRay와 같음
// 모든 구를 순서대로 다 훑음. 가속 구조 없음 (구가 수십 개 정도라 충분함)
pub fn trace_ray(ray: &Ray, scene: &Scene) -> HitPayload {
    let mut closest_index = Scene::INVALID_INDEX;
    let mut hit_distance = f32::MAX;

    for (index, sphere) in scene.spheres.iter().enumerate() {
        // o = 빔 시작 (구 중심 기준), d = 빔 방향, r = 구 반지름
        // (d.d) * t^2 + 2 * (o.d) * t + (o.o - r^2) = 0
        // 구가 원점에 있다고 가정하고 푸는 식. 그래서 빔 시작점을 구 중심만큼 옮김
        let origin = ray.origin - sphere.position;

        let a = ray.direction.magnitude_squared();
        let b = 2.0 * origin.dot(&ray.direction);
        let c = origin.magnitude_squared() - sphere.radius * sphere.radius;

        // 판별식
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            continue;
        }

        // 가까운 근만 봄. 음수면 뒤에 있거나 구 안에서 쏜 것
        let closest_t = (-b - discriminant.sqrt()) / (2.0 * a);
        if closest_t >= 0.0 && closest_t < hit_distance {
            hit_distance = closest_t;
            closest_index = index;
        }
    }

    if closest_index == Scene::INVALID_INDEX {
        return miss(ray);
    }

    closest_hit(ray, hit_distance, closest_index, scene)
}

pub fn closest_hit(ray: &Ray, hit_distance: f32, object_index: usize, scene: &Scene) -> HitPayload {
    let sphere = &scene.spheres[object_index];

    let origin = ray.origin - sphere.position;
    let hit_point = origin + ray.direction * hit_distance;

    HitPayload {
        hit_distance,
        world_position: sphere.position + hit_point,
        world_normal: hit_point.normalize(),
        object_index,
    }
}

pub fn miss(ray: &Ray) -> HitPayload {
    HitPayload {
        hit_distance: -1.0,
        world_position: ray.origin,
        world_normal: Vector3::zeros(),
        object_index: Scene::INVALID_INDEX,
    }
}
