use nalgebra::{Vector3, Vector4};

use crate::camera::RaySource;
use crate::lantern::ray::{reflect, Ray};
use crate::lantern::scene::Scene;
use crate::lantern::trace::{trace_ray, HitPayload};
use crate::util::{bounce_seed, random_in_unit_sphere};

// 표면에 딱 붙은 점에서 다시 쏘면 자기 자신이랑 부딪힘. 그래서 법선 방향으로 조금 띄움
const SURFACE_BIAS: f32 = 0.0001;

/// 한 프레임 동안 픽셀 하나의 샘플을 구하는 데 필요한 것들.
/// 장면과 카메라는 렌더링하는 동안 읽기만 함.
pub struct Integrator<'a, C: RaySource + ?Sized> {
    pub scene: &'a Scene,
    pub camera: &'a C,
    pub width: u32,
    pub frame_index: u32,
    pub bounces: u32,
}

impl<'a, C: RaySource + ?Sized> Integrator<'a, C> {
    // DirectX의 RayGen 쉐이더와 같음
    pub fn per_pixel(&self, x: u32, y: u32) -> Vector4<f32> {
        let pixel_index = x + y * self.width;

        let mut ray = Ray {
            origin: self.camera.position(),
            direction: self.camera.ray_directions()[pixel_index as usize],
        };

        let mut light = Vector3::zeros();
        let mut contribution = Vector3::new(1.0, 1.0, 1.0);

        for bounce in 0..self.bounces {
            let mut seed = bounce_seed(pixel_index, self.frame_index, bounce);

            let payload = trace_ray(&ray, self.scene);
            if payload.is_miss() {
                light += self.scene.sky_color.component_mul(&contribution);
                break;
            }

            let sphere = &self.scene.spheres[payload.object_index];
            let Some(material) = self.scene.materials.get(sphere.material_index) else {
                panic!(
                    "sphere {} references missing material {}",
                    payload.object_index, sphere.material_index
                );
            };

            // 발광은 지금까지의 contribution을 곱하지 않고 그대로 더함
            light += material.emission();
            contribution.component_mul_assign(&material.albedo);

            ray = bounce_ray(&payload, &ray.direction, material.roughness, &mut seed);
        }

        Vector4::new(light.x, light.y, light.z, 1.0)
    }
}

// 다음 광선. 법선을 roughness만큼 흔든 다음 그 법선으로 반사함
pub fn bounce_ray(
    payload: &HitPayload,
    incoming: &Vector3<f32>,
    roughness: f32,
    seed: &mut u32,
) -> Ray {
    let normal = payload.world_normal + roughness * random_in_unit_sphere(seed);

    Ray {
        origin: payload.world_position + payload.world_normal * SURFACE_BIAS,
        direction: reflect(incoming, &normal),
    }
}
