use bytemuck::cast_slice;
use log::{debug, warn};
use nalgebra::Vector4;
use rayon::prelude::*;

use crate::camera::RaySource;
use crate::lantern::integrator::Integrator;
use crate::lantern::scene::Scene;
use crate::lantern::texture::ImageSink;

pub mod integrator;
pub mod ray;
pub mod scene;
pub mod texture;
pub mod trace;

pub const MAX_BOUNCES: u32 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub accumulate: bool,
    pub bounces: u32,
}

impl Settings {
    pub fn set_bounces(&mut self, bounces: u32) {
        if bounces > MAX_BOUNCES {
            warn!("bounce count {bounces} clamped to {MAX_BOUNCES}");
        }
        self.bounces = bounces.min(MAX_BOUNCES);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accumulate: true,
            bounces: 5,
        }
    }
}

// 0~1로 자르고 255를 곱함. R, G, B, A 순서
pub fn vec4_to_rgba(color: &Vector4<f32>) -> [u8; 4] {
    let color = color.map(|channel| channel.clamp(0.0, 1.0));
    [
        (color.x * 255.0) as u8,
        (color.y * 255.0) as u8,
        (color.z * 255.0) as u8,
        (color.w * 255.0) as u8,
    ]
}

pub struct Lantern<S: ImageSink> {
    pub final_image: S,
    final_image_data: Vec<[u8; 4]>,
    path_acc: Vec<Vector4<f32>>,
    // 지금까지 쌓인 샘플 수. 언제나 1 이상
    acc_counter: u32,
    // 직전 프레임에서 누적을 했는지. 꺼졌다 켜지면 예전 샘플을 버려야 함
    was_accumulating: bool,
    width: u32,
    height: u32,
    pub settings: Settings,
}

impl<S: ImageSink> Lantern<S> {
    // 버퍼는 처음 resize할 때 만들어짐
    pub fn new(final_image: S, settings: Settings) -> Self {
        Self {
            final_image,
            final_image_data: vec![],
            path_acc: vec![],
            acc_counter: 1,
            was_accumulating: false,
            width: 0,
            height: 0,
            settings,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frame_index(&self) -> u32 {
        self.acc_counter
    }

    pub fn accumulation(&self) -> &[Vector4<f32>] {
        &self.path_acc
    }

    pub fn image_data(&self) -> &[[u8; 4]] {
        &self.final_image_data
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }

        self.width = width;
        self.height = height;
        self.acc_counter = 1;

        if width == 0 || height == 0 {
            debug!("viewport collapsed to {width}x{height}, releasing buffers");
            self.final_image_data = vec![];
            self.path_acc = vec![];
            // 예전 프레임이 남아 있지 않도록 출력 이미지도 같이 비움
            self.final_image.resize(width, height);
            return;
        }

        debug!("reallocating buffers for {width}x{height}");
        let pixel_count = width as usize * height as usize;
        self.final_image_data = vec![[0; 4]; pixel_count];
        self.path_acc = vec![Vector4::zeros(); pixel_count];

        // 픽셀 데이터를 쓰기 전에 먼저 크기를 알려줌
        self.final_image.resize(width, height);
    }

    pub fn reset_accumulation(&mut self) {
        self.path_acc.fill(Vector4::zeros());
        self.acc_counter = 1;
    }

    pub fn render<C: RaySource + ?Sized>(&mut self, scene: &Scene, camera: &C) {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            debug!("nothing to render for {width}x{height}");
            return;
        }

        assert_eq!(
            camera.ray_directions().len(),
            width as usize * height as usize,
            "camera rays do not match the {width}x{height} image"
        );

        // 누적이 꺼져 있거나, 방금 다시 켜졌으면 처음부터
        if !self.settings.accumulate || !self.was_accumulating {
            self.reset_accumulation();
        }
        self.was_accumulating = self.settings.accumulate;

        let integrator = Integrator {
            scene,
            camera,
            width,
            frame_index: self.acc_counter,
            bounces: self.settings.bounces.min(MAX_BOUNCES),
        };
        let acc_counter = self.acc_counter as f32;

        // 한 줄씩 나눠서 병렬로. 각 작업은 자기 줄만 건드리니 동기화가 필요 없음
        self.path_acc
            .par_chunks_mut(width as usize)
            .zip(self.final_image_data.par_chunks_mut(width as usize))
            .enumerate()
            .for_each(|(y, (path_row, image_row))| {
                for (x, (path, pixel)) in path_row.iter_mut().zip(image_row.iter_mut()).enumerate() {
                    *path += integrator.per_pixel(x as u32, y as u32);

                    let accumulated = *path / acc_counter;
                    *pixel = vec4_to_rgba(&accumulated);
                }
            });

        self.final_image.load_image(cast_slice(&self.final_image_data));

        if self.settings.accumulate {
            self.acc_counter += 1;
        } else {
            self.acc_counter = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};

    use super::*;
    use crate::lantern::scene::{Material, Sphere};
    use crate::lantern::texture::Image;

    struct FixedRays {
        position: Point3<f32>,
        directions: Vec<Vector3<f32>>,
    }

    impl RaySource for FixedRays {
        fn position(&self) -> Point3<f32> {
            self.position
        }

        fn ray_directions(&self) -> &[Vector3<f32>] {
            &self.directions
        }
    }

    // 모든 픽셀이 아래를 봄
    fn rays(width: u32, height: u32) -> FixedRays {
        FixedRays {
            position: Point3::new(0.0, 5.0, 0.0),
            directions: vec![Vector3::new(0.0, -1.0, 0.0); (width * height) as usize],
        }
    }

    fn sky_scene() -> Scene {
        Scene {
            sky_color: Vector3::new(0.37, 0.53, 1.0),
            ..Default::default()
        }
    }

    fn sky_sample() -> Vector4<f32> {
        Vector4::new(0.37, 0.53, 1.0, 1.0)
    }

    fn renderer() -> Lantern<Image> {
        Lantern::new(Image::new(0, 0, "test"), Settings::default())
    }

    #[test]
    fn test_vec4_to_rgba() {
        assert_eq!(vec4_to_rgba(&sky_sample()), [94, 135, 255, 255]);
        assert_eq!(
            vec4_to_rgba(&Vector4::new(-1.0, 2.0, 0.5, 1.0)),
            [0, 255, 127, 255]
        );
    }

    #[test]
    fn test_set_bounces_clamps() {
        let mut settings = Settings::default();
        settings.set_bounces(3);
        assert_eq!(settings.bounces, 3);
        settings.set_bounces(100);
        assert_eq!(settings.bounces, MAX_BOUNCES);
    }

    #[test]
    fn test_resize_allocates_zeroed_buffers() {
        let mut lantern = renderer();
        lantern.resize(4, 3);

        assert_eq!(lantern.size(), (4, 3));
        assert_eq!(lantern.accumulation().len(), 12);
        assert_eq!(lantern.image_data().len(), 12);
        assert_eq!(lantern.final_image.size(), (4, 3));
        assert_eq!(lantern.frame_index(), 1);
        assert!(lantern.accumulation().iter().all(|cell| *cell == Vector4::zeros()));

        lantern.render(&sky_scene(), &rays(4, 3));
        assert!(lantern.accumulation().iter().all(|cell| *cell == sky_sample()));
        assert_eq!(lantern.final_image.buffer().get_pixel(3, 2).0, [94, 135, 255, 255]);
        assert_eq!(lantern.frame_index(), 2);
    }

    #[test]
    fn test_resize_discards_history() {
        let mut lantern = renderer();
        lantern.resize(2, 2);
        lantern.render(&sky_scene(), &rays(2, 2));
        lantern.render(&sky_scene(), &rays(2, 2));
        assert_eq!(lantern.frame_index(), 3);

        // 같은 크기면 아무것도 안 함
        lantern.resize(2, 2);
        assert_eq!(lantern.frame_index(), 3);

        lantern.resize(3, 1);
        assert_eq!(lantern.frame_index(), 1);
        assert_eq!(lantern.accumulation().len(), 3);
        assert!(lantern.accumulation().iter().all(|cell| *cell == Vector4::zeros()));

        lantern.render(&sky_scene(), &rays(3, 1));
        assert!(lantern.accumulation().iter().all(|cell| *cell == sky_sample()));
    }

    #[test]
    fn test_accumulation_sums_frames() {
        let mut lantern = renderer();
        lantern.resize(1, 1);

        for _ in 0..3 {
            lantern.render(&sky_scene(), &rays(1, 1));
        }

        assert_eq!(lantern.frame_index(), 4);
        let sum = lantern.accumulation()[0];
        assert!((sum - sky_sample() * 3.0).abs().max() < 1e-5);
        assert_eq!(lantern.image_data()[0], [94, 135, 255, 255]);
    }

    #[test]
    fn test_reset_accumulation() {
        let mut lantern = renderer();
        lantern.resize(2, 1);
        lantern.render(&sky_scene(), &rays(2, 1));
        lantern.render(&sky_scene(), &rays(2, 1));

        lantern.reset_accumulation();
        assert_eq!(lantern.frame_index(), 1);
        assert_eq!(lantern.accumulation().len(), 2);
        assert!(lantern.accumulation().iter().all(|cell| *cell == Vector4::zeros()));

        // 다음 프레임은 그 프레임 샘플 그대로 (sum / 1)
        lantern.render(&sky_scene(), &rays(2, 1));
        assert!(lantern.accumulation().iter().all(|cell| *cell == sky_sample()));
        assert_eq!(lantern.image_data()[0], vec4_to_rgba(&sky_sample()));
    }

    #[test]
    fn test_accumulation_off_holds_frame_index() {
        let mut lantern = renderer();
        lantern.settings.accumulate = false;
        lantern.resize(1, 1);

        for _ in 0..3 {
            lantern.render(&sky_scene(), &rays(1, 1));
            assert_eq!(lantern.frame_index(), 1);
            assert_eq!(lantern.accumulation()[0], sky_sample());
        }
    }

    #[test]
    fn test_toggle_clears_history() {
        let mut lantern = renderer();
        lantern.resize(1, 1);
        lantern.render(&sky_scene(), &rays(1, 1));
        lantern.render(&sky_scene(), &rays(1, 1));
        assert_eq!(lantern.frame_index(), 3);

        lantern.settings.accumulate = false;
        lantern.render(&sky_scene(), &rays(1, 1));
        assert_eq!(lantern.frame_index(), 1);

        // 하늘색이 바뀐 장면으로 다시 켬. 예전 샘플이 섞이면 안 됨
        let red_sky = Scene {
            sky_color: Vector3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        lantern.settings.accumulate = true;
        lantern.render(&red_sky, &rays(1, 1));
        assert_eq!(lantern.accumulation()[0], Vector4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(lantern.image_data()[0], [255, 0, 0, 255]);
        assert_eq!(lantern.frame_index(), 2);

        // 켜진 상태가 유지되면 계속 쌓임
        lantern.render(&red_sky, &rays(1, 1));
        assert_eq!(lantern.accumulation()[0], Vector4::new(2.0, 0.0, 0.0, 2.0));
        assert_eq!(lantern.frame_index(), 3);
    }

    #[test]
    fn test_zero_size_is_noop() {
        let mut lantern = renderer();
        lantern.render(&sky_scene(), &rays(0, 0));
        assert_eq!(lantern.frame_index(), 1);

        lantern.resize(4, 0);
        assert!(lantern.accumulation().is_empty());
        assert!(lantern.image_data().is_empty());
        lantern.render(&sky_scene(), &rays(4, 0));
        assert_eq!(lantern.frame_index(), 1);
    }

    #[test]
    fn test_collapse_clears_sink() {
        let mut lantern = renderer();
        lantern.resize(4, 3);
        lantern.render(&sky_scene(), &rays(4, 3));
        assert_eq!(lantern.final_image.size(), (4, 3));

        lantern.resize(0, 0);
        assert_eq!(lantern.size(), (0, 0));
        assert_eq!(lantern.final_image.size(), (0, 0));
        assert!(lantern.final_image.buffer().is_empty());

        // 다시 커지면 새로 할당
        lantern.resize(2, 2);
        assert_eq!(lantern.final_image.size(), (2, 2));
        lantern.render(&sky_scene(), &rays(2, 2));
        assert_eq!(lantern.final_image.buffer().get_pixel(1, 1).0, [94, 135, 255, 255]);
    }

    #[test]
    #[should_panic(expected = "camera rays do not match")]
    fn test_mismatched_rays_panics() {
        let mut lantern = renderer();
        lantern.resize(2, 2);
        lantern.render(&sky_scene(), &rays(1, 1));
    }

    #[test]
    fn test_single_white_sphere_end_to_end() {
        let scene = Scene {
            sky_color: Vector3::new(0.37, 0.53, 1.0),
            spheres: vec![Sphere {
                position: Point3::new(0.0, 1.0, 0.0),
                radius: 1.0,
                material_index: 0,
            }],
            materials: vec![Material {
                albedo: Vector3::new(1.0, 1.0, 1.0),
                emissive_intensity: 0.0,
                ..Default::default()
            }],
        };

        let mut lantern = renderer();
        lantern.settings.bounces = 1;
        lantern.resize(1, 1);
        lantern.render(&scene, &rays(1, 1));

        assert!((lantern.accumulation()[0] - Vector4::new(0.0, 0.0, 0.0, 1.0)).abs().max() < 1e-4);
        assert_eq!(lantern.image_data()[0], [0, 0, 0, 255]);
    }

    #[test]
    fn test_render_is_reproducible_per_frame() {
        let scene = Scene::showcase();
        let mut camera = crate::camera::Camera::new(45.0, 0.1, 100.0);
        camera.resize(8, 6);

        let mut first = renderer();
        first.resize(8, 6);
        first.render(&scene, &camera);

        let mut second = renderer();
        second.resize(8, 6);
        second.render(&scene, &camera);

        assert_eq!(first.image_data(), second.image_data());
    }
}
