use std::time::Instant;

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::camera::Camera;
use crate::lantern::scene::Scene;
use crate::lantern::texture::Image;
use crate::lantern::{Lantern, Settings};

// 한 스레드에서 resize -> render -> 결과 출력 순서로 돌림.
// 렌더링 중에 장면이나 버퍼가 바뀌는 일이 없도록 전부 여기서 소유함
pub struct Application {
    pub scene: Scene,
    camera: Camera,
    pub renderer: Lantern<Image>,
    last_frame_time: f32,
}

impl Application {
    pub fn new(scene: Scene, camera: Camera, settings: Settings) -> Self {
        Self {
            scene,
            camera,
            renderer: Lantern::new(Image::new(0, 0, "Lantern Output"), settings),
            last_frame_time: 0.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        self.renderer.resize(width, height);
    }

    // 카메라가 움직이면 예전 샘플은 쓸모없음
    pub fn move_camera(&mut self, position: Point3<f32>, forward: Vector3<f32>) {
        self.camera.set_view(position, forward);
        self.renderer.reset_accumulation();
    }

    pub fn frame(&mut self) {
        let start = Instant::now();

        self.renderer.render(&self.scene, &self.camera);

        self.last_frame_time = start.elapsed().as_secs_f32() * 1000.0;
        debug!(
            "frame {} took {:.3}ms",
            self.renderer.frame_index() - 1,
            self.last_frame_time
        );
    }

    /// 마지막 프레임에 걸린 시간 (ms)
    pub fn last_frame_time(&self) -> f32 {
        self.last_frame_time
    }

    // 카메라는 move_camera로만 움직일 수 있음
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn final_image(&self) -> &Image {
        &self.renderer.final_image
    }
}
