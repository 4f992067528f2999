use nalgebra::{Isometry3, Perspective3, Point3, Unit, Vector3};
use rayon::prelude::*;

/// 렌더러가 카메라에서 필요로 하는 것. 광선 시작점과 픽셀마다 미리 계산된 방향.
///
/// `ray_directions`는 행 우선 배열이고, 길이는 이미지의 `width * height`와 같아야 함.
pub trait RaySource: Sync {
    fn position(&self) -> Point3<f32>;
    fn ray_directions(&self) -> &[Vector3<f32>];
}

pub struct Camera {
    projection: Perspective3<f32>,
    view: Isometry3<f32>,

    vertical_fov: f32,
    near: f32,
    far: f32,

    position: Point3<f32>,
    forward: Unit<Vector3<f32>>,

    rays: Vec<Vector3<f32>>,

    width: u32,
    height: u32,
}

impl Camera {
    // vertical_fov는 도 단위
    pub fn new(vertical_fov: f32, near: f32, far: f32) -> Self {
        let vertical_fov = vertical_fov.to_radians();
        let projection = Perspective3::new(1.0, vertical_fov, near, far);
        let position = Point3::new(0.0, 0.0, 6.0);
        let forward = Unit::new_unchecked(Vector3::new(0.0, 0.0, -1.0));

        Self {
            projection,
            view: Self::look_at(&position, &forward),
            vertical_fov,
            near,
            far,
            position,
            forward,
            rays: vec![],
            width: 0,
            height: 0,
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward.into_inner()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 크기가 바뀌었으면 true
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }

        self.width = width;
        self.height = height;

        self.reevaluate_projection();
        self.reevaluate_rays();

        true
    }

    pub fn set_view(&mut self, position: Point3<f32>, forward: Vector3<f32>) {
        self.position = position;
        self.forward = Unit::new_normalize(forward);

        self.reevaluate_view();
        self.reevaluate_rays();
    }

    fn look_at(position: &Point3<f32>, forward: &Unit<Vector3<f32>>) -> Isometry3<f32> {
        // 위아래를 똑바로 보면 y축이랑 평행해져서 look_at이 망가짐
        let up = if forward.y.abs() > 0.999 {
            Vector3::z_axis()
        } else {
            Vector3::y_axis()
        };
        let target = position + forward.into_inner();
        Isometry3::look_at_rh(position, &target, &up)
    }

    fn reevaluate_projection(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let aspect = self.width as f32 / self.height as f32;
        self.projection = Perspective3::new(aspect, self.vertical_fov, self.near, self.far);
    }

    fn reevaluate_view(&mut self) {
        self.view = Self::look_at(&self.position, &self.forward);
    }

    fn reevaluate_rays(&mut self) {
        let (width, height) = (self.width, self.height);
        let pixel_count = width as usize * height as usize;

        self.rays = (0..pixel_count)
            .into_par_iter()
            .map(|index| {
                let x = (index % width as usize) as f32;
                let y = (index / width as usize) as f32;

                // 픽셀 중심을 지나도록 0.5 더함. 0번 행이 화면 맨 위
                let ndc = Point3::new(
                    (x + 0.5) / width as f32 * 2.0 - 1.0,
                    1.0 - (y + 0.5) / height as f32 * 2.0,
                    -1.0,
                );

                // 근평면 위의 점 (뷰 공간). 카메라는 뷰 공간 원점에 있으니 그대로 방향이 됨
                let target = self.projection.unproject_point(&ndc);
                self.view
                    .inverse_transform_vector(&target.coords)
                    .normalize()
            })
            .collect();
    }
}

impl RaySource for Camera {
    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn ray_directions(&self) -> &[Vector3<f32>] {
        &self.rays
    }
}
