//! Lantern: 구로만 이루어진 장면을 CPU에서 프레임마다 누적하며 그리는 경로 추적기.

pub mod app;
pub mod camera;
pub mod lantern;
pub mod util;

pub use crate::app::Application;
pub use crate::camera::{Camera, RaySource};
pub use crate::lantern::scene::{Material, Scene, SceneError, Sphere};
pub use crate::lantern::texture::{Image, ImageSink};
pub use crate::lantern::{vec4_to_rgba, Lantern, Settings, MAX_BOUNCES};
