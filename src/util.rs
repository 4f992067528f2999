use nalgebra::Vector3;

// PCG 해시. 상태 없이 시드 하나로 다음 상태를 만들어냄
// 같은 시드면 언제나 같은 값이 나옴 (재현성이 목적이지 암호학적 난수가 아님)
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}

/// 시드를 해시로 한 번 굴리고 `[0, 1)` 범위의 실수를 돌려줌.
///
/// `u32::MAX as f32`가 2^32로 반올림되기 때문에 시드가 맨 위 근처면 정확히 1.0이 나올 수 있음.
/// 예전 렌더 결과와 샘플이 똑같아야 해서 그대로 둠.
pub fn random_float(seed: &mut u32) -> f32 {
    *seed = pcg_hash(*seed);
    *seed as f32 / u32::MAX as f32
}

// 각 성분을 [-1, 1) 균등분포로 뽑고 정규화함.
// 구 표면에서 균등하지 않지만 (모서리 방향이 더 자주 나옴) 결과 화면이 이 분포에 맞춰져 있으니 그대로 둠
pub fn random_in_unit_sphere(seed: &mut u32) -> Vector3<f32> {
    Vector3::new(
        random_float(seed) * 2.0 - 1.0,
        random_float(seed) * 2.0 - 1.0,
        random_float(seed) * 2.0 - 1.0,
    )
    .normalize()
}

/// 픽셀, 프레임, 반사 횟수로부터 시드를 만듦.
pub fn bounce_seed(pixel_index: u32, frame_index: u32, bounce: u32) -> u32 {
    pcg_hash(pixel_index.wrapping_add(pcg_hash(frame_index))).wrapping_add(bounce)
}
