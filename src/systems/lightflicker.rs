//! Deterministic light flicker.
//!
//! [`flicker_multiplier`] returns the brightness factor of a light at a
//! given time. It is a pure function of the light's parameters and the
//! time, so every instance of the same light flickers identically and a
//! frame can be rebuilt without keeping noise state around.
//!
//! The signal is three layers of 1-D value noise (quintic fade) at rising
//! frequencies, plus a fast smoothstepped jitter for lights that are not
//! smooth. Speed scales both frequency and amplitude.

use crate::loader::LightSource;

const FNV_BASIS: u32 = 0x811C_9DC5;
const GOLDEN: u32 = 0x9E37_79B9;

const SEED_LOW: u32 = 0xA1B2_C3D4;
const SEED_MID: u32 = 0xBEEF_1234;
const SEED_HIGH: u32 = 0xDEAD_BEEF;

/// Lowest multiplier a flickering light can reach.
pub const MIN_FLICKER: f32 = 0.2;

fn mix(seed: u32, value: u32) -> u32 {
    seed ^ value
        .wrapping_add(GOLDEN)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Map the low 16 bits of a hash to roughly `[-1, 1]`.
fn to_signed_unit(hash: u32) -> f32 {
    (hash & 0xFFFF) as f32 / 32767.5 - 1.0
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn value_noise(t: f32, seed: u32) -> f32 {
    if !t.is_finite() {
        return 0.0;
    }
    let cell = t.floor();
    let f = t - cell;
    let u = f * f * f * (f * (f * 6.0 - 15.0) + 10.0);
    let i = cell as i64 as u32;
    let a = to_signed_unit(mix(seed, i));
    let b = to_signed_unit(mix(seed, i.wrapping_add(1)));
    lerp(a, b, u)
}

/// Seed derived from the light's geometry and texture.
pub fn light_seed(light: &LightSource) -> u32 {
    let mut seed = FNV_BASIS;
    seed = mix(seed, light.offset_x as u32);
    seed = mix(seed, light.offset_y as u32);
    seed = mix(seed, light.radius as u32);
    seed = mix(seed, light.intensity as u32);
    seed = mix(seed, light.fall_off as u32);
    let texture_bits = light.texture.map_or(0, |id| id.0 & 0xFFFF);
    mix(seed, texture_bits)
}

/// Brightness factor of `light` at `time_seconds`.
///
/// 1.0 for lights that do not flicker; otherwise within
/// `[MIN_FLICKER, 1 + amplitude]` where the amplitude grows with speed.
pub fn flicker_multiplier(light: &LightSource, time_seconds: f32) -> f32 {
    let speed = light.flicker_speed.clamp(0, 100) as f32 / 100.0;
    if speed <= 0.001 {
        return 1.0;
    }
    let smoothness = light.flicker_smoothness.clamp(0, 100) as f32 / 100.0;
    let t = if time_seconds.is_finite() {
        time_seconds
    } else {
        0.0
    };
    let base = light_seed(light);

    let rate = 0.4 + 6.0 * speed;
    let n0 = value_noise(t * rate, mix(base, SEED_LOW));
    let n1 = value_noise(t * rate * 2.17, mix(base, SEED_MID));
    let n2 = value_noise(t * rate * 3.73, mix(base, SEED_HIGH));

    let w0 = 0.6 + 0.3 * smoothness;
    let w1 = 0.3 * (1.0 - 0.5 * smoothness);
    let w2 = 0.1 * (1.0 - smoothness);
    let mut noise = (n0 * w0 + n1 * w1 + n2 * w2) / (w0 + w1 + w2).max(1e-6);

    if smoothness < 0.5 {
        let jt = t * (70.0 + 260.0 * speed) + ((base >> 8) & 0xFF) as f32 * 0.013;
        let cell = jt.floor();
        let f = jt - cell;
        let u = f * f * (3.0 - 2.0 * f);
        let ji = cell as i64 as u32;
        let ja = to_signed_unit(mix(base, ji));
        let jb = to_signed_unit(mix(base, ji.wrapping_add(1)));
        let jitter = lerp(ja, jb, u);
        let amp = (0.1 + 0.15 * speed) * (1.0 - smoothness);
        noise = (noise * (1.0 - amp) + jitter * amp).clamp(-1.0, 1.0);
    }

    let amplitude = 0.12 + 0.45 * speed;
    (1.0 + noise.clamp(-1.0, 1.0) * amplitude).clamp(MIN_FLICKER, 1.0 + amplitude)
}
