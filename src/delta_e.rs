//! CIEDE2000 color difference (Sharma, Wu & Dalal, 2005) with
//! `k_L = k_C = k_H = 1`.

use crate::color::Lab;

/// 25^7
const POW25_7: f64 = 6_103_515_625.0;

/// Perceptual distance between two CIELAB colors.
///
/// Symmetric, zero for identical inputs, total over finite inputs.
pub fn ciede2000(lab1: Lab, lab2: Lab) -> f64 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    let c_ab_mean = (a1.hypot(b1) + a2.hypot(b2)) / 2.0;
    let c_ab_mean_7 = c_ab_mean.powi(7);
    let g = 0.5 * (1.0 - (c_ab_mean_7 / (c_ab_mean_7 + POW25_7)).sqrt());

    let a1p = a1 * (1.0 + g);
    let a2p = a2 * (1.0 + g);
    let c1p = a1p.hypot(b1);
    let c2p = a2p.hypot(b2);
    let h1p = hue_degrees(a1p, b1);
    let h2p = hue_degrees(a2p, b2);
    let chroma_product = c1p * c2p;

    let delta_lp = l2 - l1;
    let delta_cp = c2p - c1p;
    let delta_hp = if chroma_product == 0.0 {
        0.0
    } else {
        let diff = h2p - h1p;
        if diff > 180.0 {
            diff - 360.0
        } else if diff < -180.0 {
            diff + 360.0
        } else {
            diff
        }
    };
    let delta_big_hp = 2.0 * chroma_product.sqrt() * (delta_hp.to_radians() / 2.0).sin();

    let lp_mean = (l1 + l2) / 2.0;
    let cp_mean = (c1p + c2p) / 2.0;
    let hp_mean = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (hp_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * hp_mean).to_radians().cos()
        + 0.32 * (3.0 * hp_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * hp_mean - 63.0).to_radians().cos();

    let lp_offset_sq = (lp_mean - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * lp_offset_sq / (20.0 + lp_offset_sq).sqrt();
    let s_c = 1.0 + 0.045 * cp_mean;
    let s_h = 1.0 + 0.015 * cp_mean * t;

    let delta_theta = 30.0 * (-((hp_mean - 275.0) / 25.0).powi(2)).exp();
    let cp_mean_7 = cp_mean.powi(7);
    let r_c = 2.0 * (cp_mean_7 / (cp_mean_7 + POW25_7)).sqrt();
    let r_t = -(2.0 * delta_theta).to_radians().sin() * r_c;

    let term_l = delta_lp / s_l;
    let term_c = delta_cp / s_c;
    let term_h = delta_big_hp / s_h;

    (term_l * term_l + term_c * term_c + term_h * term_h + r_t * term_c * term_h)
        .max(0.0)
        .sqrt()
}

/// Hue angle in degrees, normalized to `[0, 360)`.
fn hue_degrees(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}
