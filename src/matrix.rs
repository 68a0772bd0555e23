//! 3x3 and 4x4 matrices, row-major: the element at `(col, row)` lives at
//! `data[col + stride*row]`.

use crate::vector::{Vec3, Vec4};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Mat3 {
    pub data: [f32; 9],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        #[rustfmt::skip]
        data: [
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        ],
    };

    /// Element at column `c`, row `r`.
    pub fn at(&self, c: usize, r: usize) -> f32 {
        self.data[c + 3 * r]
    }

    fn at_mut(&mut self, c: usize, r: usize) -> &mut f32 {
        &mut self.data[c + 3 * r]
    }

    /// The transpose of the inverse, used to transform normals safely
    /// under non-uniform scale.
    pub fn transposed_inverse(&self) -> Mat3 {
        let m = self;
        let det = m.at(0, 0) * m.at(1, 1) * m.at(2, 2)
            + m.at(1, 0) * m.at(2, 1) * m.at(0, 2)
            + m.at(2, 0) * m.at(0, 1) * m.at(1, 2)
            - m.at(0, 2) * m.at(1, 1) * m.at(2, 0)
            - m.at(1, 2) * m.at(2, 1) * m.at(0, 0)
            - m.at(2, 2) * m.at(0, 1) * m.at(1, 0);

        let mut inv = Mat3 { data: [0.0; 9] };

        *inv.at_mut(0, 0) = m.at(1, 1) * m.at(2, 2) - m.at(1, 2) * m.at(2, 1);
        *inv.at_mut(1, 0) = -m.at(0, 1) * m.at(2, 2) + m.at(0, 2) * m.at(2, 1);
        *inv.at_mut(2, 0) = m.at(0, 1) * m.at(1, 2) - m.at(0, 2) * m.at(1, 1);

        *inv.at_mut(0, 1) = -m.at(1, 0) * m.at(2, 2) + m.at(1, 2) * m.at(2, 0);
        *inv.at_mut(1, 1) = m.at(0, 0) * m.at(2, 2) - m.at(0, 2) * m.at(2, 0);
        *inv.at_mut(2, 1) = -m.at(0, 0) * m.at(1, 2) + m.at(0, 2) * m.at(1, 0);

        *inv.at_mut(0, 2) = m.at(1, 0) * m.at(2, 1) - m.at(1, 1) * m.at(2, 0);
        *inv.at_mut(1, 2) = -m.at(0, 0) * m.at(2, 1) + m.at(0, 1) * m.at(2, 0);
        *inv.at_mut(2, 2) = m.at(0, 0) * m.at(1, 1) - m.at(0, 1) * m.at(1, 0);

        for v in inv.data.iter_mut() {
            *v /= det;
        }

        inv
    }

    /// Apply as a linear map: `out = M * v` (column-vector convention).
    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            v.x * self.at(0, 0) + v.y * self.at(1, 0) + v.z * self.at(2, 0),
            v.x * self.at(0, 1) + v.y * self.at(1, 1) + v.z * self.at(2, 1),
            v.x * self.at(0, 2) + v.y * self.at(1, 2) + v.z * self.at(2, 2),
        )
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        #[rustfmt::skip]
        data: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn at(&self, c: usize, r: usize) -> f32 {
        self.data[c + 4 * r]
    }

    fn at_mut(&mut self, c: usize, r: usize) -> &mut f32 {
        &mut self.data[c + 4 * r]
    }

    /// `self * rhs`, both treated as acting on column vectors (so
    /// `(self * rhs).apply(v) == self.apply(rhs.apply(v))`).
    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let mut out = Mat4 { data: [0.0; 16] };
        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(k, i) * rhs.at(j, k);
                }
                *out.at_mut(j, i) = sum;
            }
        }
        out
    }

    pub fn upper_left_3x3(&self) -> Mat3 {
        let mut out = Mat3 { data: [0.0; 9] };
        for r in 0..3 {
            for c in 0..3 {
                out.data[c + 3 * r] = self.at(c, r);
            }
        }
        out
    }

    pub fn translate(v: Vec3) -> Mat4 {
        #[rustfmt::skip]
        let data = [
            1.0, 0.0, 0.0, v.x,
            0.0, 1.0, 0.0, v.y,
            0.0, 0.0, 1.0, v.z,
            0.0, 0.0, 0.0, 1.0,
        ];
        Mat4 { data }
    }

    pub fn scale(v: Vec3) -> Mat4 {
        #[rustfmt::skip]
        let data = [
            v.x, 0.0, 0.0, 0.0,
            0.0, v.y, 0.0, 0.0,
            0.0, 0.0, v.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Mat4 { data }
    }

    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let f = (center - eye).normalize();
        let up = up.normalize();

        let s = f.cross(up);
        let u = s.cross(f);

        #[rustfmt::skip]
        let data = [
             s.x,  s.y,  s.z, -s.dot(eye),
             u.x,  u.y,  u.z, -u.dot(eye),
            -f.x, -f.y, -f.z,  f.dot(eye),
             0.0,  0.0,  0.0,  1.0,
        ];
        Mat4 { data }
    }

    /// Right-handed perspective projection with `fov` the full vertical
    /// field of view in radians. `z_near`/`z_far` are positive distances;
    /// the view direction looks down `-z`.
    pub fn perspective(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
        let f = (std::f32::consts::FRAC_PI_2 - fov / 2.0).tan();

        #[rustfmt::skip]
        let data = [
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (z_far + z_near) / (z_near - z_far), 2.0 * z_far * z_near / (z_near - z_far),
            0.0, 0.0, -1.0, 0.0,
        ];
        Mat4 { data }
    }

    /// Apply as a point transform (implicit `w = 1`), ignoring the last row.
    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            v.x * self.at(0, 0) + v.y * self.at(1, 0) + v.z * self.at(2, 0) + self.at(3, 0),
            v.x * self.at(0, 1) + v.y * self.at(1, 1) + v.z * self.at(2, 1) + self.at(3, 1),
            v.x * self.at(0, 2) + v.y * self.at(1, 2) + v.z * self.at(2, 2) + self.at(3, 2),
        )
    }

    /// Apply preserving the full homogeneous output (implicit `w = 1`).
    pub fn project(&self, v: Vec3) -> Vec4 {
        Vec4::new(
            v.x * self.at(0, 0) + v.y * self.at(1, 0) + v.z * self.at(2, 0) + self.at(3, 0),
            v.x * self.at(0, 1) + v.y * self.at(1, 1) + v.z * self.at(2, 1) + self.at(3, 1),
            v.x * self.at(0, 2) + v.y * self.at(1, 2) + v.z * self.at(2, 2) + self.at(3, 2),
            v.x * self.at(0, 3) + v.y * self.at(1, 3) + v.z * self.at(2, 3) + self.at(3, 3),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn mat3_close(a: &Mat3, b: &Mat3, eps: f32) -> bool {
        a.data.iter().zip(b.data.iter()).all(|(x, y)| (x - y).abs() < eps)
    }

    #[test]
    fn transposed_inverse_of_identity_is_identity() {
        assert_eq!(Mat3::IDENTITY.transposed_inverse(), Mat3::IDENTITY);
    }

    #[test]
    fn transposed_inverse_round_trips() {
        #[rustfmt::skip]
        let m = Mat3 { data: [
            2.0, 0.0, 1.0,
            0.0, 1.0, 3.0,
            1.0, 0.0, 1.0,
        ]};

        let inv_t = m.transposed_inverse();
        // transpose(inverse(M)) == inv_t, so inv_t^T * M^T should be close
        // to I. Verify via the defining relation instead: inv(M)*M == I,
        // i.e. transpose(inv_t) * M == I.
        let mut inv = Mat3 { data: [0.0; 9] };
        for r in 0..3 {
            for c in 0..3 {
                inv.data[c + 3 * r] = inv_t.data[r + 3 * c];
            }
        }

        let mut product = Mat3 { data: [0.0; 9] };
        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += inv.at(k, i) * m.at(j, k);
                }
                product.data[j + 3 * i] = sum;
            }
        }

        assert!(mat3_close(&product, &Mat3::IDENTITY, EPS));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let proj = Mat4::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0);

        let near = proj.project(Vec3::new(0.0, 0.0, -1.0));
        assert!((near.z / near.w - (-1.0)).abs() < 1e-4);

        let far = proj.project(Vec3::new(0.0, 0.0, -100.0));
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let forward = Vec3::new(0.0, 0.0, -1.0);
        let view = Mat4::look_at(eye, eye + forward, Vec3::new(0.0, 1.0, 0.0));
        let origin = view.apply(eye);
        assert!(origin.x.abs() < 1e-5);
        assert!(origin.y.abs() < 1e-5);
        assert!(origin.z.abs() < 1e-5);
    }
}
