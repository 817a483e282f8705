use glam::{Mat4, Quat, Vec3};

/// Scale / rotation / translation of a node before any parent is applied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalTransform {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    #[inline]
    pub const fn new(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self { scale, rotation, translation }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self { scale, ..Self::IDENTITY }
    }

    #[inline]
    pub fn with_scale(self, scale: Vec3) -> Self {
        Self { scale, ..self }
    }

    #[inline]
    pub fn with_rotation(self, rotation: Quat) -> Self {
        Self { rotation, ..self }
    }

    #[inline]
    pub fn with_translation(self, translation: Vec3) -> Self {
        Self { translation, ..self }
    }

    /// Sets the rotation from an axis and an angle in radians.
    ///
    /// `axis` is normalized; a zero axis leaves the rotation at identity.
    pub fn with_axis_angle(self, axis: Vec3, angle: f32) -> Self {
        let rotation = axis
            .try_normalize()
            .map_or(Quat::IDENTITY, |axis| Quat::from_axis_angle(axis, angle));
        self.with_rotation(rotation)
    }

    /// Sets the rotation from per-axis angles applied as `Rx · Ry · Rz`.
    pub fn with_euler_xyz(self, x: f32, y: f32, z: f32) -> Self {
        let rotation = Quat::from_rotation_x(x) * Quat::from_rotation_y(y) * Quat::from_rotation_z(z);
        self.with_rotation(rotation)
    }

    /// Local matrix `T · R · S`.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl From<LocalTransform> for Mat4 {
    fn from(local: LocalTransform) -> Mat4 {
        local.matrix()
    }
}

/// World matrix of `local` under an optional parent world matrix.
#[inline]
pub fn compose(local: &LocalTransform, parent_world: Option<Mat4>) -> Mat4 {
    chain(local.matrix(), parent_world)
}

/// Applies an already-built local matrix under an optional parent world matrix.
#[inline]
pub fn chain(local: Mat4, parent_world: Option<Mat4>) -> Mat4 {
    match parent_world {
        Some(parent) => parent * local,
        None => local,
    }
}

/// Inverse-transpose of `model`, used to carry normals into world space.
///
/// Singular models (a zero scale axis) fall back to identity.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    model.inverse().transpose()
}
