/// The scalar transform properties a clip can animate on a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransformProperty {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    RotationW,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl TransformProperty {
    /// Local position channels, in x/y/z order.
    pub const POSITION: [Self; 3] = [Self::PositionX, Self::PositionY, Self::PositionZ];

    /// Local rotation quaternion channels, in x/y/z/w order.
    pub const ROTATION: [Self; 4] = [Self::RotationX, Self::RotationY, Self::RotationZ, Self::RotationW];

    /// Local scale channels, in x/y/z order.
    pub const SCALE: [Self; 3] = [Self::ScaleX, Self::ScaleY, Self::ScaleZ];

    /// Every property the writer clears for a bone.
    pub const ALL: [Self; 10] = [
        Self::PositionX,
        Self::PositionY,
        Self::PositionZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::RotationW,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
    ];

    /// Property name as used in curve bindings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PositionX => "localPosition.x",
            Self::PositionY => "localPosition.y",
            Self::PositionZ => "localPosition.z",
            Self::RotationX => "localRotation.x",
            Self::RotationY => "localRotation.y",
            Self::RotationZ => "localRotation.z",
            Self::RotationW => "localRotation.w",
            Self::ScaleX => "localScale.x",
            Self::ScaleY => "localScale.y",
            Self::ScaleZ => "localScale.z",
        }
    }
}

impl std::fmt::Display for TransformProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding key of a curve inside a clip: which bone (by path from the
/// skeleton root) and which of its properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveBinding {
    pub path: String,
    pub property: TransformProperty,
}

impl CurveBinding {
    #[must_use]
    pub fn new(path: impl Into<String>, property: TransformProperty) -> Self {
        Self {
            path: path.into(),
            property,
        }
    }
}
