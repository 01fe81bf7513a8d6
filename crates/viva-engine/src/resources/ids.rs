use std::fmt;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Slot index in the owning registry.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

typed_id!(SpriteId, "sprite");
typed_id!(AnimationId, "animation");
typed_id!(DynamicId, "dynamic");
typed_id!(TextId, "text");
typed_id!(LineId, "line");
typed_id!(MeshId, "mesh");
typed_id!(FontId, "font");
typed_id!(
    /// Registry slot of a `Texture` (not the GPU handle, see `TextureId`).
    TextureSlot,
    "texture"
);
typed_id!(RoutineId, "routine");

/// A contiguous run of sprites allocated together.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SpriteBlock {
    pub(crate) start: usize,
    pub(crate) len: usize,
}

impl SpriteBlock {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `i`-th sprite of the block.
    pub fn get(&self, i: usize) -> Option<SpriteId> {
        (i < self.len).then(|| SpriteId(self.start + i))
    }

    pub fn iter(&self) -> impl Iterator<Item = SpriteId> + use<> {
        (self.start..self.start + self.len).map(SpriteId)
    }
}
