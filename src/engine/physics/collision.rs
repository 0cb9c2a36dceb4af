use rapier2d::prelude::*;

/// Collision layers for filtering what objects can collide with each other
/// and what the character's probes are allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    /// Default layer - interacts with everything
    Default = 0b0000_0001,

    /// Player characters
    Player = 0b0000_0010,

    /// Static level geometry: floors, walls, slopes, ledges
    Level = 0b0000_0100,

    /// Moving platforms
    Platform = 0b0000_1000,

    /// Pickups, bumpers, kill zones and other trigger volumes
    Trigger = 0b0001_0000,
}

impl CollisionLayer {
    pub fn bit(self) -> u32 {
        self as u32
    }

    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self.bit());

        let filter = match self {
            // Players stand on geometry and overlap triggers, never each other
            CollisionLayer::Player => Group::from_bits_truncate(
                CollisionLayer::Level.bit()
                    | CollisionLayer::Platform.bit()
                    | CollisionLayer::Trigger.bit()
                    | CollisionLayer::Default.bit(),
            ),

            CollisionLayer::Level | CollisionLayer::Platform => Group::from_bits_truncate(
                CollisionLayer::Player.bit()
                    | CollisionLayer::Default.bit()
                    | CollisionLayer::Platform.bit(),
            ),

            CollisionLayer::Trigger => Group::from_bits_truncate(CollisionLayer::Player.bit()),

            CollisionLayer::Default => Group::ALL,
        };

        InteractionGroups::new(memberships, filter)
    }
}

/// Set of collision layers used to filter ray casts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// What the character's ground/wall/slope probes collide with
    pub const WALKABLE: Self = Self(
        CollisionLayer::Default as u32 | CollisionLayer::Level as u32 | CollisionLayer::Platform as u32,
    );

    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0, |bits, layer| bits | layer.bit()))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, layer: CollisionLayer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn with(self, layer: CollisionLayer) -> Self {
        Self(self.0 | layer.bit())
    }

    /// Rapier groups that only match colliders belonging to this mask
    pub fn to_query_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self.0))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::WALKABLE
    }
}
