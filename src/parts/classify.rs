//! Part classification from folder names.
//!
//! Folders are named `<character>_<variant>_<role>`; only the role segment is
//! matched, so character and variant names ("Robinhood", "Hoodie") never
//! decide the type. The role is lowercased and wrapped in underscores, which
//! lets a pattern pin a segment boundary on either side.
//!
//! The pattern table is ordered data: the first entry whose substring occurs
//! in the role decides the part type. Compound patterns must precede the
//! general ones they contain ("hood_hair" before "hood", the left-hand weapon
//! spellings before "weapon"). Short role words are anchored so "_arm_" does
//! not fire on "charm" or "armor", and "weapon_l_" not on "weapon_lance".

use serde::{Deserialize, Serialize};

/// Semantic role of one mesh part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum PartType {
    Body,
    Head,
    Arm,
    Hair,
    Hood,
    Accessory,
    /// Right-hand weapon.
    Weapon,
    /// Off-hand weapon.
    WeaponLeft,
    Shield,
}

/// Which hand a detachable part prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandSide {
    Right,
    Left,
}

impl HandSide {
    pub fn opposite(self) -> Self {
        match self {
            HandSide::Right => HandSide::Left,
            HandSide::Left => HandSide::Right,
        }
    }
}

impl PartType {
    /// Weapon family parts are attached to a hand bone at runtime.
    pub fn is_detachable(self) -> bool {
        matches!(
            self,
            PartType::Weapon | PartType::WeaponLeft | PartType::Shield
        )
    }

    /// Body-like parts are always visible and sit at the actor origin.
    pub fn is_body_like(self) -> bool {
        !self.is_detachable()
    }

    pub fn is_hair(self) -> bool {
        self == PartType::Hair
    }

    /// Sequential load order: the body goes first so the canonical clip set is
    /// observed as early as possible.
    pub fn load_rank(self) -> u8 {
        match self {
            PartType::Body => 0,
            PartType::Head => 1,
            PartType::Arm => 2,
            PartType::Hair => 3,
            PartType::Hood => 4,
            PartType::Accessory => 5,
            PartType::Weapon | PartType::WeaponLeft | PartType::Shield => 6,
        }
    }

    /// Preferred hand for detachable parts.
    pub fn hand_side(self) -> Option<HandSide> {
        match self {
            PartType::Weapon => Some(HandSide::Right),
            PartType::WeaponLeft | PartType::Shield => Some(HandSide::Left),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PartType::Body => "body",
            PartType::Head => "head",
            PartType::Arm => "arm",
            PartType::Hair => "hair",
            PartType::Hood => "hood",
            PartType::Accessory => "accessory",
            PartType::Weapon => "weapon",
            PartType::WeaponLeft => "weapon (left)",
            PartType::Shield => "shield",
        }
    }
}

/// Ordered `(substring, type)` table. First match wins.
pub const PART_PATTERNS: &[(&str, PartType)] = &[
    ("hood_hair", PartType::Hair),
    ("hoodhair", PartType::Hair),
    ("hood", PartType::Hood),
    ("weapon_l_", PartType::WeaponLeft),
    ("weaponl_", PartType::WeaponLeft),
    ("lweapon", PartType::WeaponLeft),
    ("left_weapon", PartType::WeaponLeft),
    ("shield", PartType::Shield),
    ("weapon", PartType::Weapon),
    ("sword", PartType::Weapon),
    ("staff", PartType::Weapon),
    ("_bow", PartType::Weapon),
    ("hair", PartType::Hair),
    ("_arm_", PartType::Arm),
    ("head", PartType::Head),
    ("_face", PartType::Head),
    ("body", PartType::Body),
    ("accessory", PartType::Accessory),
    ("_acc", PartType::Accessory),
    ("wing", PartType::Accessory),
    ("tail", PartType::Accessory),
];

/// Lowercased role segment of `folder`, wrapped in underscores. Names with
/// fewer than three segments are used whole.
pub fn role_key(folder: &str) -> String {
    let lower = folder.to_ascii_lowercase();
    let mut segments = lower.splitn(3, '_');
    let role = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(_), Some(role)) if !role.is_empty() => role,
        _ => lower.as_str(),
    };
    format!("_{role}_")
}

/// Classify a folder name, or `None` when no pattern matches.
pub fn classify(folder: &str) -> Option<PartType> {
    classify_with(PART_PATTERNS, folder)
}

/// Classify against an arbitrary ordered table.
pub fn classify_with(patterns: &[(&str, PartType)], folder: &str) -> Option<PartType> {
    let key = role_key(folder);
    patterns
        .iter()
        .find(|(needle, _)| key.contains(needle))
        .map(|&(_, part_type)| part_type)
}
