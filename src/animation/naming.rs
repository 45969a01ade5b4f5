//! Weapon clip-name derivation.
//!
//! Clip names are `_`-separated. A weapon clip is the body clip with a
//! `Weapon` segment inserted after the first segment (`Hero_Idle` ->
//! `Hero_Weapon_Idle`). Facial-variant clips carry `Face`/`Facial` as their
//! second segment and take the marker after it instead
//! (`Hero_Face_Smile` -> `Hero_Face_Weapon_Smile`).

pub const WEAPON_SEGMENT: &str = "Weapon";
const FACIAL_SEGMENTS: &[&str] = &["face", "facial"];

/// Whether `clip` follows the facial-variant naming pattern.
pub fn is_facial_variant(clip: &str) -> bool {
    clip.split('_')
        .nth(1)
        .is_some_and(|seg| FACIAL_SEGMENTS.iter().any(|f| seg.eq_ignore_ascii_case(f)))
}

/// Derive the weapon clip name that accompanies body clip `clip`.
pub fn weapon_clip_name(clip: &str) -> String {
    if clip.is_empty() {
        return WEAPON_SEGMENT.to_string();
    }

    let mut segments: Vec<&str> = clip.split('_').collect();
    if segments
        .iter()
        .any(|seg| seg.eq_ignore_ascii_case(WEAPON_SEGMENT))
    {
        return clip.to_string();
    }

    let at = match segments.len() {
        1 => 0,
        _ if is_facial_variant(clip) => 2,
        _ => 1,
    };
    segments.insert(at, WEAPON_SEGMENT);
    segments.join("_")
}
