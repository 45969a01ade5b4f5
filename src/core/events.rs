//! Core domain: messages for character and variant selection.

use bevy::ecs::message::Message;

use crate::parts::PartDescriptor;

/// Request to show `variant` of `character`. `variant: None` picks the
/// character's first variant.
#[derive(Debug, Clone)]
pub struct SelectVariant {
    pub character: String,
    pub variant: Option<String>,
}

impl Message for SelectVariant {}

/// Request to step through the current character's variants.
#[derive(Debug, Clone, Copy)]
pub struct CycleVariant {
    pub step: isize,
}

impl Message for CycleVariant {}

/// Fired once a selection has been resolved into a part list. Every domain
/// resets its per-session state on this.
#[derive(Debug, Clone)]
pub struct SessionStarted {
    pub generation: u64,
    pub character: String,
    pub variant: String,
    pub parts: Vec<PartDescriptor>,
}

impl Message for SessionStarted {}
