//! Records with a stable identity.

/// A record addressed by id.
///
/// Two values with the same id are the same record at different points in
/// time; stores key on [`Entity::id`].
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;
}
