/* Type collection and naming shared by every backend */

pub mod interner;
pub mod naming;

pub use interner::{structural_hash, Binding, EntryKind, TypeArena, TypeEntry, TypeId};
