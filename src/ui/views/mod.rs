mod cards;
mod contact;
mod home;
mod stack;

pub use cards::CardSectionView;
pub use contact::ContactView;
pub use home::HomeView;
pub use stack::StackSectionView;

use crate::store::types::ItemDraft;

/// Completed store mutation, applied to the cache only after the remote call
/// succeeded.
#[derive(Debug, Clone)]
pub enum MutationDone {
  Created { id: String, draft: ItemDraft },
  Updated { id: String, draft: ItemDraft },
  Deleted { id: String },
}
