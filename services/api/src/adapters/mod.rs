pub mod firestore;
pub mod google;
pub mod identity;
pub mod memory;

pub use firestore::FirestoreAdapter;
pub use identity::IdentityToolkitAdapter;
pub use memory::{InMemoryAccountStore, InMemoryIdentityProvider};

#[cfg(test)]
pub(crate) mod stub;
