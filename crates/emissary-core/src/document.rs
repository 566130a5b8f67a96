//! Document resolution contract.

use emissary_types::content::ContentUnit;
use emissary_types::document::DocumentRef;
use emissary_types::error::DocumentError;

/// Turns document references into content units for the model.
///
/// `storage` names the storage location (bucket) the references live in.
/// Any failure is fatal for the request; implementations do not skip
/// documents they cannot fetch.
pub trait DocumentResolver: Send + Sync {
    fn resolve(
        &self,
        documents: &[DocumentRef],
        storage: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ContentUnit>, DocumentError>> + Send;
}
