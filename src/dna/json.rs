use crate::dna::document::DnaDocument;
use crate::dna::stream::DnaCodec;
use crate::foundation::error::{CalibError, CalibResult};

/// Human-readable JSON rendition of the same document, for diffing and fixtures.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl DnaCodec for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> CalibResult<DnaDocument> {
        serde_json::from_slice(bytes)
            .map_err(|e| CalibError::format(format!("parse DNA JSON: {e}")))
    }

    fn encode(&self, doc: &DnaDocument) -> CalibResult<Vec<u8>> {
        serde_json::to_vec_pretty(doc)
            .map_err(|e| CalibError::format(format!("serialize DNA JSON: {e}")))
    }
}
