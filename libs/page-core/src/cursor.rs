use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Key attributes of the boundary item (`PK`, `SK` and the queried index keys).
pub type StartKey = BTreeMap<String, String>;

const CURSOR_VERSION: u8 = 1;

/// Version 1 cursor: the boundary position of one index/partition listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorV1 {
    /// Index the listing ran against (`primary`, `gsi1`, `gsi2`).
    pub i: String,
    /// Partition key value the listing was scoped to.
    pub p: String,
    /// Exclusive start key.
    pub k: StartKey,
}

#[derive(Serialize, Deserialize)]
struct Wire {
    v: u8,
    i: String,
    p: String,
    k: StartKey,
}

impl CursorV1 {
    pub fn new(index: impl Into<String>, partition: impl Into<String>, key: StartKey) -> Self {
        Self {
            i: index.into(),
            p: partition.into(),
            k: key,
        }
    }

    /// Encode as URL-safe base64 of a compact JSON document.
    pub fn encode(&self) -> String {
        let wire = Wire {
            v: CURSOR_VERSION,
            i: self.i.clone(),
            p: self.p.clone(),
            k: self.k.clone(),
        };
        // A map of strings always serializes.
        let json = serde_json::to_vec(&wire).unwrap_or_default();
        base64_url::encode(&json)
    }

    pub fn decode(s: &str) -> Result<Self, Error> {
        let bytes = base64_url::decode(s).map_err(|_| Error::CursorInvalidBase64)?;

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|_| Error::CursorInvalidJson)?;
        match value.get("v").and_then(serde_json::Value::as_u64) {
            Some(v) if v == u64::from(CURSOR_VERSION) => {}
            Some(_) => return Err(Error::CursorInvalidVersion),
            None => return Err(Error::CursorInvalidJson),
        }

        let wire: Wire = serde_json::from_value(value).map_err(|_| Error::CursorInvalidJson)?;
        if wire.i.is_empty() {
            return Err(Error::CursorInvalidIndex);
        }
        if wire.k.is_empty() {
            return Err(Error::CursorInvalidKeys);
        }

        Ok(Self {
            i: wire.i,
            p: wire.p,
            k: wire.k,
        })
    }

    /// Decode and check that the cursor belongs to the given listing.
    pub fn decode_for(s: &str, index: &str, partition: &str) -> Result<StartKey, Error> {
        let cursor = Self::decode(s)?;
        if cursor.i != index || cursor.p != partition {
            return Err(Error::CursorMismatch);
        }
        Ok(cursor.k)
    }
}

pub mod base64_url {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    pub fn encode(bytes: &[u8]) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
        URL_SAFE_NO_PAD.decode(s)
    }
}
