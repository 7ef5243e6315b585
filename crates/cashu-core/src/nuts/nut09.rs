//! Restore signatures
// https://github.com/cashubtc/nuts/blob/main/09.md

use serde::{Deserialize, Serialize};

use super::{BlindSignature, BlindedMessage};

/// Restore request [NUT-09]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    /// Outputs to restore signatures for
    pub outputs: Vec<BlindedMessage>,
}

/// Restore response [NUT-09]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    /// Outputs that a signature could be restored for
    pub outputs: Vec<BlindedMessage>,
    /// Restored signatures, in the same order as `outputs`
    pub signatures: Vec<BlindSignature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_response_serialization_roundtrip() {
        let response = RestoreResponse {
            outputs: Vec::new(),
            signatures: Vec::new(),
        };
        let json = serde_json::to_string(&response).unwrap();
        let parsed: RestoreResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(response, parsed);
    }
}
