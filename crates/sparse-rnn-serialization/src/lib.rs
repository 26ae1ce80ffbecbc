// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Sparse RNN Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Sparse RNN Serialization
//!
//! Persistence for compiled graphs and the dense weight files they are
//! compiled from.
//!
//! ## Formats
//! - **JSON**: the serialized graph as-is (camelCase fields, `null` holes)
//! - **Binary**: a framed container around the JSON payload with a
//!   checksum and optional LZ4 compression
//!
//! ## Usage
//! ```ignore
//! use sparse_rnn_serialization::{save_graph, load_graph, GraphSnapshot};
//!
//! save_graph(&GraphSnapshot::new(graph.serialize()), "model.srnn")?;
//! let snapshot = load_graph("model.srnn")?;
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use serde::{Deserialize, Serialize};
use sparse_rnn_neural::GraphError;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod graph_format;
mod weights_file;

pub use graph_format::*;
pub use weights_file::*;

/// Graph I/O errors
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: u32,
        expected_version: u32,
    },

    #[error("Invalid magic number: expected SRNNG, got {0:?}")]
    InvalidMagic([u8; 5]),

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("Compression error: {0}")]
    Compression(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Magic number for binary graph files: "SRNNG"
pub const MAGIC: &[u8; 5] = b"SRNNG";

/// Current container version
const FORMAT_VERSION: u32 = 1;

/// Header length: magic + version + flags + uncompressed size + checksum
const HEADER_LEN: usize = 5 + 4 + 1 + 8 + 8;

/// Payload of the binary container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub version: u32,
    pub graph: SerializedRnnGraph,
    #[serde(default)]
    pub metadata: GraphMetadata,
}

impl GraphSnapshot {
    pub fn new(graph: SerializedRnnGraph) -> Self {
        Self {
            version: FORMAT_VERSION,
            graph,
            metadata: GraphMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: GraphMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Provenance of a saved graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    pub description: String,
    /// e.g. "weights: model.json"
    pub source: String,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            description: String::new(),
            source: String::from("unknown"),
        }
    }
}

/// Serialized graph as pretty JSON
pub fn graph_to_json(graph: &SerializedRnnGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

pub fn graph_from_json(json: &str) -> Result<SerializedRnnGraph> {
    Ok(serde_json::from_str(json)?)
}

pub fn save_graph_json<P: AsRef<Path>>(graph: &SerializedRnnGraph, path: P) -> Result<()> {
    std::fs::write(path, graph_to_json(graph)?)?;
    Ok(())
}

/// Encode a snapshot into the binary container
///
/// # Format
/// ```text
/// [Header]
/// - Magic: "SRNNG" (5 bytes)
/// - Version: u32 (4 bytes)
/// - Flags: u8 (1 byte) - bit 0: compressed
/// - Uncompressed Size: u64 (8 bytes, original size before compression)
/// - Checksum: u64 (8 bytes, FNV-1a of data)
/// [Data]
/// - JSON-serialized GraphSnapshot (optionally LZ4 compressed)
/// ```
pub fn encode_snapshot(snapshot: &GraphSnapshot) -> Result<Vec<u8>> {
    let data = serde_json::to_vec(snapshot)?;

    #[cfg(feature = "compression")]
    let (final_data, flags, uncompressed_size) = {
        let original_size = data.len();
        let compressed = lz4::block::compress(&data, None, false)
            .map_err(|e| SerializationError::Compression(e.to_string()))?;
        (compressed, 1u8, original_size as u64)
    };

    #[cfg(not(feature = "compression"))]
    let (final_data, flags, uncompressed_size) = {
        let original_size = data.len() as u64;
        (data, 0u8, original_size)
    };

    let mut out = Vec::with_capacity(HEADER_LEN + final_data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.push(flags);
    out.extend_from_slice(&uncompressed_size.to_le_bytes());
    out.extend_from_slice(&calculate_checksum(&final_data).to_le_bytes());
    out.extend_from_slice(&final_data);
    Ok(out)
}

/// Decode the binary container produced by [`encode_snapshot`]
pub fn decode_snapshot(mut bytes: &[u8]) -> Result<GraphSnapshot> {
    let mut magic = [0u8; 5];
    bytes.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(SerializationError::InvalidMagic(magic));
    }

    let mut version_bytes = [0u8; 4];
    bytes.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != FORMAT_VERSION {
        return Err(SerializationError::VersionMismatch {
            file_version: version,
            expected_version: FORMAT_VERSION,
        });
    }

    let mut flags = [0u8; 1];
    bytes.read_exact(&mut flags)?;
    let is_compressed = (flags[0] & 1) != 0;

    let mut size_bytes = [0u8; 8];
    bytes.read_exact(&mut size_bytes)?;
    let uncompressed_size = u64::from_le_bytes(size_bytes) as usize;

    let mut checksum_bytes = [0u8; 8];
    bytes.read_exact(&mut checksum_bytes)?;
    let expected_checksum = u64::from_le_bytes(checksum_bytes);

    if calculate_checksum(bytes) != expected_checksum {
        return Err(SerializationError::ChecksumMismatch);
    }

    let data = if is_compressed {
        #[cfg(feature = "compression")]
        {
            let size = i32::try_from(uncompressed_size).map_err(|_| {
                SerializationError::Compression(format!(
                    "Uncompressed size {} exceeds the LZ4 block limit",
                    uncompressed_size
                ))
            })?;
            lz4::block::decompress(bytes, Some(size)).map_err(|e| {
                SerializationError::Compression(format!("Decompression failed: {}", e))
            })?
        }
        #[cfg(not(feature = "compression"))]
        {
            let _ = uncompressed_size;
            return Err(SerializationError::Compression(
                "File is compressed but compression feature is not enabled".to_string(),
            ));
        }
    } else {
        bytes.to_vec()
    };

    Ok(serde_json::from_slice(&data)?)
}

/// Save a snapshot to a file in the binary container format
pub fn save_graph<P: AsRef<Path>>(snapshot: &GraphSnapshot, path: P) -> Result<()> {
    let bytes = encode_snapshot(snapshot)?;
    let mut file = File::create(path.as_ref())?;
    file.write_all(&bytes)?;
    debug!(
        target: "sparse-rnn-serialization",
        "Saved graph ({} neurons, {} bytes) to {}",
        snapshot.graph.neuron_count(),
        bytes.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Load a snapshot from a binary container file
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<GraphSnapshot> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    decode_snapshot(&bytes)
}

/// Load a graph file in either format, sniffing the magic bytes
pub fn load_graph_any<P: AsRef<Path>>(path: P) -> Result<SerializedRnnGraph> {
    let bytes = std::fs::read(path.as_ref())?;
    if bytes.starts_with(MAGIC) {
        return Ok(decode_snapshot(&bytes)?.graph);
    }
    debug!(
        target: "sparse-rnn-serialization",
        "No container magic in {}; parsing as JSON",
        path.as_ref().display()
    );
    Ok(serde_json::from_slice(&bytes)?)
}

/// FNV-1a over the payload bytes
fn calculate_checksum(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparse_rnn_neural::Activation;
    use tempfile::NamedTempFile;

    fn tiny_graph() -> SerializedRnnGraph {
        let input = SerializedSparseNeuron {
            weights: vec![],
            bias: 0.0,
            name: "input_0".into(),
            activation: Activation::Linear,
        };
        let output = SerializedSparseNeuron {
            weights: vec![SerializedSparseWeight { weight: 1.0, index: 0 }],
            bias: 0.0,
            name: "output_0".into(),
            activation: Activation::Linear,
        };
        SerializedRnnGraph {
            input_layer: SerializedInputLayer {
                neurons: vec![Some(input)],
            },
            cells: vec![],
            post_layers: vec![],
            outputs: SerializedOutputLayer {
                neurons: vec![Some(output)],
            },
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let snapshot = GraphSnapshot::new(tiny_graph());

        let temp_file = NamedTempFile::new().unwrap();
        save_graph(&snapshot, temp_file.path()).unwrap();

        let loaded = load_graph(temp_file.path()).unwrap();
        assert_eq!(loaded.version, FORMAT_VERSION);
        assert_eq!(loaded.graph, snapshot.graph);
        assert_eq!(loaded.metadata.timestamp, snapshot.metadata.timestamp);
    }

    #[test]
    fn test_invalid_magic() {
        let result = decode_snapshot(b"WRONGxxxxxxxxxxxxxxxxxxxxxxx");
        assert!(matches!(result, Err(SerializationError::InvalidMagic(_))));
    }

    #[test]
    fn test_corrupted_payload_fails_checksum() {
        let mut bytes = encode_snapshot(&GraphSnapshot::new(tiny_graph())).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(SerializationError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = encode_snapshot(&GraphSnapshot::new(tiny_graph())).unwrap();
        bytes[5..9].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(SerializationError::VersionMismatch { file_version: 7, .. })
        ));
    }

    #[test]
    fn test_load_any_sniffs_format() {
        let graph = tiny_graph();

        let json_file = NamedTempFile::new().unwrap();
        save_graph_json(&graph, json_file.path()).unwrap();
        assert_eq!(load_graph_any(json_file.path()).unwrap(), graph);

        let bin_file = NamedTempFile::new().unwrap();
        save_graph(&GraphSnapshot::new(graph.clone()), bin_file.path()).unwrap();
        assert_eq!(load_graph_any(bin_file.path()).unwrap(), graph);
    }

    #[test]
    fn test_checksum() {
        assert_eq!(calculate_checksum(b"hello world"), calculate_checksum(b"hello world"));
        assert_ne!(calculate_checksum(b"hello world"), calculate_checksum(b"hello worlD"));
    }
}
