use std::io::{Cursor, Read, Write};

use anyhow::{ensure, Context};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Partition proofs of one proving window.
///
/// Serialized as the concatenation of every partition proof, each prefixed with its
/// length as a little-endian `u32`. Serializing the proofs of a window one partition at
/// a time and concatenating the results yields the same bytes as serializing them together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiProof {
    pub partition_proofs: Vec<Vec<u8>>,
}

impl MultiProof {
    pub fn new(partition_proofs: Vec<Vec<u8>>) -> Self {
        MultiProof { partition_proofs }
    }

    /// Splits serialized bytes back into partition proofs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(bytes);
        let mut partition_proofs = Vec::new();

        while (reader.position() as usize) < bytes.len() {
            let len = reader
                .read_u32::<LittleEndian>()
                .map_err(|_| Error::ProofAggregation("truncated partition header".to_string()))?
                as usize;
            let remaining = bytes.len() - reader.position() as usize;
            ensure!(
                len <= remaining,
                Error::ProofAggregation(format!(
                    "partition proof of {} bytes exceeds the {} remaining",
                    len, remaining
                ))
            );

            let mut proof = vec![0u8; len];
            reader.read_exact(&mut proof)?;
            partition_proofs.push(proof);
        }

        Ok(MultiProof::new(partition_proofs))
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for proof in &self.partition_proofs {
            writer.write_u32::<LittleEndian>(proof.len() as u32)?;
            writer.write_all(proof)?;
        }
        Ok(())
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out).context("known allocation target")?;
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.partition_proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partition_proofs.is_empty()
    }
}
