//! Scoped stage input buffers

use starpipe_story::{write_story, StoryNode};
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use tempfile::SpooledData;

/// Serialized story ready to become a process's stdin
///
/// Small inputs stay in memory; inputs above the spill threshold live in an
/// anonymous temporary file that is removed when this value (or the child
/// process holding the descriptor) is dropped.
#[derive(Debug)]
pub(crate) enum StagedInput {
    InMemory(Vec<u8>),
    Spilled(File),
}

impl StagedInput {
    /// Serialize `node` into a spooled buffer bounded by `threshold` bytes
    pub(crate) fn stage(node: &StoryNode, threshold: usize) -> io::Result<Self> {
        let mut spool = tempfile::spooled_tempfile(threshold);
        {
            let mut writer = BufWriter::new(&mut spool);
            write_story(node, &mut writer)?;
            writer.flush()?;
        }

        let len = spool.seek(SeekFrom::End(0))?;
        let rolled = spool.is_rolled();
        tracing::debug!(bytes = len, spilled = rolled, "staged stage input");

        Ok(match spool.into_inner() {
            SpooledData::InMemory(cursor) => Self::InMemory(cursor.into_inner()),
            SpooledData::OnDisk(mut file) => {
                file.seek(SeekFrom::Start(0))?;
                Self::Spilled(file)
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn is_spilled(&self) -> bool {
        matches!(self, Self::Spilled(_))
    }
}
