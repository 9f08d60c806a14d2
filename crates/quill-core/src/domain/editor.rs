//! In-memory block editing for a page that has not been submitted yet.
//!
//! Every operation keeps positions dense (`1..=N`), which is the same
//! property [`reconcile`](super::reconcile::reconcile) checks on submission.

use super::block::{BlockId, BlockKind, ContentBlock};
use super::reconcile::validate_positions;
use crate::error::ContentError;

const LOCAL_PREFIX: &str = "local-";

/// Editable, always-dense list of content blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEditor {
    blocks: Vec<ContentBlock>,
    next_local: u64,
}

impl BlockEditor {
    /// Start editing an existing block list. Positions must already be dense.
    pub fn new(mut blocks: Vec<ContentBlock>) -> Result<Self, ContentError> {
        validate_positions(&blocks)?;
        blocks.sort_by_key(|b| b.position);

        let next_local = blocks
            .iter()
            .filter_map(|b| match &b.id {
                BlockId::Local(id) => id.strip_prefix(LOCAL_PREFIX)?.parse::<u64>().ok(),
                BlockId::Stored(_) => None,
            })
            .max()
            .map_or(1, |n| n + 1);

        Ok(Self { blocks, next_local })
    }

    /// Blocks ordered by position.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Swap the block with its predecessor. No-op for the first block.
    pub fn move_up(&mut self, id: &BlockId) -> Result<(), ContentError> {
        let index = self.index_of(id)?;
        if index > 0 {
            self.swap_with_next(index - 1);
        }
        Ok(())
    }

    /// Swap the block with its successor. No-op for the last block.
    pub fn move_down(&mut self, id: &BlockId) -> Result<(), ContentError> {
        let index = self.index_of(id)?;
        if index + 1 < self.blocks.len() {
            self.swap_with_next(index);
        }
        Ok(())
    }

    /// Delete the block and close the gap it leaves.
    pub fn remove(&mut self, id: &BlockId) -> Result<ContentBlock, ContentError> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        for block in &mut self.blocks[index..] {
            block.position -= 1;
        }
        Ok(removed)
    }

    /// Add a block after the last one, under a fresh local id.
    pub fn append(&mut self, kind: BlockKind, text: impl Into<String>) -> BlockId {
        let id = self.fresh_local_id();
        let position = self.blocks.len() as i32 + 1;
        self.blocks.push(ContentBlock::new(id.clone(), kind, text, position));
        id
    }

    /// Replace the text of a block; kind and position stay as they are.
    pub fn edit_text(&mut self, id: &BlockId, text: impl Into<String>) -> Result<(), ContentError> {
        let index = self.index_of(id)?;
        self.blocks[index].text = text.into();
        Ok(())
    }

    fn index_of(&self, id: &BlockId) -> Result<usize, ContentError> {
        self.blocks
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| ContentError::UnknownBlockReference(id.to_string()))
    }

    // Blocks are kept sorted, so index i holds position i + 1.
    fn swap_with_next(&mut self, index: usize) {
        self.blocks.swap(index, index + 1);
        self.blocks[index].position = index as i32 + 1;
        self.blocks[index + 1].position = index as i32 + 2;
    }

    fn fresh_local_id(&mut self) -> BlockId {
        loop {
            let candidate = BlockId::Local(format!("{}{}", LOCAL_PREFIX, self.next_local));
            self.next_local += 1;
            if !self.blocks.iter().any(|b| b.id == candidate) {
                return candidate;
            }
        }
    }
}
