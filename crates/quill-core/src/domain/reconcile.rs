//! Content reconciliation - turns a submitted block list into the writes
//! needed to bring a page's stored blocks in line with it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::block::{BlockId, BlockKind, ContentBlock};
use crate::error::ContentError;

/// A block the store must insert. The store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
    pub position: i32,
}

/// New values for the mutable fields of a stored block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUpdate {
    pub id: i64,
    pub text: String,
    pub position: i32,
}

/// Writes needed to move a page from its stored blocks to a submitted list.
///
/// `to_create`, `to_update` and `to_delete` are disjoint. Together with
/// `unchanged` the created and updated blocks occupy exactly the positions
/// `1..=N` of the submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPlan {
    pub to_create: Vec<NewBlock>,
    pub to_update: Vec<BlockUpdate>,
    pub to_delete: Vec<i64>,
    pub unchanged: Vec<i64>,
}

impl ContentPlan {
    /// True when applying the plan would write nothing.
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Check that positions, once sorted, are exactly `1..=N`.
pub fn validate_positions(blocks: &[ContentBlock]) -> Result<(), ContentError> {
    let mut positions: Vec<i32> = blocks.iter().map(|b| b.position).collect();
    positions.sort_unstable();

    let dense = positions
        .iter()
        .zip(1..)
        .all(|(&position, expected)| position == expected);

    if dense {
        Ok(())
    } else {
        Err(ContentError::InvalidOrdering {
            expected: blocks.len(),
            positions,
        })
    }
}

/// Check the minimum viable content: a header plus a paragraph or image.
pub fn validate_content_mix(blocks: &[ContentBlock]) -> Result<(), ContentError> {
    let has_header = blocks.iter().any(|b| b.kind == BlockKind::Header);
    let has_body = blocks.iter().any(|b| b.kind.is_body());

    if has_header && has_body {
        Ok(())
    } else {
        Err(ContentError::InsufficientContent)
    }
}

/// Compute the plan that moves `old` (as stored) to `new` (as submitted).
///
/// Submitted blocks are matched to stored ones by id. Validation runs before
/// any operation is planned, so a rejected submission yields no plan at all.
pub fn reconcile(old: &[ContentBlock], new: &[ContentBlock]) -> Result<ContentPlan, ContentError> {
    validate_positions(new)?;
    validate_content_mix(new)?;

    let mut lookup: HashMap<i64, &ContentBlock> = old
        .iter()
        .filter_map(|b| b.id.stored().map(|id| (id, b)))
        .collect();

    let mut seen: HashSet<&BlockId> = HashSet::with_capacity(new.len());
    let mut plan = ContentPlan::default();

    for block in new {
        if !seen.insert(&block.id) {
            return Err(ContentError::UnknownBlockReference(format!(
                "block {} is submitted more than once",
                block.id
            )));
        }

        let matched = block
            .id
            .stored()
            .and_then(|id| lookup.remove(&id).map(|previous| (id, previous)));

        match matched {
            // The kind of a stored block never changes in place.
            Some((id, previous)) if previous.kind != block.kind => {
                plan.to_delete.push(id);
                plan.to_create.push(new_block(block));
            }
            Some((id, previous)) => {
                if previous.text != block.text || previous.position != block.position {
                    plan.to_update.push(BlockUpdate {
                        id,
                        text: block.text.clone(),
                        position: block.position,
                    });
                } else {
                    plan.unchanged.push(id);
                }
            }
            None => plan.to_create.push(new_block(block)),
        }
    }

    // Whatever was not claimed by the submission goes away, in stored order.
    plan.to_delete.extend(
        old.iter()
            .filter_map(|b| b.id.stored())
            .filter(|id| lookup.contains_key(id)),
    );

    Ok(plan)
}

fn new_block(block: &ContentBlock) -> NewBlock {
    NewBlock {
        kind: block.kind,
        text: block.text.clone(),
        position: block.position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BlockKind::{Header, Image, Paragraph};

    fn stored_page() -> Vec<ContentBlock> {
        vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(2, Paragraph, "B", 2),
        ]
    }

    #[test]
    fn test_update_and_append() {
        let new = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(2, Paragraph, "C", 2),
            ContentBlock::local("local-3", Image, "x.png", 3),
        ];

        let plan = reconcile(&stored_page(), &new).unwrap();

        assert_eq!(
            plan.to_update,
            vec![BlockUpdate {
                id: 2,
                text: "C".to_string(),
                position: 2
            }]
        );
        assert_eq!(
            plan.to_create,
            vec![NewBlock {
                kind: Image,
                text: "x.png".to_string(),
                position: 3
            }]
        );
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.unchanged, vec![1]);
    }

    #[test]
    fn test_identical_submission_is_noop() {
        let old = vec![
            ContentBlock::stored(10, Header, "Title", 1),
            ContentBlock::stored(11, Paragraph, "Body", 2),
            ContentBlock::stored(12, Image, "a.png", 3),
        ];
        // Same set, different submission order.
        let new = vec![old[2].clone(), old[0].clone(), old[1].clone()];

        let plan = reconcile(&old, &new).unwrap();

        assert!(plan.is_noop());
        assert_eq!(plan.unchanged.len(), 3);
    }

    #[test]
    fn test_missing_header_rejected() {
        let new = vec![
            ContentBlock::stored(1, Paragraph, "A", 1),
            ContentBlock::stored(2, Paragraph, "B", 2),
        ];

        assert_eq!(
            reconcile(&stored_page(), &new),
            Err(ContentError::InsufficientContent)
        );
    }

    #[test]
    fn test_header_only_rejected() {
        let new = vec![ContentBlock::stored(1, Header, "A", 1)];

        assert_eq!(
            reconcile(&stored_page(), &new),
            Err(ContentError::InsufficientContent)
        );
    }

    #[test]
    fn test_duplicate_positions_rejected() {
        let new = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(2, Paragraph, "B", 1),
            ContentBlock::local("local-3", Image, "x.png", 3),
        ];

        let err = reconcile(&stored_page(), &new).unwrap_err();
        assert!(matches!(err, ContentError::InvalidOrdering { .. }));
    }

    #[test]
    fn test_ordering_checked_before_content_mix() {
        let new = vec![
            ContentBlock::stored(1, Paragraph, "A", 2),
            ContentBlock::stored(2, Paragraph, "B", 3),
        ];

        let err = reconcile(&stored_page(), &new).unwrap_err();
        assert!(matches!(err, ContentError::InvalidOrdering { .. }));
    }

    #[test]
    fn test_dense_positions_accepted_for_any_permutation() {
        // Every permutation of 1..=4 is accepted.
        let base = [1, 2, 3, 4];
        let mut accepted = 0;
        for a in base {
            for b in base {
                for c in base {
                    for d in base {
                        let positions = [a, b, c, d];
                        let new: Vec<ContentBlock> = positions
                            .iter()
                            .enumerate()
                            .map(|(i, &p)| {
                                let kind = if i == 0 { Header } else { Paragraph };
                                ContentBlock::local(format!("local-{}", i), kind, "t", p)
                            })
                            .collect();

                        let mut sorted = positions;
                        sorted.sort_unstable();
                        let result = reconcile(&[], &new);

                        if sorted == base {
                            assert!(result.is_ok(), "{:?} should pass", positions);
                            accepted += 1;
                        } else {
                            assert!(
                                matches!(result, Err(ContentError::InvalidOrdering { .. })),
                                "{:?} should fail",
                                positions
                            );
                        }
                    }
                }
            }
        }
        assert_eq!(accepted, 24);
    }

    #[test]
    fn test_gaps_and_out_of_range_rejected() {
        for positions in [vec![0, 1], vec![1, 3], vec![-1, 1], vec![2, 3]] {
            let new: Vec<ContentBlock> = positions
                .iter()
                .enumerate()
                .map(|(i, &p)| {
                    let kind = if i == 0 { Header } else { Image };
                    ContentBlock::local(format!("local-{}", i), kind, "t", p)
                })
                .collect();

            assert!(matches!(
                validate_positions(&new),
                Err(ContentError::InvalidOrdering { .. })
            ));
        }
    }

    #[test]
    fn test_removed_blocks_are_deleted() {
        let old = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(2, Paragraph, "B", 2),
            ContentBlock::stored(3, Image, "c.png", 3),
        ];
        let new = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(3, Image, "c.png", 2),
        ];

        let plan = reconcile(&old, &new).unwrap();

        assert_eq!(plan.to_delete, vec![2]);
        assert_eq!(
            plan.to_update,
            vec![BlockUpdate {
                id: 3,
                text: "c.png".to_string(),
                position: 2
            }]
        );
        assert!(plan.to_create.is_empty());
    }

    #[test]
    fn test_kind_change_becomes_delete_and_create() {
        let new = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(2, Image, "b.png", 2),
        ];

        let plan = reconcile(&stored_page(), &new).unwrap();

        assert_eq!(plan.to_delete, vec![2]);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].kind, Image);
        assert!(plan.to_update.is_empty());
    }

    #[test]
    fn test_unknown_stored_id_is_created() {
        let new = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(99, Paragraph, "foreign", 2),
        ];

        let plan = reconcile(&stored_page(), &new).unwrap();

        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_delete, vec![2]);
    }

    #[test]
    fn test_repeated_id_rejected() {
        let new = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(1, Header, "A again", 2),
            ContentBlock::stored(2, Paragraph, "B", 3),
        ];

        assert!(matches!(
            reconcile(&stored_page(), &new),
            Err(ContentError::UnknownBlockReference(_))
        ));
    }

    #[test]
    fn test_new_page_creates_everything() {
        let new = vec![
            ContentBlock::local("local-1", Header, "A", 1),
            ContentBlock::local("local-2", Paragraph, "B", 2),
        ];

        let plan = reconcile(&[], &new).unwrap();

        assert_eq!(plan.to_create.len(), 2);
        assert!(plan.to_update.is_empty());
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_plan_covers_every_position_once() {
        let old = vec![
            ContentBlock::stored(1, Header, "A", 1),
            ContentBlock::stored(2, Paragraph, "B", 2),
            ContentBlock::stored(3, Paragraph, "C", 3),
        ];
        let new = vec![
            ContentBlock::stored(3, Paragraph, "C", 1),
            ContentBlock::local("local-9", Image, "z.png", 2),
            ContentBlock::stored(1, Header, "A", 3),
            ContentBlock::stored(2, Paragraph, "B", 4),
        ];

        let plan = reconcile(&old, &new).unwrap();

        let by_id: HashMap<i64, i32> = old.iter().map(|b| (b.id.stored().unwrap(), b.position)).collect();
        let mut positions: Vec<i32> = plan
            .to_create
            .iter()
            .map(|b| b.position)
            .chain(plan.to_update.iter().map(|u| u.position))
            .chain(plan.unchanged.iter().map(|id| by_id[id]))
            .collect();
        positions.sort_unstable();

        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert!(plan.to_delete.is_empty());
    }
}
