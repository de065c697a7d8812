use crate::models::Block;

/// Sort by position; ties keep their relative order.
pub(crate) fn sort_by_position(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| {
        a.position
            .partial_cmp(&b.position)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

pub(crate) fn index_of(blocks: &[Block], id: &str) -> Option<usize> {
    blocks.iter().position(|b| b.id == id)
}

pub(crate) fn find<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    blocks.iter().find(|b| b.id == id)
}

pub(crate) fn find_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    blocks.iter_mut().find(|b| b.id == id)
}

/// Sort key for a block inserted right after `blocks[idx]`.
///
/// Midpoint between the block and its successor; without a successor the new
/// block goes one past the end.
pub(crate) fn position_after(blocks: &[Block], idx: usize) -> f64 {
    let Some(prev) = blocks.get(idx) else {
        return next_position(blocks);
    };
    match blocks.get(idx + 1) {
        Some(next) => (prev.position + next.position) / 2.0,
        None => prev.position + 1.0,
    }
}

/// Sort key one past the current maximum (1.0 for an empty list).
pub(crate) fn next_position(blocks: &[Block]) -> f64 {
    blocks
        .iter()
        .map(|b| b.position)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
        .map(|max| max + 1.0)
        .unwrap_or(1.0)
}

/// Rewrite every position to the dense sequence 1, 2, 3, … in list order.
pub(crate) fn renumber(blocks: &mut [Block]) {
    for (i, b) in blocks.iter_mut().enumerate() {
        b.position = (i + 1) as f64;
    }
}

pub(crate) fn ordered_ids(blocks: &[Block]) -> Vec<String> {
    blocks.iter().map(|b| b.id.clone()).collect()
}

#[cfg(test)]
pub(crate) fn block(id: &str, text: &str, position: f64) -> Block {
    use crate::models::{BlockContent, BlockProps, BlockType};
    Block {
        id: id.to_string(),
        kind: BlockType::Text,
        content: BlockContent::new(text),
        props: BlockProps::default(),
        position,
        page_id: "p1".to_string(),
        created_by: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_after_uses_midpoint() {
        let xs = vec![block("a", "", 1.0), block("b", "", 2.0)];
        assert_eq!(position_after(&xs, 0), 1.5);
    }

    #[test]
    fn test_position_after_last_appends() {
        let xs = vec![block("a", "", 1.0), block("b", "", 2.0)];
        assert_eq!(position_after(&xs, 1), 3.0);
    }

    #[test]
    fn test_repeated_midpoints_stay_ordered() {
        let mut xs = vec![block("a", "", 1.0), block("z", "", 2.0)];
        for n in 0..20 {
            let p = position_after(&xs, 0);
            xs.insert(1, block(&format!("n{n}"), "", p));
        }
        let positions = xs.iter().map(|b| b.position).collect::<Vec<_>>();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_next_position_empty() {
        assert_eq!(next_position(&[]), 1.0);
        assert_eq!(next_position(&[block("a", "", 7.5)]), 8.5);
    }

    #[test]
    fn test_renumber_dense_one_based() {
        let mut xs = vec![
            block("a", "", 0.25),
            block("b", "", 0.5),
            block("c", "", 9.0),
        ];
        renumber(&mut xs);
        assert_eq!(
            xs.iter().map(|b| b.position).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_sort_by_position() {
        let mut xs = vec![block("b", "", 2.0), block("a", "", 1.5), block("c", "", 3.0)];
        sort_by_position(&mut xs);
        assert_eq!(ordered_ids(&xs), vec!["a", "b", "c"]);
    }
}
