use crate::editor::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropEdge {
    Above,
    Below,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropIndicator {
    pub target_id: String,
    pub edge: DropEdge,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropPlan {
    pub dragged_id: String,
    pub target_id: String,
    pub after: bool,
}

/// Pointer-drag gesture over block handles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    dragged: Option<String>,
    indicator: Option<DropIndicator>,
}

impl DragState {
    pub fn start(&mut self, block_id: &str) {
        self.dragged = Some(block_id.to_string());
        self.indicator = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Pointer moved over `target_id`; upper half means "above". Returns true
    /// when the indicator moved.
    pub fn over(&mut self, target_id: &str, pointer_y: f64, target: Rect) -> bool {
        if self.dragged.is_none() {
            return false;
        }
        let mid = target.y + target.height / 2.0;
        let edge = if pointer_y < mid {
            DropEdge::Above
        } else {
            DropEdge::Below
        };
        let next = Some(DropIndicator {
            target_id: target_id.to_string(),
            edge,
        });
        if self.indicator == next {
            return false;
        }
        self.indicator = next;
        true
    }

    pub fn indicator_for(&self, block_id: &str) -> Option<DropEdge> {
        self.indicator
            .as_ref()
            .filter(|i| i.target_id == block_id)
            .map(|i| i.edge)
    }

    /// Finish the gesture. Yields a plan only when a valid target is set.
    pub fn finish(&mut self) -> Option<DropPlan> {
        let dragged_id = self.dragged.take()?;
        let ind = self.indicator.take()?;
        if ind.target_id == dragged_id {
            return None;
        }
        Some(DropPlan {
            dragged_id,
            target_id: ind.target_id,
            after: ind.edge == DropEdge::Below,
        })
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
        self.indicator = None;
    }
}

/// Old and new index of the dragged block.
///
/// The target index is taken before removal, so it is shifted back by one when
/// the block moves downward past its own old slot.
pub(crate) fn drop_index(
    ids: &[String],
    dragged_id: &str,
    target_id: &str,
    after: bool,
) -> Option<(usize, usize)> {
    if dragged_id == target_id {
        return None;
    }
    let from = ids.iter().position(|id| id == dragged_id)?;
    let target = ids.iter().position(|id| id == target_id)?;
    let mut to = target + usize::from(after);
    if from < to {
        to -= 1;
    }
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ids(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn row(y: f64) -> Rect {
        Rect {
            x: 0.0,
            y,
            width: 600.0,
            height: 40.0,
        }
    }

    #[rstest]
    #[case("a", "c", true, Some((0, 2)))]
    #[case("a", "c", false, Some((0, 1)))]
    #[case("c", "a", false, Some((2, 0)))]
    #[case("c", "a", true, Some((2, 1)))]
    #[case("b", "a", true, Some((1, 1)))]
    #[case("b", "b", true, None)]
    #[case("x", "a", true, None)]
    fn test_drop_index(
        #[case] dragged: &str,
        #[case] target: &str,
        #[case] after: bool,
        #[case] expected: Option<(usize, usize)>,
    ) {
        assert_eq!(drop_index(&ids(&["a", "b", "c"]), dragged, target, after), expected);
    }

    #[test]
    fn test_over_picks_half() {
        let mut d = DragState::default();
        d.start("a");
        assert!(d.over("b", 105.0, row(100.0)));
        assert_eq!(d.indicator_for("b"), Some(DropEdge::Above));
        assert!(!d.over("b", 110.0, row(100.0)));
        assert!(d.over("b", 125.0, row(100.0)));
        assert_eq!(d.indicator_for("b"), Some(DropEdge::Below));
        assert_eq!(d.indicator_for("a"), None);
    }

    #[test]
    fn test_drop_without_target_is_noop() {
        let mut d = DragState::default();
        d.start("a");
        assert_eq!(d.finish(), None);
        assert!(!d.is_dragging());
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let mut d = DragState::default();
        d.start("a");
        d.over("a", 130.0, row(100.0));
        assert_eq!(d.finish(), None);
    }

    #[test]
    fn test_drop_plan() {
        let mut d = DragState::default();
        d.start("a");
        d.over("b", 130.0, row(100.0));
        assert_eq!(
            d.finish(),
            Some(DropPlan {
                dragged_id: "a".to_string(),
                target_id: "b".to_string(),
                after: true
            })
        );
    }

    #[test]
    fn test_over_ignored_when_not_dragging() {
        let mut d = DragState::default();
        assert!(!d.over("b", 0.0, row(0.0)));
        assert_eq!(d.indicator_for("b"), None);
    }
}
