use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Highlight {
    #[default]
    None,
    Row {
        index: usize,
    },
    Col {
        index: usize,
    },
    Cell {
        row: usize,
        col: usize,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HighlightEvent {
    Row { index: usize },
    Col { index: usize },
    Cell { row: usize, col: usize },
}

impl From<HighlightEvent> for Highlight {
    fn from(event: HighlightEvent) -> Self {
        match event {
            HighlightEvent::Row { index } => Highlight::Row { index },
            HighlightEvent::Col { index } => Highlight::Col { index },
            HighlightEvent::Cell { row, col } => Highlight::Cell { row, col },
        }
    }
}

impl Highlight {
    pub fn on_double_click(self, event: HighlightEvent) -> Highlight {
        let next = Highlight::from(event);
        if next == self { Highlight::None } else { next }
    }

    pub fn dispatch(&mut self, event: HighlightEvent) {
        *self = self.on_double_click(event);
    }

    pub fn covers_cell(self, row: usize, col: usize) -> bool {
        match self {
            Highlight::None => false,
            Highlight::Row { index } => index == row,
            Highlight::Col { index } => index == col,
            Highlight::Cell { row: r, col: c } => r == row && c == col,
        }
    }

    pub fn covers_header(self, col: usize) -> bool {
        matches!(self, Highlight::Col { index } if index == col)
    }

    pub fn fits(self, rows: usize, cols: usize) -> bool {
        match self {
            Highlight::None => true,
            Highlight::Row { index } => index < rows,
            Highlight::Col { index } => index < cols,
            Highlight::Cell { row, col } => row < rows && col < cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_event() -> impl Strategy<Value = HighlightEvent> {
        prop_oneof![
            (0usize..40).prop_map(|index| HighlightEvent::Row { index }),
            (0usize..40).prop_map(|index| HighlightEvent::Col { index }),
            (0usize..40, 0usize..40).prop_map(|(row, col)| HighlightEvent::Cell { row, col }),
        ]
    }

    #[test]
    fn starts_with_nothing_highlighted() {
        assert_eq!(Highlight::default(), Highlight::None);
    }

    #[test]
    fn same_row_twice_toggles_off() {
        let state = Highlight::None.on_double_click(HighlightEvent::Row { index: 4 });
        assert_eq!(state, Highlight::Row { index: 4 });
        assert_eq!(
            state.on_double_click(HighlightEvent::Row { index: 4 }),
            Highlight::None
        );
    }

    #[test]
    fn different_row_replaces_directly() {
        let state = Highlight::Row { index: 1 };
        assert_eq!(
            state.on_double_click(HighlightEvent::Row { index: 2 }),
            Highlight::Row { index: 2 }
        );
    }

    #[test]
    fn row_and_column_with_same_index_are_different_targets() {
        let state = Highlight::Row { index: 3 };
        assert_eq!(
            state.on_double_click(HighlightEvent::Col { index: 3 }),
            Highlight::Col { index: 3 }
        );
    }

    #[test]
    fn dispatch_updates_in_place() {
        let mut state = Highlight::default();
        state.dispatch(HighlightEvent::Cell { row: 1, col: 9 });
        assert_eq!(state, Highlight::Cell { row: 1, col: 9 });
        state.dispatch(HighlightEvent::Cell { row: 1, col: 9 });
        assert_eq!(state, Highlight::None);
    }

    #[test]
    fn coverage_rules() {
        let row = Highlight::Row { index: 2 };
        assert!(row.covers_cell(2, 0));
        assert!(row.covers_cell(2, 30));
        assert!(!row.covers_cell(3, 0));
        assert!(!row.covers_header(2));

        let col = Highlight::Col { index: 9 };
        assert!(col.covers_cell(0, 9));
        assert!(col.covers_header(9));
        assert!(!col.covers_cell(9, 0));

        let cell = Highlight::Cell { row: 1, col: 5 };
        assert!(cell.covers_cell(1, 5));
        assert!(!cell.covers_cell(1, 6));
        assert!(!Highlight::None.covers_cell(0, 0));
    }

    #[test]
    fn serializes_as_tagged_union() {
        let json = serde_json::to_string(&Highlight::Cell { row: 1, col: 2 }).expect("json");
        assert_eq!(json, r#"{"type":"cell","row":1,"col":2}"#);
        let none = serde_json::to_string(&Highlight::None).expect("json");
        assert_eq!(none, r#"{"type":"none"}"#);

        let event: HighlightEvent =
            serde_json::from_str(r#"{"type":"col","index":7}"#).expect("event");
        assert_eq!(event, HighlightEvent::Col { index: 7 });
    }

    proptest! {
        #[test]
        fn prop_repeating_an_event_toggles_off(first in arb_event(), start in arb_event()) {
            let state = Highlight::from(start).on_double_click(first);
            if state != Highlight::None {
                prop_assert_eq!(state.on_double_click(first), Highlight::None);
            }
        }

        #[test]
        fn prop_new_target_never_passes_through_none(a in arb_event(), b in arb_event()) {
            prop_assume!(a != b);
            let state = Highlight::None.on_double_click(a);
            prop_assert_eq!(state.on_double_click(b), Highlight::from(b));
        }
    }
}
