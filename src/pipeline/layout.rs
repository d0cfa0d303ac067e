//! PDF pagination and placement, independent of any drawing backend.
//!
//! ## a4_8 placement
//!
//! Each physical sheet holds up to eight cards in a 2 × 4 grid. The front
//! page takes cards row-major; the back page that follows it takes the same
//! cards with the column mirrored, so that after a long-edge duplex flip
//! every back lands behind its own front:
//!
//! ```text
//!   front page           back page
//!   ┌────┬────┐          ┌────┬────┐
//!   │ 0  │ 1  │          │ 1  │ 0  │
//!   ├────┼────┤          ├────┼────┤
//!   │ 2  │ 3  │          │ 3  │ 2  │
//!   │ …  │ …  │          │ …  │ …  │
//! ```
//!
//! A short final sheet keeps its empty cells empty on both pages.

use crate::config::PdfLayout;
use serde::Serialize;

/// Grid rows on an a4_8 page.
pub const A4_8_ROWS: usize = 4;
/// Grid columns on an a4_8 page.
pub const A4_8_COLUMNS: usize = 2;

/// Which side of the cards a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
}

/// One grid cell on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub row: usize,
    pub column: usize,
    /// Index into the card list; `None` for a blank cell.
    pub card_index: Option<usize>,
}

/// Everything the renderer needs to draw one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePlan {
    pub face: Face,
    /// 0-based physical sheet (a front/back page pair).
    pub sheet: usize,
    pub rows: usize,
    pub columns: usize,
    /// Row-major, `rows * columns` entries.
    pub slots: Vec<Slot>,
}

impl PagePlan {
    /// Card indices on this page in slot order.
    pub fn cards(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().filter_map(|s| s.card_index)
    }

    /// The card at a grid position, if any.
    pub fn card_at(&self, row: usize, column: usize) -> Option<usize> {
        self.slots
            .iter()
            .find(|s| s.row == row && s.column == column)
            .and_then(|s| s.card_index)
    }
}

/// Plan every page for `card_count` cards.
///
/// Pages alternate front, back, front, back, … so each back immediately
/// follows the front it is printed behind.
pub fn plan(layout: PdfLayout, card_count: usize) -> Vec<PagePlan> {
    match layout {
        PdfLayout::Single => (0..card_count)
            .flat_map(|i| {
                [Face::Front, Face::Back].map(|face| PagePlan {
                    face,
                    sheet: i,
                    rows: 1,
                    columns: 1,
                    slots: vec![Slot {
                        row: 0,
                        column: 0,
                        card_index: Some(i),
                    }],
                })
            })
            .collect(),
        PdfLayout::A4Eight => {
            let per_sheet = A4_8_ROWS * A4_8_COLUMNS;
            let sheets = card_count.div_ceil(per_sheet);
            (0..sheets)
                .flat_map(|sheet| {
                    [Face::Front, Face::Back]
                        .map(|face| grid_page(sheet, face, card_count, A4_8_ROWS, A4_8_COLUMNS))
                })
                .collect()
        }
    }
}

/// Total pages `plan` produces.
pub fn page_count(layout: PdfLayout, card_count: usize) -> usize {
    match layout {
        PdfLayout::Single => 2 * card_count,
        PdfLayout::A4Eight => 2 * card_count.div_ceil(A4_8_ROWS * A4_8_COLUMNS),
    }
}

fn grid_page(sheet: usize, face: Face, card_count: usize, rows: usize, columns: usize) -> PagePlan {
    let first = sheet * rows * columns;
    let mut slots = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        for column in 0..columns {
            // The back page reads each row right-to-left.
            let source_column = match face {
                Face::Front => column,
                Face::Back => columns - 1 - column,
            };
            let index = first + row * columns + source_column;
            slots.push(Slot {
                row,
                column,
                card_index: (index < card_count).then_some(index),
            });
        }
    }
    PagePlan {
        face,
        sheet,
        rows,
        columns,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_layout_pairs_front_and_back() {
        let pages = plan(PdfLayout::Single, 3);
        assert_eq!(pages.len(), 6);
        let faces: Vec<_> = pages.iter().map(|p| (p.face, p.slots[0].card_index)).collect();
        assert_eq!(
            faces,
            vec![
                (Face::Front, Some(0)),
                (Face::Back, Some(0)),
                (Face::Front, Some(1)),
                (Face::Back, Some(1)),
                (Face::Front, Some(2)),
                (Face::Back, Some(2)),
            ]
        );
    }

    #[test]
    fn a4_8_page_counts() {
        for (cards, pages) in [(1, 2), (8, 2), (9, 4), (16, 4), (17, 6), (0, 0)] {
            assert_eq!(plan(PdfLayout::A4Eight, cards).len(), pages, "{cards} cards");
            assert_eq!(page_count(PdfLayout::A4Eight, cards), pages);
        }
        assert_eq!(page_count(PdfLayout::Single, 5), 10);
    }

    #[test]
    fn a4_8_front_is_row_major() {
        let pages = plan(PdfLayout::A4Eight, 8);
        let front = &pages[0];
        assert_eq!(front.face, Face::Front);
        assert_eq!(front.cards().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
        assert_eq!(front.card_at(0, 1), Some(1));
        assert_eq!(front.card_at(3, 0), Some(6));
    }

    #[test]
    fn a4_8_back_mirrors_columns() {
        let pages = plan(PdfLayout::A4Eight, 8);
        let (front, back) = (&pages[0], &pages[1]);
        assert_eq!(back.face, Face::Back);
        for row in 0..A4_8_ROWS {
            for column in 0..A4_8_COLUMNS {
                assert_eq!(
                    back.card_at(row, A4_8_COLUMNS - 1 - column),
                    front.card_at(row, column),
                    "row {row} column {column}"
                );
            }
        }
        assert_eq!(back.cards().collect::<Vec<_>>(), vec![1, 0, 3, 2, 5, 4, 7, 6]);
    }

    #[test]
    fn short_sheet_keeps_blank_cells() {
        let pages = plan(PdfLayout::A4Eight, 11);
        assert_eq!(pages.len(), 4);
        let (front, back) = (&pages[2], &pages[3]);
        assert_eq!(front.sheet, 1);
        assert_eq!(front.cards().collect::<Vec<_>>(), vec![8, 9, 10]);
        assert_eq!(front.card_at(1, 1), None);
        // Card 10 sits at (1, 0) on the front and (1, 1) on the back.
        assert_eq!(front.card_at(1, 0), Some(10));
        assert_eq!(back.card_at(1, 1), Some(10));
        assert_eq!(back.card_at(1, 0), None);
        assert_eq!(back.slots.len(), 8);
    }

    #[test]
    fn every_card_appears_once_per_face() {
        let pages = plan(PdfLayout::A4Eight, 21);
        for face in [Face::Front, Face::Back] {
            let mut seen: Vec<_> = pages
                .iter()
                .filter(|p| p.face == face)
                .flat_map(|p| p.cards().collect::<Vec<_>>())
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..21).collect::<Vec<_>>());
        }
    }
}
