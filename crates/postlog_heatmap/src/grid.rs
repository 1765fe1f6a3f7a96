//! Calendar grid of the trailing year.
//!
//! Columns are weeks starting on Sunday, rows are weekdays. The first column
//! is the first Sunday on or after the day twelve months before `today`;
//! days after `today` are not part of the grid.

use crate::scale::ColorScale;
use chrono::{Datelike, Days, Months, NaiveDate};
use postlog_codec::PostLog;

/// Number of week columns.
pub const WEEKS: usize = 52;

/// Number of weekday rows.
pub const DAYS_PER_WEEK: usize = 7;

/// One day of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Calendar day.
    pub date: NaiveDate,
    /// Posts published that day.
    pub count: u32,
    /// Colour tier of the count.
    pub tier: usize,
    /// Column, from 0.
    pub week: usize,
    /// Row, 0 is Sunday.
    pub weekday: usize,
}

/// A month name placed above a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthLabel {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Column the label sits above.
    pub week: usize,
}

/// The trailing year bucketed into weeks.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    start: NaiveDate,
    today: NaiveDate,
    cells: Vec<Cell>,
    month_labels: Vec<MonthLabel>,
}

impl CalendarGrid {
    /// Buckets `log` into the year ending on `today`.
    pub fn build(log: &PostLog, today: NaiveDate, scale: &ColorScale) -> Self {
        let start = first_sunday(
            today
                .checked_sub_months(Months::new(12))
                .unwrap_or(NaiveDate::MIN),
        );

        let mut cells = Vec::with_capacity(WEEKS * DAYS_PER_WEEK);
        let mut month_labels = vec![MonthLabel {
            month: start.month(),
            week: 0,
        }];
        let mut date = start;

        'weeks: for week in 0..WEEKS {
            for weekday in 0..DAYS_PER_WEEK {
                if date > today {
                    break 'weeks;
                }
                if weekday == 0 && month_labels.last().is_some_and(|l| l.month != date.month()) {
                    month_labels.push(MonthLabel {
                        month: date.month(),
                        week,
                    });
                }
                let count = log.get(date);
                cells.push(Cell {
                    date,
                    count,
                    tier: scale.tier(count),
                    week,
                    weekday,
                });
                date = match date.checked_add_days(Days::new(1)) {
                    Some(next) => next,
                    None => break 'weeks,
                };
            }
        }

        Self {
            start,
            today,
            cells,
            month_labels,
        }
    }

    /// First day of the grid, a Sunday.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day the grid may contain.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Days in column-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell of `date`, if the grid covers it.
    pub fn cell(&self, date: NaiveDate) -> Option<&Cell> {
        let offset = usize::try_from((date - self.start).num_days()).ok()?;
        self.cells.get(offset).filter(|cell| cell.date == date)
    }

    /// Month labels in column order, starting with the first column.
    pub fn month_labels(&self) -> &[MonthLabel] {
        &self.month_labels
    }

    /// Posts published on the days of the grid.
    pub fn total_posts(&self) -> u64 {
        self.cells.iter().map(|cell| u64::from(cell.count)).sum()
    }
}

fn first_sunday(date: NaiveDate) -> NaiveDate {
    let ahead = (7 - date.weekday().num_days_from_sunday()) % 7;
    date.checked_add_days(Days::new(u64::from(ahead)))
        .unwrap_or(date)
}
